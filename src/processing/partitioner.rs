// データセット分割
// 固定幅のストライドで連続したチャンクを切り出す

use crate::core::Chunk;

/// チャンクの基準サイズ: max(1, floor(N / W))
pub fn chunk_size(item_count: usize, worker_count: usize) -> usize {
    (item_count / worker_count.max(1)).max(1)
}

/// 順序付きの列をワーカー数に応じたチャンクへ分割
///
/// 基準サイズごとに先頭から切り出し、最後のチャンクには残りが入る。
/// そのためチャンク数はワーカー数を超えることがある。
pub fn partition<T>(items: Vec<T>, worker_count: usize) -> Vec<Chunk<T>> {
    let size = chunk_size(items.len(), worker_count);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut remaining = items.into_iter().peekable();
    let mut offset = 0;

    while remaining.peek().is_some() {
        let chunk_items: Vec<T> = remaining.by_ref().take(size).collect();
        let len = chunk_items.len();
        chunks.push(Chunk {
            index: chunks.len(),
            offset,
            items: chunk_items,
        });
        offset += len;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes<T>(chunks: &[Chunk<T>]) -> Vec<usize> {
        chunks.iter().map(Chunk::len).collect()
    }

    #[test]
    fn test_concatenation_reconstitutes_input() {
        for n in 1..=40usize {
            for w in 1..=12usize {
                let items: Vec<usize> = (0..n).collect();
                let chunks = partition(items.clone(), w);
                let rebuilt: Vec<usize> = chunks.iter().flat_map(|c| c.items.clone()).collect();
                assert_eq!(rebuilt, items, "n={n} w={w}");
            }
        }
    }

    #[test]
    fn test_chunk_indexes_and_offsets() {
        let chunks = partition((0..7).collect::<Vec<_>>(), 3);

        assert_eq!(sizes(&chunks), vec![2, 2, 2, 1]);
        for (position, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, position);
            assert_eq!(chunk.items[0], chunk.offset);
        }
    }

    #[test]
    fn test_stride_rule_ten_items_four_workers() {
        let chunks = partition((0..10).collect::<Vec<_>>(), 4);
        assert_eq!(sizes(&chunks), vec![2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_remainder_goes_to_last_chunk() {
        let chunks = partition((0..10).collect::<Vec<_>>(), 3);
        assert_eq!(sizes(&chunks), vec![3, 3, 3, 1]);
    }

    #[test]
    fn test_fewer_items_than_workers() {
        let chunks = partition(vec!['a', 'b', 'c'], 8);
        assert_eq!(sizes(&chunks), vec![1, 1, 1]);
    }

    #[test]
    fn test_zero_workers_treated_as_one() {
        let chunks = partition(vec![1, 2, 3], 0);
        assert_eq!(sizes(&chunks), vec![3]);
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(partition(Vec::<u8>::new(), 4).is_empty());
    }
}
