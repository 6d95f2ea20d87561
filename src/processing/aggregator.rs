// 結果集約
// 投入順にチャンク出力を並べ、1本の列へ平坦化する

use crate::core::{ChunkOutput, ResultSet, RunError, RunResult};

/// 完了順に届いたチャンク出力を投入順に並べ直す
///
/// 欠けた・重複したチャンク番号は部分結果として扱わずエラーにする。
pub fn order_by_submission(
    chunk_count: usize,
    outputs: Vec<ChunkOutput>,
) -> RunResult<Vec<ChunkOutput>> {
    let mut slots: Vec<Option<ChunkOutput>> = (0..chunk_count).map(|_| None).collect();

    for output in outputs {
        let index = output.chunk_index;
        let Some(slot) = slots.get_mut(index) else {
            return Err(RunError::protocol(format!(
                "chunk {index} is out of range (submitted {chunk_count})"
            )));
        };
        if slot.is_some() {
            return Err(RunError::protocol(format!("chunk {index} was returned twice")));
        }
        *slot = Some(output);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| RunError::protocol(format!("chunk {index} never completed")))
        })
        .collect()
}

/// チャンク出力を順番通りに連結
pub fn flatten(outputs: Vec<ChunkOutput>) -> ResultSet {
    ResultSet::new(outputs.into_iter().flat_map(|output| output.outcomes).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ImageFailure, ImageOutcome};
    use serde_json::json;

    fn output(chunk_index: usize, indexes: &[usize]) -> ChunkOutput {
        ChunkOutput {
            chunk_index,
            outcomes: indexes
                .iter()
                .map(|&index| ImageOutcome::Processed { index, value: json!(index * 10) })
                .collect(),
        }
    }

    #[test]
    fn test_order_by_submission_ignores_completion_order() {
        let completed = vec![output(2, &[4, 5]), output(0, &[0, 1]), output(1, &[2, 3])];
        let ordered = order_by_submission(3, completed).unwrap();

        let indexes: Vec<usize> = ordered.iter().map(|o| o.chunk_index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn test_missing_chunk_is_error() {
        let result = order_by_submission(3, vec![output(0, &[0]), output(2, &[2])]);
        assert!(matches!(result, Err(RunError::ProtocolError { .. })));
    }

    #[test]
    fn test_duplicate_or_unknown_chunk_is_error() {
        assert!(order_by_submission(2, vec![output(0, &[0]), output(0, &[0])]).is_err());
        assert!(order_by_submission(1, vec![output(5, &[0])]).is_err());
    }

    #[test]
    fn test_flatten_preserves_order_and_skips_empty_chunks() {
        let result_set = flatten(vec![output(0, &[0, 1]), output(1, &[]), output(2, &[2])]);
        assert_eq!(result_set.into_values(), vec![json!(0), json!(10), json!(20)]);
    }

    #[test]
    fn test_flatten_keeps_failures_in_position() {
        let mut first = output(0, &[0]);
        first.outcomes.push(ImageOutcome::Failed(ImageFailure {
            index: 1,
            image_id: "image-1".to_string(),
            reason: "boom".to_string(),
        }));
        let result_set = flatten(vec![first, output(1, &[2])]);

        let positions: Vec<usize> = result_set.outcomes().iter().map(|o| o.index()).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(result_set.processed_count(), 2);
        assert_eq!(result_set.failed_count(), 1);
    }
}
