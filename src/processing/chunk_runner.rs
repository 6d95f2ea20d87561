// チャンク処理 - ワーカー内で画像を1枚ずつ処理する

use crate::core::{Chunk, ChunkOutput, Image, ImageFailure, ImageOutcome, RunError};
use crate::workload::Workload;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// チャンク内の画像を順番に処理
///
/// 画像単位の失敗（エラーまたはパニック）はここで捕捉し、
/// 診断を記録して次の画像へ進む。チャンク自体は中断しない。
pub fn run_chunk<W>(workload: &W, chunk: &Chunk<Image>) -> ChunkOutput
where
    W: Workload + ?Sized,
{
    let outcomes = chunk
        .items
        .iter()
        .enumerate()
        .map(|(position, image)| process_image(workload, chunk.offset + position, image))
        .collect();

    ChunkOutput {
        chunk_index: chunk.index,
        outcomes,
    }
}

fn process_image<W>(workload: &W, index: usize, image: &Image) -> ImageOutcome
where
    W: Workload + ?Sized,
{
    let result = panic::catch_unwind(AssertUnwindSafe(|| workload.process(image)));

    let reason = match result {
        Ok(Ok(value)) => return ImageOutcome::Processed { index, value },
        Ok(Err(e)) => format!("{e:#}"),
        Err(payload) => format!("workload panicked: {}", panic_message(payload.as_ref())),
    };

    let failure = ImageFailure {
        index,
        image_id: image.id.clone(),
        reason,
    };
    let error = RunError::from(&failure);
    error!(
        severity = error.severity().as_str(),
        workload = workload.name(),
        "{error}"
    );

    ImageOutcome::Failed(failure)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
