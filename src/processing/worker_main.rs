// ワーカープロセスのメインループ
//
// `--internal-worker <locator>` で起動された時に実行される。
// 標準入力から要求を読み、起動時に退避した元の標準出力へ応答を書く。
// ワークロードの読み込み前に fd 1 を標準エラーへ付け替えるため、
// ユーザーコードの出力がプロトコルの行に混ざることはない。

use super::chunk_runner::run_chunk;
use super::protocol::{WorkerRequest, WorkerResponse};
use crate::core::{RunError, RunResult};
use crate::workload::WorkloadLocator;
use std::io::{BufRead, BufWriter, Write};
use tracing::{debug, error, info};

/// 起動時にワークロードを読み込み、要求ループを回す
///
/// 戻り値はプロセスの終了コードに使う。
pub fn run_worker_main(locator: &str) -> i32 {
    let channel = match take_protocol_channel() {
        Ok(channel) => channel,
        Err(e) => {
            error!("Worker error: {e}");
            return 1;
        }
    };
    let stdin = std::io::stdin();

    match worker_loop(locator, stdin.lock(), BufWriter::new(channel)) {
        Ok(()) => 0,
        Err(e) => {
            error!("Worker error: {e}");
            1
        }
    }
}

/// 標準出力を複製してプロトコル専用にし、fd 1 を標準エラーへ向け直す
#[cfg(unix)]
pub fn take_protocol_channel() -> RunResult<std::fs::File> {
    use std::os::fd::AsFd;

    let mut stdout = std::io::stdout();
    stdout
        .flush()
        .map_err(|e| RunError::protocol(format!("failed to flush stdout: {e}")))?;

    let channel = stdout
        .as_fd()
        .try_clone_to_owned()
        .map_err(|e| RunError::protocol(format!("failed to duplicate stdout: {e}")))?;
    nix::unistd::dup2_stdout(std::io::stderr())
        .map_err(|e| RunError::protocol(format!("failed to redirect stdout to stderr: {e}")))?;

    Ok(std::fs::File::from(channel))
}

/// fdの付け替えができない環境では標準出力をそのまま使う
#[cfg(not(unix))]
pub fn take_protocol_channel() -> RunResult<std::io::Stdout> {
    Ok(std::io::stdout())
}

/// 要求ループ本体（テストのため入出力を差し替え可能にしている）
pub fn worker_loop<R, W>(locator: &str, reader: R, mut writer: W) -> RunResult<()>
where
    R: BufRead,
    W: Write,
{
    let locator = WorkloadLocator::parse(locator);
    let workload = match locator.load() {
        Ok(workload) => workload,
        Err(e) => {
            error!(%locator, "Failed to load workload: {e}");
            send(&mut writer, &WorkerResponse::load_failed(&e))?;
            return Ok(());
        }
    };
    info!(pid = std::process::id(), workload = workload.name(), "Worker ready");
    send(&mut writer, &WorkerResponse::Ready)?;

    for line in reader.lines() {
        let line = line.map_err(|e| RunError::protocol(format!("failed to read request: {e}")))?;
        if line.trim().is_empty() {
            continue;
        }

        let request = match WorkerRequest::from_line(&line) {
            Ok(request) => request,
            Err(e) => {
                send(&mut writer, &WorkerResponse::error(format!("Invalid request: {e}")))?;
                continue;
            }
        };

        match request {
            WorkerRequest::Exit => return Ok(()),
            WorkerRequest::ProcessChunk { chunk } => {
                debug!(chunk_index = chunk.index, images = chunk.len(), "Processing chunk");
                let output = run_chunk(workload.as_ref(), &chunk);
                send(&mut writer, &WorkerResponse::ChunkDone { output })?;
            }
        }
    }

    // 親がパイプを閉じた
    Ok(())
}

fn send<W: Write>(writer: &mut W, response: &WorkerResponse) -> RunResult<()> {
    let line = response.to_line()?;
    writer
        .write_all(line.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| RunError::protocol(format!("failed to write response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Chunk, Image, ImageOutcome};
    use serde_json::json;
    use std::io::Cursor;

    fn responses(output: Vec<u8>) -> Vec<WorkerResponse> {
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| WorkerResponse::from_line(line).unwrap())
            .collect()
    }

    fn request_lines(requests: &[WorkerRequest]) -> Cursor<Vec<u8>> {
        let text: String = requests.iter().map(|r| r.to_line().unwrap()).collect();
        Cursor::new(text.into_bytes())
    }

    #[test]
    fn test_ready_then_chunk_then_exit() {
        let chunk = Chunk {
            index: 0,
            offset: 0,
            items: vec![
                Image::grayscale("a", 1, 1, vec![5]).unwrap(),
                Image::grayscale("b", 0, 0, Vec::new()).unwrap(),
            ],
        };
        let input = request_lines(&[WorkerRequest::process_chunk(chunk), WorkerRequest::Exit]);
        let mut output = Vec::new();

        worker_loop("builtin:sum", input, &mut output).unwrap();

        let responses = responses(output);
        assert_eq!(responses.len(), 2);
        assert!(matches!(responses[0], WorkerResponse::Ready));
        match &responses[1] {
            WorkerResponse::ChunkDone { output } => {
                assert_eq!(output.outcomes[0].value(), Some(&json!(5)));
                assert!(matches!(output.outcomes[1], ImageOutcome::Failed(_)));
            }
            other => panic!("Expected ChunkDone, got {other:?}"),
        }
    }

    #[test]
    fn test_load_failure_is_reported_and_loop_ends() {
        let input = request_lines(&[WorkerRequest::Exit]);
        let mut output = Vec::new();

        worker_loop("builtin:nope", input, &mut output).unwrap();

        let responses = responses(output);
        assert_eq!(responses.len(), 1);
        assert!(matches!(responses[0], WorkerResponse::LoadFailed { .. }));
    }

    #[test]
    fn test_invalid_request_gets_error_response() {
        let input = Cursor::new(b"not json\n".to_vec());
        let mut output = Vec::new();

        worker_loop("builtin:sum", input, &mut output).unwrap();

        let responses = responses(output);
        assert!(matches!(responses[1], WorkerResponse::Error { .. }));
    }
}
