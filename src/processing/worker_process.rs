// ワーカーサブプロセスのハンドル
// 子プロセスの標準入出力をIPCチャンネルとして包む

use super::protocol::{WorkerRequest, WorkerResponse};
use crate::core::{Chunk, ChunkOutput, Image, RunError, RunResult};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

/// ワーカーモードで起動するための隠しフラグ
pub const INTERNAL_WORKER_FLAG: &str = "--internal-worker";

/// 起動済みワーカープロセス
///
/// ドロップされると子プロセスは強制終了される。
pub struct WorkerProcess {
    id: usize,
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl WorkerProcess {
    /// ワーカープログラムを `--internal-worker <locator>` で起動
    pub fn spawn(id: usize, program: &Path, locator: &str) -> RunResult<Self> {
        let mut child = Command::new(program)
            .arg(INTERNAL_WORKER_FLAG)
            .arg(locator)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RunError::worker(id, format!("failed to spawn {}: {e}", program.display()))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RunError::worker(id, "child stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunError::worker(id, "child stdout not captured"))?;

        debug!(worker_id = id, pid = ?child.id(), "Spawned worker process");

        Ok(Self {
            id,
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// 読み込み完了（Ready）を待つ
    ///
    /// ワーカー側で読み込みに失敗した場合は読み込み/契約エラーになる。
    pub async fn wait_for_ready(&mut self, locator: &str) -> RunResult<()> {
        match self.recv().await? {
            Some(WorkerResponse::Ready) => Ok(()),
            Some(WorkerResponse::LoadFailed { kind, reason }) => {
                Err(WorkerResponse::into_load_error(kind, locator, reason))
            }
            Some(other) => Err(RunError::worker(
                self.id,
                format!("unexpected response instead of ready: {other:?}"),
            )),
            None => Err(self.exited_early("before signalling ready").await),
        }
    }

    /// チャンクを送り、結果を受け取る
    pub async fn process_chunk(&mut self, chunk: Chunk<Image>) -> RunResult<ChunkOutput> {
        let chunk_index = chunk.index;
        self.send(&WorkerRequest::process_chunk(chunk)).await?;

        match self.recv().await? {
            Some(WorkerResponse::ChunkDone { output }) if output.chunk_index == chunk_index => {
                Ok(output)
            }
            Some(WorkerResponse::ChunkDone { output }) => Err(RunError::worker(
                self.id,
                format!(
                    "returned chunk {} while chunk {chunk_index} was in flight",
                    output.chunk_index
                ),
            )),
            Some(WorkerResponse::Error { message }) => Err(RunError::worker(self.id, message)),
            Some(other) => Err(RunError::worker(
                self.id,
                format!("unexpected response to chunk {chunk_index}: {other:?}"),
            )),
            None => Err(self.exited_early(&format!("while processing chunk {chunk_index}")).await),
        }
    }

    /// 終了を要求して子プロセスを回収
    pub async fn shutdown(mut self) -> RunResult<()> {
        self.send(&WorkerRequest::Exit).await?;
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| RunError::worker(self.id, format!("failed to wait for worker: {e}")))?;
        if !status.success() {
            warn!(worker_id = self.id, %status, "Worker exited with non-zero status");
        }
        Ok(())
    }

    async fn send(&mut self, request: &WorkerRequest) -> RunResult<()> {
        let line = request.to_line()?;
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| RunError::worker(self.id, format!("failed to send request: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| RunError::worker(self.id, format!("failed to flush request: {e}")))
    }

    /// 次のプロトコル応答を受け取る（EOFならNone）
    ///
    /// ユーザーコードが標準出力へ書いた行は警告を出して読み飛ばす。
    async fn recv(&mut self) -> RunResult<Option<WorkerResponse>> {
        loop {
            let line = self
                .stdout
                .next_line()
                .await
                .map_err(|e| RunError::worker(self.id, format!("failed to read response: {e}")))?;

            let Some(line) = line else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                continue;
            }

            match WorkerResponse::from_line(&line) {
                Ok(response) => return Ok(Some(response)),
                Err(_) => {
                    warn!(worker_id = self.id, output = %line, "Ignoring non-protocol output from worker");
                }
            }
        }
    }

    async fn exited_early(&mut self, context: &str) -> RunError {
        let status = match self.child.wait().await {
            Ok(status) => status.to_string(),
            Err(e) => format!("unknown status ({e})"),
        };
        RunError::worker(self.id, format!("exited {context}: {status}"))
    }
}
