use crate::processing::run_worker_main;

/// Execute the hidden worker command, returning the process exit code
pub fn execute_worker(locator: &str) -> i32 {
    tracing::debug!(pid = std::process::id(), %locator, "Starting worker process");
    run_worker_main(locator)
}
