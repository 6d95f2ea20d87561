use clap::Parser;
use image_parallel::{
    cli::{execute_run, execute_worker, usage, Cli, RunConfig},
    logging::{self, LogConfig},
};

fn main() {
    let cli = Cli::parse();
    logging::init(LogConfig::default().with_env_overrides());

    // ワーカーとして再実行された場合は要求ループのみを回す
    if let Some(locator) = cli.internal_worker {
        std::process::exit(execute_worker(&locator));
    }

    let (Some(workload), Some(dataset_id)) = (cli.workload, cli.dataset_id) else {
        println!("{}", usage());
        std::process::exit(1);
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("Error: failed to start async runtime: {error}");
            std::process::exit(1);
        }
    };

    if let Err(error) = runtime.block_on(execute_run(RunConfig { workload, dataset_id })) {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}
