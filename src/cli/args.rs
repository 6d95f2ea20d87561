use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "image_parallel")]
#[command(about = "Apply an image-processing workload to every image of a dataset in parallel")]
#[command(version)]
pub struct Cli {
    /// Workload locator: builtin:<name>, a JSON manifest, or a plugin library
    pub workload: Option<String>,

    /// Dataset identifier
    pub dataset_id: Option<String>,

    /// Run as a worker process serving the given workload locator
    #[arg(long, hide = true, value_name = "LOCATOR", allow_hyphen_values = true)]
    pub internal_worker: Option<String>,
}

/// 引数不足時に標準出力へ出す使い方
pub fn usage() -> String {
    [
        "Usage: image_parallel <workload> <dataset_id>",
        "",
        "  <workload>    builtin:<name> (sum, mean, histogram, gaussian_blur),",
        "                a JSON manifest path, or a plugin library (.so/.dylib/.dll)",
        "  <dataset_id>  dataset identifier",
        "",
        "Environment: IMAGE_PARALLEL_WORKERS, IMAGE_PARALLEL_DATASET_ROOT, IMAGE_PARALLEL_LOG",
    ]
    .join("\n")
}
