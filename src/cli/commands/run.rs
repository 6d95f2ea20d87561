use crate::{
    config::DefaultExecutionConfig,
    core::{DatasetId, ResultSet},
    engine::{create_default_driver, provider_for},
    workload::WorkloadLocator,
};
use anyhow::Result;

/// Configuration for the run command
pub struct RunConfig {
    pub workload: String,
    pub dataset_id: String,
}

/// Execute the run command with settings taken from the environment
pub async fn execute_run(config: RunConfig) -> Result<ResultSet> {
    let execution = DefaultExecutionConfig::from_env()?;
    execute_run_with_config(config, execution).await
}

/// Execute the run command with an explicit execution config
pub async fn execute_run_with_config(
    config: RunConfig,
    execution: DefaultExecutionConfig,
) -> Result<ResultSet> {
    let provider = provider_for(&execution);
    let driver = create_default_driver(provider, execution)?;

    let locator = WorkloadLocator::parse(&config.workload);
    let results = driver.run(&locator, &DatasetId::from(config.dataset_id)).await?;
    Ok(results)
}
