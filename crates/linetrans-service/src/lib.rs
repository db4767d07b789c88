pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod processor;
pub mod progress;
pub mod status_log;
#[cfg(test)]
mod test_support;

pub use config::TranslateConfig;
pub use driver::{PipelineDriver, RunSummary};
pub use error::PipelineError;
pub use executor::{CompletionTransport, HttpTransport, RequestExecutor, TransformResult};
pub use processor::RecordProcessor;
pub use status_log::{FileStatusLog, StatusLog};

/// Installs `env_logger` for the diagnostic channel; `RUST_LOG` overrides `info`.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    // a second init (tests, embedding) is not an error worth surfacing
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Runs the whole pipeline with the real HTTP transport and file status log.
pub fn run(config: &TranslateConfig) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    let transport = HttpTransport::new(config)?;
    let status_log = FileStatusLog::new(&config.log_file).with_field_tags(config.concurrent_fields);
    let driver = PipelineDriver::new(config, &transport, &status_log);
    driver.run(&config.input_file, &config.output_file)
}
