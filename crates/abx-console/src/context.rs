use crate::client::{ClientError, ExperimentClient};
use crate::config::ConsoleConfig;

/// Everything a command needs, passed explicitly instead of living in
/// process-wide state.
#[derive(Debug, Clone)]
pub struct ConsoleContext {
    pub config: ConsoleConfig,
    pub client: ExperimentClient,
}

impl ConsoleContext {
    pub fn new(config: ConsoleConfig) -> Result<Self, ClientError> {
        let client = ExperimentClient::new(&config.server)?;
        Ok(Self { config, client })
    }
}
