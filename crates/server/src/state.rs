use std::path::Path;
use std::sync::Arc;

use logfetch_core::{Authenticator, Config, JobDispatcher, JobRegistry, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    registry: Arc<JobRegistry>,
    dispatcher: JobDispatcher,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        registry: Arc<JobRegistry>,
        dispatcher: JobDispatcher,
    ) -> Self {
        Self {
            config,
            authenticator,
            registry,
            dispatcher,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn registry(&self) -> &JobRegistry {
        self.registry.as_ref()
    }

    pub fn dispatcher(&self) -> &JobDispatcher {
        &self.dispatcher
    }

    pub fn archive_dir(&self) -> &Path {
        &self.config.fetcher.archive_dir
    }
}
