use reformer_core::{
    Config, ContentFilter, JobRegistry, WorkspaceManager,
};
use reformer_core::service::ConversionService;

/// Shared application state behind every handler.
pub struct AppState {
    config: Config,
    workspaces: WorkspaceManager,
    filter: ContentFilter,
    service: ConversionService,
    registry: JobRegistry,
}

impl AppState {
    pub fn new(
        config: Config,
        workspaces: WorkspaceManager,
        service: ConversionService,
        registry: JobRegistry,
    ) -> Self {
        let filter = ContentFilter::new(config.filter.clone(), config.limits.clone());
        Self {
            config,
            workspaces,
            filter,
            service,
            registry,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    pub fn filter(&self) -> &ContentFilter {
        &self.filter
    }

    pub fn service(&self) -> &ConversionService {
        &self.service
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }
}
