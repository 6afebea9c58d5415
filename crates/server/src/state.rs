use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use menufeed::{CdaClient, ContentSource, Endpoint, EntryQuery, LocaleScope, MenufeedConfig, Normalizer};
use std::sync::Arc;

/// Shared application state. Built once at startup and only read after.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Pipeline configuration (include overrides, locale field)
    pub pipeline: Arc<MenufeedConfig>,

    /// Where entries come from
    pub source: Arc<dyn ContentSource>,

    /// Normalization rules
    pub normalizer: Arc<Normalizer>,
}

impl ServerState {
    /// Create state backed by the delivery API client.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline = match &config.pipeline_file {
            Some(path) => MenufeedConfig::from_file(path)
                .map_err(|e| ServerError::Config(format!("{path}: {e}")))?,
            None => MenufeedConfig::default(),
        };
        let client = CdaClient::new(&config.delivery).map_err(|e| ServerError::Config(e.to_string()))?;
        Ok(Self::with_source(config, pipeline, Arc::new(client)))
    }

    /// Create state over any content source.
    pub fn with_source(
        config: ServerConfig,
        pipeline: MenufeedConfig,
        source: Arc<dyn ContentSource>,
    ) -> Self {
        let normalizer = Arc::new(pipeline.normalizer());
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            source,
            normalizer,
        }
    }

    /// The listing query an endpoint runs for a scope.
    pub fn query(&self, endpoint: Endpoint, scope: &LocaleScope) -> EntryQuery {
        endpoint.query(
            self.pipeline.include_for(endpoint),
            scope,
            &self.pipeline.locale.language_field,
        )
    }
}
