//! Shared application state handed to every route handler.
//!
//! [`AppState::from_config`] assembles the full component graph from a
//! [`FrontdeskConfig`]: history backend, FAQ index, provider adapter, the
//! resolver over them, and the session registry. Tests build the same graph
//! through [`AppState::with_components`] with doubles swapped in.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, bail};
use directories::BaseDirs;
use log::info;

use frontdesk_config::{FrontdeskConfig, HistoryBackend};
use frontdesk_core::{FaqIndex, Resolver, SessionRegistry};
use frontdesk_llm::{OllamaGenerator, OpenAiGenerator, TextGenerator};
use frontdesk_store::{FileKvStore, HistoryStore, KeyValueStore, MemoryKvStore};

/// Shared state behind the router, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<FrontdeskConfig>,
    pub faq: Arc<FaqIndex>,
    pub history: Arc<HistoryStore>,
    pub registry: Arc<SessionRegistry>,
    pub resolver: Arc<Resolver>,
    pub start_time: Instant,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("faq", &self.faq)
            .field("start_time", &self.start_time)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Assemble every component described by the configuration.
    pub fn from_config(config: FrontdeskConfig) -> anyhow::Result<Self> {
        let kv = open_kv_store(&config)?;
        let history = Arc::new(HistoryStore::new(kv, config.history.ttl_secs));
        let faq = Arc::new(load_faq_index(&config)?);
        let generator = build_generator(&config)?;
        info!(
            "components ready (provider={}, model={}, faq_entries={})",
            generator.name(),
            config.llm.model,
            faq.len()
        );
        Ok(Self::assemble(config, faq, history, generator))
    }

    /// Build state over explicit components. Used by tests to swap in
    /// in-memory stores and scripted generators.
    pub fn with_components(
        config: FrontdeskConfig,
        faq: Arc<FaqIndex>,
        history: Arc<HistoryStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self::assemble(config, faq, history, generator)
    }

    fn assemble(
        config: FrontdeskConfig,
        faq: Arc<FaqIndex>,
        history: Arc<HistoryStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new(history.clone()));
        let resolver = Arc::new(Resolver::new(
            faq.clone(),
            history.clone(),
            generator,
            &config,
        ));
        Self {
            config: Arc::new(config),
            faq,
            history,
            registry,
            resolver,
            start_time: Instant::now(),
        }
    }
}

fn open_kv_store(config: &FrontdeskConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match config.history.backend {
        HistoryBackend::Memory => Ok(Arc::new(MemoryKvStore::new())),
        HistoryBackend::File => {
            let root = config
                .history
                .path
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(default_history_root);
            info!("opening file history store (root={})", root.display());
            let store = FileKvStore::new(&root).with_context(|| {
                format!("failed to open history store at {}", root.display())
            })?;
            Ok(Arc::new(store))
        }
    }
}

/// Default root for the file backend when no path is configured.
fn default_history_root() -> PathBuf {
    if let Some(home) = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()) {
        return home.join(".frontdesk").join("history");
    }
    PathBuf::from(".frontdesk").join("history")
}

fn load_faq_index(config: &FrontdeskConfig) -> anyhow::Result<FaqIndex> {
    match config.faq.path.as_ref() {
        Some(path) => {
            info!("loading FAQ entries (path={})", path);
            FaqIndex::load_from_path(path)
                .with_context(|| format!("failed to load FAQ file {path}"))
        }
        None => Ok(FaqIndex::with_defaults()),
    }
}

fn build_generator(config: &FrontdeskConfig) -> anyhow::Result<Arc<dyn TextGenerator>> {
    match config.llm.provider.as_str() {
        "openai" => {
            let mut generator =
                OpenAiGenerator::from_env(&config.llm.api_key_env, config.llm.model.as_str())
                    .context("failed to configure the openai provider")?
                    .with_sampling(config.llm.temperature, config.llm.max_tokens);
            if let Some(api_url) = config.llm.api_url.as_ref() {
                generator = generator.with_api_url(api_url.as_str());
            }
            Ok(Arc::new(generator))
        }
        "ollama" => Ok(Arc::new(OllamaGenerator::new(
            config.llm.ollama_host.as_str(),
            config.llm.model.as_str(),
        ))),
        other => bail!("unknown llm provider: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_config::LlmConfig;

    #[test]
    fn from_config_rejects_unknown_provider() {
        let config = FrontdeskConfig::builder()
            .llm(LlmConfig {
                provider: "bedrock".to_string(),
                ..LlmConfig::default()
            })
            .build();

        let err = AppState::from_config(config).unwrap_err();
        assert!(err.to_string().contains("unknown llm provider"));
    }

    #[test]
    fn from_config_builds_ollama_provider_without_api_key() {
        let config = FrontdeskConfig::builder()
            .llm(LlmConfig {
                provider: "ollama".to_string(),
                ..LlmConfig::default()
            })
            .build();

        let state = AppState::from_config(config).unwrap();
        assert_eq!(state.config.llm.provider, "ollama");
        assert!(!state.faq.is_empty());
    }
}
