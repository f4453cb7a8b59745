//! Configuration schema for the frontdesk relay.

use serde::{Deserialize, Serialize};

/// Root config for the frontdesk service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FrontdeskConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub faq: FaqConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub escalation: EscalationConfig,
}

impl FrontdeskConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> FrontdeskConfigBuilder {
        FrontdeskConfigBuilder::new()
    }
}

/// Builder for assembling a `FrontdeskConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct FrontdeskConfigBuilder {
    config: FrontdeskConfig,
}

impl FrontdeskConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: FrontdeskConfig::default(),
        }
    }

    /// Replace the HTTP listener configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the FAQ source configuration.
    pub fn faq(mut self, faq: FaqConfig) -> Self {
        self.config.faq = faq;
        self
    }

    /// Replace the history persistence configuration.
    pub fn history(mut self, history: HistoryConfig) -> Self {
        self.config.history = history;
        self
    }

    /// Replace the provider configuration.
    pub fn llm(mut self, llm: LlmConfig) -> Self {
        self.config.llm = llm;
        self
    }

    /// Replace the session lifecycle configuration.
    pub fn sessions(mut self, sessions: SessionsConfig) -> Self {
        self.config.sessions = sessions;
        self
    }

    /// Replace the escalation detection configuration.
    pub fn escalation(mut self, escalation: EscalationConfig) -> Self {
        self.config.escalation = escalation;
        self
    }

    /// Finalize and return the built `FrontdeskConfig`.
    pub fn build(self) -> FrontdeskConfig {
        self.config
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// FAQ data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqConfig {
    /// Path to a JSON file holding FAQ entries. None uses the built-in set.
    #[serde(default)]
    pub path: Option<String>,
    /// Minimum relevance score for a direct FAQ answer.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: u32,
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            path: None,
            match_threshold: default_match_threshold(),
        }
    }
}

fn default_match_threshold() -> u32 {
    3
}

/// Conversation history persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub backend: HistoryBackend,
    /// Root directory for the file backend. None resolves to a default
    /// under the user's home directory.
    #[serde(default)]
    pub path: Option<String>,
    /// History time-to-live in seconds, refreshed on every write.
    #[serde(default = "default_history_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: HistoryBackend::default(),
            path: None,
            ttl_secs: default_history_ttl_secs(),
        }
    }
}

fn default_history_ttl_secs() -> u64 {
    86_400
}

/// History backend selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    Memory,
    File,
}

/// Text-generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name, `openai` or `ollama`.
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Endpoint override for OpenAI-compatible providers.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Environment variable holding the API key. Keys never live in config
    /// files.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Provider call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Number of most-recent history messages sent as context.
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            api_url: None,
            api_key_env: default_api_key_env(),
            ollama_host: default_ollama_host(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            context_window: default_context_window(),
        }
    }
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_context_window() -> usize {
    10
}

/// Session lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Interval between idle-session sweeps, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Idle age after which a session is swept, in seconds.
    #[serde(default = "default_max_idle_secs")]
    pub max_idle_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            max_idle_secs: default_max_idle_secs(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    3_600
}

fn default_max_idle_secs() -> u64 {
    86_400
}

/// Escalation detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Phrases in a user message that request a human directly.
    #[serde(default = "default_user_phrases")]
    pub user_phrases: Vec<String>,
    /// Phrases in an assistant reply that signal a hand-off.
    #[serde(default = "default_response_phrases")]
    pub response_phrases: Vec<String>,
    /// Conversations longer than this many messages count as long.
    #[serde(default = "default_long_conversation_turns")]
    pub long_conversation_turns: usize,
    /// Number of most-recent messages inspected for repetition.
    #[serde(default = "default_repetition_window")]
    pub repetition_window: usize,
    /// Minimum user turns within the repetition window.
    #[serde(default = "default_repetition_min_user_turns")]
    pub repetition_min_user_turns: usize,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            user_phrases: default_user_phrases(),
            response_phrases: default_response_phrases(),
            long_conversation_turns: default_long_conversation_turns(),
            repetition_window: default_repetition_window(),
            repetition_min_user_turns: default_repetition_min_user_turns(),
        }
    }
}

fn default_user_phrases() -> Vec<String> {
    [
        "speak to human",
        "human agent",
        "real person",
        "manager",
        "supervisor",
        "escalate",
        "complaint",
        "legal",
        "lawsuit",
        "frustrated",
        "angry",
        "terrible service",
        "worst",
        "cancel account",
        "delete account",
        "refund immediately",
    ]
    .iter()
    .map(|phrase| phrase.to_string())
    .collect()
}

fn default_response_phrases() -> Vec<String> {
    ["human agent", "not sure", "don't know", "transfer", "unable to"]
        .iter()
        .map(|phrase| phrase.to_string())
        .collect()
}

fn default_long_conversation_turns() -> usize {
    8
}

fn default_repetition_window() -> usize {
    4
}

fn default_repetition_min_user_turns() -> usize {
    3
}
