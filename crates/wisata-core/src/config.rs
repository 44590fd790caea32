use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, WisataError};

/// Top-level configuration for the Wisata travel assistant.
///
/// Loaded from `~/.wisata/config.toml` by default. Every section falls back
/// to its defaults, so a partial file is enough.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WisataConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub datasets: DatasetConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub keywords: KeywordConfig,
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

impl WisataConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WisataConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| WisataError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// HTTP API port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            port: 3030,
        }
    }
}

/// Locations of the four CSV datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub transport_path: String,
    pub promo_path: String,
    pub destination_path: String,
    pub hotel_path: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            transport_path: "data/transport_schedule.csv".to_string(),
            promo_path: "data/promo_travel.csv".to_string(),
            destination_path: "data/destination_info.csv".to_string(),
            hotel_path: "data/hotel_availability.csv".to_string(),
        }
    }
}

/// Language model client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name passed to the provider.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Override for the provider base URL.
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// HTTP timeout for a single provider call.
    pub timeout_secs: u64,
    /// Upper bound on tool-call rounds in one agent run.
    pub agent_max_iterations: usize,
    /// Number of recent user/bot exchanges the agent sees as memory.
    pub memory_turns: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            base_url: None,
            temperature: 0.0,
            max_output_tokens: 2048,
            timeout_secs: 120,
            agent_max_iterations: 5,
            memory_turns: 5,
        }
    }
}

/// Retrieval index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of snippets returned per transport-schedule lookup.
    pub top_k: usize,
    /// Embedding dimensionality of the hashing embedder.
    pub dimensions: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            dimensions: 256,
        }
    }
}

/// Chat session and turn-handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum utterance length in characters.
    pub max_message_length: usize,
    /// History entries passed as context to the plain language-model fallback.
    pub fallback_context_entries: usize,
    /// Inactivity timeout for API sessions; 0 keeps sessions forever.
    pub session_timeout_minutes: u32,
    /// Agent replies containing this phrase (case-insensitive) are discarded.
    pub non_knowledge_marker: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: 2000,
            fallback_context_entries: 10,
            session_timeout_minutes: 0,
            non_knowledge_marker: "i don't know".to_string(),
        }
    }
}

/// Keyword sets used by intent classification, one list per indicator.
///
/// Matching is case-insensitive substring containment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub recommendation: Vec<String>,
    pub lodging: Vec<String>,
    pub bundle_transport: Vec<String>,
    pub promo: Vec<String>,
    pub transport: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        let list = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            recommendation: list(&["rekomendasi"]),
            lodging: list(&["hotel", "penginapan"]),
            bundle_transport: list(&["kendaraan", "transport"]),
            promo: list(&["promo"]),
            transport: list(&["transportasi", "kendaraan", "harga", "tiket", "biaya"]),
        }
    }
}

/// City explorer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Wikipedia language edition used for city descriptions.
    pub wikipedia_lang: String,
    /// Number of sentences kept from the description.
    pub description_sentences: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            wikipedia_lang: "id".to_string(),
            description_sentences: 3,
        }
    }
}
