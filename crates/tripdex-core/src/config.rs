//! Typed configuration loaded via Figment.
//!
//! Merges `tripdex.toml` + `tripdex.<env>.toml` (env from `RUST_ENV`) +
//! `TRIPDEX_*` environment variables (`__` as section separator), then
//! extracts into [`Settings`] with serde defaults. Path helpers expand `~`
//! and `${VAR}` and resolve relative paths against a base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub index: IndexSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexSettings {
    #[serde(default = "IndexSettings::default_text_dir")]
    pub text_dir: String,
    #[serde(default = "IndexSettings::default_vector_dir")]
    pub vector_dir: String,
    #[serde(default = "IndexSettings::default_vector_table")]
    pub vector_table: String,
}

impl IndexSettings {
    fn default_text_dir() -> String {
        "indexes/text".to_string()
    }
    fn default_vector_dir() -> String {
        "indexes/vector".to_string()
    }
    fn default_vector_table() -> String {
        "travel_docs".to_string()
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            text_dir: Self::default_text_dir(),
            vector_dir: Self::default_vector_dir(),
            vector_table: Self::default_vector_table(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "LlmSettings::default_base_url")]
    pub base_url: String,
    /// Empty means "no key configured": the search service then runs with
    /// the language-model and embedding collaborators disabled.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "LlmSettings::default_chat_model")]
    pub chat_model: String,
    #[serde(default = "LlmSettings::default_embed_model")]
    pub embed_model: String,
    #[serde(default = "LlmSettings::default_embed_dim")]
    pub embed_dim: usize,
    #[serde(default = "LlmSettings::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LlmSettings {
    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }
    fn default_chat_model() -> String {
        "gpt-3.5-turbo".to_string()
    }
    fn default_embed_model() -> String {
        "text-embedding-3-small".to_string()
    }
    fn default_embed_dim() -> usize {
        1536
    }
    fn default_timeout_secs() -> u64 {
        30
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            api_key: String::new(),
            chat_model: Self::default_chat_model(),
            embed_model: Self::default_embed_model(),
            embed_dim: Self::default_embed_dim(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "SearchSettings::default_limit")]
    pub default_limit: usize,
    #[serde(default = "SearchSettings::default_rrf_k")]
    pub rrf_k: u32,
}

impl SearchSettings {
    fn default_limit() -> usize {
        10
    }
    fn default_rrf_k() -> u32 {
        60
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: Self::default_limit(),
            rrf_k: Self::default_rrf_k(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("tripdex.toml"))
            .merge(Toml::file(format!("tripdex.{env_name}.toml")))
            .merge(Env::prefixed("TRIPDEX_").split("__"));

        let settings: Settings = figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.search.rrf_k == 0 {
            return Err(Error::InvalidConfig("search.rrf_k must be > 0".to_string()));
        }
        if self.llm.embed_dim == 0 {
            return Err(Error::InvalidConfig(
                "llm.embed_dim must be > 0".to_string(),
            ));
        }
        if self.search.default_limit == 0 {
            return Err(Error::InvalidConfig(
                "search.default_limit must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after
/// expansion. Absolute paths are returned as-is.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
