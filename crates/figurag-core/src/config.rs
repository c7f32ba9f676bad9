use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    /// Merges `config.toml`, `config.<env>.toml` and `APP_*` variables
    /// (`__` separates nesting: `APP_RETRIEVAL__TOP_K=3`).
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Self::from_figment(figment, &env_name)
    }

    /// Wraps an already assembled figment; defaults fill every missing key.
    pub fn from_figment(figment: Figment, env_name: &str) -> anyhow::Result<Self> {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(figment);
        let config = Self { figment, env_name: env_name.to_string() };
        config.validate_for_env(env_name)?;
        Ok(config)
    }

    pub fn from_toml_str(toml: &str, env_name: &str) -> anyhow::Result<Self> {
        Self::from_figment(Figment::new().merge(Toml::string(toml)), env_name)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.validate()?;
        match env {
            "prod" | "production" => {
                if settings.provider.kind == ProviderKind::Fake {
                    return Err(crate::Error::InvalidConfig(
                        "the fake provider is not allowed in production".into(),
                    )
                    .into());
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

/// Typed view over every recognised configuration key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub knowledge: KnowledgeSettings,
    pub retrieval: RetrievalSettings,
    pub provider: ProviderSettings,
    pub server: ServerSettings,
}

impl Settings {
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: &str| Err(crate::Error::InvalidConfig(msg.to_string()));
        if self.retrieval.top_k == 0 {
            return invalid("retrieval.top_k must be greater than zero");
        }
        if self.retrieval.chunk_max_chars == 0 {
            return invalid("retrieval.chunk_max_chars must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.retrieval.similarity_threshold) {
            return invalid("retrieval.similarity_threshold must be within [0, 1]");
        }
        if self.retrieval.semantic_weight < 0.0 {
            return invalid("retrieval.semantic_weight must not be negative");
        }
        if self.provider.timeout_secs == 0 {
            return invalid("provider.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnowledgeSettings {
    /// JSON catalog; the builtin table is used when unset.
    pub catalog_path: Option<String>,
    /// Directory of text documents; takes precedence over the catalog.
    pub corpus_dir: Option<String>,
    pub max_files: usize,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self { catalog_path: None, corpus_dir: None, max_files: 200 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub chunk_max_chars: usize,
    pub similarity_threshold: f32,
    pub semantic_weight: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5, chunk_max_chars: 500, similarity_threshold: 0.7, semantic_weight: 5.0 }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    None,
    Fake,
    OpenAi,
    ZhipuAi,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    /// Per-kind defaults apply when these are unset.
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub embedding_model: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub use_embeddings: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::None,
            base_url: None,
            chat_model: None,
            embedding_model: None,
            api_key_env: None,
            timeout_secs: 30,
            max_tokens: 800,
            temperature: 0.7,
            use_embeddings: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080 }
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

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
