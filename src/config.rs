//! Paths and environment-driven settings.
//!
//! Missing AI credentials are a configuration error: `Settings::load` fails
//! and the process exits before the server binds.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub user_data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub db_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let user_data_dir = discover_user_data_dir();
        let log_dir = user_data_dir.join("logs");
        let db_path = user_data_dir.join("askdoc.db");

        for dir in [&user_data_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            user_data_dir,
            log_dir,
            db_path,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_user_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("ASKDOC_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if cfg!(debug_assertions) {
        return env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    if cfg!(target_os = "windows") {
        let base = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string()));
        return PathBuf::from(base).join("Askdoc");
    }

    if cfg!(target_os = "macos") {
        return home_dir()
            .join("Library")
            .join("Application Support")
            .join("Askdoc");
    }

    let xdg = env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        home_dir()
            .join(".local/share")
            .to_string_lossy()
            .to_string()
    });
    PathBuf::from(xdg).join("askdoc")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    /// Minimum delay between outbound AI calls.
    pub min_request_delay_ms: u64,
    /// Maximum outbound AI calls within any rolling 60 second window.
    pub max_requests_per_minute: u32,
    pub similarity_threshold: f32,
    pub max_ranked_results: usize,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let api_key = match env::var("ASKDOC_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => bail!("ASKDOC_API_KEY is not set; refusing to start without AI credentials"),
        };

        let base_url = env::var("ASKDOC_AI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com".to_string())
            .trim_end_matches('/')
            .to_string();

        let embedding_model = env::var("ASKDOC_EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".to_string());
        let generation_model =
            env::var("ASKDOC_GENERATION_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let min_request_delay_ms = parse_env("ASKDOC_MIN_REQUEST_DELAY_MS", 1_000u64)?;
        let max_requests_per_minute =
            parse_env("ASKDOC_MAX_REQUESTS_PER_MINUTE", 15u32)?.max(1);
        let similarity_threshold = parse_env("ASKDOC_SIMILARITY_THRESHOLD", 0.3f32)?;
        let max_ranked_results = parse_env("ASKDOC_MAX_RANKED_RESULTS", 5usize)?.max(1);

        Ok(Settings {
            api_key,
            base_url,
            embedding_model,
            generation_model,
            min_request_delay_ms,
            max_requests_per_minute,
            similarity_threshold,
            max_ranked_results,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
