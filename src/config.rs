//! Configuration types for playlist-dl

use crate::error::{Error, Result};
use crate::types::{MediaFormat, OutputMode};
use serde::{Deserialize, Serialize};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};
use utoipa::ToSchema;

/// Download behavior configuration (directories, output mode, format)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Directory that receives playlist folders in local mode (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Parent for per-run temporary roots in hosted mode (default: "./temp")
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Local directory or hosted zip archive (default: local)
    #[serde(default)]
    pub mode: OutputMode,

    /// Media format to request (None = derived from mode: video locally, audio when hosted)
    #[serde(default)]
    pub format: Option<MediaFormat>,

    /// Raw engine format selector, overrides `format` when set
    #[serde(default)]
    pub format_selector: Option<String>,

    /// Title used when the playlist reports none (default: "YouTube_Playlist")
    #[serde(default = "default_title")]
    pub default_title: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            temp_dir: default_temp_dir(),
            mode: OutputMode::default(),
            format: None,
            format_selector: None,
            default_title: default_title(),
        }
    }
}

impl DownloadConfig {
    /// Format actually requested from the engine for the configured mode
    pub fn effective_format(&self) -> MediaFormat {
        self.format_for(self.mode)
    }

    /// Engine format selector string for the configured mode
    pub fn effective_selector(&self) -> String {
        self.selector_for(self.mode)
    }

    /// Format requested when running in `mode`
    pub fn format_for(&self, mode: OutputMode) -> MediaFormat {
        self.format.unwrap_or(match mode {
            OutputMode::Local => MediaFormat::Video,
            OutputMode::Hosted => MediaFormat::Audio,
        })
    }

    /// Engine format selector when running in `mode` (explicit override wins)
    pub fn selector_for(&self, mode: OutputMode) -> String {
        match &self.format_selector {
            Some(selector) if !selector.trim().is_empty() => selector.trim().to_string(),
            _ => self.format_for(mode).selector().to_string(),
        }
    }
}

/// External engine configuration (yt-dlp binary discovery)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EngineConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Extra arguments appended to every engine invocation
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            extra_args: Vec::new(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8686)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for PlaylistDownloader
///
/// Every section is optional in the serialized form; missing sections and fields
/// fall back to their defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// External engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file cannot be read or parsed, or when the
    /// loaded values fail [`Config::validate`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        if !crate::utils::is_usable_name(
            crate::utils::sanitize_filename(&self.download.default_title).trim(),
        ) {
            return Err(Error::Config {
                message: "default_title must be a usable directory name (not empty, not only dots)"
                    .to_string(),
                key: Some("default_title".to_string()),
            });
        }
        if self.download.download_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "download_dir must not be empty".to_string(),
                key: Some("download_dir".to_string()),
            });
        }
        Ok(())
    }

    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Temporary directory
    pub fn temp_dir(&self) -> &PathBuf {
        &self.download.temp_dir
    }
}

// Default value functions
fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_title() -> String {
    "YouTube_Playlist".to_string()
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8686))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
