//! Configuration for the agents and the deployment CLI
//!
//! Loaded from `bedrud.toml` when present; every field has a default that
//! matches the stock deployment, so no config file is required.

use crate::errors::AgentError;
use crate::media::{AudioSpec, VideoSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BedrudConfig {
    pub media: MediaConfig,
    pub deploy: DeployConfig,
}

/// Media formats the agents decode to and publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// PCM sample rate in Hz
    pub sample_rate: u32,
    /// Audio channel count
    pub channels: u32,
    /// Video width in pixels
    pub width: u32,
    /// Video height in pixels
    pub height: u32,
    /// Video frames per second
    pub fps: u32,
    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: String,
}

/// Paths and names used by `bedrud deploy` / `bedrud uninstall`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Locally built backend binary
    pub dist_binary: String,
    /// Archive produced for upload
    pub archive_path: String,
    /// Staging path on the remote host
    pub remote_archive_path: String,
    /// Installed binary path on the remote host
    pub install_path: String,
    /// systemd units managed by the installer
    pub services: Vec<String>,
    /// Provisioning entry point passed to pyinfra
    pub provision_script: String,
    /// Command that builds the backend binary
    pub build_command: Vec<String>,
    /// Documentation site directory (mkdocs project)
    pub docs_dir: String,
}

impl Default for BedrudConfig {
    fn default() -> Self {
        Self {
            media: MediaConfig::default(),
            deploy: DeployConfig::default(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
            width: 1280,
            height: 720,
            fps: 30,
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            dist_binary: "server/dist/bedrud".to_string(),
            archive_path: "server/dist/bedrud.tar.xz".to_string(),
            remote_archive_path: "/tmp/bedrud.tar.xz".to_string(),
            install_path: "/usr/local/bin/bedrud".to_string(),
            services: vec!["bedrud".to_string(), "livekit".to_string()],
            provision_script: "deploy/autoconfig/deploy.py".to_string(),
            build_command: vec!["make".to_string(), "build-back".to_string()],
            docs_dir: "docs".to_string(),
        }
    }
}

impl MediaConfig {
    pub fn audio_spec(&self) -> AudioSpec {
        AudioSpec {
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }

    pub fn video_spec(&self) -> VideoSpec {
        VideoSpec {
            width: self.width,
            height: self.height,
            fps: self.fps,
        }
    }
}

impl BedrudConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AgentError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("Failed to read config file: {}", e)))?;

        let config: BedrudConfig = toml::from_str(&contents)
            .map_err(|e| AgentError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate().map_err(AgentError::Config)?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), AgentError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AgentError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| AgentError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| AgentError::Config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("bedrud.toml")
    }

    /// Load from the default location. A missing file yields defaults; a
    /// file that exists but fails to parse or validate is an error, never
    /// a silent fallback.
    pub fn load_or_default() -> Result<Self, AgentError> {
        Self::load_from_file(Self::default_path())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.media.sample_rate == 0 || self.media.sample_rate % 50 != 0 {
            return Err("Sample rate must be a positive multiple of 50".to_string());
        }
        if self.media.channels == 0 || self.media.channels > 2 {
            return Err("Channels must be 1 or 2".to_string());
        }
        if self.media.width == 0 || self.media.height == 0 {
            return Err("Invalid video resolution".to_string());
        }
        if self.media.width % 2 != 0 || self.media.height % 2 != 0 {
            return Err("Video resolution must be even (I420 subsampling)".to_string());
        }
        if self.media.fps == 0 || self.media.fps > 120 {
            return Err("FPS must be between 1 and 120".to_string());
        }
        if self.deploy.services.is_empty() {
            return Err("At least one service name is required".to_string());
        }
        if self.deploy.build_command.is_empty() {
            return Err("Build command must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BedrudConfig::default();
        assert_eq!(config.media.sample_rate, 48_000);
        assert_eq!(config.media.channels, 2);
        assert_eq!(config.media.fps, 30);
        assert_eq!(config.deploy.services, vec!["bedrud", "livekit"]);
    }

    #[test]
    fn test_config_validation() {
        let config = BedrudConfig::default();
        assert!(config.validate().is_ok());

        let mut bad = config.clone();
        bad.media.channels = 3;
        assert!(bad.validate().is_err());

        let mut odd = BedrudConfig::default();
        odd.media.width = 1281;
        assert!(odd.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bedrud.toml");

        let mut config = BedrudConfig::default();
        config.media.fps = 25;
        assert!(config.save_to_file(&config_path).is_ok());

        let loaded = BedrudConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.media.fps, 25);
        assert_eq!(loaded.deploy.install_path, config.deploy.install_path);
    }

    #[test]
    fn test_config_toml_format() {
        let config = BedrudConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[media]"));
        assert!(toml_string.contains("[deploy]"));
        assert!(toml_string.contains("sample_rate"));
        assert!(toml_string.contains("install_path"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = BedrudConfig::load_from_file("nonexistent_file.toml");
        assert!(result.is_ok()); // Should return default
        assert_eq!(result.unwrap().media.sample_rate, 48_000);
    }

    #[test]
    fn test_load_rejects_zero_fps() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bedrud.toml");
        fs::write(&config_path, "[media]\nfps = 0\n").unwrap();

        let err = BedrudConfig::load_from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("FPS"));
    }

    #[test]
    fn test_load_rejects_zero_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bedrud.toml");
        fs::write(&config_path, "[media]\nsample_rate = 0\n").unwrap();

        assert!(BedrudConfig::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: BedrudConfig = toml::from_str("[media]\nfps = 24\n").unwrap();
        assert_eq!(config.media.fps, 24);
        assert_eq!(config.media.sample_rate, 48_000);
        assert_eq!(config.deploy.remote_archive_path, "/tmp/bedrud.tar.xz");
    }
}
