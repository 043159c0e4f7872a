//! Server configuration.

use anyhow::{Context, bail};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address host
    pub host: String,
    /// Bind address port
    pub port: u16,
    /// Data directory
    pub data_dir: PathBuf,
    /// Clinical case database path
    pub database_path: PathBuf,
    /// Sessions idle at least this long are evicted
    pub idle_timeout: Duration,
    /// How often the expiry sweeper runs
    pub sweep_interval: Duration,
    /// Speech and chat upstream settings
    pub upstream: UpstreamConfig,
}

/// OpenAI-compatible upstream configuration
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    pub transcription_model: String,
    pub chat_model: String,
    pub speech_model: String,
    /// Per-request timeout for every upstream call
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let data_dir = home.join(".osce-voice");

        Self {
            host: "127.0.0.1".to_string(),
            port: 5005,
            database_path: data_dir.join("cases.db"),
            data_dir,
            idle_timeout: Duration::from_secs(900),
            sweep_interval: Duration::from_secs(150),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            transcription_model: "whisper-1".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            speech_model: "tts-1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Standard directory structure:
    /// ```text
    /// ~/.osce-voice/
    /// └── cases.db              # Clinical case definitions
    /// ```
    pub fn load() -> anyhow::Result<Self> {
        let defaults = Config::default();
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        // Use OSCE_VOICE_DIR env var if set, otherwise ~/.osce-voice
        let data_dir = std::env::var("OSCE_VOICE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".osce-voice"));

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("creating data directory {}", data_dir.display()))?;

        let database_path = std::env::var("OSCE_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("cases.db"));

        Ok(Self {
            host: env_or("OSCE_HOST", &defaults.host),
            port: env_u16("OSCE_PORT", defaults.port)?,
            idle_timeout: env_secs("OSCE_IDLE_TIMEOUT_SECS", defaults.idle_timeout)?,
            sweep_interval: env_secs("OSCE_SWEEP_INTERVAL_SECS", defaults.sweep_interval)?,
            upstream: UpstreamConfig {
                base_url: env_or("OSCE_OPENAI_BASE_URL", &defaults.upstream.base_url),
                api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
                transcription_model: env_or(
                    "OSCE_TRANSCRIPTION_MODEL",
                    &defaults.upstream.transcription_model,
                ),
                chat_model: env_or("OSCE_CHAT_MODEL", &defaults.upstream.chat_model),
                speech_model: env_or("OSCE_SPEECH_MODEL", &defaults.upstream.speech_model),
                timeout: env_secs("OSCE_UPSTREAM_TIMEOUT_SECS", defaults.upstream.timeout)?,
            },
            data_dir,
            database_path,
        })
    }

    /// Reject combinations the sweeper cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sweep_interval.is_zero() {
            bail!("sweep interval must be greater than zero");
        }
        if self.idle_timeout.is_zero() {
            bail!("idle timeout must be greater than zero");
        }
        if self.sweep_interval >= self.idle_timeout {
            bail!(
                "sweep interval ({}s) must be shorter than the idle timeout ({}s)",
                self.sweep_interval.as_secs(),
                self.idle_timeout.as_secs()
            );
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u16(key: &str, default: u16) -> anyhow::Result<u16> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be a port number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn env_secs(key: &str, default: Duration) -> anyhow::Result<Duration> {
    match std::env::var(key) {
        Ok(raw) => {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{key} must be a number of seconds, got {raw:?}"))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5005);
        assert!(config.database_path.ends_with("cases.db"));
        assert_eq!(config.idle_timeout, Duration::from_secs(900));
        assert_eq!(config.sweep_interval, Duration::from_secs(150));
        assert_eq!(config.upstream.base_url, "https://api.openai.com/v1");
        assert_eq!(config.upstream.transcription_model, "whisper-1");
        assert_eq!(config.upstream.chat_model, "gpt-4o-mini");
        assert_eq!(config.upstream.speech_model, "tts-1");
    }

    #[test]
    fn test_default_config_directory_structure() {
        let config = Config::default();

        // All paths should be under ~/.osce-voice
        let home = dirs::home_dir().unwrap();
        let data_dir = home.join(".osce-voice");

        assert_eq!(config.data_dir, data_dir);
        assert!(config.database_path.starts_with(&data_dir));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_sweep_interval() {
        let config = Config {
            sweep_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_sweep_not_shorter_than_idle() {
        let config = Config {
            sweep_interval: Duration::from_secs(900),
            idle_timeout: Duration::from_secs(900),
            ..Config::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("shorter"));
    }

    #[test]
    fn test_config_load_with_custom_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let custom_path = temp_dir.path().join("voice-data");

        // Save current value to restore later
        let old_val = env::var("OSCE_VOICE_DIR").ok();
        // SAFETY: This test runs in isolation and we restore the env var afterward
        unsafe { env::set_var("OSCE_VOICE_DIR", &custom_path) };

        let config = Config::load().unwrap();

        // Should use (and create) the custom directory
        assert_eq!(config.data_dir, custom_path);
        assert!(config.database_path.starts_with(&custom_path));
        assert!(custom_path.exists());

        // Cleanup
        // SAFETY: Restoring environment to previous state
        unsafe {
            if let Some(val) = old_val {
                env::set_var("OSCE_VOICE_DIR", val);
            } else {
                env::remove_var("OSCE_VOICE_DIR");
            }
        }
    }

    #[test]
    fn test_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:5005");
    }
}
