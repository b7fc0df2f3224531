use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "HOOKCHAT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting, set the {env_var} environment variable")]
    MissingEnvVar { env_var: String },

    #[error("Invalid endpoint url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Turn a dotted settings key into the environment variable that sets it
pub fn to_env_var(field: &str) -> String {
    format!("{}_{}", ENV_PREFIX, field.to_uppercase().replace('.', "__"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointSettings {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl EndpointSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitSettings {
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,
}

impl Default for LimitSettings {
    fn default() -> Self {
        LimitSettings {
            max_attachment_bytes: default_max_attachment_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecorderSettings {
    #[serde(default = "default_recorder_command")]
    pub command: String,
    /// Full argument list for `command`; when empty, arecord flags for the format below are used
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: u16,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        RecorderSettings {
            command: default_recorder_command(),
            args: Vec::new(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
        }
    }
}

/// User facing strings that are shown inside the conversation
#[derive(Debug, Clone, Deserialize)]
pub struct MessageSettings {
    #[serde(default = "default_timeout_message")]
    pub timeout: String,
    #[serde(default = "default_generic_error")]
    pub generic_error: String,
}

impl Default for MessageSettings {
    fn default() -> Self {
        MessageSettings {
            timeout: default_timeout_message(),
            generic_error: default_generic_error(),
        }
    }
}

/// Values given on the command line, applied over every other source
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub endpoint: EndpointSettings,
    #[serde(default)]
    pub limits: LimitSettings,
    #[serde(default)]
    pub recorder: RecorderSettings,
    #[serde(default)]
    pub messages: MessageSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_overrides(file, &Overrides::default())
    }

    /// Load defaults, then the optional file, then `HOOKCHAT_*` environment variables,
    /// then `overrides`
    pub fn load_with_overrides(
        file: Option<&Path>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("endpoint.timeout_secs", default_timeout_secs())?
            .set_default("limits.max_attachment_bytes", default_max_attachment_bytes())?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(" ")
                    .with_list_parse_key("recorder.args")
                    .try_parsing(true),
            )
            .set_override_option("endpoint.url", overrides.endpoint.clone())?
            .set_override_option("endpoint.timeout_secs", overrides.timeout_secs)?
            .build()?;

        match config.get_string("endpoint.url") {
            Ok(_) => {}
            Err(config::ConfigError::NotFound(_)) => {
                return Err(ConfigError::MissingEnvVar {
                    env_var: to_env_var("endpoint.url"),
                })
            }
            Err(err) => return Err(err.into()),
        }

        let settings: Settings = config.try_deserialize()?;
        tracing::debug!("Loaded settings: {:?}", &settings);
        settings.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        match url::Url::parse(&self.endpoint.url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(self),
            Ok(url) => Err(ConfigError::InvalidUrl {
                url: self.endpoint.url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => Err(ConfigError::InvalidUrl {
                url: self.endpoint.url.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Settings pointing at `url` with every other value at its default
    pub fn with_endpoint<S: Into<String>>(url: S) -> Self {
        Settings {
            endpoint: EndpointSettings {
                url: url.into(),
                timeout_secs: default_timeout_secs(),
            },
            limits: LimitSettings::default(),
            recorder: RecorderSettings::default(),
            messages: MessageSettings::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attachment_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_recorder_command() -> String {
    "arecord".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_channels() -> u16 {
    1
}

fn default_timeout_message() -> String {
    "The request took too long. Please try again.".to_string()
}

fn default_generic_error() -> String {
    "There was an error processing your message. Please try again.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("HOOKCHAT_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();
        env::set_var("HOOKCHAT_ENDPOINT__URL", "https://hooks.example.com/chat");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.endpoint.url, "https://hooks.example.com/chat");
        assert_eq!(settings.endpoint.timeout(), Duration::from_secs(30));
        assert_eq!(settings.limits.max_attachment_bytes, 5_242_880);
        assert_eq!(settings.recorder.command, "arecord");
        assert_eq!(settings.recorder.sample_rate, 16000);
        assert_eq!(settings.recorder.channels, 1);
        assert!(settings.recorder.args.is_empty());

        clean_env();
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clean_env();
        env::set_var("HOOKCHAT_ENDPOINT__URL", "http://localhost:5678/webhook/chat");
        env::set_var("HOOKCHAT_ENDPOINT__TIMEOUT_SECS", "5");
        env::set_var("HOOKCHAT_RECORDER__SAMPLE_RATE", "44100");
        env::set_var("HOOKCHAT_RECORDER__ARGS", "-D hw:1");
        env::set_var("HOOKCHAT_MESSAGES__TIMEOUT", "La solicitud tardó demasiado.");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.endpoint.timeout(), Duration::from_secs(5));
        assert_eq!(settings.recorder.sample_rate, 44100);
        assert_eq!(settings.recorder.args, vec!["-D", "hw:1"]);
        assert_eq!(settings.messages.timeout, "La solicitud tardó demasiado.");

        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_endpoint() {
        clean_env();

        let result = Settings::new();
        match result {
            Err(ConfigError::MissingEnvVar { env_var }) => {
                assert_eq!(env_var, "HOOKCHAT_ENDPOINT__URL");
            }
            other => panic!("Expected MissingEnvVar, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_invalid_endpoint() {
        clean_env();
        env::set_var("HOOKCHAT_ENDPOINT__URL", "ftp://example.com/hook");

        assert!(matches!(
            Settings::new(),
            Err(ConfigError::InvalidUrl { .. })
        ));

        clean_env();
    }

    #[test]
    #[serial]
    fn test_file_then_environment() {
        clean_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hookchat.toml");
        fs::write(
            &path,
            r#"
[endpoint]
url = "https://hooks.example.com/from-file"
timeout_secs = 10

[limits]
max_attachment_bytes = 1024
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.endpoint.url, "https://hooks.example.com/from-file");
        assert_eq!(settings.endpoint.timeout_secs, 10);
        assert_eq!(settings.limits.max_attachment_bytes, 1024);

        env::set_var("HOOKCHAT_ENDPOINT__TIMEOUT_SECS", "3");
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.endpoint.timeout_secs, 3);

        clean_env();
    }

    #[test]
    #[serial]
    fn test_overrides_win() {
        clean_env();
        env::set_var("HOOKCHAT_ENDPOINT__URL", "https://hooks.example.com/env");

        let overrides = Overrides {
            endpoint: Some("http://127.0.0.1:5678/webhook".to_string()),
            timeout_secs: Some(7),
        };
        let settings = Settings::load_with_overrides(None, &overrides).unwrap();
        assert_eq!(settings.endpoint.url, "http://127.0.0.1:5678/webhook");
        assert_eq!(settings.endpoint.timeout_secs, 7);

        clean_env();
        let settings = Settings::load_with_overrides(None, &overrides).unwrap();
        assert_eq!(settings.endpoint.url, "http://127.0.0.1:5678/webhook");
    }

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("endpoint.url"), "HOOKCHAT_ENDPOINT__URL");
        assert_eq!(to_env_var("limits.max_attachment_bytes"), "HOOKCHAT_LIMITS__MAX_ATTACHMENT_BYTES");
    }
}
