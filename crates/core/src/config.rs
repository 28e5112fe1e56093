use std::path::Path;

use serde::Deserialize;

use crate::error::PixelResult;

/// Root application configuration. Loaded from environment variables
/// with the prefix `PIXEL_BRIDGE__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pixel: PixelConfig,
    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PixelConfig {
    #[serde(default)]
    pub pixel_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Send events through the Conversions API instead of the browser pixel.
    #[serde(default = "default_use_s2s")]
    pub use_s2s: bool,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_partner_agent")]
    pub partner_agent: String,
    #[serde(default)]
    pub test_event_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationsConfig {
    #[serde(default = "default_enabled_integrations")]
    pub enabled: Vec<String>,
}

fn default_use_s2s() -> bool {
    false
}
fn default_api_version() -> String {
    "v8.0".to_string()
}
fn default_partner_agent() -> String {
    format!("pixel-bridge-{}", env!("CARGO_PKG_VERSION"))
}
fn default_enabled_integrations() -> Vec<String> {
    vec!["caldera-forms".to_string(), "contact-form-7".to_string()]
}

impl Default for PixelConfig {
    fn default() -> Self {
        Self {
            pixel_id: None,
            access_token: None,
            use_s2s: default_use_s2s(),
            api_version: default_api_version(),
            partner_agent: default_partner_agent(),
            test_event_code: None,
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_integrations(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pixel: PixelConfig::default(),
            integrations: IntegrationsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> PixelResult<Self> {
        Self::build(None)
    }

    /// Load configuration from a TOML file, with environment variables
    /// layered on top.
    pub fn load_from(path: &Path) -> PixelResult<Self> {
        Self::build(Some(path))
    }

    fn build(path: Option<&Path>) -> PixelResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix("PIXEL_BRIDGE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("integrations.enabled"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(!config.pixel.use_s2s);
        assert_eq!(config.pixel.api_version, "v8.0");
        assert!(config.pixel.partner_agent.starts_with("pixel-bridge-"));
        assert_eq!(
            config.integrations.enabled,
            vec!["caldera-forms".to_string(), "contact-form-7".to_string()]
        );
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir =
            std::env::temp_dir().join(format!("pixel-bridge-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pixel.toml");
        std::fs::write(
            &path,
            r#"
[pixel]
pixel_id = "123456"
use_s2s = true

[integrations]
enabled = ["caldera-forms"]
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.pixel.pixel_id.as_deref(), Some("123456"));
        assert!(config.pixel.use_s2s);
        assert_eq!(config.pixel.api_version, "v8.0");
        assert_eq!(config.integrations.enabled, vec!["caldera-forms".to_string()]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
