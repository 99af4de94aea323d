//! Configuration parsing
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{AppConfig, CoreError};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<AppConfig, CoreError> {
    toml::from_str(content).map_err(|e| CoreError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<AppConfig, CoreError> {
    serde_json::from_str(content).map_err(|e| CoreError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<AppConfig, CoreError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DurationChoice;

    #[test]
    fn test_parse_toml_sections() {
        let content = r#"
[session]
duration = "long"
[session.tuning]
ewma_alpha = 0.3
fusion_weight = 0.6

[sensors]
accel_hz = 200.0
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.session.duration, DurationChoice::Long);
        assert_eq!(config.session.tuning.ewma_alpha, 0.3);
        assert_eq!(config.session.tuning.fusion_weight, 0.6);
        assert_eq!(config.sensors.accel_hz, 200.0);
        // Untouched sections keep their defaults.
        assert_eq!(config.sensors.gyro_hz, 50.0);
    }

    #[test]
    fn test_parse_json_sections() {
        let content = r#"{
            "session": { "duration": "short" },
            "sensors": { "channel_capacity": 128 },
            "export": { "output_path": "/tmp/out.csv" }
        }"#;
        let config = parse_json(content).unwrap();
        assert_eq!(config.session.duration, DurationChoice::Short);
        assert_eq!(config.sensors.channel_capacity, 128);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let result = parse_toml("invalid toml [[[");
        assert!(matches!(result, Err(CoreError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
