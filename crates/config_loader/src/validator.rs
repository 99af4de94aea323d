//! Configuration validation
//!
//! Rules:
//! - ewma_alpha in (0, 1]
//! - fusion_weight in [0, 1]
//! - sample rates > 0 and finite
//! - channel_capacity > 0
//! - output_path not empty

use contracts::{AppConfig, CoreError, EstimatorTuning};

/// Validate an AppConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &AppConfig) -> Result<(), CoreError> {
    validate_tuning(&config.session.tuning)?;
    validate_sample_rates(config)?;
    validate_channel(config)?;
    validate_export(config)?;
    Ok(())
}

/// Validate estimator coefficients
fn validate_tuning(tuning: &EstimatorTuning) -> Result<(), CoreError> {
    if !(tuning.ewma_alpha > 0.0 && tuning.ewma_alpha <= 1.0) {
        return Err(CoreError::config_validation(
            "session.tuning.ewma_alpha",
            format!("must be in (0, 1], got {}", tuning.ewma_alpha),
        ));
    }
    if !(0.0..=1.0).contains(&tuning.fusion_weight) {
        return Err(CoreError::config_validation(
            "session.tuning.fusion_weight",
            format!("must be in [0, 1], got {}", tuning.fusion_weight),
        ));
    }
    Ok(())
}

/// Validate sensor sample rates
fn validate_sample_rates(config: &AppConfig) -> Result<(), CoreError> {
    for (field, rate) in [
        ("sensors.accel_hz", config.sensors.accel_hz),
        ("sensors.gyro_hz", config.sensors.gyro_hz),
    ] {
        if !(rate > 0.0 && rate.is_finite()) {
            return Err(CoreError::config_validation(
                field,
                format!("sample rate must be > 0, got {rate}"),
            ));
        }
    }
    Ok(())
}

/// Validate sample channel sizing
fn validate_channel(config: &AppConfig) -> Result<(), CoreError> {
    if config.sensors.channel_capacity == 0 {
        return Err(CoreError::config_validation(
            "sensors.channel_capacity",
            "channel capacity must be > 0",
        ));
    }
    Ok(())
}

/// Validate export target
fn validate_export(config: &AppConfig) -> Result<(), CoreError> {
    if config.export.output_path.as_os_str().is_empty() {
        return Err(CoreError::config_validation(
            "export.output_path",
            "output path cannot be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_alpha_rejected() {
        let mut config = AppConfig::default();
        config.session.tuning.ewma_alpha = 0.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("ewma_alpha"), "got: {err}");
    }

    #[test]
    fn test_alpha_above_one_rejected() {
        let mut config = AppConfig::default();
        config.session.tuning.ewma_alpha = 1.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_negative_fusion_weight_rejected() {
        let mut config = AppConfig::default();
        config.session.tuning.fusion_weight = -0.1;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("fusion_weight"), "got: {err}");
    }

    #[test]
    fn test_invalid_sample_rate_rejected() {
        let mut config = AppConfig::default();
        config.sensors.gyro_hz = -5.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("sample rate must be > 0"), "got: {err}");
    }

    #[test]
    fn test_nan_sample_rate_rejected() {
        let mut config = AppConfig::default();
        config.sensors.accel_hz = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = AppConfig::default();
        config.sensors.channel_capacity = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("channel capacity"), "got: {err}");
    }

    #[test]
    fn test_empty_output_path_rejected() {
        let mut config = AppConfig::default();
        config.export.output_path = std::path::PathBuf::new();
        assert!(validate(&config).is_err());
    }
}
