//! Configuration validation.
//!
//! Checks that required values are present and within valid ranges before
//! any calculation runs.

use thiserror::Error;

use crate::config::{Config, IndicatorSettings, ObservabilityConfig, ValuationSettings};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if self.tickers.is_empty() {
            errors.push(ValidationError::MissingField {
                field: "tickers".into(),
            });
        }

        if let (Some(start), Some(end)) = (self.data.start_date, self.data.end_date) {
            if start > end {
                errors.push(ValidationError::InvalidValue {
                    field: "data.start_date".into(),
                    reason: format!("{start} is after data.end_date {end}"),
                });
            }
        }

        if let Err(e) = self.valuation.validate() {
            errors.push(e);
        }

        if let Err(e) = self.indicators.validate() {
            errors.push(e);
        }

        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }

    /// Load (with environment overrides) and validate configuration.
    pub fn load_and_validate() -> anyhow::Result<Self> {
        let config = Self::load_with_env()?;
        config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(config)
    }
}

impl Validate for ValuationSettings {
    fn validate(&self) -> ValidationResult<()> {
        if !self.long_term_growth.is_finite() || self.long_term_growth <= -1.0 {
            return Err(ValidationError::InvalidValue {
                field: "valuation.long_term_growth".into(),
                reason: "must be a finite rate above -100%".into(),
            });
        }

        if !self.medium_term_ratio.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: "valuation.medium_term_ratio".into(),
                reason: "must be finite".into(),
            });
        }

        if let Some(rate) = self.discount_rate_override {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(ValidationError::InvalidValue {
                    field: "valuation.discount_rate_override".into(),
                    reason: "must be a finite rate above -100%".into(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for IndicatorSettings {
    fn validate(&self) -> ValidationResult<()> {
        if self.sma_periods.contains(&0) {
            return Err(ValidationError::InvalidValue {
                field: "indicators.sma_periods".into(),
                reason: "periods must be at least 1".into(),
            });
        }

        if self.ema_spans.contains(&0) {
            return Err(ValidationError::InvalidValue {
                field: "indicators.ema_spans".into(),
                reason: "spans must be at least 1".into(),
            });
        }

        if self.rsi_period == 0 {
            return Err(ValidationError::InvalidValue {
                field: "indicators.rsi_period".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_tickers() {
        let mut config = Config::default();
        config.tickers.clear();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingField { .. })
        ));
    }

    #[test]
    fn test_inverted_date_range() {
        let mut config = Config::default();
        config.data.start_date = NaiveDate::from_ymd_opt(2023, 10, 1);
        config.data.end_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_periods_rejected() {
        let mut config = Config::default();
        config.indicators.sma_periods = vec![9, 0];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.indicators.rsi_period = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut config = Config::default();
        config.tickers.clear();
        config.observability.log_format = "xml".into();
        assert!(matches!(config.validate(), Err(ValidationError::Multiple(errs)) if errs.len() == 2));
    }

    #[test_case("trace", true ; "trace level")]
    #[test_case("INFO", true ; "upper case level")]
    #[test_case("verbose", false ; "unknown level")]
    fn test_log_level_validation(level: &str, valid: bool) {
        let obs = ObservabilityConfig {
            log_level: level.into(),
            ..Default::default()
        };
        assert_eq!(obs.validate().is_ok(), valid);
    }

    #[test]
    fn test_discount_override_must_be_finite() {
        let settings = ValuationSettings {
            discount_rate_override: Some(f64::NAN),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
