//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

/// Validate an NF base URL: parsable, http or https, with a host
pub fn validate_url(url: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }

    let parsed = url::Url::parse(url).map_err(|e| ConfigError::DomainError {
        domain: domain.to_string(),
        message: format!("{} has invalid URL format: {}", field_name, e),
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ConfigError::DomainError {
                domain: domain.to_string(),
                message: format!(
                    "{} scheme '{}' not supported (only http/https)",
                    field_name, scheme
                ),
            })
        }
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must have a valid host", field_name),
        });
    }

    Ok(())
}

/// Validate a string of decimal digits whose length lies in `min..=max`
pub fn validate_digits(
    value: &str,
    min: usize,
    max: usize,
    field_name: &str,
    domain: &str,
) -> ConfigResult<()> {
    let len_ok = (min..=max).contains(&value.len());
    if !len_ok || !value.chars().all(|c| c.is_ascii_digit()) {
        let expected = if min == max {
            format!("{} digits", min)
        } else {
            format!("{}-{} digits", min, max)
        };
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be {}, got '{}'", field_name, expected, value),
        });
    }
    Ok(())
}

/// Validate a string of hex digits with an exact length
pub fn validate_hex(value: &str, len: usize, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.len() != len || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be {} hex digits, got '{}'", field_name, len, value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(1usize, "concurrency", "run").is_ok());
        let err = validate_positive(0usize, "concurrency", "run").unwrap_err();
        assert!(err.to_string().contains("concurrency must be greater than 0"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("http://oai-nrf", "nrf", "endpoints").is_ok());
        assert!(validate_url("https://10.0.0.1:8080/", "nrf", "endpoints").is_ok());
        assert!(validate_url("", "nrf", "endpoints").is_err());
        assert!(validate_url("oai-nrf", "nrf", "endpoints").is_err());
        assert!(validate_url("ftp://oai-nrf", "nrf", "endpoints").is_err());
    }

    #[test]
    fn test_validate_digits_and_hex() {
        assert!(validate_digits("208", 3, 3, "mcc", "identity").is_ok());
        assert!(validate_digits("95", 2, 3, "mnc", "identity").is_ok());
        assert!(validate_digits("2a8", 3, 3, "mcc", "identity").is_err());
        assert!(validate_digits("2080", 3, 3, "mcc", "identity").is_err());

        assert!(validate_hex("FFFFFF", 6, "sd", "identity").is_ok());
        assert!(validate_hex("00a1Bc", 6, "sd", "identity").is_ok());
        assert!(validate_hex("FFFFF", 6, "sd", "identity").is_err());
        assert!(validate_hex("GGGGGG", 6, "sd", "identity").is_err());
    }
}
