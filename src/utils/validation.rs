use crate::utils::error::{LearnPathError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LearnPathError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LearnPathError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(LearnPathError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(LearnPathError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LearnPathError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(LearnPathError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 語言標籤採寬鬆的 IETF 形式，例如 `en`、`zh-TW`、`pt-BR`
pub fn validate_language_tag(field_name: &str, tag: &str) -> Result<()> {
    let well_formed = !tag.is_empty()
        && tag.len() <= 35
        && tag.split('-').all(|part| {
            !part.is_empty() && part.len() <= 8 && part.chars().all(|c| c.is_ascii_alphanumeric())
        })
        && tag
            .split('-')
            .next()
            .map(|primary| primary.len() >= 2 && primary.chars().all(|c| c.is_ascii_alphabetic()))
            .unwrap_or(false);

    if !well_formed {
        return Err(LearnPathError::invalid_input(
            field_name,
            format!("'{}' is not a language tag", tag),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("providers.edx_endpoint", "https://example.com").is_ok());
        assert!(validate_url("providers.edx_endpoint", "http://example.com").is_ok());
        assert!(validate_url("providers.edx_endpoint", "").is_err());
        assert!(validate_url("providers.edx_endpoint", "invalid-url").is_err());
        assert!(validate_url("providers.edx_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("ranking.top_k", 5, 1).is_ok());
        assert!(validate_positive_number("ranking.top_k", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("server.port", 8000u16, 1, u16::MAX).is_ok());
        assert!(validate_range("server.port", 0u16, 1, u16::MAX).is_err());
    }

    #[test]
    fn test_validate_language_tag() {
        assert!(validate_language_tag("language", "en").is_ok());
        assert!(validate_language_tag("language", "zh-TW").is_ok());
        assert!(validate_language_tag("language", "pt-BR").is_ok());
        assert!(validate_language_tag("language", "").is_err());
        assert!(validate_language_tag("language", "e").is_err());
        assert!(validate_language_tag("language", "en_US").is_err());
        assert!(validate_language_tag("language", "12-ab").is_err());
    }
}
