use crate::utils::error::{Result, ScrapeError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ScrapeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 憑證與 ID 不可為空，也不可殘留未替換的 `${VAR}`
pub fn validate_credential(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScrapeError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    if value.starts_with("${") && value.ends_with('}') {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Environment variable is not set".to_string(),
        });
    }
    Ok(())
}

pub fn validate_country_code(field_name: &str, code: &str) -> Result<()> {
    let valid = (1..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: code.to_string(),
            reason: "Country code must be 1 to 3 digits".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.api_url", "https://example.com").is_ok());
        assert!(validate_url("source.api_url", "http://example.com").is_ok());
        assert!(validate_url("source.api_url", "").is_err());
        assert!(validate_url("source.api_url", "invalid-url").is_err());
        assert!(validate_url("source.api_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("http.concurrent_requests", 5, 1).is_ok());
        assert!(validate_positive_number("http.concurrent_requests", 0, 1).is_err());
    }

    #[test]
    fn test_validate_credential() {
        assert!(validate_credential("source.auth", "abc123").is_ok());
        assert!(matches!(
            validate_credential("source.auth", "  "),
            Err(ScrapeError::MissingConfigError { .. })
        ));
        assert!(validate_credential("source.auth", "${CANTON_AUTH}").is_err());
    }

    #[test]
    fn test_validate_country_code() {
        assert!(validate_country_code("phone.default_country_code", "34").is_ok());
        assert!(validate_country_code("phone.default_country_code", "1").is_ok());
        assert!(validate_country_code("phone.default_country_code", "").is_err());
        assert!(validate_country_code("phone.default_country_code", "+34").is_err());
        assert!(validate_country_code("phone.default_country_code", "3456").is_err());
    }
}
