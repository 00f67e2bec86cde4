use crate::utils::error::ConfigError;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<(), ConfigError> {
    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ConfigError::InvalidValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ConfigError::InvalidValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// Resolves every required key through `lookup`, collecting all that are absent.
/// Empty values count as absent.
pub fn require_all<'a, F>(required: &[&'a str], lookup: F) -> Result<Vec<(&'a str, String)>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut resolved = Vec::with_capacity(required.len());
    let mut missing = Vec::new();

    for &key in required {
        match lookup(key).filter(|v| !v.is_empty()) {
            Some(value) => resolved.push((key, value)),
            None => missing.push(key.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(ConfigError::MissingConfiguration { keys: missing });
    }
    Ok(resolved)
}
