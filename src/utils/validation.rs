use crate::utils::error::{IgnitionError, Result};
use regex::Regex;
use std::sync::OnceLock;

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

static IDENTIFIER_RE: OnceLock<Regex> = OnceLock::new();

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn identifier_regex() -> Result<&'static Regex> {
    if let Some(re) = IDENTIFIER_RE.get() {
        return Ok(re);
    }
    let re = Regex::new(IDENTIFIER_PATTERN).map_err(|e| IgnitionError::ConfigError {
        message: format!("Invalid identifier pattern: {}", e),
    })?;
    Ok(IDENTIFIER_RE.get_or_init(|| re))
}

/// 驗證模組名稱、future id 等識別字
pub fn validate_identifier(kind: &str, value: &str) -> Result<()> {
    if identifier_regex()?.is_match(value) {
        Ok(())
    } else {
        Err(IgnitionError::InvalidIdentifier {
            kind: kind.to_string(),
            value: value.to_string(),
        })
    }
}

/// 驗證合約名稱，允許 `contracts/File.sol:Name` 形式的完整名稱
pub fn validate_contract_name(value: &str) -> Result<()> {
    let bare = match value.rsplit_once(':') {
        Some((source, name)) if !source.is_empty() => name,
        Some(_) => value,
        None => value,
    };

    validate_identifier("contract name", bare).map_err(|_| IgnitionError::InvalidIdentifier {
        kind: "contract name".to_string(),
        value: value.to_string(),
    })
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(IgnitionError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(IgnitionError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(IgnitionError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(IgnitionError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
