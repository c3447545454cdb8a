//! Input validation for invoice and batch-slip submissions.
//!
//! Validation happens before any rendering or network call. A failed
//! validation produces a field -> message map and nothing else.

use std::collections::BTreeMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// E.164-like: leading `+`, country code digit 1-9, then 1-14 digits.
    static ref PHONE_RE: Regex = Regex::new(r"^\+[1-9]\d{1,14}$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
}

/// Validation error for a single submitted field.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} is required", label))
    }

    pub fn invalid_phone(field: &str) -> Self {
        Self::new(
            field,
            "Invalid phone number format. Use +countrycode followed by number (e.g., +919876543210)",
        )
    }

    pub fn invalid_email(field: &str) -> Self {
        Self::new(field, "Invalid email address")
    }

    pub fn invalid_decimal(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} must be a decimal number", label))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors keyed by field name.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Field -> human readable message, for inline display next to the form field.
    pub fn to_field_map(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|e| (e.field.clone(), e.message.clone()))
            .collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: {} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value.trim())
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// Validate that a string is not empty after trimming.
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::required(field, label));
    }
}

/// Validate a WhatsApp number in `+<countrycode><digits>` form.
pub fn validate_phone(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::required(field, "Phone number"));
        return;
    }
    if !PHONE_RE.is_match(trimmed) {
        errors.add(ValidationError::invalid_phone(field));
    }
}

pub fn validate_email(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::required(field, "Email"));
        return;
    }
    if !EMAIL_RE.is_match(trimmed) {
        errors.add(ValidationError::invalid_email(field));
    }
}

/// Parse a required decimal field, recording an error when it does not parse.
pub fn parse_decimal(
    value: &str,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::required(field, label));
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => parsed,
        _ => {
            errors.add(ValidationError::invalid_decimal(field, label));
            0.0
        }
    }
}

/// Parse an optional decimal field; empty input yields 0.00.
pub fn parse_decimal_or_zero(value: &str) -> f64 {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_pattern() {
        assert!(is_valid_phone("+919876543210"));
        assert!(is_valid_phone("+14155238886"));
        assert!(!is_valid_phone("9876543210"));
        assert!(!is_valid_phone("+0123456789"));
        assert!(!is_valid_phone("+1234567890123456"));
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("accounts@rrconstructions.in"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn test_field_map_collects_all_errors() {
        let mut errors = ValidationErrors::new();
        validate_required("", "clientName", "Client name", &mut errors);
        validate_phone("12345", "clientWhatsApp", &mut errors);
        let map = errors.to_field_map();
        assert_eq!(map.len(), 2);
        assert!(map["clientName"].contains("required"));
        assert!(map["clientWhatsApp"].contains("+countrycode"));
    }

    #[test]
    fn test_parse_decimal_reports_garbage() {
        let mut errors = ValidationErrors::new();
        let value = parse_decimal("12.5x", "rate", "Rate", &mut errors);
        assert_eq!(value, 0.0);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_parse_decimal_or_zero() {
        assert_eq!(parse_decimal_or_zero(""), 0.0);
        assert_eq!(parse_decimal_or_zero(" 10.50 "), 10.5);
    }
}
