use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

/// Upper bound, in characters, for short string columns.
pub const MAX_STRING_LENGTH: usize = 255;

/// Collects per-field failures; a payload is rejected once with all of them.
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, rule: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| format!("{} validation failed", rule));
    }

    /// Trimmed, non-empty string.
    pub fn required(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                self.fail(field, "required");
                None
            }
        }
    }

    /// Absent stays absent; present must be non-empty after trimming.
    pub fn optional(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        value.and_then(|v| self.required(field, Some(v)))
    }

    /// Nullable text: absent leaves the column alone, `null` or blank clears it.
    pub fn nullable(&mut self, value: Option<Option<&str>>) -> Option<Option<String>> {
        value.map(|v| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string))
    }

    /// Untrimmed secret, required.
    pub fn password(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                self.fail(field, "required");
                None
            }
        }
    }

    pub fn max_length(&mut self, field: &str, value: Option<&str>, max: usize) {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.fail(field, "max_length");
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value {
            if !is_email(v) {
                self.fail(field, "email");
            }
        }
    }

    /// `<field>_confirmation` must repeat `<field>`.
    pub fn confirmed(&mut self, field: &str, value: Option<&str>, confirmation: Option<&str>) {
        if value.is_some() && value != confirmation {
            self.fail(&format!("{}_confirmation", field), "confirmed");
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_failure(self.errors))
        }
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
/// Use with `#[serde(default)]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
