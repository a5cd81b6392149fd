//! Public form payloads and their field validation
//!
//! Validation collects one message per failing field so the client can
//! highlight every problem at once.

pub mod contact;
pub mod interest;

pub use contact::ContactForm;
pub use interest::RegisterInterestForm;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::FieldErrors;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^[\d\s\-\+\(\)]+$";

/// Minimum number of digits in a phone number
pub const MIN_PHONE_DIGITS: usize = 10;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("valid email pattern"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("valid phone pattern"))
}

/// Basic email shape check
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Trimmed value of an optional field, `None` when missing or blank
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Accept any JSON for a list field so a wrong shape becomes a field error.
///
/// Non-arrays read as missing; scalar items are kept as text.
pub(crate) fn lenient_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        _ => return Ok(None),
    };

    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
    ))
}

/// Collects field errors for one payload
#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Required text of at least `min_len` characters
    pub fn text<'a>(
        &mut self,
        field: &str,
        label: &str,
        value: &'a Option<String>,
        min_len: usize,
    ) -> &'a str {
        match present(value) {
            None => {
                self.fail(field, &format!("{} is required", label));
                ""
            }
            Some(v) if v.chars().count() < min_len => {
                self.fail(
                    field,
                    &format!("{} must be at least {} characters long", label, min_len),
                );
                v
            }
            Some(v) => v,
        }
    }

    pub fn email<'a>(&mut self, field: &str, value: &'a Option<String>) -> &'a str {
        match present(value) {
            None => {
                self.fail(field, "Email is required");
                ""
            }
            Some(v) if !is_valid_email(v) => {
                self.fail(field, "Please provide a valid email address");
                v
            }
            Some(v) => v,
        }
    }

    pub fn phone<'a>(&mut self, field: &str, value: &'a Option<String>) -> &'a str {
        match present(value) {
            None => {
                self.fail(field, "Phone number is required");
                ""
            }
            Some(v) if !phone_regex().is_match(v) => {
                self.fail(field, "Please provide a valid phone number");
                v
            }
            Some(v) if v.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS => {
                self.fail(field, "Phone number must contain at least 10 digits");
                v
            }
            Some(v) => v,
        }
    }

    /// Required `Yes` / `No` answer
    pub fn yes_no<'a>(&mut self, field: &str, value: &'a Option<String>) -> &'a str {
        match present(value) {
            None => {
                self.fail(field, "Please select an option");
                ""
            }
            Some(v) if v != "Yes" && v != "No" => {
                self.fail(field, "Please select Yes or No");
                v
            }
            Some(v) => v,
        }
    }

    /// Required non-empty list
    pub fn non_empty(&mut self, field: &str, value: &Option<Vec<String>>, message: &str) {
        if value.as_ref().map_or(true, Vec::is_empty) {
            self.fail(field, message);
        }
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("user.name@example.co.uk"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("test"));
        assert!(!is_valid_email("test@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("test@domain"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn test_phone_rules() {
        let mut v = Validator::new();
        v.phone("ok", &Some("+971 (50) 123-4567".to_string()));
        v.phone("letters", &Some("050-CALL-ME".to_string()));
        v.phone("short", &Some("123 456".to_string()));
        v.phone("missing", &Some("   ".to_string()));

        let errors = v.finish().unwrap_err();
        assert!(!errors.contains_key("ok"));
        assert_eq!(errors["letters"], "Please provide a valid phone number");
        assert_eq!(errors["short"], "Phone number must contain at least 10 digits");
        assert_eq!(errors["missing"], "Phone number is required");
    }

    #[test]
    fn test_text_trims_before_length_check() {
        let mut v = Validator::new();
        let value = Some("  Al  ".to_string());
        assert_eq!(v.text("name", "Name", &value, 2), "Al");
        v.text("short", "Name", &Some(" A ".to_string()), 2);

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["short"], "Name must be at least 2 characters long");
    }
}
