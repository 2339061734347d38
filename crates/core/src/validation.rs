//! Exhaustive input validation.
//!
//! A `Validator` collects every offending field of a request and only fails
//! once all checks ran, so clients see the complete list in one response.
//! Only the first failure of each field is kept.
//!
//! Request bodies keep their text fields as raw JSON values; a value of the
//! wrong type is one more field failure, not a rejected body.

use core::str::FromStr;

use serde_json::Value;

use crate::error::{DomainError, FieldError};

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn reject(&mut self, field: &str, message: &str) {
        if !self.has_failed(field) {
            self.errors.push(FieldError::new(field, message));
        }
    }

    pub fn has_failed(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Record a failure for `field` unless `ok` holds.
    pub fn ensure(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.reject(field, message);
        }
    }

    /// Trimmed, non-empty text; `None` (and a recorded failure) otherwise.
    pub fn required_text(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                self.reject(field, message);
                None
            }
        }
    }

    /// String content of a raw JSON field. Absent and `null` are `None`;
    /// any other non-string is recorded as a failure and is `None` too.
    pub fn text(&mut self, field: &str, raw: Option<&Value>) -> Option<String> {
        match raw {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.reject(field, &format!("{field} must be a string"));
                None
            }
        }
    }

    /// Character-count ceiling (counts chars, not bytes).
    pub fn max_chars(&mut self, field: &str, value: &str, max: usize, message: &str) {
        self.ensure(value.chars().count() <= max, field, message);
    }

    /// Parse an identifier; records `message` on failure.
    pub fn parse_id<T: FromStr>(&mut self, field: &str, raw: &str, message: &str) -> Option<T> {
        match raw.trim().parse::<T>() {
            Ok(id) => Some(id),
            Err(_) => {
                self.reject(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` if nothing was rejected, otherwise a `Validation` error with every field.
    pub fn finish(self) -> Result<(), DomainError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::id::ProductId;

    #[test]
    fn collects_all_failures() {
        let mut v = Validator::new();
        assert_eq!(v.required_text("name", Some("   "), "Name is required"), None);
        v.max_chars("description", &"x".repeat(501), 500, "too long");
        let id: Option<ProductId> = v.parse_id("id", "nope", "Invalid product ID");
        assert!(id.is_none());

        let err = v.finish().unwrap_err();
        let fields: Vec<_> = err.details().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "description", "id"]);
    }

    #[test]
    fn trims_accepted_text() {
        let mut v = Validator::new();
        assert_eq!(v.required_text("name", Some("  Tools "), "required").as_deref(), Some("Tools"));
        assert!(v.finish().is_ok());
    }

    #[test]
    fn text_reports_wrong_types() {
        let mut v = Validator::new();
        assert_eq!(v.text("name", Some(&json!("Saw"))).as_deref(), Some("Saw"));
        assert_eq!(v.text("name", Some(&Value::Null)), None);
        assert_eq!(v.text("name", None), None);
        assert!(v.is_empty());

        assert_eq!(v.text("name", Some(&json!(123))), None);
        assert_eq!(v.text("tags", Some(&json!(["a"]))), None);
        let err = v.finish().unwrap_err();
        assert_eq!(err.details()[0].message, "name must be a string");
        assert_eq!(err.details()[1].field, "tags");
    }

    #[test]
    fn keeps_first_failure_per_field() {
        let mut v = Validator::new();
        let name = v.text("name", Some(&json!(false)));
        v.required_text("name", name.as_deref(), "Name is required");
        v.reject("price", "Price must be a positive number");

        let err = v.finish().unwrap_err();
        let messages: Vec<_> = err.details().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["name must be a string", "Price must be a positive number"]);
    }

    #[test]
    fn max_chars_counts_characters() {
        let mut v = Validator::new();
        v.max_chars("name", "ééé", 3, "too long");
        assert!(v.is_empty());
    }
}
