//! Validated-on-read access to dynamic job payloads.

use clipwright_error::{ClipwrightResult, TaskError, TaskErrorKind};
use serde_json::Value;

/// Validating reader over an arbitrary JSON job payload.
///
/// Every field access goes through an explicit shape check with a named
/// failure; nothing is implicitly coerced.
///
/// # Examples
///
/// ```
/// use clipwright_core::PayloadView;
/// use serde_json::json;
///
/// let payload = json!({"analysisModel": "deepseek-chat", "maxClipCount": 12});
/// let view = PayloadView::new(&payload);
///
/// assert_eq!(view.opt_str_field("analysisModel").unwrap(), Some("deepseek-chat"));
/// assert_eq!(view.opt_u32_field("maxClipCount").unwrap(), Some(12));
/// assert!(view.str_field("novelText").is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PayloadView<'a> {
    payload: &'a Value,
}

impl<'a> PayloadView<'a> {
    /// Wrap a payload value.
    pub fn new(payload: &'a Value) -> Self {
        Self { payload }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        match self.payload.get(field) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Required string field.
    pub fn str_field(&self, field: &str) -> ClipwrightResult<&'a str> {
        match self.opt_str_field(field)? {
            Some(value) => Ok(value),
            None => Err(TaskError::missing_field(field).into()),
        }
    }

    /// Optional string field; absent and `null` both read as `None`.
    pub fn opt_str_field(&self, field: &str) -> ClipwrightResult<Option<&'a str>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(invalid(field, "expected a string", other)),
        }
    }

    /// Required integer field.
    pub fn i64_field(&self, field: &str) -> ClipwrightResult<i64> {
        match self.opt_i64_field(field)? {
            Some(value) => Ok(value),
            None => Err(TaskError::missing_field(field).into()),
        }
    }

    /// Optional integer field.
    pub fn opt_i64_field(&self, field: &str) -> ClipwrightResult<Option<i64>> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => match value.as_i64() {
                Some(n) => Ok(Some(n)),
                None => Err(invalid(field, "expected an integer", value)),
            },
        }
    }

    /// Optional non-negative integer field narrowed to `u32`.
    pub fn opt_u32_field(&self, field: &str) -> ClipwrightResult<Option<u32>> {
        match self.opt_i64_field(field)? {
            None => Ok(None),
            Some(n) => u32::try_from(n)
                .map(Some)
                .map_err(|_| invalid_msg(field, format!("{} is out of range for u32", n))),
        }
    }

    /// Optional boolean field.
    pub fn opt_bool_field(&self, field: &str) -> ClipwrightResult<Option<bool>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(invalid(field, "expected a boolean", other)),
        }
    }
}

fn invalid(field: &str, expected: &str, actual: &Value) -> clipwright_error::ClipwrightError {
    invalid_msg(field, format!("{}, got {}", expected, type_name(actual)))
}

fn invalid_msg(field: &str, message: String) -> clipwright_error::ClipwrightError {
    TaskError::new(TaskErrorKind::InvalidField {
        field: field.to_string(),
        message,
    })
    .into()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_required_field_names_the_field() {
        let payload = json!({});
        let view = PayloadView::new(&payload);
        let err = view.str_field("episodeId").unwrap_err();
        assert!(err.to_string().contains("episodeId is required"));
    }

    #[test]
    fn null_reads_as_absent() {
        let payload = json!({"analysisModel": null});
        let view = PayloadView::new(&payload);
        assert_eq!(view.opt_str_field("analysisModel").unwrap(), None);
    }

    #[test]
    fn wrong_type_is_invalid_not_coerced() {
        let payload = json!({"maxClipCount": "12"});
        let view = PayloadView::new(&payload);
        let err = view.opt_u32_field("maxClipCount").unwrap_err();
        assert!(err.to_string().contains("maxClipCount"));
    }
}
