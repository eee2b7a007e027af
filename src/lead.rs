//! Lead record and payload validation.

use serde_json::Value;

use crate::error::ValidationError;

/// Notification locale. Only `"en"` selects English; everything else
/// falls back to Spanish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    English,
    #[default]
    Spanish,
}

impl Locale {
    pub fn from_lang(lang: Option<&str>) -> Self {
        match lang {
            Some("en") => Locale::English,
            _ => Locale::Spanish,
        }
    }
}

/// A validated contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub locale: Locale,
}

impl Lead {
    /// Validate a raw request payload.
    ///
    /// `name`, `email` and `message` must be non-blank strings. Values are
    /// kept verbatim; `phone` and `lang` never affect validity. A numeric
    /// `phone` keeps its digits.
    pub fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let fields = raw.as_object().ok_or(ValidationError::NotAnObject)?;

        let required = |field: &'static str| {
            fields
                .get(field)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .ok_or(ValidationError::MissingField(field))
        };

        let name = required("name")?;
        let email = required("email")?;
        let message = required("message")?;

        let phone = fields.get("phone").and_then(phone_text);

        let locale = Locale::from_lang(fields.get("lang").and_then(Value::as_str));

        Ok(Self {
            name,
            email,
            phone,
            message,
            locale,
        })
    }

    /// Phone number for display, `"-"` when absent.
    pub fn phone_or_placeholder(&self) -> &str {
        self.phone.as_deref().unwrap_or("-")
    }
}

/// Display text for a `phone` value. Numbers and `true` keep their JSON
/// text; empty strings, zero, `false`, null and containers count as absent.
fn phone_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
