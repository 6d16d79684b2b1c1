use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Deliberately permissive `local@domain.tld` shape check, not RFC 5322.
pub static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub const MESSAGE_MAX_CHARS: usize = 5000;

/// One contact-form payload, normalized but not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
    pub phone: String,
}

impl ContactSubmission {
    /// Extracts the form fields from an arbitrary request payload.
    ///
    /// Absent or non-string values become empty strings and every value is
    /// trimmed, so this never fails; validation decides what to do with the
    /// result.
    pub fn from_payload(payload: &Value) -> Self {
        let field = |name: &str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_owned()
        };

        Self {
            first_name: field("first_name"),
            last_name: field("last_name"),
            email: field("email"),
            message: field("message"),
            phone: field("phone"),
        }
    }

    /// First and last name joined by a single space, skipping empty parts.
    pub fn full_name(&self) -> String {
        [self.first_name.as_str(), self.last_name.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The subject/text/HTML triple derived from a validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub subject: String,
    pub text: String,
    pub html: String,
}
