//! Contact form field rules.

use fancy_regex::Regex;

use crate::{Error, Result};

pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
pub const PHONE_PATTERN: &str = r"^[0-9\s\-+()]+$";

pub const NAME_MIN_LEN: usize = 2;
pub const PHONE_MIN_LEN: usize = 8;
pub const MESSAGE_MIN_LEN: usize = 10;

pub const NAME_ERROR: &str = "Please enter a valid name";
pub const EMAIL_ERROR: &str = "Please enter a valid email address";
pub const PHONE_ERROR: &str = "Please enter a valid phone number";
pub const MESSAGE_ERROR: &str = "Please enter a message with at least 10 characters";
pub const REQUIRED_ERROR: &str = "This field is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Phone,
    Message,
}

impl Field {
    pub fn id(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Message => "message",
        }
    }
}

/// How a single input is checked on blur, derived from its markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRule {
    pub required: bool,
    pub kind: InputKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Tel,
}

impl InputKind {
    pub fn from_type_attr(input_type: Option<&str>) -> Self {
        match input_type.map(str::to_ascii_lowercase).as_deref() {
            Some("email") => Self::Email,
            Some("tel") => Self::Tel,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub project: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

#[derive(Debug, Clone)]
pub struct FieldValidator {
    email: Regex,
    phone: Regex,
}

impl FieldValidator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            email: compile(EMAIL_PATTERN)?,
            phone: compile(PHONE_PATTERN)?,
        })
    }

    pub fn is_valid_name(&self, value: &str) -> bool {
        value.trim().chars().count() >= NAME_MIN_LEN
    }

    pub fn is_valid_email(&self, value: &str) -> bool {
        self.email.is_match(value).unwrap_or(false)
    }

    /// Any mix of digits and separators passes once long enough, so
    /// `"--------"` is accepted.
    pub fn is_valid_phone(&self, value: &str) -> bool {
        self.phone.is_match(value).unwrap_or(false) && value.trim().chars().count() >= PHONE_MIN_LEN
    }

    pub fn is_valid_message(&self, value: &str) -> bool {
        value.trim().chars().count() >= MESSAGE_MIN_LEN
    }

    /// Full check run on submit. Returns every failing field in form order.
    pub fn validate_submission(&self, data: &ContactSubmission) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !self.is_valid_name(&data.name) {
            errors.push(FieldError {
                field: Field::Name,
                message: NAME_ERROR,
            });
        }
        if !self.is_valid_email(&data.email) {
            errors.push(FieldError {
                field: Field::Email,
                message: EMAIL_ERROR,
            });
        }
        if !self.is_valid_phone(&data.phone) {
            errors.push(FieldError {
                field: Field::Phone,
                message: PHONE_ERROR,
            });
        }
        if !self.is_valid_message(&data.message) {
            errors.push(FieldError {
                field: Field::Message,
                message: MESSAGE_ERROR,
            });
        }
        errors
    }

    /// Blur-time check for one input. The value is trimmed first; the
    /// required check wins over the type check.
    pub fn validate_input(&self, rule: InputRule, raw: &str) -> Option<&'static str> {
        let value = raw.trim();
        if rule.required && value.is_empty() {
            return Some(REQUIRED_ERROR);
        }
        match rule.kind {
            InputKind::Email if !self.is_valid_email(value) => Some(EMAIL_ERROR),
            InputKind::Tel if !self.is_valid_phone(value) => Some(PHONE_ERROR),
            _ => None,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}
