//! Input rules evaluated before any business logic runs.
//!
//! Field rules are declared on the input types with `#[derive(Validate)]`;
//! the composite rules below are wired in through `custom(function = ...)`.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use super::errors::CustomerError;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 20;
/// Column widths of `customer.phone` and `customer.nickname`.
pub const PHONE_MAX_LEN: usize = 32;
pub const NICKNAME_MAX_LEN: usize = 64;
pub const PASSWORD_POLICY_MESSAGE: &str =
    "Password must contain at least one letter, one digit and one special character (8-20 characters)";

/// Letter + digit + ASCII special character, 8 to 20 characters, nothing outside those classes.
pub fn password_policy_satisfied(raw: &str) -> bool {
    let len = raw.chars().count();
    (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len)
        && raw.chars().all(|c| c.is_ascii_alphanumeric() || c.is_ascii_punctuation())
        && raw.chars().any(|c| c.is_ascii_alphabetic())
        && raw.chars().any(|c| c.is_ascii_digit())
        && raw.chars().any(|c| c.is_ascii_punctuation())
}

pub fn validate_password(raw: &str) -> Result<(), ValidationError> {
    if password_policy_satisfied(raw) {
        return Ok(());
    }
    Err(ValidationError::new("password_policy").with_message(Cow::Borrowed(PASSWORD_POLICY_MESSAGE)))
}

/// Blank nicknames count as missing.
pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    if nickname.trim().is_empty() {
        return Err(ValidationError::new("nickname_blank").with_message(Cow::Borrowed("nickname cannot be null")));
    }
    if nickname.chars().count() > NICKNAME_MAX_LEN {
        return Err(ValidationError::new("nickname_length")
            .with_message(Cow::Owned(format!("nickname must be at most {NICKNAME_MAX_LEN} characters"))));
    }
    Ok(())
}

// Emptiness is reported by the length rule.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("phone_digits")
            .with_message(Cow::Borrowed("phone number must contain only digits")));
    }
    if phone.len() > PHONE_MAX_LEN {
        return Err(ValidationError::new("phone_length")
            .with_message(Cow::Owned(format!("phone number must be at most {PHONE_MAX_LEN} digits"))));
    }
    Ok(())
}

/// Run the derived rules and fold every failure into one `CustomerError::Validation`.
pub fn check<T: Validate>(input: &T) -> Result<(), CustomerError> {
    input.validate().map_err(|errs| CustomerError::Validation(describe(&errs)))
}

/// `field: message` pairs sorted by field name, joined with `; `.
fn describe(errs: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errs.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .iter()
        .flat_map(|(field, list)| {
            list.iter().map(move |e| {
                let msg = e.message.as_deref().unwrap_or(e.code.as_ref());
                format!("{field}: {msg}")
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}
