//! Contact record validation.
//!
//! One raw row in, either a normalized record or the first failing
//! rule out. Rules apply in fixed precedence (presence, email shape,
//! phone shape) so a caller always sees the most fundamental problem
//! first.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `local@domain` shape: non-space runs around `@` and a dot.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("invalid email regex"));

/// Exactly 10 decimal digits.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("invalid phone regex"));

/// One loosely-typed input row, as decoded from an uploaded sheet or
/// a request body. Missing cells arrive as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// A validated, trimmed contact ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name, email and phone are required")]
    MissingRequired,
    #[error("invalid email format")]
    InvalidEmail,
    #[error("invalid phone number")]
    InvalidPhone,
}

/// Validate one raw row into a normalized record.
pub fn validate_row(row: &RawRow) -> Result<NewContact, ValidationError> {
    let name = row.name.trim();
    let email = row.email.trim();
    let phone = row.phone.trim();

    if name.is_empty() || email.is_empty() || phone.is_empty() {
        return Err(ValidationError::MissingRequired);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !PHONE_RE.is_match(phone) {
        return Err(ValidationError::InvalidPhone);
    }

    Ok(NewContact {
        name: name.to_owned(),
        email: email.to_owned(),
        phone: phone.to_owned(),
    })
}
