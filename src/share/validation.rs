use lazy_static::lazy_static;
use regex::Regex;

use super::ShareForm;
use crate::ValidationError;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL.is_match(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Ten digits once spaces, dashes and other separators are stripped.
pub fn validate_mobile(mobile: &str) -> Result<(), ValidationError> {
    if mobile.chars().filter(|c| c.is_ascii_digit()).count() == 10 {
        Ok(())
    } else {
        Err(ValidationError::InvalidMobile)
    }
}

/// Field checks in the order the form presents them; the first failure wins.
pub fn validate_share_form(form: &ShareForm) -> Result<(), ValidationError> {
    if form.department.trim().is_empty() {
        return Err(ValidationError::MissingField("department"));
    }
    if form.person_name.trim().is_empty() {
        return Err(ValidationError::MissingField("person name"));
    }
    if form.file_name.trim().is_empty() {
        return Err(ValidationError::MissingField("file name or ID"));
    }
    if form.email.trim().is_empty() {
        return Err(ValidationError::MissingField("email address"));
    }
    if form.mobile.trim().is_empty() {
        return Err(ValidationError::MissingField("mobile number"));
    }
    validate_email(&form.email)?;
    validate_mobile(&form.mobile)
}
