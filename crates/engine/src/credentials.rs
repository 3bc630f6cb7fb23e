//! Sign-in and password-recovery input rules, checked before anything is
//! sent to the backend.

use crate::{FieldErrors, util};

const PASSWORD_SPECIALS: &str = "@$!%*?&";
const PASSWORD_MIN_LEN: usize = 8;

/// Sign-in form.
pub fn check_sign_in(email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if util::is_blank(email) || password.is_empty() {
        errors.insert("form", "Please enter all the mandatory fields!");
        return errors;
    }
    if !is_email(email) {
        errors.insert("email", "Invalid email format");
    }
    if !is_strong_password(password) {
        errors.insert("password", password_rule());
    }
    errors
}

/// Forgot-password form.
pub fn check_email(email: &str) -> FieldErrors {
    if util::is_blank(email) {
        return FieldErrors::single("email", "Please enter email");
    }
    if !is_email(email) {
        return FieldErrors::single("email", "Invalid email format");
    }
    FieldErrors::new()
}

/// OTP verification form.
pub fn check_otp(email: &str, otp: &str) -> FieldErrors {
    let mut errors = check_email(email);
    let otp = otp.trim();
    if otp.is_empty() {
        errors.insert("otp", "Please enter the OTP");
    } else if !otp.chars().all(|c| c.is_ascii_digit()) {
        errors.insert("otp", "OTP must contain only digits");
    }
    errors
}

/// Reset-password form.
pub fn check_reset(email: &str, password: &str, confirm: &str) -> FieldErrors {
    let mut errors = check_email(email);
    if password.is_empty() {
        errors.insert("password", "Please enter a new password");
    } else if !is_strong_password(password) {
        errors.insert("password", password_rule());
    } else if password != confirm {
        errors.insert("confirm_password", "Passwords do not match");
    }
    errors
}

fn password_rule() -> String {
    format!(
        "Password must contain {PASSWORD_MIN_LEN} chars and must contain 1 number, 1 special character, 1 uppercase and 1 lowercase letter"
    )
}

/// `local@domain.tld`, no whitespace, exactly one `@`.
#[must_use]
pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

/// At least 8 characters from letters, digits and `@$!%*?&`, with one of each
/// class.
#[must_use]
pub fn is_strong_password(value: &str) -> bool {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    allowed
        && value.chars().count() >= PASSWORD_MIN_LEN
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}
