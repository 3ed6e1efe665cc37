use validator::ValidateEmail;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Validates a membership plan code.
/// Rules:
/// - 1-50 characters
/// - Only uppercase ASCII letters, digits and underscores
/// - Must start with a letter
pub fn is_valid_plan_code(code: &str) -> bool {
    if code.is_empty() || code.len() > 50 {
        return false;
    }

    let Some(first) = code.chars().next() else {
        return false;
    };
    if !first.is_ascii_uppercase() {
        return false;
    }

    code.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN && !password.trim().is_empty()
}
