//! Input validation utilities

/// Longest accepted username, in characters
pub const MAX_USERNAME_LEN: usize = 64;

/// Longest accepted password, in characters
pub const MAX_PASSWORD_LEN: usize = 128;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(format!(
            "Username must be at most {} characters long",
            MAX_USERNAME_LEN
        ));
    }

    if username.chars().any(char::is_control) {
        return Err("Username cannot contain control characters".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() > MAX_PASSWORD_LEN {
        return Err(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LEN
        ));
    }

    Ok(())
}
