//! Account-creation rules for signup: username shape and password strength.

use crate::domain::FieldErrors;

pub const USERNAME_MAX_LEN: usize = 150;
pub const NAME_MAX_LEN: usize = 50;

/// Threshold above which a password counts as "too similar" to an account field.
const MAX_SIMILARITY: f64 = 0.7;

const COMMON_PASSWORDS: &[&str] = &[
    "123456", "123456789", "12345678", "1234567890", "password", "password1", "password123",
    "qwerty", "qwerty123", "qwertyuiop", "abc123", "111111", "123123", "1q2w3e4r", "iloveyou",
    "admin123", "welcome", "welcome1", "letmein", "monkey", "dragon", "sunshine", "princess",
    "football", "baseball", "superman", "trustno1", "passw0rd", "whatever", "starwars",
    "zaq12wsx", "asdfghjkl", "1qaz2wsx", "changeme", "library", "books123",
];

/// Letters, digits and `@ . + - _`, like the default account username rule.
pub fn validate_username(username: &str, errors: &mut FieldErrors) {
    if username.is_empty() {
        errors.add("username", "This field is required.");
        return;
    }

    let len = username.chars().count();
    if len > USERNAME_MAX_LEN {
        errors.add(
            "username",
            format!("Ensure this value has at most {USERNAME_MAX_LEN} characters (it has {len})."),
        );
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

pub fn validate_name(field: &str, value: &str, errors: &mut FieldErrors) {
    if value.is_empty() {
        errors.add(field, "This field is required.");
        return;
    }

    let len = value.chars().count();
    if len > NAME_MAX_LEN {
        errors.add(
            field,
            format!("Ensure this value has at most {NAME_MAX_LEN} characters (it has {len})."),
        );
    }
}

/// Strength checks on the chosen password. Failures are reported on
/// `password2`, next to the confirmation box.
pub fn validate_password(
    password: &str,
    min_length: usize,
    attributes: &[(&str, &str)],
    errors: &mut FieldErrors,
) {
    for (label, value) in attributes {
        if is_too_similar(password, value) {
            errors.add(
                "password2",
                format!("The password is too similar to the {label}."),
            );
            break;
        }
    }

    if password.chars().count() < min_length {
        errors.add(
            "password2",
            format!(
                "This password is too short. It must contain at least {min_length} characters."
            ),
        );
    }

    let lowered = password.trim().to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        errors.add("password2", "This password is too common.");
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.add("password2", "This password is entirely numeric.");
    }
}

fn is_too_similar(password: &str, attribute: &str) -> bool {
    let password = password.to_lowercase();
    let attribute = attribute.to_lowercase();
    if password.is_empty() || attribute.chars().count() < 3 {
        return false;
    }

    if password.contains(&attribute) || attribute.contains(&password) {
        return true;
    }

    // Compare against the whole value and each of its word-like parts
    std::iter::once(attribute.as_str())
        .chain(attribute.split(|c: char| !c.is_alphanumeric()))
        .filter(|part| part.chars().count() >= 3)
        .any(|part| similarity(&password, part) >= MAX_SIMILARITY)
}

/// `2 * LCS / (|a| + |b|)` over characters, in `[0, 1]`.
#[allow(clippy::cast_precision_loss)]
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let mut previous = vec![0usize; b.len() + 1];
    for ca in &a {
        let mut current = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        previous = current;
    }

    let lcs = previous[b.len()];
    (2 * lcs) as f64 / (a.len() + b.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        let mut errors = FieldErrors::new();
        validate_username("jane.doe+books@example", &mut errors);
        assert!(errors.is_empty());

        validate_username("", &mut errors);
        assert_eq!(errors.get("username"), ["This field is required."]);

        let mut errors = FieldErrors::new();
        validate_username("no spaces", &mut errors);
        assert!(errors.get("username")[0].starts_with("Enter a valid username"));

        let mut errors = FieldErrors::new();
        validate_username(&"a".repeat(151), &mut errors);
        assert!(errors.get("username")[0].contains("at most 150"));
    }

    #[test]
    fn test_validate_password_accepts_strong() {
        let mut errors = FieldErrors::new();
        validate_password(
            "tangerine-orbit-42",
            8,
            &[("username", "jdoe"), ("first name", "Jane"), ("last name", "Doe")],
            &mut errors,
        );
        assert!(errors.is_empty(), "{errors}");
    }

    #[test]
    fn test_validate_password_rejections() {
        let mut errors = FieldErrors::new();
        validate_password("1234", 8, &[], &mut errors);
        let messages = errors.get("password2");
        assert!(messages.iter().any(|m| m.contains("too short")));
        assert!(messages.iter().any(|m| m.contains("entirely numeric")));

        let mut errors = FieldErrors::new();
        validate_password("password", 8, &[], &mut errors);
        assert_eq!(errors.get("password2"), ["This password is too common."]);

        let mut errors = FieldErrors::new();
        validate_password("bookworm99", 8, &[("username", "bookworm")], &mut errors);
        assert_eq!(
            errors.get("password2"),
            ["The password is too similar to the username."]
        );
    }

    #[test]
    fn test_similarity_bounds() {
        assert!((similarity("abc", "abc") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("abc", "xyz") < f64::EPSILON);
        assert!(!is_too_similar("tangerine-orbit-42", "jdoe"));
        assert!(is_too_similar("margaret1", "Margaret"));
    }
}
