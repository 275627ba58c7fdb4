//! Utility functions for shaping user data the way iPass accepts it

use crate::domain::entities::PersonName;

/// Split a full name into first and last name.
/// The last word is the last name, everything before it the first name.
pub fn split_full_name(full_name: &str) -> PersonName {
    let trimmed = full_name.trim();
    match trimmed.rsplit_once(char::is_whitespace) {
        Some((first, last)) => PersonName {
            first: first.trim_end().to_string(),
            last: last.to_string(),
        },
        None => PersonName {
            first: String::new(),
            last: trimmed.to_string(),
        },
    }
}

/// iPass requires both names to be non empty
pub fn fill_first_name(mut name: PersonName) -> PersonName {
    if name.first.is_empty() {
        name.first = name.last.clone();
    }
    name
}

/// Tag an email address with a plus suffix, `local+tag@host`
pub fn plus_tagged_email(email: &str, tag: &str) -> Option<String> {
    let (local, host) = email.rsplit_once('@')?;
    if local.is_empty() || host.is_empty() {
        return None;
    }
    Some(format!("{}+{}@{}", local, tag, host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_two_words() {
        let name = split_full_name("John Doe");
        assert_eq!(name.first, "John");
        assert_eq!(name.last, "Doe");
    }

    #[test]
    fn test_split_keeps_middle_names_in_first() {
        let name = split_full_name("  Anna Maria  von Berg ");
        assert_eq!(name.first, "Anna Maria  von");
        assert_eq!(name.last, "Berg");
    }

    #[test]
    fn test_split_single_word() {
        let name = split_full_name("Cher");
        assert_eq!(name.first, "");
        assert_eq!(name.last, "Cher");

        let filled = fill_first_name(name);
        assert_eq!(filled.first, "Cher");
        assert_eq!(filled.last, "Cher");
    }

    #[test]
    fn test_split_empty() {
        assert_eq!(split_full_name("   "), PersonName::default());
    }

    #[test]
    fn test_plus_tagged_email() {
        assert_eq!(
            plus_tagged_email("john@mail.com", "jdoe").as_deref(),
            Some("john+jdoe@mail.com")
        );
        assert!(plus_tagged_email("no-at-sign", "jdoe").is_none());
        assert!(plus_tagged_email("@mail.com", "jdoe").is_none());
    }
}
