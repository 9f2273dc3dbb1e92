//! # Invite
//!
//! Shared vocabulary between the guest-facing workflow and the backend.
//!
//! Both sides validate submissions with the same rules from [`validation`], so a
//! guest who passes the form checks is never surprised by the server and a
//! caller who skips the form is still held to them.

pub mod model;
pub mod payloads;
pub mod validation;

pub use model::{Admission, Attending, GateStrategy, RsvpRecord, RsvpSubmission};
pub use validation::{Field, FieldError, ValidationErrors, is_valid_email, validate_submission};

/// Minimum trimmed length before a suggestion lookup is worth issuing.
pub const MIN_SEARCH_CHARS: usize = 2;

/// Upper bound on suggestions returned for one lookup.
pub const MAX_SUGGESTIONS: usize = 10;

/// Upper bound on the well wishes a declining guest can leave.
pub const MAX_WELL_WISHES_CHARS: usize = 400;

/// Lookup key for a guest name: trimmed and lowercased.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trimmed search term, or `None` when too short to search.
pub fn search_term(raw: &str) -> Option<&str> {
    let term = raw.trim();

    (term.chars().count() >= MIN_SEARCH_CHARS).then_some(term)
}

#[cfg(test)]
mod tests {
    use super::{name_key, search_term};

    #[test]
    fn test_name_key() {
        assert_eq!(name_key("  Jane Doe "), "jane doe");
        assert_eq!(name_key("ANESU BANDA"), "anesu banda");
        assert_eq!(name_key(""), "");
    }

    #[test]
    fn test_search_term() {
        assert_eq!(search_term("a"), None);
        assert_eq!(search_term(" a  "), None);
        assert_eq!(search_term(""), None);
        assert_eq!(search_term(" an "), Some("an"));
        assert_eq!(search_term("é"), None);
        assert_eq!(search_term("éa"), Some("éa"));
    }
}
