//! Case-insensitive uniqueness rules for human-entered fields.

use super::Error;

/// Canonical form used to compare names, codes and emails.
///
/// ```
/// use staffing::domain::fold_case;
///
/// assert_eq!(fold_case("  Engineering "), fold_case("engineering"));
/// ```
#[must_use]
pub fn fold_case(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Case-insensitive substring match used by list filters and search.
#[must_use]
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&fold_case(needle))
}

/// The record currently holding a unique value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holder<'a> {
    /// Identity of the holder.
    pub id: i64,
    /// Value as stored by the holder.
    pub value: &'a str,
}

/// Reject a value already held by a record other than `exclude_self`.
///
/// On update, pass the record's own id as `exclude_self` so re-saving the
/// same value (in any letter case) is not a collision. The error names the
/// stored value.
///
/// # Errors
/// Returns a `DuplicateField` error when another record holds the value.
pub fn ensure_unique(
    entity: &str,
    field: &str,
    holder: Option<Holder<'_>>,
    exclude_self: Option<i64>,
) -> Result<(), Error> {
    match holder {
        Some(existing) if Some(existing.id) != exclude_self => {
            Err(Error::duplicate_field(entity, field, existing.value))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    const ENGINEERING: Holder<'static> = Holder {
        id: 1,
        value: "Engineering",
    };

    #[rstest]
    #[case::free(None, None, true)]
    #[case::create_collides(Some(ENGINEERING), None, false)]
    #[case::update_self(Some(ENGINEERING), Some(1), true)]
    #[case::update_other(Some(ENGINEERING), Some(2), false)]
    fn enforces_uniqueness(
        #[case] holder: Option<Holder<'static>>,
        #[case] exclude_self: Option<i64>,
        #[case] accepted: bool,
    ) {
        assert_eq!(
            ensure_unique("Department", "name", holder, exclude_self).is_ok(),
            accepted
        );
    }

    #[test]
    fn collision_names_stored_value() {
        let err = ensure_unique("Department", "name", Some(ENGINEERING), None)
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::DuplicateField);
        assert!(err.message().contains("'Engineering'"));
    }

    #[rstest]
    #[case("ENG", "eng")]
    #[case(" Ada@Example.com", "ada@example.com")]
    fn folds_case_and_whitespace(#[case] left: &str, #[case] right: &str) {
        assert_eq!(fold_case(left), fold_case(right));
    }

    #[test]
    fn substring_match_ignores_case() {
        assert!(contains_folded("Lovelace", "LACE"));
        assert!(!contains_folded("Lovelace", "hopper"));
    }
}
