//! Category identifier derivation and parsing.
//!
//! A daily expense is folded into a monthly ledger entry keyed by a string
//! identifier that encodes both the category tag and, for individually
//! carried expenses, the owning party: `grocery`, `my_grocery`,
//! `partner_grocery`. Deriving and parsing that key lives here and nowhere
//! else.

use crate::domain::models::{Owner, Ownership};

const MY_PREFIX: &str = "my_";
const PARTNER_PREFIX: &str = "partner_";

/// A category identifier split back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCategoryId {
    pub category: String,
    pub ownership: Ownership,
}

/// Derive the monthly category identifier for an expense.
///
/// Shared expenses use the bare category tag; individual ones are prefixed
/// with the owning party.
pub fn derive_id(category: &str, ownership: Ownership) -> String {
    match ownership {
        Ownership::Shared => category.to_string(),
        Ownership::Individual(Owner::Me) => format!("{}{}", MY_PREFIX, category),
        Ownership::Individual(Owner::Partner) => format!("{}{}", PARTNER_PREFIX, category),
    }
}

/// Parse a category identifier back into category and ownership.
///
/// Total over any string: identifiers without a recognized prefix are read
/// as shared. This is the left inverse of [`derive_id`] for category tags
/// that do not themselves start with a reserved prefix; a literal tag like
/// `"my_grocery"` is indistinguishable from the derived individual form and
/// parses as `Individual(Me)` of `"grocery"`. Known limitation, kept from
/// the original data model.
pub fn parse_id(id: &str) -> ParsedCategoryId {
    if let Some(category) = id.strip_prefix(MY_PREFIX) {
        ParsedCategoryId {
            category: category.to_string(),
            ownership: Ownership::Individual(Owner::Me),
        }
    } else if let Some(category) = id.strip_prefix(PARTNER_PREFIX) {
        ParsedCategoryId {
            category: category.to_string(),
            ownership: Ownership::Individual(Owner::Partner),
        }
    } else {
        ParsedCategoryId {
            category: id.to_string(),
            ownership: Ownership::Shared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_bare_id_for_shared_expenses() {
        assert_eq!(derive_id("grocery", Ownership::Shared), "grocery");
    }

    #[test]
    fn derives_prefixed_ids_for_individual_expenses() {
        assert_eq!(
            derive_id("grocery", Ownership::Individual(Owner::Me)),
            "my_grocery"
        );
        assert_eq!(
            derive_id("grocery", Ownership::Individual(Owner::Partner)),
            "partner_grocery"
        );
    }

    #[test]
    fn parse_inverts_derive_on_prefix_free_categories() {
        for category in ["grocery", "dining", "transport", "m", ""] {
            for ownership in [
                Ownership::Shared,
                Ownership::Individual(Owner::Me),
                Ownership::Individual(Owner::Partner),
            ] {
                let parsed = parse_id(&derive_id(category, ownership));
                assert_eq!(parsed.category, category);
                assert_eq!(parsed.ownership, ownership);
            }
        }
    }

    #[test]
    fn unprefixed_id_parses_as_shared() {
        let parsed = parse_id("rent");
        assert_eq!(parsed.category, "rent");
        assert_eq!(parsed.ownership, Ownership::Shared);
    }

    #[test]
    fn prefix_matching_is_literal() {
        // "my" without the underscore is not a prefix.
        assert_eq!(parse_id("mystuff").ownership, Ownership::Shared);
        assert_eq!(parse_id("partner").ownership, Ownership::Shared);
    }

    #[test]
    fn reserved_prefix_in_literal_category_is_ambiguous() {
        // Known limitation: a shared expense whose tag is literally
        // "my_books" derives the same id as an individual "books" expense
        // and parses back as the latter.
        let id = derive_id("my_books", Ownership::Shared);
        let parsed = parse_id(&id);
        assert_eq!(parsed.category, "books");
        assert_eq!(parsed.ownership, Ownership::Individual(Owner::Me));
    }
}
