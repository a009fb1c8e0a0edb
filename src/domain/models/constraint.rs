//! Constraints: predicates over an offer's attributes.

use super::offer::{AttributeValue, Offer};

/// A predicate over an offer's attributes. A tagged variant rather than a
/// trait object hierarchy, so new operators can be added as variants
/// without disturbing existing matches (see DESIGN.md).
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Matches when the named attribute exists and its rendering equals
    /// `value` exactly: text attributes compare their string value,
    /// scalar attributes compare their value printed with zero
    /// fractional digits. Any other attribute type never matches.
    Equals { attribute: String, value: String },
}

impl Constraint {
    pub fn matches(&self, offer: &Offer) -> bool {
        match self {
            Self::Equals { attribute, value } => {
                let Some(attr) = offer.attribute(attribute) else {
                    return false;
                };
                match &attr.value {
                    AttributeValue::Text(text) => text == value,
                    AttributeValue::Scalar(scalar) => format!("{scalar:.0}") == *value,
                    AttributeValue::Other => false,
                }
            }
        }
    }
}

/// A constraint set matches an offer iff every member does. An empty set
/// matches everything.
pub fn matches_all(constraints: &[Constraint], offer: &Offer) -> bool {
    constraints.iter().all(|c| c.matches(offer))
}
