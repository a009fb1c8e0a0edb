//! Offers: resource proposals from the master, scoped to a single
//! scheduling pass and never retained past it.

use std::fmt;

/// Opaque id for an offer, as handed out by the master.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OfferId(pub String);

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque id for a slave (worker node).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlaveId(pub String);

impl fmt::Display for SlaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// This process's registered identity with the master.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameworkId(pub String);

impl fmt::Display for FrameworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed attribute value. Only `Scalar` and `Text` ever match a
/// constraint; any other shape is inert for matching purposes.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Scalar(f64),
    Text(String),
    Other,
}

/// A named, typed attribute attached to an offer's slave.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

/// A named scalar resource share, labeled with a role. `"*"` denotes
/// unreserved.
#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub role: String,
    pub value: f64,
}

impl Resource {
    pub fn unreserved(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            role: "*".to_string(),
            value,
        }
    }
}

/// A resource proposal from the master. Lifetime is a single scheduling
/// pass: never retained beyond `ResourceOffers`.
#[derive(Debug, Clone)]
pub struct Offer {
    pub id: OfferId,
    pub slave_id: SlaveId,
    pub attributes: Vec<Attribute>,
    pub resources: Vec<Resource>,
}

impl Offer {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}
