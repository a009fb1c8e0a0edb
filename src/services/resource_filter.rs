//! Extracts role-eligible scalar resources from an offer and sums them;
//! the only arithmetic primitives the packing algorithm uses (spec
//! §4.3).

use crate::domain::models::{constraint::matches_all, Constraint, Offer, Resource};

pub struct ResourceFilter {
    role: String,
    constraints: Vec<Constraint>,
}

impl ResourceFilter {
    pub fn new(role: impl Into<String>, constraints: Vec<Constraint>) -> Self {
        Self {
            role: role.into(),
            constraints,
        }
    }

    /// Constraint verdict for the whole offer (logical AND over the set;
    /// an empty set matches everything).
    pub fn filter_offer(&self, offer: &Offer) -> bool {
        matches_all(&self.constraints, offer)
    }

    /// The subset of `offer`'s resources named `name` whose role is `*`
    /// (unreserved) or equals this filter's role.
    pub fn filter_resources<'a>(&self, offer: &'a Offer, name: &str) -> Vec<&'a Resource> {
        offer
            .resources
            .iter()
            .filter(|res| res.name == name && self.role_eligible(&res.role))
            .collect()
    }

    fn role_eligible(&self, role: &str) -> bool {
        role == "*" || role == self.role
    }

    pub fn sum(resources: &[&Resource]) -> f64 {
        resources.iter().map(|r| r.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Attribute, AttributeValue, OfferId, SlaveId};

    fn offer(resources: Vec<Resource>) -> Offer {
        Offer {
            id: OfferId("o1".to_string()),
            slave_id: SlaveId("s1".to_string()),
            attributes: vec![Attribute {
                name: "zone".to_string(),
                value: AttributeValue::Text("us-east".to_string()),
            }],
            resources,
        }
    }

    #[test]
    fn filter_offer_with_empty_constraints_always_matches() {
        let filter = ResourceFilter::new("*", vec![]);
        assert!(filter.filter_offer(&offer(vec![])));
    }

    #[test]
    fn filter_offer_honors_constraint_set() {
        let filter = ResourceFilter::new(
            "*",
            vec![Constraint::Equals {
                attribute: "zone".to_string(),
                value: "us-west".to_string(),
            }],
        );
        assert!(!filter.filter_offer(&offer(vec![])));
    }

    #[test]
    fn filter_resources_returns_only_matching_name_and_role() {
        let filter = ResourceFilter::new("engineering", vec![]);
        let o = offer(vec![
            Resource {
                name: "cpus".to_string(),
                role: "*".to_string(),
                value: 2.0,
            },
            Resource {
                name: "cpus".to_string(),
                role: "engineering".to_string(),
                value: 1.5,
            },
            Resource {
                name: "cpus".to_string(),
                role: "marketing".to_string(),
                value: 4.0,
            },
            Resource {
                name: "mem".to_string(),
                role: "*".to_string(),
                value: 512.0,
            },
        ]);

        let cpus = filter.filter_resources(&o, "cpus");
        assert_eq!(cpus.len(), 2);
        assert!((ResourceFilter::sum(&cpus) - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn sum_is_additive() {
        let a = Resource::unreserved("cpus", 1.0);
        let b = Resource::unreserved("cpus", 2.5);
        assert!((ResourceFilter::sum(&[&a, &b]) - 3.5).abs() < f64::EPSILON);
    }
}
