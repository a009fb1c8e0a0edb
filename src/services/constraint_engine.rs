//! Parses the `--constraints` flag's grammar into a `Vec<Constraint>`.
//!
//! Grammar: `CONSTRAINT (';' CONSTRAINT)*` where
//! `CONSTRAINT := attr ':' op (':' value)?`. An absent or empty string
//! parses to the empty set, which matches every offer.

use crate::domain::errors::ConfigError;
use crate::domain::models::Constraint;

const OPERATOR_EQUALS: &str = "EQUALS";

/// Parses the constraints grammar. Pure: does not touch any offer.
pub fn parse(text: Option<&str>) -> Result<Vec<Constraint>, ConfigError> {
    let Some(text) = text else {
        return Ok(Vec::new());
    };
    if text.is_empty() {
        return Ok(Vec::new());
    }

    text.split(';').map(parse_one).collect()
}

fn parse_one(clause: &str) -> Result<Constraint, ConfigError> {
    let mut parts = clause.splitn(3, ':');
    let attribute = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::InvalidConstraint(clause.to_string()))?;
    let operator = parts
        .next()
        .ok_or_else(|| ConfigError::InvalidConstraint(clause.to_string()))?;
    let value = parts.next().unwrap_or("");

    match operator {
        OPERATOR_EQUALS => Ok(Constraint::Equals {
            attribute: attribute.to_string(),
            value: value.to_string(),
        }),
        other => Err(ConfigError::InvalidConstraint(format!(
            "unsupported operator: {other}"
        ))),
    }
}
