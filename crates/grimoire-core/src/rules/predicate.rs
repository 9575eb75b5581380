//! Roll-option predicates.
//!
//! A predicate is a list of terms that must all hold. A term is a bare
//! option name or a `not` / `or` / `and` / `nor` combinator.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One predicate term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredicateTerm {
    /// Holds when the option is present
    Option(String),
    Not { not: Box<PredicateTerm> },
    Or { or: Vec<PredicateTerm> },
    And { and: Vec<PredicateTerm> },
    Nor { nor: Vec<PredicateTerm> },
}

impl PredicateTerm {
    pub fn test(&self, options: &BTreeSet<String>) -> bool {
        match self {
            PredicateTerm::Option(option) => options.contains(option),
            PredicateTerm::Not { not } => !not.test(options),
            PredicateTerm::Or { or } => or.iter().any(|t| t.test(options)),
            PredicateTerm::And { and } => and.iter().all(|t| t.test(options)),
            PredicateTerm::Nor { nor } => !nor.iter().any(|t| t.test(options)),
        }
    }
}

/// Conjunction of terms; an empty predicate always holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate(pub Vec<PredicateTerm>);

impl Predicate {
    pub fn test(&self, options: &BTreeSet<String>) -> bool {
        self.0.iter().all(|t| t.test(options))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn parse(value: serde_json::Value) -> Predicate {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_all_terms_must_hold() {
        let predicate = parse(json!(["self:lit", "self:holding-torch"]));
        assert!(predicate.test(&options(&["self:lit", "self:holding-torch"])));
        assert!(!predicate.test(&options(&["self:lit"])));
    }

    #[test]
    fn test_combinators() {
        let predicate = parse(json!([
            {"or": ["darkness", "dim-light"]},
            {"not": "blinded"},
            {"nor": ["unconscious", "dead"]},
            {"and": ["awake"]}
        ]));
        assert!(predicate.test(&options(&["darkness", "awake"])));
        assert!(!predicate.test(&options(&["darkness", "awake", "blinded"])));
        assert!(!predicate.test(&options(&["awake"])));
        assert!(!predicate.test(&options(&["dim-light", "awake", "dead"])));
    }

    #[test]
    fn test_empty_predicate_holds() {
        assert!(Predicate::default().test(&BTreeSet::new()));
    }
}
