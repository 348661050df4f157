//! Composable selection predicates

use super::document::Document;
use super::value::{IntoValue, RecordId, Value};
use regex::Regex;
use std::cmp::Ordering;
use std::ops::{BitAnd, BitAndAssign};

/// A boolean predicate over the documents of a collection
///
/// Selectors are closed under AND: combining with [`Selector::All`] is the
/// identity and nested conjunctions are flattened.
#[derive(Debug, Clone, Default)]
pub enum Selector {
    /// Accept every document
    #[default]
    All,
    Eq(&'static str, Value),
    Ne(&'static str, Value),
    /// Inclusive lower bound
    Gte(&'static str, Value),
    /// Inclusive upper bound
    Lte(&'static str, Value),
    /// Text field matches the pattern somewhere
    Matches(&'static str, Regex),
    And(Vec<Selector>),
}

impl Selector {
    pub fn eq(field: &'static str, value: impl IntoValue) -> Self {
        Self::Eq(field, value.into_value())
    }

    pub fn ne(field: &'static str, value: impl IntoValue) -> Self {
        Self::Ne(field, value.into_value())
    }

    pub fn gte(field: &'static str, value: impl IntoValue) -> Self {
        Self::Gte(field, value.into_value())
    }

    pub fn lte(field: &'static str, value: impl IntoValue) -> Self {
        Self::Lte(field, value.into_value())
    }

    /// Select a single document by identity
    pub fn by_id<D: Document>(id: RecordId) -> Self {
        Self::Eq(D::ID_FIELD, Value::Id(id))
    }

    /// Substring match of `text` taken literally
    pub fn contains_literal(field: &'static str, text: &str) -> Result<Self, regex::Error> {
        Regex::new(&regex::escape(text)).map(|re| Self::Matches(field, re))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }

    /// Conjunction of two selectors
    pub fn and(self, other: Selector) -> Self {
        match (self, other) {
            (Selector::All, s) | (s, Selector::All) => s,
            (Selector::And(mut left), Selector::And(right)) => {
                left.extend(right);
                Selector::And(left)
            }
            (Selector::And(mut left), s) => {
                left.push(s);
                Selector::And(left)
            }
            (s, Selector::And(mut right)) => {
                right.insert(0, s);
                Selector::And(right)
            }
            (a, b) => Selector::And(vec![a, b]),
        }
    }

    /// Evaluate the predicate against a document
    pub fn matches<D: Document>(&self, doc: &D) -> bool {
        match self {
            Selector::All => true,
            Selector::Eq(field, value) => doc.get(field).unwrap_or(Value::Null) == *value,
            Selector::Ne(field, value) => doc.get(field).unwrap_or(Value::Null) != *value,
            Selector::Gte(field, bound) => matches!(
                doc.get(field).and_then(|v| v.compare(bound)),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Selector::Lte(field, bound) => matches!(
                doc.get(field).and_then(|v| v.compare(bound)),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Selector::Matches(field, re) => match doc.get(field) {
                Some(Value::Text(text)) => re.is_match(&text),
                _ => false,
            },
            Selector::And(parts) => parts.iter().all(|s| s.matches(doc)),
        }
    }
}

impl BitAnd for Selector {
    type Output = Selector;

    fn bitand(self, rhs: Selector) -> Selector {
        self.and(rhs)
    }
}

impl BitAndAssign for Selector {
    fn bitand_assign(&mut self, rhs: Selector) {
        let lhs = std::mem::take(self);
        *self = lhs.and(rhs);
    }
}
