use serde::{Deserialize, Serialize};

use grove_types::{SearchOperator, Value};

/// Connective between two combined sub-results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalRelation {
    And,
    Or,
}

/// One field comparison: `predicate <operator> value`, optionally
/// negated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchPair {
    pub predicate: String,
    pub operator: SearchOperator,
    pub value: Value,
    pub not: bool,
}

impl SearchPair {
    pub fn new(predicate: impl Into<String>, operator: SearchOperator, value: Value) -> Self {
        Self {
            predicate: predicate.into(),
            operator,
            value,
            not: false,
        }
    }

    /// Invert the pair: match subjects that have edges for other values
    /// of this predicate but none satisfying the comparison.
    pub fn negated(mut self) -> Self {
        self.not = true;
        self
    }
}

/// One element of a query, evaluated in sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SearchElement {
    Pair(SearchPair),
    Group(SearchQuery),
    Relation(LogicalRelation),
}

/// An ordered boolean query.
///
/// Elements are evaluated left to right; the most recently seen
/// [`LogicalRelation`] applies to the next combination, defaulting to
/// `And`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub elements: Vec<SearchElement>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn push(&mut self, element: SearchElement) {
        self.elements.push(element);
    }

    /// Builder form of [`Self::push`].
    pub fn with(mut self, element: SearchElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Append `AND <pair>`.
    pub fn and(self, pair: SearchPair) -> Self {
        self.with(SearchElement::Relation(LogicalRelation::And))
            .with(SearchElement::Pair(pair))
    }

    /// Append `OR <pair>`.
    pub fn or(self, pair: SearchPair) -> Self {
        self.with(SearchElement::Relation(LogicalRelation::Or))
            .with(SearchElement::Pair(pair))
    }
}

impl From<SearchPair> for SearchQuery {
    fn from(pair: SearchPair) -> Self {
        SearchQuery::new().with(SearchElement::Pair(pair))
    }
}

/// Direction of a sort criterion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sort request: order results by the lexical value of one predicate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SortCriterion {
    pub predicate: String,
    pub order: SortOrder,
}

impl SortCriterion {
    pub fn ascending(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            order: SortOrder::Descending,
        }
    }
}

/// An ordered list of matching identities.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub ids: Vec<String>,
    pub sort: Option<SortCriterion>,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.ids.iter().any(|id| id == uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_relation_pair_sequences() {
        let q = SearchQuery::from(SearchPair::new(
            "http://grove.org/terms/title",
            SearchOperator::Equals,
            Value::String("x".into()),
        ))
        .or(SearchPair::new(
            "http://grove.org/terms/year",
            SearchOperator::Greater,
            Value::Integer(2000),
        ));

        assert_eq!(q.elements.len(), 3);
        assert!(matches!(q.elements[0], SearchElement::Pair(_)));
        assert!(matches!(
            q.elements[1],
            SearchElement::Relation(LogicalRelation::Or)
        ));
        assert!(matches!(q.elements[2], SearchElement::Pair(_)));
    }

    #[test]
    fn queries_round_trip_as_json() {
        let q = SearchQuery::from(SearchPair::new(
            "http://grove.org/terms/title",
            SearchOperator::NotEquals,
            Value::String("x".into()),
        ))
        .with(SearchElement::Group(SearchQuery::from(
            SearchPair::new(
                "http://grove.org/terms/year",
                SearchOperator::Lesser,
                Value::Integer(1990),
            )
            .negated(),
        )));

        let json = serde_json::to_string(&q).unwrap();
        let back: SearchQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }
}
