use std::cmp::Ordering;

use serde_json::Value;

use super::document::{Document, Fields};

/// Conjunction of field-equality clauses.
///
/// Equality on exact field values is the only predicate shape the content
/// model needs; a clause never matches a missing field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Matches every document in the collection.
    pub fn all() -> Self {
        Self::default()
    }

    /// Single `field == value` clause.
    pub fn field(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            clauses: vec![(name.into(), value.into())],
        }
    }

    /// Adds another `field == value` clause.
    pub fn and(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((name.into(), value.into()));
        self
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.clauses
            .iter()
            .all(|(name, value)| fields.get(name) == Some(value))
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single-field sort order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

impl Sort {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ordering = compare_values(a.fields.get(&self.field), b.fields.get(&self.field));
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// Missing fields sort first; numbers before strings; other value kinds
/// compare equal (the content model only sorts numbers and strings).
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Number(_)), Some(_)) => Ordering::Less,
        (Some(_), Some(Value::Number(_))) => Ordering::Greater,
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Applies a filter and optional sort to a set of documents.
///
/// Unsorted results are ordered by id so reads stay deterministic.
pub(crate) fn snapshot(docs: Vec<Document>, filter: &Filter, sort: Option<&Sort>) -> Vec<Document> {
    let mut matched: Vec<Document> = docs
        .into_iter()
        .filter(|doc| filter.matches(&doc.fields))
        .collect();

    match sort {
        Some(sort) => matched.sort_by(|a, b| sort.compare(a, b)),
        None => matched.sort_by(|a, b| a.id.cmp(&b.id)),
    }

    matched
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(id: &str, fields: Value) -> Document {
        match fields {
            Value::Object(map) => Document {
                id: id.to_string(),
                fields: map,
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let d = doc("a", json!({ "order": 1 }));
        assert!(Filter::all().matches(&d.fields));
    }

    #[test]
    fn clause_does_not_match_missing_field() {
        let d = doc("a", json!({ "order": 1 }));
        assert!(!Filter::field("categoryId", "x").matches(&d.fields));
    }

    #[test]
    fn conjunction_requires_all_clauses() {
        let d = doc("a", json!({ "categoryId": "x", "order": 2 }));
        assert!(Filter::field("categoryId", "x").and("order", 2).matches(&d.fields));
        assert!(!Filter::field("categoryId", "x").and("order", 3).matches(&d.fields));
    }

    #[test]
    fn sort_orders_numbers_ascending_and_descending() {
        let docs = vec![
            doc("b", json!({ "order": 2 })),
            doc("a", json!({ "order": 1 })),
            doc("c", json!({ "order": 3 })),
        ];

        let asc = snapshot(docs.clone(), &Filter::all(), Some(&Sort::ascending("order")));
        assert_eq!(
            asc.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            ["a", "b", "c"]
        );

        let desc = snapshot(docs, &Filter::all(), Some(&Sort::descending("order")));
        assert_eq!(
            desc.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            ["c", "b", "a"]
        );
    }
}
