//! Query description and client-visible matching/ordering semantics.
//!
//! Queries are scoped to a single collection. Filters are conjunctive.
//! Ordering compares field values (strings lexicographically, so RFC 3339
//! timestamps sort correctly; numbers numerically) with the document ID as
//! tiebreak so result order is deterministic.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field == value`
    Eq { field: String, value: Value },
    /// Array field contains the value (`array-contains`)
    ArrayContains { field: String, value: Value },
}

impl Filter {
    fn matches(&self, data: &Map<String, Value>) -> bool {
        match self {
            Filter::Eq { field, value } => data.get(field) == Some(value),
            Filter::ArrayContains { field, value } => match data.get(field) {
                Some(Value::Array(items)) => items.contains(value),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A standing or one-shot query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(path: impl Into<String>) -> Self {
        Self {
            collection: path.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn filter_eq(mut self, field: &str, value: Value) -> Self {
        self.filters.push(Filter::Eq {
            field: field.to_string(),
            value,
        });
        self
    }

    pub fn filter_array_contains(mut self, field: &str, value: Value) -> Self {
        self.filters.push(Filter::ArrayContains {
            field: field.to_string(),
            value,
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document's field map satisfies every filter.
    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        self.filters.iter().all(|f| f.matches(data))
    }

    /// Apply ordering and limit to a result set.
    pub fn arrange(&self, docs: &mut Vec<Document>) {
        if let Some(order) = &self.order_by {
            docs.sort_by(|a, b| {
                let ord = compare_values(a.data.get(&order.field), b.data.get(&order.field))
                    .then_with(|| a.id.cmp(&b.id));
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            docs.truncate(limit);
        }
    }
}

/// Total order over field values: null < bool < number < string, missing
/// fields sort first.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Bool(_), _) => Ordering::Less,
            (_, Value::Bool(_)) => Ordering::Greater,
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::Number(_), _) => Ordering::Less,
            (_, Value::Number(_)) => Ordering::Greater,
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => Ordering::Equal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        let Value::Object(map) = data else {
            panic!("doc body must be an object")
        };
        Document::new(id, map)
    }

    #[test]
    fn eq_and_array_contains_filters() {
        let q = Query::collection("joinRequests")
            .filter_eq("status", json!("pending"))
            .filter_eq("userId", json!("u1"));

        let pending = doc("r1", json!({ "status": "pending", "userId": "u1" }));
        let approved = doc("r2", json!({ "status": "approved", "userId": "u1" }));
        assert!(q.matches(&pending.data));
        assert!(!q.matches(&approved.data));

        let q = Query::collection("courses").filter_array_contains("members", json!("u1"));
        let hit = doc("c1", json!({ "members": ["u2", "u1"] }));
        let miss = doc("c2", json!({ "members": ["u2"] }));
        let not_array = doc("c3", json!({ "members": "u1" }));
        assert!(q.matches(&hit.data));
        assert!(!q.matches(&miss.data));
        assert!(!q.matches(&not_array.data));
    }

    #[test]
    fn ordering_by_rfc3339_timestamp_strings() {
        let q = Query::collection("messages").order_by("timestamp", Direction::Asc);
        let mut docs = vec![
            doc("b", json!({ "timestamp": "2026-08-24T10:00:01Z" })),
            doc("a", json!({ "timestamp": "2026-08-24T09:59:59Z" })),
            doc("c", json!({ "timestamp": "2026-08-24T10:00:01Z" })),
        ];
        q.arrange(&mut docs);
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        // equal timestamps break ties by document ID
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn descending_order_with_limit() {
        let q = Query::collection("announcements")
            .order_by("createdAt", Direction::Desc)
            .limit(2);
        let mut docs = vec![
            doc("a1", json!({ "createdAt": "2026-01-01T00:00:00Z" })),
            doc("a2", json!({ "createdAt": "2026-03-01T00:00:00Z" })),
            doc("a3", json!({ "createdAt": "2026-02-01T00:00:00Z" })),
        ];
        q.arrange(&mut docs);
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["a2", "a3"]);
    }

    #[test]
    fn missing_order_field_sorts_first() {
        let q = Query::collection("messages").order_by("timestamp", Direction::Asc);
        let mut docs = vec![
            doc("m2", json!({ "timestamp": "2026-08-24T10:00:00Z" })),
            doc("m1", json!({})),
        ];
        q.arrange(&mut docs);
        assert_eq!(docs[0].id, "m1");
    }
}
