//! Query filters
//!
//! Conditions are evaluated against stored records. A field missing from a
//! record reads as null.

use serde_json::Value;
use std::cmp::Ordering;

use crate::Record;

/// Query condition operators
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Eq,        // =
    Ne,        // !=
    Gt,        // >
    Gte,       // >=
    Lt,        // <
    Lte,       // <=
    In,        // IN
    NotIn,     // NOT IN
    IsNull,    // IS NULL
    IsNotNull, // IS NOT NULL
}

/// Single condition in WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    pub value: Option<Value>, // None for IS NULL/IS NOT NULL
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Query filter that can be nested
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    Condition(QueryCondition),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
}

/// Named standing filter attached to an entity type
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDef {
    pub name: String,
    pub cond: QueryFilter,
    /// Applied to every query unless disabled
    pub default: bool,
}

impl FilterDef {
    pub fn new(name: impl Into<String>, cond: QueryFilter, default: bool) -> Self {
        Self {
            name: name.into(),
            cond,
            default,
        }
    }
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: &str, operator: QueryOperator, value: Option<Value>) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            value,
        })
    }

    /// Create AND group
    pub fn and(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    /// Equal condition; comparing with null means IS NULL
    pub fn eq(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Eq, Some(value))
    }

    /// Not equal condition; comparing with null means IS NOT NULL
    pub fn ne(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Ne, Some(value))
    }

    /// Greater than condition
    pub fn gt(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gt, Some(value))
    }

    /// Greater than or equal condition
    pub fn gte(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gte, Some(value))
    }

    /// Less than condition
    pub fn lt(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lt, Some(value))
    }

    /// Less than or equal condition
    pub fn lte(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lte, Some(value))
    }

    /// IN condition
    pub fn in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, QueryOperator::In, Some(Value::Array(values)))
    }

    /// NOT IN condition
    pub fn not_in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, QueryOperator::NotIn, Some(Value::Array(values)))
    }

    /// IS NULL condition
    pub fn is_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNull, None)
    }

    /// IS NOT NULL condition
    pub fn is_not_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNotNull, None)
    }

    /// Evaluate against a record
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            QueryFilter::Condition(condition) => condition.matches(record),
            QueryFilter::Group { operator, filters } => match operator {
                LogicalOperator::And => filters.iter().all(|f| f.matches(record)),
                LogicalOperator::Or => filters.iter().any(|f| f.matches(record)),
            },
        }
    }
}

impl QueryCondition {
    /// Evaluate with SQL null semantics: any comparison against a null field
    /// is false, except the explicit null checks.
    pub fn matches(&self, record: &Record) -> bool {
        let field = record.get(&self.field).unwrap_or(&Value::Null);
        let expected = self.value.as_ref().unwrap_or(&Value::Null);

        match self.operator {
            QueryOperator::IsNull => field.is_null(),
            QueryOperator::IsNotNull => !field.is_null(),
            QueryOperator::Eq if expected.is_null() => field.is_null(),
            QueryOperator::Ne if expected.is_null() => !field.is_null(),
            _ if field.is_null() => false,
            QueryOperator::Eq => values_equal(field, expected),
            QueryOperator::Ne => !values_equal(field, expected),
            QueryOperator::Gt => compare(field, expected) == Some(Ordering::Greater),
            QueryOperator::Gte => matches!(
                compare(field, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            QueryOperator::Lt => compare(field, expected) == Some(Ordering::Less),
            QueryOperator::Lte => matches!(
                compare(field, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            QueryOperator::In => in_list(field, expected),
            QueryOperator::NotIn => !in_list(field, expected),
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => compare(left, right) == Some(Ordering::Equal),
        _ => left == right,
    }
}

fn in_list(field: &Value, list: &Value) -> bool {
    match list {
        Value::Array(values) => values.iter().any(|v| values_equal(field, v)),
        _ => false,
    }
}

/// Ordering between two scalars of the same kind
pub(crate) fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
