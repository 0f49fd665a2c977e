//! Row filters understood by both repository engines.
//!
//! A [`Query`] is evaluated client-side by the mock engine
//! ([`Query::apply`]) and rendered to PostgREST parameters by the remote
//! engine ([`Query::to_params`]), so the same query yields the same rows
//! on either backend.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::{Number, Value};

/// Comparison applied to one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    IsNull,
    NotNull,
}

impl FilterOp {
    fn operator(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::In => "in",
            FilterOp::IsNull => "is",
            FilterOp::NotNull => "not.is",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    /// Operand; an array for [`FilterOp::In`], `Null` for the null checks.
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Filter, ordering and limit for `find_all`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<Filter>,
    order: Vec<Order>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn filter(mut self, column: impl Into<String>, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op,
            value,
        });
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value.into())
    }

    pub fn neq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Neq, value.into())
    }

    pub fn gt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gt, value.into())
    }

    pub fn gte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gte, value.into())
    }

    pub fn lt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lt, value.into())
    }

    pub fn lte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lte, value.into())
    }

    /// Column value is one of `values`.
    pub fn in_list<I, V>(self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.filter(column, FilterOp::In, Value::Array(values))
    }

    pub fn is_null(self, column: impl Into<String>) -> Self {
        self.filter(column, FilterOp::IsNull, Value::Null)
    }

    pub fn not_null(self, column: impl Into<String>) -> Self {
        self.filter(column, FilterOp::NotNull, Value::Null)
    }

    /// Add a sort key. Earlier keys take precedence.
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order.push(Order {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> &[Order] {
        &self.order
    }

    pub fn max_rows(&self) -> Option<usize> {
        self.limit
    }

    /// Whether `row` passes every filter.
    ///
    /// Comparisons follow SQL semantics: a missing or `null` column never
    /// satisfies a comparison, only `is_null`.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|filter| {
            let field = row.get(&filter.column).unwrap_or(&Value::Null);
            match filter.op {
                FilterOp::IsNull => field.is_null(),
                FilterOp::NotNull => !field.is_null(),
                _ if field.is_null() => false,
                FilterOp::Eq => compare(field, &filter.value) == Some(Ordering::Equal),
                FilterOp::Neq => matches!(
                    compare(field, &filter.value),
                    Some(Ordering::Less | Ordering::Greater)
                ),
                FilterOp::Gt => compare(field, &filter.value) == Some(Ordering::Greater),
                FilterOp::Gte => matches!(
                    compare(field, &filter.value),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                FilterOp::Lt => compare(field, &filter.value) == Some(Ordering::Less),
                FilterOp::Lte => matches!(
                    compare(field, &filter.value),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                FilterOp::In => filter.value.as_array().is_some_and(|options| {
                    options
                        .iter()
                        .any(|option| compare(field, option) == Some(Ordering::Equal))
                }),
            }
        })
    }

    /// Filter, sort (stable) and truncate `rows`.
    pub fn apply(&self, rows: Vec<Value>) -> Vec<Value> {
        let mut rows: Vec<Value> = rows.into_iter().filter(|row| self.matches(row)).collect();

        if !self.order.is_empty() {
            rows.sort_by(|a, b| {
                self.order
                    .iter()
                    .map(|key| order_rows(a, b, key))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
        }

        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }

    /// PostgREST query parameters, e.g. `("household_id", "eq.h1")`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|filter| {
                let operand = match filter.op {
                    FilterOp::IsNull | FilterOp::NotNull => "null".to_string(),
                    FilterOp::In => {
                        let items = filter
                            .value
                            .as_array()
                            .map(|items| items.iter().map(quoted).collect::<Vec<_>>())
                            .unwrap_or_default();
                        format!("({})", items.join(","))
                    }
                    _ => plain(&filter.value),
                };
                (
                    filter.column.clone(),
                    format!("{}.{}", filter.op.operator(), operand),
                )
            })
            .collect();

        if !self.order.is_empty() {
            let keys = self
                .order
                .iter()
                .map(|key| match key.direction {
                    Direction::Asc => format!("{}.asc", key.column),
                    Direction::Desc => format!("{}.desc", key.column),
                })
                .collect::<Vec<_>>();
            params.push(("order".to_string(), keys.join(",")));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Order two rows by one key. Nulls sort last ascending, first descending.
fn order_rows(a: &Value, b: &Value, key: &Order) -> Ordering {
    let left = a.get(&key.column).unwrap_or(&Value::Null);
    let right = b.get(&key.column).unwrap_or(&Value::Null);
    let ordering = match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare(left, right).unwrap_or(Ordering::Equal),
    };
    match key.direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

/// Compare two non-null JSON scalars. `None` when they are not comparable.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => match (timestamp(a), timestamp(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => Some(a.cmp(b)),
        },
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        // Numbers stored as text, e.g. a numeric column compared to "3"
        (Value::String(a), Value::Number(b)) => compare_numbers(&a.parse().ok()?, b),
        (Value::Number(a), Value::String(b)) => compare_numbers(a, &b.parse().ok()?),
        _ => None,
    }
}

/// Exact for two integers; floats only when either side is fractional.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return Some(a.cmp(&b));
    }
    if a.is_f64() || b.is_f64() {
        return a.as_f64()?.partial_cmp(&b.as_f64()?);
    }
    // One negative i64 against a u64 above i64::MAX
    Some(if a.as_i64().is_some() {
        Ordering::Less
    } else {
        Ordering::Greater
    })
}

fn timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text).ok()
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn quoted(value: &Value) -> String {
    match value {
        Value::String(text) => format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\"")),
        other => other.to_string(),
    }
}
