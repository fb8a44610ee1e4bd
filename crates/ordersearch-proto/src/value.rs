//! Typed values bound into compiled predicates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{OrderStatus, PaymentMethod, PaymentStatus};

/// A typed comparison operand.
///
/// Values keep their domain type until the store adapter encodes them, so a
/// compiled predicate can be inspected and tested without a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer.
    Int64(i64),
    /// UTF-8 text.
    String(String),
    /// Monetary amount.
    Money(Money),
    /// Date and time without zone.
    Timestamp(NaiveDateTime),
    /// Calendar date.
    Date(NaiveDate),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Money> for Value {
    fn from(v: Money) -> Self {
        Value::Money(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<OrderStatus> for Value {
    fn from(v: OrderStatus) -> Self {
        Value::String(v.as_str().to_string())
    }
}

impl From<PaymentMethod> for Value {
    fn from(v: PaymentMethod) -> Self {
        Value::String(v.as_str().to_string())
    }
}

impl From<PaymentStatus> for Value {
    fn from(v: PaymentStatus) -> Self {
        Value::String(v.as_str().to_string())
    }
}
