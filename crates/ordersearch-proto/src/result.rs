//! Search result types.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{CustomerId, OrderId, OrderStatus, PaymentStatus};

/// Scalar columns of an order row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: NaiveDateTime,
    pub total_amount: Money,
    pub status: OrderStatus,
}

/// One matched order with its derived aggregate columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub order: OrderSummary,
    pub customer_name: String,
    pub customer_email: String,
    /// Number of item rows belonging to the order.
    pub item_count: u64,
    /// Distinct product names across the order's items.
    pub product_names: BTreeSet<String>,
    /// `None` when the order has no payment row.
    pub payment_status: Option<PaymentStatus>,
}

impl SearchResult {
    pub fn order_id(&self) -> OrderId {
        self.order.id
    }
}

/// A page of results plus, when requested, the total match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub offset: u64,
    pub limit: u32,
    /// Total number of matching orders across all pages.
    pub total: Option<u64>,
}

impl SearchPage {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether another page exists after this one. Unknown without a total.
    pub fn has_next(&self) -> Option<bool> {
        self.total
            .map(|total| self.offset + (self.results.len() as u64) < total)
    }
}
