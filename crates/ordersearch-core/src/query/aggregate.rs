//! Grouped projection for search queries.
//!
//! The projection lists one output column per [`SelectItem`]. The GROUP BY
//! key is derived from the projection itself: every non-aggregated item is a
//! key column, so a projected scalar can never be left out of the grouping.

use std::collections::BTreeSet;

use super::predicate::{Column, Relation};

/// Output column aliases shared by the SQL emitter and the row mapper.
pub mod alias {
    pub const ORDER_ID: &str = "order_id";
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const ORDER_DATE: &str = "order_date";
    pub const TOTAL_AMOUNT: &str = "total_amount";
    pub const ORDER_STATUS: &str = "order_status";
    pub const CUSTOMER_NAME: &str = "customer_name";
    pub const CUSTOMER_EMAIL: &str = "customer_email";
    pub const PAYMENT_STATUS: &str = "payment_status";
    pub const ITEM_COUNT: &str = "item_count";
    pub const PRODUCT_NAMES: &str = "product_names";
}

/// Expression producing one output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectExpr {
    /// Plain column; part of the group key.
    Column(Column),
    /// Count of non-null values of the column within the group.
    Count(Column),
    /// Distinct non-null values of the column, collected as a sequence.
    CollectDistinct(Column),
}

impl SelectExpr {
    pub fn column(&self) -> Column {
        match self {
            SelectExpr::Column(c) | SelectExpr::Count(c) | SelectExpr::CollectDistinct(c) => *c,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        !matches!(self, SelectExpr::Column(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectItem {
    pub expr: SelectExpr,
    pub alias: &'static str,
}

/// Ordered list of output columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    items: Vec<SelectItem>,
}

impl Projection {
    /// Projection of a search result row: order scalars, customer name and
    /// email, payment status, item count, and distinct product names.
    pub fn search_result() -> Self {
        Self {
            items: vec![
                scalar(Column::OrderId, alias::ORDER_ID),
                scalar(Column::OrderCustomerId, alias::CUSTOMER_ID),
                scalar(Column::OrderDate, alias::ORDER_DATE),
                scalar(Column::OrderTotal, alias::TOTAL_AMOUNT),
                scalar(Column::OrderStatus, alias::ORDER_STATUS),
                scalar(Column::CustomerName, alias::CUSTOMER_NAME),
                scalar(Column::CustomerEmail, alias::CUSTOMER_EMAIL),
                scalar(Column::PaymentStatus, alias::PAYMENT_STATUS),
                SelectItem {
                    expr: SelectExpr::Count(Column::ItemId),
                    alias: alias::ITEM_COUNT,
                },
                SelectItem {
                    expr: SelectExpr::CollectDistinct(Column::ProductName),
                    alias: alias::PRODUCT_NAMES,
                },
            ],
        }
    }

    pub fn items(&self) -> &[SelectItem] {
        &self.items
    }

    /// Non-aggregated columns, in projection order.
    pub fn group_key(&self) -> Vec<Column> {
        self.items
            .iter()
            .filter(|item| !item.expr.is_aggregate())
            .map(|item| item.expr.column())
            .collect()
    }

    /// Relations whose columns appear in the projection.
    pub fn relations(&self) -> BTreeSet<Relation> {
        self.items
            .iter()
            .map(|item| item.expr.column().relation())
            .collect()
    }

    pub fn has_aggregates(&self) -> bool {
        self.items.iter().any(|item| item.expr.is_aggregate())
    }
}

fn scalar(column: Column, alias: &'static str) -> SelectItem {
    SelectItem {
        expr: SelectExpr::Column(column),
        alias,
    }
}
