//! Sort and pagination stage.

use ordersearch_proto::{Paging, SortDirection, SortField};

use super::predicate::Column;

/// Column that breaks ties between rows with an equal sort key.
pub const TIE_BREAK: Column = Column::OrderId;

/// Resolved ordering for the grouped rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Column,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self {
            column: sort_column(field),
            direction,
        }
    }

    /// ORDER BY terms: the requested key, then order id ascending.
    pub fn terms(&self) -> Vec<(Column, SortDirection)> {
        let mut terms = vec![(self.column, self.direction)];
        if self.column != TIE_BREAK {
            terms.push((TIE_BREAK, SortDirection::Asc));
        }
        terms
    }
}

/// Map a sort field to the join-qualified column it orders by.
pub fn sort_column(field: SortField) -> Column {
    match field {
        SortField::OrderDate => Column::OrderDate,
        SortField::TotalAmount => Column::OrderTotal,
        SortField::CustomerName => Column::CustomerName,
        SortField::OrderStatus => Column::OrderStatus,
    }
}

/// Offset/limit applied to grouped rows, one per order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u32,
}

impl From<Paging> for Window {
    fn from(paging: Paging) -> Self {
        Self {
            offset: paging.offset(),
            limit: paging.limit(),
        }
    }
}
