//! Query executor for running search and count plans.
//!
//! The executor plans the criteria, renders SQL, hands the statements to a
//! [`QueryBackend`] and maps the returned rows onto [`SearchResult`]s.

use ordersearch_proto::{
    CustomerId, OrderId, OrderStatus, OrderSummary, PaymentStatus, SearchCriteria, SearchPage,
    SearchResult,
};
use tracing::{debug, instrument};

use crate::error::Error;
use crate::storage::{QueryBackend, Row};

use super::aggregate::alias;
use super::planner::QueryPlanner;
use super::sql::{render_count, render_search};
use super::value_codec::{
    decode_enum, decode_i64, decode_money, decode_name_set, decode_optional_enum, decode_string,
    decode_timestamp, decode_u64,
};

/// Query executor that runs criteria against a backend.
pub struct QueryExecutor<'a, B: QueryBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: QueryBackend + ?Sized> QueryExecutor<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// One page of matching orders, sorted and sliced as requested.
    ///
    /// Every eligible order appears at most once.
    #[instrument(skip_all, fields(offset = criteria.offset(), limit = criteria.limit()))]
    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<SearchResult>, Error> {
        let plan = QueryPlanner::plan_search(criteria);
        let statement = render_search(&plan);
        let rows = self.backend.fetch_rows(&statement)?;

        let results = rows
            .iter()
            .map(map_row)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(results = results.len(), "search complete");
        Ok(results)
    }

    /// Number of distinct orders matching the criteria's filters.
    ///
    /// Paging and sorting are ignored.
    #[instrument(skip_all)]
    pub fn count(&self, criteria: &SearchCriteria) -> Result<u64, Error> {
        let plan = QueryPlanner::plan_count(criteria);
        let statement = render_count(&plan);
        let total = self.backend.fetch_count(&statement)?;
        debug!(total, "count complete");
        Ok(total)
    }

    /// Search, optionally paired with the total match count.
    pub fn search_page(
        &self,
        criteria: &SearchCriteria,
        with_total: bool,
    ) -> Result<SearchPage, Error> {
        let results = self.search(criteria)?;
        let total = if with_total {
            Some(self.count(criteria)?)
        } else {
            None
        };

        Ok(SearchPage {
            results,
            offset: criteria.offset(),
            limit: criteria.limit(),
            total,
        })
    }
}

/// Map one grouped row onto a search result.
pub fn map_row(row: &Row) -> Result<SearchResult, Error> {
    let order = OrderSummary {
        id: OrderId(decode_i64(row, alias::ORDER_ID)?),
        customer_id: CustomerId(decode_i64(row, alias::CUSTOMER_ID)?),
        order_date: decode_timestamp(row, alias::ORDER_DATE)?,
        total_amount: decode_money(row, alias::TOTAL_AMOUNT)?,
        status: decode_enum::<OrderStatus>(row, alias::ORDER_STATUS)?,
    };

    Ok(SearchResult {
        order,
        customer_name: decode_string(row, alias::CUSTOMER_NAME)?,
        customer_email: decode_string(row, alias::CUSTOMER_EMAIL)?,
        item_count: decode_u64(row, alias::ITEM_COUNT)?,
        product_names: decode_name_set(row, alias::PRODUCT_NAMES)?,
        payment_status: decode_optional_enum::<PaymentStatus>(row, alias::PAYMENT_STATUS)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Statement;
    use crate::storage::Cell;
    use parking_lot::Mutex;

    /// Backend that records statements and replays canned rows.
    #[derive(Default)]
    struct RecordingBackend {
        rows: Vec<Row>,
        count: u64,
        seen: Mutex<Vec<String>>,
    }

    impl QueryBackend for RecordingBackend {
        fn fetch_rows(&self, statement: &Statement) -> Result<Vec<Row>, Error> {
            self.seen.lock().push(statement.sql.clone());
            Ok(self.rows.clone())
        }

        fn fetch_count(&self, statement: &Statement) -> Result<u64, Error> {
            self.seen.lock().push(statement.sql.clone());
            Ok(self.count)
        }
    }

    fn order_row(id: i64, status: &str, payment: Cell) -> Row {
        let cells = vec![
            (alias::ORDER_ID, Cell::Integer(id)),
            (alias::CUSTOMER_ID, Cell::Integer(1)),
            (alias::ORDER_DATE, Cell::Text("2024-01-15 10:30:00".into())),
            (alias::TOTAL_AMOUNT, Cell::Integer(105_000)),
            (alias::ORDER_STATUS, Cell::Text(status.into())),
            (alias::CUSTOMER_NAME, Cell::Text("John Doe".into())),
            (alias::CUSTOMER_EMAIL, Cell::Text("john@example.com".into())),
            (alias::PAYMENT_STATUS, payment),
            (alias::ITEM_COUNT, Cell::Integer(2)),
            (alias::PRODUCT_NAMES, Cell::Text(r#"["Laptop","Mouse"]"#.into())),
        ];
        Row::new(cells.into_iter().map(|(n, c)| (n.to_string(), c)).collect())
    }

    #[test]
    fn test_map_row() {
        let result = map_row(&order_row(1, "DELIVERED", Cell::Text("COMPLETED".into()))).unwrap();
        assert_eq!(result.order_id(), OrderId(1));
        assert_eq!(result.order.status, OrderStatus::Delivered);
        assert_eq!(result.order.total_amount.to_string(), "1050.00");
        assert_eq!(result.item_count, 2);
        assert!(result.product_names.contains("Laptop"));
        assert_eq!(result.payment_status, Some(PaymentStatus::Completed));
    }

    #[test]
    fn test_map_row_without_payment() {
        let result = map_row(&order_row(2, "PENDING", Cell::Null)).unwrap();
        assert_eq!(result.payment_status, None);
    }

    #[test]
    fn test_unknown_status_fails_the_search() {
        let backend = RecordingBackend {
            rows: vec![order_row(1, "ON_HOLD", Cell::Null)],
            ..Default::default()
        };
        let err = QueryExecutor::new(&backend)
            .search(&SearchCriteria::default())
            .unwrap_err();
        assert!(matches!(err, Error::Mapping { ref column, .. } if column == "order_status"));
    }

    #[test]
    fn test_search_page_runs_count_only_when_asked() {
        let backend = RecordingBackend {
            rows: vec![order_row(1, "DELIVERED", Cell::Null)],
            count: 3,
            ..Default::default()
        };
        let executor = QueryExecutor::new(&backend);
        let criteria = SearchCriteria::builder().limit(1).build().unwrap();

        let page = executor.search_page(&criteria, false).unwrap();
        assert_eq!(page.total, None);
        assert_eq!(backend.seen.lock().len(), 1);

        let page = executor.search_page(&criteria, true).unwrap();
        assert_eq!(page.total, Some(3));
        assert_eq!(page.limit, 1);
        assert_eq!(page.has_next(), Some(true));
        assert_eq!(backend.seen.lock().len(), 3);
    }
}
