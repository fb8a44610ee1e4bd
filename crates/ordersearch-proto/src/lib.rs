//! ordersearch request and response types.
//!
//! This crate defines the values exchanged with the search engine in
//! `ordersearch-core`: the validated [`SearchCriteria`], the domain value
//! types it filters on, and the [`SearchResult`] rows it produces.
//!
//! # Modules
//!
//! - [`criteria`] - Search criteria, filter groups, paging and sorting
//! - [`types`] - Identifiers and persisted enumerations
//! - [`money`] - Two-scale money amounts
//! - [`value`] - Typed operands bound into compiled predicates
//! - [`result`] - Search result rows and pages
//! - [`error`] - Validation errors

pub mod criteria;
pub mod error;
pub mod money;
pub mod result;
pub mod types;
pub mod value;

pub use criteria::{
    CustomerFilter, OrderFilter, Paging, PaymentFilter, ProductFilter, SearchCriteria,
    SearchCriteriaBuilder, SortDirection, SortField, DEFAULT_LIMIT, DEFAULT_OFFSET, MAX_LIMIT,
};
pub use error::{ParseEnumError, ValidationError};
pub use money::Money;
pub use result::{OrderSummary, SearchPage, SearchResult};
pub use types::{CustomerId, OrderId, OrderStatus, PaymentMethod, PaymentStatus};
pub use value::Value;
