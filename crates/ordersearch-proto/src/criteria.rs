//! Search criteria model.
//!
//! A [`SearchCriteria`] carries optional filters grouped by the entity that
//! owns the filtered column, plus mandatory paging and sorting values. It is
//! immutable once built; invalid paging values are rejected by the builder so
//! they never reach the query compiler.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ParseEnumError, ValidationError};
use crate::money::Money;
use crate::types::{OrderStatus, PaymentMethod, PaymentStatus};

/// Offset used when none is given.
pub const DEFAULT_OFFSET: i64 = 0;

/// Page size used when none is given.
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest accepted page size.
pub const MAX_LIMIT: i64 = 1000;

/// Column the grouped result set is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortField {
    #[default]
    OrderDate,
    TotalAmount,
    CustomerName,
    OrderStatus,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    #[default]
    Desc,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::OrderDate => "ORDER_DATE",
            SortField::TotalAmount => "TOTAL_AMOUNT",
            SortField::CustomerName => "CUSTOMER_NAME",
            SortField::OrderStatus => "ORDER_STATUS",
        }
    }
}

impl FromStr for SortField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ORDER_DATE" => Ok(SortField::OrderDate),
            "TOTAL_AMOUNT" => Ok(SortField::TotalAmount),
            "CUSTOMER_NAME" => Ok(SortField::CustomerName),
            "ORDER_STATUS" => Ok(SortField::OrderStatus),
            _ => Err(ParseEnumError::new("sort field", s)),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(ParseEnumError::new("sort direction", s)),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters on the order row itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderFilter {
    pub date_from: Option<NaiveDateTime>,
    pub date_to: Option<NaiveDateTime>,
    pub min_total: Option<Money>,
    pub max_total: Option<Money>,
    /// Empty means no status filter.
    pub statuses: BTreeSet<OrderStatus>,
}

impl OrderFilter {
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.min_total.is_none()
            && self.max_total.is_none()
            && self.statuses.is_empty()
    }
}

/// Filters on the owning customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub registered_from: Option<NaiveDate>,
    pub registered_to: Option<NaiveDate>,
}

impl CustomerFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.registered_from.is_none()
            && self.registered_to.is_none()
    }
}

/// Filters on products reached through the order's items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductFilter {
    pub name: Option<String>,
    /// Matched exactly, case included.
    pub category: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}

/// Filters on the order's payment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentFilter {
    pub methods: BTreeSet<PaymentMethod>,
    pub statuses: BTreeSet<PaymentStatus>,
    pub date_from: Option<NaiveDateTime>,
    pub date_to: Option<NaiveDateTime>,
}

impl PaymentFilter {
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
            && self.statuses.is_empty()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }
}

/// Validated offset/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paging {
    offset: u64,
    limit: u32,
}

impl Paging {
    /// Validate an offset and limit.
    pub fn new(offset: i64, limit: i64) -> Result<Self, ValidationError> {
        if offset < 0 {
            return Err(ValidationError::NegativeOffset(offset));
        }
        if limit <= 0 || limit > MAX_LIMIT {
            return Err(ValidationError::LimitOutOfRange {
                limit,
                max: MAX_LIMIT,
            });
        }
        Ok(Self {
            offset: offset as u64,
            limit: limit as u32,
        })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET as u64,
            limit: DEFAULT_LIMIT as u32,
        }
    }
}

/// Immutable search request over orders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchCriteria {
    order: OrderFilter,
    customer: CustomerFilter,
    product: ProductFilter,
    payment: PaymentFilter,
    paging: Paging,
    sort_by: SortField,
    sort_direction: SortDirection,
}

impl SearchCriteria {
    /// Start building a criteria with default paging and sorting.
    pub fn builder() -> SearchCriteriaBuilder {
        SearchCriteriaBuilder::default()
    }

    pub fn order(&self) -> &OrderFilter {
        &self.order
    }

    pub fn customer(&self) -> &CustomerFilter {
        &self.customer
    }

    pub fn product(&self) -> &ProductFilter {
        &self.product
    }

    pub fn payment(&self) -> &PaymentFilter {
        &self.payment
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    pub fn offset(&self) -> u64 {
        self.paging.offset
    }

    pub fn limit(&self) -> u32 {
        self.paging.limit
    }

    pub fn sort_by(&self) -> SortField {
        self.sort_by
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// Whether any optional filter is set. Paging and sorting are ignored.
    pub fn has_any_filter(&self) -> bool {
        !(self.order.is_empty()
            && self.customer.is_empty()
            && self.product.is_empty()
            && self.payment.is_empty())
    }

    /// Copy of this criteria with different paging; filters and sort stay.
    pub fn with_paging(&self, paging: Paging) -> Self {
        Self {
            paging,
            ..self.clone()
        }
    }
}

/// Builder for [`SearchCriteria`].
///
/// Text filters are trimmed; a blank text filter is treated as absent.
#[derive(Debug, Clone)]
pub struct SearchCriteriaBuilder {
    order: OrderFilter,
    customer: CustomerFilter,
    product: ProductFilter,
    payment: PaymentFilter,
    offset: i64,
    limit: i64,
    sort_by: SortField,
    sort_direction: SortDirection,
}

impl Default for SearchCriteriaBuilder {
    fn default() -> Self {
        Self {
            order: OrderFilter::default(),
            customer: CustomerFilter::default(),
            product: ProductFilter::default(),
            payment: PaymentFilter::default(),
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
            sort_by: SortField::default(),
            sort_direction: SortDirection::default(),
        }
    }
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl SearchCriteriaBuilder {
    pub fn order_date_from(mut self, from: NaiveDateTime) -> Self {
        self.order.date_from = Some(from);
        self
    }

    pub fn order_date_to(mut self, to: NaiveDateTime) -> Self {
        self.order.date_to = Some(to);
        self
    }

    pub fn min_total_amount(mut self, amount: Money) -> Self {
        self.order.min_total = Some(amount);
        self
    }

    pub fn max_total_amount(mut self, amount: Money) -> Self {
        self.order.max_total = Some(amount);
        self
    }

    pub fn order_statuses(mut self, statuses: impl IntoIterator<Item = OrderStatus>) -> Self {
        self.order.statuses = statuses.into_iter().collect();
        self
    }

    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer.name = non_blank(name);
        self
    }

    pub fn customer_email(mut self, email: impl Into<String>) -> Self {
        self.customer.email = non_blank(email);
        self
    }

    pub fn customer_address(mut self, address: impl Into<String>) -> Self {
        self.customer.address = non_blank(address);
        self
    }

    pub fn customer_registered_from(mut self, from: NaiveDate) -> Self {
        self.customer.registered_from = Some(from);
        self
    }

    pub fn customer_registered_to(mut self, to: NaiveDate) -> Self {
        self.customer.registered_to = Some(to);
        self
    }

    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.product.name = non_blank(name);
        self
    }

    pub fn product_category(mut self, category: impl Into<String>) -> Self {
        self.product.category = non_blank(category);
        self
    }

    pub fn min_product_price(mut self, price: Money) -> Self {
        self.product.min_price = Some(price);
        self
    }

    pub fn max_product_price(mut self, price: Money) -> Self {
        self.product.max_price = Some(price);
        self
    }

    pub fn payment_methods(mut self, methods: impl IntoIterator<Item = PaymentMethod>) -> Self {
        self.payment.methods = methods.into_iter().collect();
        self
    }

    pub fn payment_statuses(mut self, statuses: impl IntoIterator<Item = PaymentStatus>) -> Self {
        self.payment.statuses = statuses.into_iter().collect();
        self
    }

    pub fn payment_date_from(mut self, from: NaiveDateTime) -> Self {
        self.payment.date_from = Some(from);
        self
    }

    pub fn payment_date_to(mut self, to: NaiveDateTime) -> Self {
        self.payment.date_to = Some(to);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn sort_by(mut self, field: SortField) -> Self {
        self.sort_by = field;
        self
    }

    pub fn sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = direction;
        self
    }

    /// Validate paging and produce the criteria.
    pub fn build(self) -> Result<SearchCriteria, ValidationError> {
        let paging = Paging::new(self.offset, self.limit)?;
        Ok(SearchCriteria {
            order: self.order,
            customer: self.customer,
            product: self.product,
            payment: self.payment,
            paging,
            sort_by: self.sort_by,
            sort_direction: self.sort_direction,
        })
    }
}
