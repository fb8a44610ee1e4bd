//! Predicate compilation.
//!
//! This module turns a [`SearchCriteria`] into a flat, ordered list of
//! [`Predicate`]s. Each predicate is bound to one [`Column`], and through it
//! to the [`Relation`] it constrains. Compilation knows nothing about join
//! shape; the join planner and SQL emitter decide where each predicate lands.

use std::collections::BTreeSet;
use std::fmt;

use ordersearch_proto::{SearchCriteria, Value};

/// Logical relation a predicate or projected column belongs to.
///
/// `Product` covers both order items and the products they reference, since
/// product columns are only reachable through an order's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relation {
    Order,
    Customer,
    Product,
    Payment,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Relation::Order => "order",
            Relation::Customer => "customer",
            Relation::Product => "order_item/product",
            Relation::Payment => "payment",
        };
        f.write_str(name)
    }
}

/// Physical table with its alias in the main query and in filter subqueries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Orders,
    Customers,
    OrderItems,
    Products,
    Payments,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Orders => "orders",
            Table::Customers => "customers",
            Table::OrderItems => "order_items",
            Table::Products => "products",
            Table::Payments => "payments",
        }
    }

    /// Alias used in the outer search and count queries.
    pub fn alias(&self) -> &'static str {
        match self {
            Table::Orders => "o",
            Table::Customers => "c",
            Table::OrderItems => "oi",
            Table::Products => "p",
            Table::Payments => "pay",
        }
    }

    /// Alias used inside a correlated filter subquery.
    pub fn filter_alias(&self) -> &'static str {
        match self {
            Table::OrderItems => "fi",
            Table::Products => "fp",
            other => other.alias(),
        }
    }

    pub fn relation(&self) -> Relation {
        match self {
            Table::Orders => Relation::Order,
            Table::Customers => Relation::Customer,
            Table::OrderItems | Table::Products => Relation::Product,
            Table::Payments => Relation::Payment,
        }
    }
}

/// A column that can be filtered, projected, grouped, or sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    OrderId,
    OrderCustomerId,
    OrderDate,
    OrderTotal,
    OrderStatus,
    CustomerName,
    CustomerEmail,
    CustomerAddress,
    CustomerRegisteredAt,
    ItemId,
    ProductName,
    ProductCategory,
    ProductPrice,
    PaymentMethod,
    PaymentStatus,
    PaymentDate,
}

impl Column {
    pub fn table(&self) -> Table {
        match self {
            Column::OrderId
            | Column::OrderCustomerId
            | Column::OrderDate
            | Column::OrderTotal
            | Column::OrderStatus => Table::Orders,
            Column::CustomerName
            | Column::CustomerEmail
            | Column::CustomerAddress
            | Column::CustomerRegisteredAt => Table::Customers,
            Column::ItemId => Table::OrderItems,
            Column::ProductName | Column::ProductCategory | Column::ProductPrice => Table::Products,
            Column::PaymentMethod | Column::PaymentStatus | Column::PaymentDate => Table::Payments,
        }
    }

    pub fn relation(&self) -> Relation {
        self.table().relation()
    }

    /// Unqualified column name.
    pub fn name(&self) -> &'static str {
        match self {
            Column::OrderId => "id",
            Column::OrderCustomerId => "customer_id",
            Column::OrderDate => "order_date",
            Column::OrderTotal => "total_amount",
            Column::OrderStatus => "status",
            Column::CustomerName => "name",
            Column::CustomerEmail => "email",
            Column::CustomerAddress => "address",
            Column::CustomerRegisteredAt => "registered_at",
            Column::ItemId => "id",
            Column::ProductName => "name",
            Column::ProductCategory => "category",
            Column::ProductPrice => "price",
            Column::PaymentMethod => "method",
            Column::PaymentStatus => "status",
            Column::PaymentDate => "payment_date",
        }
    }

    /// Alias-qualified name in the outer query, e.g. `o.order_date`.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table().alias(), self.name())
    }

    /// Alias-qualified name inside a filter subquery.
    pub fn filter_qualified(&self) -> String {
        format!("{}.{}", self.table().filter_alias(), self.name())
    }
}

/// One compiled boolean condition on a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Inclusive lower bound.
    AtLeast { column: Column, value: Value },
    /// Inclusive upper bound.
    AtMost { column: Column, value: Value },
    /// Case-insensitive substring containment.
    Contains { column: Column, needle: String },
    /// Exact equality.
    Equals { column: Column, value: Value },
    /// Set membership. Never constructed with an empty set.
    OneOf { column: Column, values: Vec<Value> },
}

impl Predicate {
    pub fn column(&self) -> Column {
        match self {
            Predicate::AtLeast { column, .. }
            | Predicate::AtMost { column, .. }
            | Predicate::Contains { column, .. }
            | Predicate::Equals { column, .. }
            | Predicate::OneOf { column, .. } => *column,
        }
    }

    pub fn relation(&self) -> Relation {
        self.column().relation()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::AtLeast { column, value } => {
                write!(f, "{} >= {}", column.qualified(), display_value(value))
            }
            Predicate::AtMost { column, value } => {
                write!(f, "{} <= {}", column.qualified(), display_value(value))
            }
            Predicate::Contains { column, needle } => {
                write!(f, "{} contains '{}' (ignore case)", column.qualified(), needle)
            }
            Predicate::Equals { column, value } => {
                write!(f, "{} = {}", column.qualified(), display_value(value))
            }
            Predicate::OneOf { column, values } => {
                let rendered: Vec<String> = values.iter().map(display_value).collect();
                write!(f, "{} in ({})", column.qualified(), rendered.join(", "))
            }
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Int64(v) => v.to_string(),
        Value::String(s) => format!("'{}'", s),
        Value::Money(m) => m.to_string(),
        Value::Timestamp(ts) => ts.to_string(),
        Value::Date(d) => d.to_string(),
    }
}

/// Ordered predicates combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter()
    }

    /// Predicates constraining one relation, in compilation order.
    pub fn for_relation(&self, relation: Relation) -> impl Iterator<Item = &Predicate> {
        self.predicates
            .iter()
            .filter(move |p| p.relation() == relation)
    }

    /// Relations constrained by at least one predicate.
    pub fn relations(&self) -> BTreeSet<Relation> {
        self.predicates.iter().map(Predicate::relation).collect()
    }

    pub fn constrains(&self, relation: Relation) -> bool {
        self.predicates.iter().any(|p| p.relation() == relation)
    }
}

impl FromIterator<Predicate> for PredicateSet {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Self {
            predicates: iter.into_iter().collect(),
        }
    }
}

fn range<T: Into<Value> + Clone>(
    column: Column,
    lower: Option<&T>,
    upper: Option<&T>,
) -> impl Iterator<Item = Predicate> {
    let lower = lower.map(|v| Predicate::AtLeast {
        column,
        value: v.clone().into(),
    });
    let upper = upper.map(|v| Predicate::AtMost {
        column,
        value: v.clone().into(),
    });
    lower.into_iter().chain(upper)
}

fn contains(column: Column, needle: Option<&String>) -> Option<Predicate> {
    needle.map(|n| Predicate::Contains {
        column,
        needle: n.clone(),
    })
}

fn one_of<'a, T>(column: Column, set: impl IntoIterator<Item = &'a T>) -> Option<Predicate>
where
    T: Into<Value> + Copy + 'a,
{
    let values: Vec<Value> = set.into_iter().map(|v| (*v).into()).collect();
    if values.is_empty() {
        None
    } else {
        Some(Predicate::OneOf { column, values })
    }
}

/// Compile every present filter of `criteria` into a predicate.
///
/// Order of the output is fixed: order, customer, product, payment groups,
/// each in field order. Absent fields and empty sets produce nothing.
pub fn compile(criteria: &SearchCriteria) -> PredicateSet {
    let order = criteria.order();
    let customer = criteria.customer();
    let product = criteria.product();
    let payment = criteria.payment();

    let mut predicates = Vec::new();

    predicates.extend(range(
        Column::OrderDate,
        order.date_from.as_ref(),
        order.date_to.as_ref(),
    ));
    predicates.extend(range(
        Column::OrderTotal,
        order.min_total.as_ref(),
        order.max_total.as_ref(),
    ));
    predicates.extend(one_of(Column::OrderStatus, &order.statuses));

    predicates.extend(contains(Column::CustomerName, customer.name.as_ref()));
    predicates.extend(contains(Column::CustomerEmail, customer.email.as_ref()));
    predicates.extend(contains(Column::CustomerAddress, customer.address.as_ref()));
    predicates.extend(range(
        Column::CustomerRegisteredAt,
        customer.registered_from.as_ref(),
        customer.registered_to.as_ref(),
    ));

    predicates.extend(contains(Column::ProductName, product.name.as_ref()));
    predicates.extend(product.category.as_ref().map(|category| Predicate::Equals {
        column: Column::ProductCategory,
        value: Value::String(category.clone()),
    }));
    predicates.extend(range(
        Column::ProductPrice,
        product.min_price.as_ref(),
        product.max_price.as_ref(),
    ));

    predicates.extend(one_of(Column::PaymentMethod, &payment.methods));
    predicates.extend(one_of(Column::PaymentStatus, &payment.statuses));
    predicates.extend(range(
        Column::PaymentDate,
        payment.date_from.as_ref(),
        payment.date_to.as_ref(),
    ));

    PredicateSet { predicates }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ordersearch_proto::{Money, OrderStatus, PaymentMethod, PaymentStatus};

    #[test]
    fn test_no_filters_compile_to_nothing() {
        let set = compile(&SearchCriteria::default());
        assert!(set.is_empty());
        assert!(set.relations().is_empty());
    }

    #[test]
    fn test_open_range_compiles_one_side() {
        let criteria = SearchCriteria::builder()
            .min_total_amount("100".parse().unwrap())
            .build()
            .unwrap();
        let set = compile(&criteria);
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.iter().next(),
            Some(&Predicate::AtLeast {
                column: Column::OrderTotal,
                value: Value::Money("100".parse::<Money>().unwrap()),
            })
        );
    }

    #[test]
    fn test_closed_range_is_inclusive_pair() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let criteria = SearchCriteria::builder()
            .customer_registered_from(from)
            .customer_registered_to(to)
            .build()
            .unwrap();
        let predicates: Vec<_> = compile(&criteria).iter().cloned().collect();
        assert_eq!(
            predicates,
            vec![
                Predicate::AtLeast {
                    column: Column::CustomerRegisteredAt,
                    value: Value::Date(from),
                },
                Predicate::AtMost {
                    column: Column::CustomerRegisteredAt,
                    value: Value::Date(to),
                },
            ]
        );
    }

    #[test]
    fn test_text_filters_are_substring_except_category() {
        let criteria = SearchCriteria::builder()
            .customer_email("example.com")
            .product_name("lap")
            .product_category("Electronics")
            .build()
            .unwrap();
        let predicates: Vec<_> = compile(&criteria).iter().cloned().collect();
        assert_eq!(
            predicates,
            vec![
                Predicate::Contains {
                    column: Column::CustomerEmail,
                    needle: "example.com".into(),
                },
                Predicate::Contains {
                    column: Column::ProductName,
                    needle: "lap".into(),
                },
                Predicate::Equals {
                    column: Column::ProductCategory,
                    value: Value::String("Electronics".into()),
                },
            ]
        );
    }

    #[test]
    fn test_sets_compile_to_membership() {
        let criteria = SearchCriteria::builder()
            .order_statuses([OrderStatus::Shipped, OrderStatus::Delivered])
            .payment_methods([PaymentMethod::Paypal])
            .build()
            .unwrap();
        let set = compile(&criteria);
        let statuses = set.for_relation(Relation::Order).next().unwrap();
        assert_eq!(
            statuses,
            &Predicate::OneOf {
                column: Column::OrderStatus,
                values: vec!["SHIPPED".into(), "DELIVERED".into()],
            }
        );
        assert!(set.constrains(Relation::Payment));
        assert!(!set.constrains(Relation::Customer));
    }

    #[test]
    fn test_relations_are_tagged() {
        let criteria = SearchCriteria::builder()
            .customer_name("John")
            .min_product_price(Money::from_cents(1_000).unwrap())
            .payment_statuses([PaymentStatus::Completed])
            .build()
            .unwrap();
        let relations: Vec<_> = compile(&criteria).relations().into_iter().collect();
        assert_eq!(
            relations,
            vec![Relation::Customer, Relation::Product, Relation::Payment]
        );
    }

    #[test]
    fn test_display() {
        let predicate = Predicate::OneOf {
            column: Column::PaymentStatus,
            values: vec!["COMPLETED".into()],
        };
        assert_eq!(predicate.to_string(), "pay.status in ('COMPLETED')");

        let predicate = Predicate::Contains {
            column: Column::CustomerName,
            needle: "John".into(),
        };
        assert_eq!(predicate.to_string(), "c.name contains 'John' (ignore case)");
    }

    #[test]
    fn test_column_qualification() {
        assert_eq!(Column::OrderDate.qualified(), "o.order_date");
        assert_eq!(Column::ProductName.qualified(), "p.name");
        assert_eq!(Column::ProductName.filter_qualified(), "fp.name");
        assert_eq!(Column::ItemId.filter_qualified(), "fi.id");
        assert_eq!(Column::PaymentDate.qualified(), "pay.payment_date");
    }
}
