//! Join planning.
//!
//! The join graph is described declaratively, as a list of [`JoinStep`]s
//! (relation plus join kind), before any SQL is emitted. Join kinds are fixed
//! per relation so that whether an order without items or without a payment
//! appears is decided by filtering, never by the join itself.

use std::collections::BTreeSet;
use std::fmt;

use super::predicate::{PredicateSet, Relation};

/// How a relation is attached to the order rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// Row must exist on both sides.
    Inner,
    /// Order rows are kept when the right side is missing; right columns are NULL.
    Left,
    /// Correlated semi-join: filters orders without adding rows.
    Exists,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Exists => "EXISTS",
        };
        f.write_str(name)
    }
}

/// One edge of the join graph, rooted at the order relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinStep {
    pub relation: Relation,
    pub kind: JoinKind,
}

impl JoinStep {
    fn new(relation: Relation, kind: JoinKind) -> Self {
        Self { relation, kind }
    }
}

/// Join graph for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPlan {
    steps: Vec<JoinStep>,
}

impl JoinPlan {
    /// Plan joins from the relations filtered on and the relations projected.
    ///
    /// - Customer is always an inner join; every order has exactly one.
    /// - Items/products needed by the projection are left-joined, so orders
    ///   with no items keep an item count of zero.
    /// - Product filters become a semi-join, keeping the aggregation join
    ///   over every item of an eligible order.
    /// - Payment is left-joined whenever it is projected or filtered on. A
    ///   payment filter is applied to the nullable columns in WHERE, which
    ///   drops unpaid orders only when such a filter is present.
    pub fn plan(predicates: &PredicateSet, projected: &BTreeSet<Relation>) -> Self {
        let mut steps = vec![JoinStep::new(Relation::Customer, JoinKind::Inner)];

        if projected.contains(&Relation::Product) {
            steps.push(JoinStep::new(Relation::Product, JoinKind::Left));
        }
        if projected.contains(&Relation::Payment) || predicates.constrains(Relation::Payment) {
            steps.push(JoinStep::new(Relation::Payment, JoinKind::Left));
        }
        if predicates.constrains(Relation::Product) {
            steps.push(JoinStep::new(Relation::Product, JoinKind::Exists));
        }

        Self { steps }
    }

    pub fn steps(&self) -> &[JoinStep] {
        &self.steps
    }

    /// Steps that add columns to the row set, in emission order.
    pub fn row_joins(&self) -> impl Iterator<Item = &JoinStep> {
        self.steps.iter().filter(|s| s.kind != JoinKind::Exists)
    }

    pub fn has(&self, relation: Relation, kind: JoinKind) -> bool {
        self.steps
            .iter()
            .any(|s| s.relation == relation && s.kind == kind)
    }

    /// Whether `relation` contributes columns to the row set.
    pub fn joins(&self, relation: Relation) -> bool {
        self.row_joins().any(|s| s.relation == relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::predicate::compile;
    use ordersearch_proto::{PaymentStatus, SearchCriteria};

    fn all_projected() -> BTreeSet<Relation> {
        [Relation::Order, Relation::Customer, Relation::Product, Relation::Payment]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_search_shape_without_filters() {
        let plan = JoinPlan::plan(&PredicateSet::default(), &all_projected());
        assert_eq!(
            plan.steps(),
            &[
                JoinStep::new(Relation::Customer, JoinKind::Inner),
                JoinStep::new(Relation::Product, JoinKind::Left),
                JoinStep::new(Relation::Payment, JoinKind::Left),
            ]
        );
    }

    #[test]
    fn test_payment_filter_keeps_left_join() {
        let criteria = SearchCriteria::builder()
            .payment_statuses([PaymentStatus::Completed])
            .build()
            .unwrap();
        let plan = JoinPlan::plan(&compile(&criteria), &all_projected());
        assert!(plan.has(Relation::Payment, JoinKind::Left));
        assert!(!plan.has(Relation::Payment, JoinKind::Inner));
    }

    #[test]
    fn test_product_filter_adds_semi_join() {
        let criteria = SearchCriteria::builder()
            .product_name("Laptop")
            .build()
            .unwrap();
        let plan = JoinPlan::plan(&compile(&criteria), &all_projected());
        assert!(plan.has(Relation::Product, JoinKind::Left));
        assert!(plan.has(Relation::Product, JoinKind::Exists));
        assert_eq!(plan.row_joins().count(), 3);
    }

    #[test]
    fn test_count_shape_joins_only_what_is_filtered() {
        let none = JoinPlan::plan(&PredicateSet::default(), &BTreeSet::new());
        assert_eq!(
            none.steps(),
            &[JoinStep::new(Relation::Customer, JoinKind::Inner)]
        );

        let criteria = SearchCriteria::builder()
            .payment_statuses([PaymentStatus::Pending])
            .product_category("Books")
            .build()
            .unwrap();
        let plan = JoinPlan::plan(&compile(&criteria), &BTreeSet::new());
        assert!(plan.joins(Relation::Payment));
        assert!(!plan.joins(Relation::Product));
        assert!(plan.has(Relation::Product, JoinKind::Exists));
    }
}
