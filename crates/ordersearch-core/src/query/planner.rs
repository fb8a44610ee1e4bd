//! Query planner for turning criteria into search and count plans.
//!
//! Both plans share the same compiled predicates; they differ only in
//! projection, join needs, and whether sorting and paging apply.

use std::collections::BTreeSet;

use ordersearch_proto::SearchCriteria;
use tracing::debug;

use super::aggregate::Projection;
use super::join::JoinPlan;
use super::predicate::{compile, PredicateSet};
use super::sort::{SortSpec, Window};

/// Plan for the row-producing search query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub predicates: PredicateSet,
    pub joins: JoinPlan,
    pub projection: Projection,
    pub sort: SortSpec,
    pub window: Window,
}

/// Plan for the distinct-order count query.
#[derive(Debug, Clone, PartialEq)]
pub struct CountPlan {
    pub predicates: PredicateSet,
    pub joins: JoinPlan,
}

/// Planner that transforms criteria into plans.
pub struct QueryPlanner;

impl QueryPlanner {
    pub fn plan_search(criteria: &SearchCriteria) -> SearchPlan {
        let predicates = compile(criteria);
        let projection = Projection::search_result();
        let joins = JoinPlan::plan(&predicates, &projection.relations());

        debug!(
            predicates = predicates.len(),
            list_all = !criteria.has_any_filter(),
            "planned search"
        );

        SearchPlan {
            predicates,
            joins,
            projection,
            sort: SortSpec::new(criteria.sort_by(), criteria.sort_direction()),
            window: criteria.paging().into(),
        }
    }

    pub fn plan_count(criteria: &SearchCriteria) -> CountPlan {
        let predicates = compile(criteria);
        let joins = JoinPlan::plan(&predicates, &BTreeSet::new());
        CountPlan { predicates, joins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::join::JoinKind;
    use crate::query::predicate::Relation;
    use ordersearch_proto::{PaymentStatus, SortDirection, SortField};

    #[test]
    fn test_search_and_count_share_predicates() {
        let criteria = SearchCriteria::builder()
            .customer_name("Jane")
            .product_name("Book")
            .payment_statuses([PaymentStatus::Completed])
            .build()
            .unwrap();
        let search = QueryPlanner::plan_search(&criteria);
        let count = QueryPlanner::plan_count(&criteria);
        assert_eq!(search.predicates, count.predicates);
        assert!(search.joins.has(Relation::Product, JoinKind::Exists));
        assert!(count.joins.has(Relation::Product, JoinKind::Exists));
        assert!(count.joins.has(Relation::Payment, JoinKind::Left));
    }

    #[test]
    fn test_search_carries_sort_and_window() {
        let criteria = SearchCriteria::builder()
            .offset(10)
            .limit(5)
            .sort_by(SortField::CustomerName)
            .sort_direction(SortDirection::Asc)
            .build()
            .unwrap();
        let plan = QueryPlanner::plan_search(&criteria);
        assert_eq!(plan.window, Window { offset: 10, limit: 5 });
        assert_eq!(plan.sort, SortSpec::new(SortField::CustomerName, SortDirection::Asc));
        assert!(plan.predicates.is_empty());
    }
}
