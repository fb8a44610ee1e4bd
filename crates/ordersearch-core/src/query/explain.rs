//! Query explanation.
//!
//! Shows what a criteria value compiles to without touching the store: the
//! join graph, the predicate list, and both rendered statements.

use std::fmt;

use ordersearch_proto::SearchCriteria;
use serde::Serialize;

use super::join::JoinStep;
use super::planner::QueryPlanner;
use super::sql::{render_count, render_search, Statement};

/// Compiled form of one search request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExplanation {
    /// Join graph of the search query.
    pub joins: Vec<JoinStep>,
    /// Predicates in compilation order, human readable.
    pub predicates: Vec<String>,
    pub search: Statement,
    pub count: Statement,
}

impl QueryExplanation {
    /// Compile `criteria` without executing anything.
    pub fn new(criteria: &SearchCriteria) -> Self {
        let search_plan = QueryPlanner::plan_search(criteria);
        let count_plan = QueryPlanner::plan_count(criteria);

        Self {
            joins: search_plan.joins.steps().to_vec(),
            predicates: search_plan
                .predicates
                .iter()
                .map(ToString::to_string)
                .collect(),
            search: render_search(&search_plan),
            count: render_count(&count_plan),
        }
    }

    pub fn is_list_all(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Serializable summary for machine-readable output.
    pub fn summary(&self) -> ExplainSummary {
        ExplainSummary {
            joins: self
                .joins
                .iter()
                .map(|j| format!("{} {}", j.kind, j.relation))
                .collect(),
            predicates: self.predicates.clone(),
            search_sql: self.search.sql.clone(),
            search_params: self.search.params.len(),
            count_sql: self.count.sql.clone(),
            count_params: self.count.params.len(),
        }
    }
}

/// Flat, serializable view of a [`QueryExplanation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainSummary {
    pub joins: Vec<String>,
    pub predicates: Vec<String>,
    pub search_sql: String,
    pub search_params: usize,
    pub count_sql: String,
    pub count_params: usize,
}

impl fmt::Display for QueryExplanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Joins:")?;
        writeln!(f, "  orders (root)")?;
        for step in &self.joins {
            writeln!(f, "  {} {}", step.kind, step.relation)?;
        }

        writeln!(f)?;
        if self.is_list_all() {
            writeln!(f, "Predicates: none (list all)")?;
        } else {
            writeln!(f, "Predicates:")?;
            for (i, predicate) in self.predicates.iter().enumerate() {
                let prefix = if i == 0 { "     " } else { "  AND" };
                writeln!(f, "{} {}", prefix, predicate)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Search ({} params):", self.search.params.len())?;
        writeln!(f, "  {}", self.search.sql)?;
        writeln!(f)?;
        writeln!(f, "Count ({} params):", self.count.params.len())?;
        write!(f, "  {}", self.count.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordersearch_proto::OrderStatus;

    #[test]
    fn test_list_all_explanation() {
        let explanation = QueryExplanation::new(&SearchCriteria::default());
        assert!(explanation.is_list_all());
        assert_eq!(explanation.joins.len(), 3);

        let text = explanation.to_string();
        assert!(text.contains("Predicates: none (list all)"));
        assert!(text.contains("INNER JOIN customer"));
        assert!(text.contains("LEFT JOIN payment"));
    }

    #[test]
    fn test_filtered_explanation_lists_predicates() {
        let criteria = SearchCriteria::builder()
            .order_statuses([OrderStatus::Delivered])
            .product_name("Laptop")
            .build()
            .unwrap();
        let explanation = QueryExplanation::new(&criteria);
        assert_eq!(
            explanation.predicates,
            vec![
                "o.status in ('DELIVERED')".to_string(),
                "p.name contains 'Laptop' (ignore case)".to_string(),
            ]
        );

        let text = explanation.to_string();
        assert!(text.contains("EXISTS order_item/product"));
        assert!(text.contains("  AND p.name contains 'Laptop'"));

        let summary = explanation.summary();
        assert_eq!(summary.search_params, summary.count_params + 2);
    }
}
