//! Query engine for order search.
//!
//! Criteria are compiled in stages: predicates, join graph, grouped
//! projection, sort and window. The planner combines them into search and
//! count plans, which are rendered to SQL and run by the executor.

mod aggregate;
mod executor;
mod explain;
mod join;
mod planner;
mod predicate;
mod sort;
mod sql;
pub(crate) mod value_codec;

pub use aggregate::{alias, Projection, SelectExpr, SelectItem};
pub use executor::{map_row, QueryExecutor};
pub use explain::{ExplainSummary, QueryExplanation};
pub use join::{JoinKind, JoinPlan, JoinStep};
pub use planner::{CountPlan, QueryPlanner, SearchPlan};
pub use predicate::{compile, Column, Predicate, PredicateSet, Relation, Table};
pub use sort::{sort_column, SortSpec, Window, TIE_BREAK};
pub use sql::{fold_case, render_count, render_search, Statement, CASEFOLD};
pub use value_codec::{encode_value, DATE_FORMAT, TIMESTAMP_FORMAT};
