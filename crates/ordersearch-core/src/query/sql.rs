//! SQL emission for search and count plans.
//!
//! Plans are rendered to SQLite SQL with positional `?` placeholders. Bound
//! values stay typed in [`Statement::params`] until the store encodes them.

use std::fmt;

use ordersearch_proto::{SortDirection, Value};

use super::aggregate::{Projection, SelectExpr};
use super::join::{JoinKind, JoinPlan};
use super::planner::{CountPlan, SearchPlan};
use super::predicate::{Column, Predicate, PredicateSet, Relation, Table};

/// Unicode lower-casing scalar function registered on every store connection.
pub const CASEFOLD: &str = "casefold";

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Which alias set columns are qualified with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Outer,
    Filter,
}

impl Scope {
    fn qualify(&self, column: Column) -> String {
        match self {
            Scope::Outer => column.qualified(),
            Scope::Filter => column.filter_qualified(),
        }
    }
}

#[derive(Default)]
struct SqlWriter {
    sql: String,
    params: Vec<Value>,
}

impl SqlWriter {
    fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    fn bind(&mut self, value: Value) {
        self.sql.push('?');
        self.params.push(value);
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }

    fn predicate(&mut self, predicate: &Predicate, scope: Scope) {
        match predicate {
            Predicate::AtLeast { column, value } => {
                self.push(&format!("{} >= ", scope.qualify(*column)));
                self.bind(value.clone());
            }
            Predicate::AtMost { column, value } => {
                self.push(&format!("{} <= ", scope.qualify(*column)));
                self.bind(value.clone());
            }
            Predicate::Contains { column, needle } => {
                self.push(&format!("instr({}({}), ", CASEFOLD, scope.qualify(*column)));
                self.bind(Value::String(fold_case(needle)));
                self.push(") > 0");
            }
            Predicate::Equals { column, value } => {
                self.push(&format!("{} = ", scope.qualify(*column)));
                self.bind(value.clone());
            }
            Predicate::OneOf { column, values } => {
                self.push(&format!("{} IN (", scope.qualify(*column)));
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.bind(value.clone());
                }
                self.push(")");
            }
        }
    }

    fn select_list(&mut self, projection: &Projection) {
        let items: Vec<String> = projection
            .items()
            .iter()
            .map(|item| {
                let expr = match item.expr {
                    SelectExpr::Column(c) => c.qualified(),
                    SelectExpr::Count(c) => format!("COUNT({})", c.qualified()),
                    SelectExpr::CollectDistinct(c) => {
                        format!("json_group_array(DISTINCT {})", c.qualified())
                    }
                };
                format!("{} AS {}", expr, item.alias)
            })
            .collect();
        self.push(&items.join(", "));
    }

    fn from_and_joins(&mut self, joins: &JoinPlan) {
        self.push(&format!(
            " FROM {} {}",
            Table::Orders.name(),
            Table::Orders.alias()
        ));
        for step in joins.row_joins() {
            let keyword = match step.kind {
                JoinKind::Inner => "INNER JOIN",
                _ => "LEFT JOIN",
            };
            for (table, on) in join_tables(step.relation) {
                self.push(&format!(
                    " {} {} {} ON {}",
                    keyword,
                    table.name(),
                    table.alias(),
                    on
                ));
            }
        }
    }

    /// WHERE clause: direct predicates, then the product semi-join.
    fn where_clause(&mut self, predicates: &PredicateSet, joins: &JoinPlan) {
        let direct: Vec<&Predicate> = predicates
            .iter()
            .filter(|p| p.relation() != Relation::Product)
            .collect();
        let semi = joins.has(Relation::Product, JoinKind::Exists);
        if direct.is_empty() && !semi {
            return;
        }

        self.push(" WHERE ");
        let mut first = true;
        for predicate in direct {
            if !first {
                self.push(" AND ");
            }
            first = false;
            self.predicate(predicate, Scope::Outer);
        }

        if semi {
            if !first {
                self.push(" AND ");
            }
            self.push(&format!(
                "EXISTS (SELECT 1 FROM {items} {fi} INNER JOIN {products} {fp} ON {fp}.id = {fi}.product_id WHERE {fi}.order_id = {o}.id",
                items = Table::OrderItems.name(),
                fi = Table::OrderItems.filter_alias(),
                products = Table::Products.name(),
                fp = Table::Products.filter_alias(),
                o = Table::Orders.alias(),
            ));
            for predicate in predicates.for_relation(Relation::Product) {
                self.push(" AND ");
                self.predicate(predicate, Scope::Filter);
            }
            self.push(")");
        }
    }
}

/// Tables attached for a relation, with their join conditions.
fn join_tables(relation: Relation) -> Vec<(Table, String)> {
    let o = Table::Orders.alias();
    match relation {
        Relation::Order => vec![],
        Relation::Customer => {
            let c = Table::Customers.alias();
            vec![(Table::Customers, format!("{c}.id = {o}.customer_id"))]
        }
        Relation::Product => {
            let oi = Table::OrderItems.alias();
            let p = Table::Products.alias();
            vec![
                (Table::OrderItems, format!("{oi}.order_id = {o}.id")),
                (Table::Products, format!("{p}.id = {oi}.product_id")),
            ]
        }
        Relation::Payment => {
            let pay = Table::Payments.alias();
            vec![(Table::Payments, format!("{pay}.order_id = {o}.id"))]
        }
    }
}

/// Lower-case text the same way the store's `casefold` function does.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

fn direction_keyword(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

/// Render the grouped, sorted, paginated search query.
pub fn render_search(plan: &SearchPlan) -> Statement {
    let mut w = SqlWriter::default();

    w.push("SELECT ");
    w.select_list(&plan.projection);
    w.from_and_joins(&plan.joins);
    w.where_clause(&plan.predicates, &plan.joins);

    let key: Vec<String> = plan
        .projection
        .group_key()
        .iter()
        .map(Column::qualified)
        .collect();
    if plan.projection.has_aggregates() && !key.is_empty() {
        w.push(&format!(" GROUP BY {}", key.join(", ")));
    }

    let order: Vec<String> = plan
        .sort
        .terms()
        .into_iter()
        .map(|(column, direction)| {
            format!("{} {}", column.qualified(), direction_keyword(direction))
        })
        .collect();
    w.push(&format!(" ORDER BY {}", order.join(", ")));

    w.push(" LIMIT ");
    w.bind(Value::Int64(i64::from(plan.window.limit)));
    w.push(" OFFSET ");
    w.bind(Value::Int64(
        i64::try_from(plan.window.offset).unwrap_or(i64::MAX),
    ));

    w.finish()
}

/// Render the distinct-order count query.
pub fn render_count(plan: &CountPlan) -> Statement {
    let mut w = SqlWriter::default();
    w.push(&format!("SELECT COUNT(DISTINCT {})", Column::OrderId.qualified()));
    w.from_and_joins(&plan.joins);
    w.where_clause(&plan.predicates, &plan.joins);
    w.finish()
}
