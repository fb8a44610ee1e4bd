//! Subcommands and their filter flags.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Subcommand;
use ordersearch_core::proto::{
    Money, OrderStatus, ParseEnumError, PaymentMethod, PaymentStatus, SearchCriteria,
    SearchCriteriaBuilder, SortDirection, SortField, ValidationError, DEFAULT_LIMIT,
    DEFAULT_OFFSET,
};
use ordersearch_core::{fixtures, Error, QueryExecutor, QueryExplanation, SqliteStore};
use tracing::info;

use crate::config::CliConfig;
use crate::formatter::create_formatter;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the schema in the database file.
    Init,
    /// Create the schema and load the reference dataset.
    Seed,
    /// Search orders.
    Search(SearchArgs),
    /// Count orders matching the filters.
    Count(FilterArgs),
    /// Show the joins, predicates and SQL a search compiles to.
    Explain(SearchArgs),
}

impl Command {
    /// Whether the command leaves the database untouched.
    pub fn is_read_only(&self) -> bool {
        !matches!(self, Command::Init | Command::Seed)
    }
}

/// Optional filters; every flag given narrows the result.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Earliest order date (inclusive), `YYYY-MM-DD[ HH:MM:SS]`.
    #[arg(long, value_parser = parse_lower_bound)]
    pub order_from: Option<NaiveDateTime>,

    /// Latest order date (inclusive); a bare date covers the whole day.
    #[arg(long, value_parser = parse_upper_bound)]
    pub order_to: Option<NaiveDateTime>,

    /// Minimum order total.
    #[arg(long)]
    pub min_total: Option<Money>,

    /// Maximum order total.
    #[arg(long)]
    pub max_total: Option<Money>,

    /// Order status; repeat or separate with commas.
    #[arg(long = "status", value_delimiter = ',', value_parser = parse_variant::<OrderStatus>)]
    pub statuses: Vec<OrderStatus>,

    /// Substring of the customer name, any case.
    #[arg(long)]
    pub customer_name: Option<String>,

    /// Substring of the customer email, any case.
    #[arg(long)]
    pub customer_email: Option<String>,

    /// Substring of the customer address, any case.
    #[arg(long)]
    pub customer_address: Option<String>,

    /// Earliest customer registration date.
    #[arg(long)]
    pub registered_from: Option<NaiveDate>,

    /// Latest customer registration date.
    #[arg(long)]
    pub registered_to: Option<NaiveDate>,

    /// Substring of a product name on the order, any case.
    #[arg(long)]
    pub product_name: Option<String>,

    /// Exact product category on the order.
    #[arg(long)]
    pub category: Option<String>,

    /// Minimum price of a product on the order.
    #[arg(long)]
    pub min_price: Option<Money>,

    /// Maximum price of a product on the order.
    #[arg(long)]
    pub max_price: Option<Money>,

    /// Payment method; repeat or separate with commas.
    #[arg(long = "payment-method", value_delimiter = ',', value_parser = parse_variant::<PaymentMethod>)]
    pub payment_methods: Vec<PaymentMethod>,

    /// Payment status; repeat or separate with commas.
    #[arg(long = "payment-status", value_delimiter = ',', value_parser = parse_variant::<PaymentStatus>)]
    pub payment_statuses: Vec<PaymentStatus>,

    /// Earliest payment date (inclusive).
    #[arg(long, value_parser = parse_lower_bound)]
    pub paid_from: Option<NaiveDateTime>,

    /// Latest payment date (inclusive); a bare date covers the whole day.
    #[arg(long, value_parser = parse_upper_bound)]
    pub paid_to: Option<NaiveDateTime>,
}

impl FilterArgs {
    /// Copy every given flag onto `builder`.
    pub fn apply(&self, builder: SearchCriteriaBuilder) -> SearchCriteriaBuilder {
        let mut b = builder
            .order_statuses(self.statuses.iter().copied())
            .payment_methods(self.payment_methods.iter().copied())
            .payment_statuses(self.payment_statuses.iter().copied());

        if let Some(v) = self.order_from {
            b = b.order_date_from(v);
        }
        if let Some(v) = self.order_to {
            b = b.order_date_to(v);
        }
        if let Some(v) = self.min_total {
            b = b.min_total_amount(v);
        }
        if let Some(v) = self.max_total {
            b = b.max_total_amount(v);
        }
        if let Some(v) = &self.customer_name {
            b = b.customer_name(v.as_str());
        }
        if let Some(v) = &self.customer_email {
            b = b.customer_email(v.as_str());
        }
        if let Some(v) = &self.customer_address {
            b = b.customer_address(v.as_str());
        }
        if let Some(v) = self.registered_from {
            b = b.customer_registered_from(v);
        }
        if let Some(v) = self.registered_to {
            b = b.customer_registered_to(v);
        }
        if let Some(v) = &self.product_name {
            b = b.product_name(v.as_str());
        }
        if let Some(v) = &self.category {
            b = b.product_category(v.as_str());
        }
        if let Some(v) = self.min_price {
            b = b.min_product_price(v);
        }
        if let Some(v) = self.max_price {
            b = b.max_product_price(v);
        }
        if let Some(v) = self.paid_from {
            b = b.payment_date_from(v);
        }
        if let Some(v) = self.paid_to {
            b = b.payment_date_to(v);
        }
        b
    }

    pub fn to_criteria(&self) -> Result<SearchCriteria, ValidationError> {
        self.apply(SearchCriteria::builder()).build()
    }
}

/// Filters plus paging and sorting.
#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Number of matching orders to skip.
    #[arg(long, default_value_t = DEFAULT_OFFSET, allow_negative_numbers = true)]
    pub offset: i64,

    /// Maximum number of orders to return.
    #[arg(long, default_value_t = DEFAULT_LIMIT, allow_negative_numbers = true)]
    pub limit: i64,

    /// ORDER_DATE, TOTAL_AMOUNT, CUSTOMER_NAME or ORDER_STATUS.
    #[arg(long, default_value = "ORDER_DATE")]
    pub sort_by: SortField,

    /// ASC or DESC.
    #[arg(long, default_value = "DESC")]
    pub sort_direction: SortDirection,

    /// Also report the total number of matching orders.
    #[arg(long)]
    pub total: bool,
}

impl SearchArgs {
    pub fn to_criteria(&self) -> Result<SearchCriteria, ValidationError> {
        self.filters
            .apply(SearchCriteria::builder())
            .offset(self.offset)
            .limit(self.limit)
            .sort_by(self.sort_by)
            .sort_direction(self.sort_direction)
            .build()
    }
}

/// Parse an enum variant, accepting any case and `-` for `_`.
fn parse_variant<T>(s: &str) -> Result<T, ParseEnumError>
where
    T: FromStr<Err = ParseEnumError>,
{
    s.trim().to_ascii_uppercase().replace('-', "_").parse()
}

fn parse_datetime(s: &str, day_time: NaiveTime) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| date.and_time(day_time))
        .map_err(|_| format!("`{}` is not a date or timestamp", s))
}

fn parse_lower_bound(s: &str) -> Result<NaiveDateTime, String> {
    let start_of_day =
        NaiveTime::from_hms_opt(0, 0, 0).ok_or_else(|| "invalid start of day".to_string())?;
    parse_datetime(s, start_of_day)
}

fn parse_upper_bound(s: &str) -> Result<NaiveDateTime, String> {
    let end_of_day = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(|| "invalid end of day".to_string())?;
    parse_datetime(s, end_of_day)
}

fn open_store(config: &CliConfig) -> Result<SqliteStore, Error> {
    let store = SqliteStore::open(&config.storage)?;
    if config.memory {
        store.apply_schema()?;
        fixtures::seed_reference_dataset(&store)?;
    }
    Ok(store)
}

fn describe(config: &CliConfig) -> String {
    match &config.storage.path {
        Some(path) if !config.memory => path.display().to_string(),
        _ => "in-memory database".to_string(),
    }
}

/// Run the configured command and render its output.
pub fn run(config: &CliConfig) -> Result<String, Error> {
    let formatter = create_formatter(config.format);

    match &config.command {
        Command::Init => {
            let store = SqliteStore::open(&config.storage)?;
            store.apply_schema()?;
            Ok(formatter.format_message(&format!("schema ready in {}", describe(config))))
        }
        Command::Seed => {
            let store = SqliteStore::open(&config.storage)?;
            store.apply_schema()?;
            fixtures::seed_reference_dataset(&store)?;
            Ok(formatter.format_message(&format!(
                "reference dataset loaded into {}",
                describe(config)
            )))
        }
        Command::Search(args) => {
            let criteria = args.to_criteria()?;
            let store = open_store(config)?;
            let page = QueryExecutor::new(&store).search_page(&criteria, args.total)?;
            info!(results = page.len(), total = ?page.total, "search finished");
            Ok(formatter.format_page(&page))
        }
        Command::Count(filters) => {
            let criteria = filters.to_criteria()?;
            let store = open_store(config)?;
            let count = QueryExecutor::new(&store).count(&criteria)?;
            Ok(formatter.format_count(count))
        }
        Command::Explain(args) => {
            let criteria = args.to_criteria()?;
            Ok(formatter.format_explain(&QueryExplanation::new(&criteria)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Args;
    use clap::Parser;

    fn run_args(args: &[&str]) -> Result<String, Error> {
        let config = Args::try_parse_from(args).unwrap().into_config();
        run(&config)
    }

    #[test]
    fn test_search_memory_json() {
        let output = run_args(&[
            "ordersearch",
            "--memory",
            "--format",
            "json",
            "search",
            "--customer-name",
            "john",
            "--total",
        ])
        .unwrap();
        let page: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(page["results"].as_array().unwrap().len(), 2);
        assert_eq!(page["total"], 2);
    }

    #[test]
    fn test_count_with_lowercase_status() {
        let output = run_args(&[
            "ordersearch",
            "--memory",
            "count",
            "--payment-status",
            "completed",
        ])
        .unwrap();
        assert_eq!(output, "2");
    }

    #[test]
    fn test_repeated_and_delimited_statuses() {
        let args = Args::try_parse_from([
            "ordersearch",
            "count",
            "--status",
            "pending,shipped",
            "--status",
            "DELIVERED",
        ])
        .unwrap();
        match args.command {
            Command::Count(filters) => assert_eq!(
                filters.statuses,
                vec![OrderStatus::Pending, OrderStatus::Shipped, OrderStatus::Delivered]
            ),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_negative_offset_is_rejected() {
        let err = run_args(&["ordersearch", "explain", "--offset", "-1"]).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::NegativeOffset(-1))));
    }

    #[test]
    fn test_explain_needs_no_database() {
        let output = run_args(&[
            "ordersearch",
            "--db",
            "/nonexistent/dir/orders.db",
            "explain",
            "--product-name",
            "lap",
        ])
        .unwrap();
        assert!(output.contains("EXISTS (SELECT 1 FROM order_items fi"));
    }

    #[test]
    fn test_init_seed_then_search_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("orders.db");
        let db = db.to_str().unwrap();

        run_args(&["ordersearch", "--db", db, "seed"]).unwrap();
        let output = run_args(&[
            "ordersearch",
            "--db",
            db,
            "--format",
            "csv",
            "search",
            "--sort-by",
            "total_amount",
            "--sort-direction",
            "asc",
        ])
        .unwrap();
        let ids: Vec<&str> = output
            .lines()
            .skip(1)
            .filter_map(|line| line.split(',').next())
            .collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn test_date_bounds() {
        let lower = parse_lower_bound("2024-02-10").unwrap();
        let upper = parse_upper_bound("2024-02-10").unwrap();
        assert_eq!(lower.to_string(), "2024-02-10 00:00:00");
        assert_eq!(upper.to_string(), "2024-02-10 23:59:59.999999999");
        let late = NaiveDate::from_ymd_opt(2024, 2, 10)
            .unwrap()
            .and_hms_micro_opt(23, 59, 59, 999_500)
            .unwrap();
        assert!(late <= upper);
        assert!(parse_lower_bound("2024-02-10T08:30:00").is_ok());
        assert!(parse_lower_bound("last week").is_err());
    }
}
