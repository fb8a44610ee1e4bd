//! Output formatters for search results.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use ordersearch_core::proto::{SearchPage, SearchResult};
use ordersearch_core::QueryExplanation;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format a page of search results.
    fn format_page(&self, page: &SearchPage) -> String;

    /// Format a match count.
    fn format_count(&self, count: u64) -> String;

    /// Format a query explanation.
    fn format_explain(&self, explanation: &QueryExplanation) -> String;

    /// Format an error message.
    fn format_error(&self, error: &str) -> String;

    /// Format a simple message.
    fn format_message(&self, message: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

const HEADERS: [&str; 9] = [
    "id", "date", "customer", "email", "status", "total", "items", "products", "payment",
];

/// Display fields of one result, in [`HEADERS`] order.
fn result_fields(result: &SearchResult) -> [String; 9] {
    [
        result.order.id.to_string(),
        result.order.order_date.format("%Y-%m-%d %H:%M").to_string(),
        result.customer_name.clone(),
        result.customer_email.clone(),
        result.order.status.to_string(),
        result.order.total_amount.to_string(),
        result.item_count.to_string(),
        result
            .product_names
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        result
            .payment_status
            .map(|s| s.to_string())
            .unwrap_or_default(),
    ]
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_page(&self, page: &SearchPage) -> String {
        if page.is_empty() {
            return match page.total {
                Some(total) => format!("No results ({} total)", total),
                None => "No results".to_string(),
            };
        }

        let mut table = Table::new();
        table.set_header(HEADERS.iter().map(|h| Cell::new(h)).collect::<Vec<_>>());
        for result in &page.results {
            table.add_row(result_fields(result).into_iter().map(Cell::new).collect::<Vec<_>>());
        }

        let first = page.offset + 1;
        let last = page.offset + page.len() as u64;
        match page.total {
            Some(total) => format!("{}\nrows {}-{} of {}", table, first, last, total),
            None => format!("{}\n{} row(s)", table, page.len()),
        }
    }

    fn format_count(&self, count: u64) -> String {
        count.to_string()
    }

    fn format_explain(&self, explanation: &QueryExplanation) -> String {
        explanation.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_page(&self, page: &SearchPage) -> String {
        serde_json::to_string_pretty(page).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_count(&self, count: u64) -> String {
        serde_json::json!({ "count": count }).to_string()
    }

    fn format_explain(&self, explanation: &QueryExplanation) -> String {
        serde_json::to_string_pretty(&explanation.summary()).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({ "error": error }).to_string()
    }

    fn format_message(&self, message: &str) -> String {
        serde_json::json!({ "message": message }).to_string()
    }
}

/// CSV formatter.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_page(&self, page: &SearchPage) -> String {
        let mut output = HEADERS.join(",");
        output.push('\n');
        for result in &page.results {
            let cells: Vec<String> = result_fields(result)
                .iter()
                .map(|field| csv_field(field))
                .collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }
        output
    }

    fn format_count(&self, count: u64) -> String {
        format!("count\n{}", count)
    }

    fn format_explain(&self, explanation: &QueryExplanation) -> String {
        let mut output = String::from("kind,text\n");
        for step in &explanation.joins {
            output.push_str(&format!("join,{}\n", csv_field(&format!("{} {}", step.kind, step.relation))));
        }
        for predicate in &explanation.predicates {
            output.push_str(&format!("predicate,{}\n", csv_field(predicate)));
        }
        output.push_str(&format!("search,{}\n", csv_field(&explanation.search.sql)));
        output.push_str(&format!("count,{}\n", csv_field(&explanation.count.sql)));
        output
    }

    fn format_error(&self, error: &str) -> String {
        format!("error\n\"{}\"", escape_csv(error))
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// Quote a field when it holds a delimiter, quote or line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", escape_csv(field))
    } else {
        field.to_string()
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}
