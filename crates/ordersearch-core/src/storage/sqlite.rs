//! SQLite-backed store.
//!
//! A single connection guarded by a mutex; statements are prepared through
//! the connection's statement cache, so repeated searches with the same
//! criteria shape reuse their compiled plan.

use parking_lot::Mutex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags, ToSql, Transaction};
use tracing::{debug, info};

use super::config::StorageConfig;
use super::row::{Cell, Row};
use super::schema;
use super::QueryBackend;
use crate::error::Error;
use crate::query::value_codec::encode_value;
use crate::query::{fold_case, Statement, CASEFOLD};

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Cell::Null => ValueRef::Null,
            Cell::Integer(v) => ValueRef::Integer(*v),
            Cell::Real(v) => ValueRef::Real(*v),
            Cell::Text(s) => ValueRef::Text(s.as_bytes()),
            Cell::Blob(b) => ValueRef::Blob(b),
        };
        Ok(ToSqlOutput::Borrowed(value))
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(v) => Cell::Integer(v),
            ValueRef::Real(v) => Cell::Real(v),
            ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Cell::Blob(b.to_vec()),
        }
    }
}

/// Register the scalar functions emitted SQL relies on.
///
/// SQLite's built-in `lower()` only folds ASCII letters.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CASEFOLD,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| fold_case(&t)))
        },
    )
}

/// Order store over one SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a store as described by `config`.
    ///
    /// `read_only` is ignored for in-memory stores.
    pub fn open(config: &StorageConfig) -> Result<Self, Error> {
        let conn = match &config.path {
            Some(path) => {
                let flags = if config.read_only {
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
                } else {
                    OpenFlags::default()
                };
                Connection::open_with_flags(path, flags).map_err(|e| {
                    Error::Storage(format!("cannot open {}: {}", path.display(), e))
                })?
            }
            None => Connection::open_in_memory()
                .map_err(|e| Error::Storage(format!("cannot open in-memory database: {}", e)))?,
        };

        conn.busy_timeout(config.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        register_functions(&conn)?;

        info!(
            path = ?config.path,
            read_only = config.read_only,
            "opened order store"
        );

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self, Error> {
        Self::open(&StorageConfig::in_memory())
    }

    /// Create tables and indexes that are missing.
    pub fn apply_schema(&self) -> Result<(), Error> {
        let conn = self.conn.lock();
        schema::apply_schema(&conn)?;
        info!(tables = schema::TABLES.len(), "schema applied");
        Ok(())
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&Connection) -> Result<T, Error>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` inside a transaction, committing when it succeeds.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, Error>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

impl QueryBackend for SqliteStore {
    fn fetch_rows(&self, statement: &Statement) -> Result<Vec<Row>, Error> {
        debug!(sql = %statement.sql, params = statement.params.len(), "executing search");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&statement.sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let params: Vec<Cell> = statement.params.iter().map(encode_value).collect();

        let mapped = stmt.query_map(params_from_iter(params.iter()), |row| {
            let mut columns = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                columns.push((name.clone(), Cell::from(row.get_ref(i)?)));
            }
            Ok(Row::new(columns))
        })?;
        let rows = mapped.collect::<Result<Vec<_>, _>>()?;

        debug!(rows = rows.len(), "search returned");
        Ok(rows)
    }

    fn fetch_count(&self, statement: &Statement) -> Result<u64, Error> {
        debug!(sql = %statement.sql, params = statement.params.len(), "executing count");

        let conn = self.conn.lock();
        let params: Vec<Cell> = statement.params.iter().map(encode_value).collect();
        let mut stmt = conn.prepare_cached(&statement.sql)?;
        let count: i64 = stmt.query_row(params_from_iter(params.iter()), |row| row.get(0))?;

        u64::try_from(count)
            .map_err(|_| Error::mapping("count", format!("negative count {}", count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordersearch_proto::Value;

    fn statement(sql: &str, params: Vec<Value>) -> Statement {
        Statement {
            sql: sql.to_string(),
            params,
        }
    }

    #[test]
    fn test_fetch_rows_names_columns() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rows = store
            .fetch_rows(&statement(
                "SELECT ? AS a, ? AS b, NULL AS c",
                vec![Value::Int64(7), Value::String("x".into())],
            ))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("a"), Some(&Cell::Integer(7)));
        assert_eq!(rows[0].get("b"), Some(&Cell::Text("x".into())));
        assert_eq!(rows[0].get("c"), Some(&Cell::Null));
        assert_eq!(rows[0].get("d"), None);
    }

    #[test]
    fn test_money_binds_as_cents() {
        let store = SqliteStore::open_in_memory().unwrap();
        let count = store
            .fetch_count(&statement(
                "SELECT ?",
                vec![Value::Money("12.34".parse().unwrap())],
            ))
            .unwrap();
        assert_eq!(count, 1234);
    }

    #[test]
    fn test_casefold_lowers_non_ascii_text() {
        let store = SqliteStore::open_in_memory().unwrap();
        let rows = store
            .fetch_rows(&statement(
                "SELECT casefold(?) AS folded, casefold(NULL) AS missing, \
                 instr(casefold(?), ?) > 0 AS hit",
                vec![
                    Value::String("JOSÉ ÁLVAREZ".into()),
                    Value::String("ÜBER Straße".into()),
                    Value::String("über".into()),
                ],
            ))
            .unwrap();
        assert_eq!(rows[0].get("folded"), Some(&Cell::Text("josé álvarez".into())));
        assert_eq!(rows[0].get("missing"), Some(&Cell::Null));
        assert_eq!(rows[0].get("hit"), Some(&Cell::Integer(1)));
    }

    #[test]
    fn test_sql_error_is_execution_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .fetch_rows(&statement("SELECT * FROM missing_table", vec![]))
            .unwrap_err();
        assert!(matches!(err, Error::Execution(_)));
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.apply_schema().unwrap();

        let result: Result<(), Error> = store.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO products (id, name, category, price) VALUES (1, 'Pen', 'Office', 150)",
                [],
            )?;
            Err(Error::Storage("abort".into()))
        });
        assert!(result.is_err());

        let count = store
            .fetch_count(&statement("SELECT COUNT(*) FROM products", vec![]))
            .unwrap();
        assert_eq!(count, 0);
    }
}
