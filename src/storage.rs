use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Value};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage connect failed: {0}")]
    Connect(String),

    #[error("statement failed: {0}")]
    Statement(String),

    #[error("storage worker failed: {0}")]
    Task(String),
}

/// The SQL engine behind each node. Implementations open a fresh connection
/// per operation (connect, execute, commit, close) so the coordination core
/// never contends on a shared storage handle.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Executes a statement that returns no rows.
    async fn run_write(&self, sql: &str) -> Result<u64, StorageError>;

    /// Executes a statement and fetches every resulting row as a JSON object.
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Value>, StorageError>;
}

/// SQLite-backed storage, one database file per node. Connections run in
/// autocommit, so each write is durable when the call returns.
pub struct SqliteStorage {
    path: PathBuf,
}

impl SqliteStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(path: &PathBuf) -> Result<Connection, StorageError> {
        Connection::open(path).map_err(|e| StorageError::Connect(e.to_string()))
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn run_write(&self, sql: &str) -> Result<u64, StorageError> {
        let path = self.path.clone();
        let sql = sql.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = Self::open(&path)?;
            let affected = conn
                .execute(&sql, [])
                .map_err(|e| StorageError::Statement(e.to_string()))?;
            Ok(affected as u64)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }

    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Value>, StorageError> {
        let path = self.path.clone();
        let sql = sql.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = Self::open(&path)?;
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| StorageError::Statement(e.to_string()))?;
            let col_names: Vec<String> = (0..stmt.column_count())
                .map(|i| stmt.column_name(i).unwrap_or("").to_string())
                .collect();

            let mut rows = stmt
                .query([])
                .map_err(|e| StorageError::Statement(e.to_string()))?;
            let mut result = Vec::new();
            while let Some(row) = rows
                .next()
                .map_err(|e| StorageError::Statement(e.to_string()))?
            {
                let mut map = Map::new();
                for (i, col_name) in col_names.iter().enumerate() {
                    let val = row
                        .get_ref(i)
                        .map_err(|e| StorageError::Statement(e.to_string()))?;
                    let json_val = match val {
                        ValueRef::Null => Value::Null,
                        ValueRef::Integer(n) => Value::Number(n.into()),
                        ValueRef::Real(f) => {
                            Value::Number(serde_json::Number::from_f64(f).unwrap_or(0.into()))
                        }
                        ValueRef::Text(t) => {
                            let s = std::str::from_utf8(t).unwrap_or("");
                            Value::String(s.to_string())
                        }
                        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
                    };
                    map.insert(col_name.clone(), json_val);
                }
                result.push(Value::Object(map));
            }
            Ok(result)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }
}
