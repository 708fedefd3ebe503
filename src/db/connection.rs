use anyhow::Result;
use std::fmt;

/// Which client library backs a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatabaseType {
    #[default]
    MySQL,
    SQLite,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::MySQL => "mysql",
            DatabaseType::SQLite => "sqlite",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "sqlite" => DatabaseType::SQLite,
            _ => DatabaseType::MySQL,
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            DatabaseType::MySQL => DatabaseType::SQLite,
            DatabaseType::SQLite => DatabaseType::MySQL,
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseType::MySQL => write!(f, "MySQL"),
            DatabaseType::SQLite => write!(f, "SQLite"),
        }
    }
}

/// Everything the connection form collects. For SQLite only `database` is
/// used, as a file path (or `:memory:`).
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub db_type: DatabaseType,
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

// Hand-written so the password never ends up in logs.
impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("db_type", &self.db_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// One row of `DESCRIBE <table>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    /// Key role as reported by the server: `PRI`, `UNI`, `MUL` or empty.
    pub key: String,
    pub default: Option<String>,
    /// e.g. `auto_increment`
    pub extra: String,
}

impl ColumnInfo {
    pub fn is_primary_key(&self) -> bool {
        self.key == "PRI"
    }

    pub fn is_auto_generated(&self) -> bool {
        self.extra.to_ascii_lowercase().contains("auto_increment")
    }

    pub fn is_required(&self) -> bool {
        !self.nullable
    }

    /// BLOB and BINARY family columns. Their grid text is not the stored
    /// bytes, so forms never write it back.
    pub fn is_binary(&self) -> bool {
        let data_type = self.data_type.to_ascii_lowercase();
        data_type.contains("blob") || data_type.contains("binary")
    }
}

/// Index of the first column whose key role is `PRI`.
pub fn primary_key_index(columns: &[ColumnInfo]) -> Option<usize> {
    columns.iter().position(ColumnInfo::is_primary_key)
}

/// A single cell; `None` is SQL NULL.
pub type Cell = Option<String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub rows_affected: Option<u64>,
    pub execution_time_ms: u64,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            columns,
            rows,
            rows_affected: None,
            execution_time_ms: 0,
        }
    }

    pub fn affected(count: u64) -> Self {
        Self {
            rows_affected: Some(count),
            ..Self::default()
        }
    }

    pub fn with_time(mut self, time_ms: u64) -> Self {
        self.execution_time_ms = time_ms;
        self
    }

    pub fn is_write(&self) -> bool {
        self.rows_affected.is_some()
    }
}

/// Text shown in the grid for a cell.
pub fn display_cell(cell: &Cell) -> &str {
    cell.as_deref().unwrap_or("NULL")
}

/// An authenticated connection to the database server. Exactly one is alive
/// at a time and it is handed to every operation by `&mut`.
pub trait Session {
    fn database_name(&self) -> &str;
    fn list_tables(&mut self) -> Result<Vec<String>>;
    fn describe_table(&mut self, table: &str) -> Result<Vec<ColumnInfo>>;
    /// Runs a statement that produces rows and collects all of them.
    fn query(&mut self, sql: &str) -> Result<QueryResult>;
    /// Runs a parameterized statement and returns the affected row count.
    fn execute(&mut self, sql: &str, params: &[Cell]) -> Result<u64>;
    /// Runs a statement as-is and returns the affected row count.
    fn execute_raw(&mut self, sql: &str) -> Result<u64>;
    fn commit(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
