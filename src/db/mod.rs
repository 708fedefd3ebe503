pub mod connection;
pub mod mysql;
pub mod sqlite;
pub mod statement;

pub use connection::{
    display_cell, primary_key_index, Cell, ColumnInfo, ConnectionParams, DatabaseType, QueryResult,
    Session,
};
pub use statement::Statement;

use anyhow::Result;
use std::time::Instant;

use self::mysql::MySqlSession;
use self::sqlite::SqliteSession;

pub fn open_session(params: &ConnectionParams) -> Result<Box<dyn Session>> {
    tracing::info!(
        db_type = params.db_type.as_str(),
        host = %params.host,
        user = %params.user,
        database = %params.database,
        "opening session"
    );
    let session: Box<dyn Session> = match params.db_type {
        DatabaseType::MySQL => Box::new(MySqlSession::connect(params)?),
        DatabaseType::SQLite => Box::new(SqliteSession::open(&params.database)?),
    };
    Ok(session)
}

/// Runs a parameterized write and commits it.
pub fn run_statement(session: &mut dyn Session, statement: &Statement) -> Result<u64> {
    tracing::debug!(sql = %statement.sql, params = statement.params.len(), "executing statement");
    let affected = session.execute(&statement.sql, &statement.params)?;
    session.commit()?;
    Ok(affected)
}

/// The console path: read queries come back as a grid, anything else is
/// committed and reported through `rows_affected`.
pub fn run_console(session: &mut dyn Session, sql: &str) -> Result<QueryResult> {
    let start = Instant::now();
    let result = if statement::is_read_query(sql) {
        let result = session.query(sql)?;
        session.commit()?;
        result
    } else {
        let affected = session.execute_raw(sql)?;
        session.commit()?;
        QueryResult::affected(affected)
    };
    let elapsed = start.elapsed().as_millis() as u64;
    tracing::info!(write = result.is_write(), elapsed_ms = elapsed, "console statement finished");
    Ok(result.with_time(elapsed))
}

/// Table names, read in a transaction that is closed before returning.
pub fn list_tables(session: &mut dyn Session) -> Result<Vec<String>> {
    let tables = session.list_tables()?;
    session.commit()?;
    Ok(tables)
}

/// Column metadata and every row of `table`. The read transaction is
/// committed so the next load sees rows other clients committed since.
pub fn load_table(session: &mut dyn Session, table: &str) -> Result<(Vec<ColumnInfo>, QueryResult)> {
    let start = Instant::now();
    let columns = session.describe_table(table)?;
    let mut result = session.query(&statement::select_all_sql(table))?;
    session.commit()?;
    if result.columns.is_empty() {
        result.columns = columns.iter().map(|c| c.name.clone()).collect();
    }
    Ok((columns, result.with_time(start.elapsed().as_millis() as u64)))
}
