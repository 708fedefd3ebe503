use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, Row};

use super::connection::{Cell, ColumnInfo, QueryResult, Session};

pub struct SqliteSession {
    conn: Connection,
    path: String,
}

impl SqliteSession {
    pub fn open(path: &str) -> Result<Self> {
        let path = path.trim();
        let conn = Connection::open(path)
            .context(format!("Failed to open SQLite database at {}", path))?;
        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    fn row_to_cells(row: &Row, column_count: usize) -> rusqlite::Result<Vec<Cell>> {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let cell = match row.get_ref(i)? {
                ValueRef::Null => None,
                ValueRef::Integer(v) => Some(v.to_string()),
                ValueRef::Real(v) => Some(v.to_string()),
                ValueRef::Text(v) => Some(String::from_utf8_lossy(v).into_owned()),
                ValueRef::Blob(v) => Some(format!("<BLOB: {} bytes>", v.len())),
            };
            values.push(cell);
        }
        Ok(values)
    }
}

impl Session for SqliteSession {
    fn database_name(&self) -> &str {
        &self.path
    }

    fn list_tables(&mut self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;

        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tables)
    }

    fn describe_table(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
        )?;

        let raw = stmt
            .query_map([table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)? != 0,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if raw.is_empty() {
            anyhow::bail!("Table '{}' doesn't exist", table);
        }

        // A lone INTEGER primary key aliases the rowid and is filled in by
        // SQLite, which is what MySQL reports as auto_increment.
        let pk_count = raw.iter().filter(|(.., pk)| *pk > 0).count();

        let columns = raw
            .into_iter()
            .map(|(name, data_type, not_null, default, pk)| {
                let rowid_alias = pk > 0 && pk_count == 1 && data_type.eq_ignore_ascii_case("INTEGER");
                ColumnInfo {
                    name,
                    data_type,
                    nullable: !not_null && !rowid_alias,
                    key: if pk > 0 { "PRI".to_string() } else { String::new() },
                    default,
                    extra: if rowid_alias { "auto_increment".to_string() } else { String::new() },
                }
            })
            .collect();

        Ok(columns)
    }

    fn query(&mut self, sql: &str) -> Result<QueryResult> {
        let mut stmt = self.conn.prepare(sql)?;
        let column_names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let column_count = column_names.len();

        let rows = stmt
            .query_map([], |row| Self::row_to_cells(row, column_count))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryResult::new(column_names, rows))
    }

    fn execute(&mut self, sql: &str, params: &[Cell]) -> Result<u64> {
        let affected = self.conn.execute(sql, params_from_iter(params.iter()))?;
        Ok(affected as u64)
    }

    fn execute_raw(&mut self, sql: &str) -> Result<u64> {
        let mut stmt = self.conn.prepare(sql)?;
        if stmt.column_count() > 0 {
            // Row-producing statements that are not SELECTs (PRAGMA, WITH ...)
            // are stepped through and report nothing affected.
            let mut rows = stmt.query([])?;
            while rows.next()?.is_some() {}
            return Ok(0);
        }
        let affected = stmt.execute([])?;
        Ok(affected as u64)
    }

    fn commit(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}
