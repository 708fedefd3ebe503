use anyhow::{Context, Result};
use mysql::prelude::*;
use mysql::{Conn, OptsBuilder, Params, Row, Value};

use super::connection::{Cell, ColumnInfo, ConnectionParams, QueryResult, Session};
use super::statement;

pub struct MySqlSession {
    conn: Conn,
    database: String,
}

impl MySqlSession {
    pub fn connect(params: &ConnectionParams) -> Result<Self> {
        let port: u16 = params
            .port
            .trim()
            .parse()
            .with_context(|| format!("invalid port '{}'", params.port))?;

        let database = params.database.trim();
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(params.host.trim()))
            .tcp_port(port)
            .user(Some(params.user.as_str()))
            .pass(Some(params.password.as_str()))
            .db_name((!database.is_empty()).then_some(database));

        let mut conn = Conn::new(opts)?;
        // Writes stay pending until `commit`, matching the form workflow.
        conn.query_drop("SET autocommit = 0")?;

        Ok(Self {
            conn,
            database: database.to_string(),
        })
    }
}

fn value_to_cell(value: &Value) -> Cell {
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::Int(v) => Some(v.to_string()),
        Value::UInt(v) => Some(v.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Double(v) => Some(v.to_string()),
        Value::Date(y, m, d, 0, 0, 0, 0) => Some(format!("{:04}-{:02}-{:02}", y, m, d)),
        Value::Date(y, m, d, h, mi, s, 0) => {
            Some(format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}", y, m, d, h, mi, s))
        }
        Value::Date(y, m, d, h, mi, s, us) => Some(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
            y, m, d, h, mi, s, us
        )),
        Value::Time(neg, days, h, m, s, us) => {
            let sign = if *neg { "-" } else { "" };
            let hours = u32::from(*h) + days * 24;
            if *us == 0 {
                Some(format!("{}{:02}:{:02}:{:02}", sign, hours, m, s))
            } else {
                Some(format!("{}{:02}:{:02}:{:02}.{:06}", sign, hours, m, s, us))
            }
        }
    }
}

fn row_to_cells(row: &Row) -> Vec<Cell> {
    (0..row.len())
        .map(|idx| row.as_ref(idx).map(value_to_cell).unwrap_or(None))
        .collect()
}

fn cell_to_value(cell: &Cell) -> Value {
    match cell {
        Some(text) => Value::from(text.as_str()),
        None => Value::NULL,
    }
}

impl Session for MySqlSession {
    fn database_name(&self) -> &str {
        &self.database
    }

    fn list_tables(&mut self) -> Result<Vec<String>> {
        let rows: Vec<Row> = self.conn.query("SHOW TABLES")?;
        Ok(rows
            .iter()
            .filter_map(|row| row.as_ref(0).and_then(value_to_cell))
            .collect())
    }

    fn describe_table(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
        let rows: Vec<Row> = self.conn.query(statement::describe_sql(table))?;

        // Field | Type | Null | Key | Default | Extra
        let columns = rows
            .iter()
            .map(|row| {
                let cells = row_to_cells(row);
                let text = |idx: usize| cells.get(idx).cloned().flatten().unwrap_or_default();
                ColumnInfo {
                    name: text(0),
                    data_type: text(1),
                    nullable: text(2).eq_ignore_ascii_case("YES"),
                    key: text(3),
                    default: cells.get(4).cloned().flatten(),
                    extra: text(5),
                }
            })
            .collect();

        Ok(columns)
    }

    fn query(&mut self, sql: &str) -> Result<QueryResult> {
        let mut result = self.conn.query_iter(sql)?;
        let columns: Vec<String> = result
            .columns()
            .as_ref()
            .iter()
            .map(|col| col.name_str().to_string())
            .collect();

        let mut rows = Vec::new();
        for row in result.by_ref() {
            rows.push(row_to_cells(&row?));
        }

        Ok(QueryResult::new(columns, rows))
    }

    fn execute(&mut self, sql: &str, params: &[Cell]) -> Result<u64> {
        let values: Vec<Value> = params.iter().map(cell_to_value).collect();
        self.conn.exec_drop(sql, Params::Positional(values))?;
        Ok(self.conn.affected_rows())
    }

    fn execute_raw(&mut self, sql: &str) -> Result<u64> {
        self.conn.query_drop(sql)?;
        Ok(self.conn.affected_rows())
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.query_drop("COMMIT")?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // Anything not committed is rolled back by the server on disconnect.
        self.conn.query_drop("ROLLBACK")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{load_table, run_console, run_statement, DatabaseType};

    fn mysql_integration_enabled() -> bool {
        matches!(
            std::env::var("TUI_CRUD_RUN_MYSQL_INTEGRATION").ok().as_deref(),
            Some("1")
        )
    }

    fn integration_params() -> ConnectionParams {
        ConnectionParams {
            db_type: DatabaseType::MySQL,
            host: std::env::var("TUI_CRUD_TEST_DB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("TUI_CRUD_TEST_DB_PORT").unwrap_or_else(|_| "3306".to_string()),
            user: std::env::var("TUI_CRUD_TEST_DB_USER").unwrap_or_else(|_| "root".to_string()),
            password: std::env::var("TUI_CRUD_TEST_DB_PASSWORD").unwrap_or_default(),
            database: std::env::var("TUI_CRUD_TEST_DB_NAME").unwrap_or_else(|_| "test".to_string()),
        }
    }

    #[test]
    fn converts_wire_values_to_cells() {
        assert_eq!(value_to_cell(&Value::NULL), None);
        assert_eq!(value_to_cell(&Value::Int(-3)), Some("-3".to_string()));
        assert_eq!(value_to_cell(&Value::Bytes(b"Denim".to_vec())), Some("Denim".to_string()));
        assert_eq!(
            value_to_cell(&Value::Date(2025, 3, 28, 0, 0, 0, 0)),
            Some("2025-03-28".to_string())
        );
        assert_eq!(
            value_to_cell(&Value::Date(2025, 3, 28, 9, 5, 0, 0)),
            Some("2025-03-28 09:05:00".to_string())
        );
        assert_eq!(
            value_to_cell(&Value::Time(false, 1, 2, 3, 4, 0)),
            Some("26:03:04".to_string())
        );
    }

    #[test]
    fn rejects_non_numeric_port_before_dialing() {
        let mut params = integration_params();
        params.port = "33o6".to_string();
        let err = MySqlSession::connect(&params).err().expect("port should be rejected");
        assert!(err.to_string().contains("invalid port"));
    }

    #[test]
    fn crud_round_trip_against_live_server() {
        if !mysql_integration_enabled() {
            return;
        }

        let mut session = MySqlSession::connect(&integration_params()).expect("connect");
        session
            .execute_raw("DROP TABLE IF EXISTS tui_crud_items")
            .expect("drop");
        session
            .execute_raw(
                "CREATE TABLE tui_crud_items (\
                 id INT NOT NULL AUTO_INCREMENT PRIMARY KEY,\
                 name VARCHAR(32) NOT NULL,\
                 note VARCHAR(32) NULL)",
            )
            .expect("create");

        let columns = session.describe_table("tui_crud_items").expect("describe");
        assert!(columns[0].is_primary_key());
        assert!(columns[0].is_auto_generated());
        assert!(columns[1].is_required());
        assert!(!columns[2].is_required());

        let insert = statement::insert(
            "tui_crud_items",
            vec![("name".to_string(), Some("Scarf".to_string()))],
        );
        assert_eq!(run_statement(&mut session, &insert).expect("insert"), 1);

        let result = run_console(&mut session, "select name, note from tui_crud_items").expect("select");
        assert_eq!(result.columns, vec!["name", "note"]);
        assert_eq!(result.rows, vec![vec![Some("Scarf".to_string()), None]]);

        let result = run_console(&mut session, "DELETE FROM tui_crud_items").expect("delete");
        assert_eq!(result.rows_affected, Some(1));

        session.execute_raw("DROP TABLE tui_crud_items").expect("cleanup");
    }

    #[test]
    fn reloads_see_rows_committed_by_other_clients() {
        if !mysql_integration_enabled() {
            return;
        }

        let mut reader = MySqlSession::connect(&integration_params()).expect("connect reader");
        let mut writer = MySqlSession::connect(&integration_params()).expect("connect writer");
        writer
            .execute_raw("DROP TABLE IF EXISTS tui_crud_refresh")
            .expect("drop");
        writer
            .execute_raw("CREATE TABLE tui_crud_refresh (id INT PRIMARY KEY, name VARCHAR(16) NOT NULL)")
            .expect("create");
        run_console(&mut writer, "INSERT INTO tui_crud_refresh VALUES (1, 'old')").expect("insert");

        let (_, result) = load_table(&mut reader, "tui_crud_refresh").expect("first load");
        assert_eq!(result.rows[0][1].as_deref(), Some("old"));

        run_console(&mut writer, "UPDATE tui_crud_refresh SET name = 'new' WHERE id = 1").expect("update");
        let (_, result) = load_table(&mut reader, "tui_crud_refresh").expect("reload");
        assert_eq!(result.rows[0][1].as_deref(), Some("new"));

        run_console(&mut writer, "UPDATE tui_crud_refresh SET name = 'newer' WHERE id = 1").expect("update");
        let result = run_console(&mut reader, "SELECT name FROM tui_crud_refresh").expect("console read");
        assert_eq!(result.rows[0][0].as_deref(), Some("newer"));

        // The reader holds no metadata lock, so the drop does not block.
        writer.execute_raw("DROP TABLE tui_crud_refresh").expect("cleanup");
    }
}
