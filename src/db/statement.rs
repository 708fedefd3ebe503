//! SQL text for the table operations. Identifiers are backtick-quoted (both
//! MySQL and SQLite accept that); values always travel as `?` parameters.

use super::connection::Cell;

/// A statement plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Cell>,
}

pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// The console's read/write split: anything starting with `select`.
pub fn is_read_query(sql: &str) -> bool {
    let trimmed = sql.trim_start();
    trimmed
        .get(..6)
        .map(|head| head.eq_ignore_ascii_case("select"))
        .unwrap_or(false)
}

pub fn describe_sql(table: &str) -> String {
    format!("DESCRIBE {}", quote_identifier(table))
}

pub fn select_all_sql(table: &str) -> String {
    format!("SELECT * FROM {}", quote_identifier(table))
}

pub fn insert(table: &str, values: Vec<(String, Cell)>) -> Statement {
    let columns: Vec<String> = values.iter().map(|(c, _)| quote_identifier(c)).collect();
    let placeholders = vec!["?"; values.len()];
    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(table),
            columns.join(", "),
            placeholders.join(", ")
        ),
        params: values.into_iter().map(|(_, v)| v).collect(),
    }
}

pub fn update(table: &str, values: Vec<(String, Cell)>, key_column: &str, key_value: Cell) -> Statement {
    let set_clauses: Vec<String> = values
        .iter()
        .map(|(c, _)| format!("{} = ?", quote_identifier(c)))
        .collect();
    let mut params: Vec<Cell> = values.into_iter().map(|(_, v)| v).collect();
    params.push(key_value);
    Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote_identifier(table),
            set_clauses.join(", "),
            quote_identifier(key_column)
        ),
        params,
    }
}

pub fn delete(table: &str, key_column: &str, key_value: Cell) -> Statement {
    Statement {
        sql: format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_identifier(table),
            quote_identifier(key_column)
        ),
        params: vec![key_value],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(v: &str) -> Cell {
        Some(v.to_string())
    }

    #[test]
    fn quotes_identifiers_with_backticks() {
        assert_eq!(quote_identifier("customers"), "`customers`");
        assert_eq!(quote_identifier("odd`name"), "`odd``name`");
    }

    #[test]
    fn read_query_detection_is_case_insensitive_and_trimmed() {
        assert!(is_read_query("SELECT * FROM product"));
        assert!(is_read_query("   select 1"));
        assert!(is_read_query("\n\tSeLeCt name FROM customer"));
        assert!(!is_read_query("UPDATE product SET price = 1"));
        assert!(!is_read_query("SHOW TABLES"));
        assert!(!is_read_query("sel"));
        assert!(!is_read_query(""));
    }

    #[test]
    fn insert_uses_one_placeholder_per_value() {
        let stmt = insert(
            "product",
            vec![("name".into(), text("Shirt")), ("price".into(), text("19.99"))],
        );
        assert_eq!(stmt.sql, "INSERT INTO `product` (`name`, `price`) VALUES (?, ?)");
        assert_eq!(stmt.params, vec![text("Shirt"), text("19.99")]);
    }

    #[test]
    fn update_binds_key_value_last() {
        let stmt = update(
            "product",
            vec![("name".into(), text("Hat")), ("size".into(), None)],
            "product_id",
            text("7"),
        );
        assert_eq!(
            stmt.sql,
            "UPDATE `product` SET `name` = ?, `size` = ? WHERE `product_id` = ?"
        );
        assert_eq!(stmt.params, vec![text("Hat"), None, text("7")]);
    }

    #[test]
    fn delete_targets_key_column() {
        let stmt = delete("orders", "order_id", text("42"));
        assert_eq!(stmt.sql, "DELETE FROM `orders` WHERE `order_id` = ?");
        assert_eq!(stmt.params, vec![text("42")]);
    }

    #[test]
    fn select_and_describe_quote_the_table() {
        assert_eq!(select_all_sql("order items"), "SELECT * FROM `order items`");
        assert_eq!(describe_sql("customer"), "DESCRIBE `customer`");
    }
}
