//! The record form behind "Add Record" and "Edit Record": which fields it
//! shows, how they are labelled, and what statement a submission becomes.

use thiserror::Error;

use crate::db::{primary_key_index, statement, Cell, ColumnInfo, Statement};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Please fill in required fields: {}", .0.join(", "))]
    MissingRequired(Vec<String>),
    #[error("Please enter data for at least one field.")]
    NoData,
    #[error("Could not identify primary key for this table.")]
    NoPrimaryKey,
    #[error("Please select a record first.")]
    NoSelection,
    #[error("No changes to save.")]
    NoChanges,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Add,
    /// Edit the row whose key column held `key_value` when it was selected.
    Edit { key_column: String, key_value: Cell },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub column: ColumnInfo,
    pub value: String,
    pub read_only: bool,
    /// The cell the field was pre-filled from. `None` on the add form.
    pub original: Option<Cell>,
}

impl FormField {
    pub fn label(&self, mode: &FormMode) -> String {
        let mut label = format!("{} ({})", self.column.name, self.column.data_type);
        if matches!(mode, FormMode::Edit { .. }) && self.column.is_primary_key() {
            label.push_str(" [PK]");
        }
        if self.column.is_required() {
            label.push_str(" *");
        }
        label
    }

    fn is_blank(&self) -> bool {
        self.value.is_empty()
    }

    /// Whether the text differs from what the form opened with. NULL and
    /// `''` both open as an empty field, so neither counts as changed
    /// until the user types.
    pub fn is_changed(&self) -> bool {
        match &self.original {
            Some(cell) => self.value != cell.as_deref().unwrap_or(""),
            None => !self.is_blank(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordForm {
    pub table: String,
    pub mode: FormMode,
    pub fields: Vec<FormField>,
    pub active: usize,
}

impl RecordForm {
    /// Every column except the auto-generated ones, all blank.
    pub fn for_add(table: &str, columns: &[ColumnInfo]) -> Self {
        let fields = columns
            .iter()
            .filter(|c| !c.is_auto_generated())
            .map(|c| FormField {
                column: c.clone(),
                value: String::new(),
                read_only: false,
                original: None,
            })
            .collect();

        Self {
            table: table.to_string(),
            mode: FormMode::Add,
            fields,
            active: 0,
        }
    }

    /// Every column, pre-filled from `row`, with key and binary columns locked.
    /// The key value is captured now so later edits to the grid can't
    /// retarget it.
    pub fn for_edit(table: &str, columns: &[ColumnInfo], row: &[Cell]) -> Result<Self, FormError> {
        let key_idx = primary_key_index(columns).ok_or(FormError::NoPrimaryKey)?;
        let key_value = row.get(key_idx).cloned().ok_or(FormError::NoSelection)?;

        let fields = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let original = row.get(i).cloned().flatten();
                FormField {
                    column: c.clone(),
                    value: original.clone().unwrap_or_default(),
                    read_only: c.is_primary_key() || c.is_binary(),
                    original: Some(original),
                }
            })
            .collect();

        let mut form = Self {
            table: table.to_string(),
            mode: FormMode::Edit {
                key_column: columns[key_idx].name.clone(),
                key_value,
            },
            fields,
            active: 0,
        };
        form.active = form.first_editable().unwrap_or(0);
        Ok(form)
    }

    pub fn title(&self) -> String {
        match self.mode {
            FormMode::Add => format!("Add Record to {}", self.table),
            FormMode::Edit { .. } => format!("Edit Record in {}", self.table),
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add Record",
            FormMode::Edit { .. } => "Update Record",
        }
    }

    fn first_editable(&self) -> Option<usize> {
        self.fields.iter().position(|f| !f.read_only)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.active) {
            if !field.read_only {
                field.value.push(c);
            }
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            if !field.read_only {
                field.value.pop();
            }
        }
    }

    pub fn set_value(&mut self, column: &str, value: &str) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.column.name == column) {
            field.value = value.to_string();
        }
    }

    /// Required fields left blank, in column order. When editing only the
    /// fields the user cleared count, since untouched ones are not written.
    pub fn missing_required(&self) -> Vec<String> {
        let adding = matches!(self.mode, FormMode::Add);
        self.fields
            .iter()
            .filter(|f| f.column.is_required() && !f.read_only && f.is_blank())
            .filter(|f| adding || f.is_changed())
            .map(|f| f.column.name.clone())
            .collect()
    }

    /// Validates the form and turns it into the statement to run.
    pub fn to_statement(&self) -> Result<Statement, FormError> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(FormError::MissingRequired(missing));
        }

        match &self.mode {
            FormMode::Add => {
                // Blank fields are left out so the column default applies.
                let values: Vec<(String, Cell)> = self
                    .fields
                    .iter()
                    .filter(|f| !f.is_blank())
                    .map(|f| (f.column.name.clone(), Some(f.value.clone())))
                    .collect();
                if values.is_empty() {
                    return Err(FormError::NoData);
                }
                Ok(statement::insert(&self.table, values))
            }
            FormMode::Edit {
                key_column,
                key_value,
            } => {
                // Only changed fields are written, so untouched cells keep
                // their stored value and type.
                let values: Vec<(String, Cell)> = self
                    .fields
                    .iter()
                    .filter(|f| !f.read_only && &f.column.name != key_column && f.is_changed())
                    .map(|f| {
                        let value = if f.is_blank() && f.column.nullable {
                            None
                        } else {
                            Some(f.value.clone())
                        };
                        (f.column.name.clone(), value)
                    })
                    .collect();
                if values.is_empty() {
                    return Err(FormError::NoChanges);
                }
                Ok(statement::update(&self.table, values, key_column, key_value.clone()))
            }
        }
    }
}

/// The `DELETE` for `row` plus the `pk=value` text used in the confirmation.
pub fn delete_statement(
    table: &str,
    columns: &[ColumnInfo],
    row: &[Cell],
) -> Result<(Statement, String), FormError> {
    let key_idx = primary_key_index(columns).ok_or(FormError::NoPrimaryKey)?;
    let key_value = row.get(key_idx).cloned().ok_or(FormError::NoSelection)?;
    let key_column = &columns[key_idx].name;
    let description = format!("{}={}", key_column, crate::db::display_cell(&key_value));
    Ok((statement::delete(table, key_column, key_value), description))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: &str, nullable: bool, key: &str, extra: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable,
            key: key.to_string(),
            default: None,
            extra: extra.to_string(),
        }
    }

    fn customer_columns() -> Vec<ColumnInfo> {
        vec![
            column("customer_id", "int", false, "PRI", "auto_increment"),
            column("first_name", "varchar(50)", false, "", ""),
            column("email", "varchar(100)", true, "UNI", ""),
            column("loyalty_points", "int", true, "", ""),
        ]
    }

    fn text(v: &str) -> Cell {
        Some(v.to_string())
    }

    #[test]
    fn add_form_omits_exactly_the_auto_generated_columns() {
        let form = RecordForm::for_add("customer", &customer_columns());
        let names: Vec<_> = form.fields.iter().map(|f| f.column.name.as_str()).collect();
        assert_eq!(names, vec!["first_name", "email", "loyalty_points"]);
        assert!(form.fields.iter().all(|f| !f.read_only));
        assert_eq!(form.title(), "Add Record to customer");
    }

    #[test]
    fn add_form_rejects_blank_required_fields() {
        let mut form = RecordForm::for_add("customer", &customer_columns());
        form.set_value("email", "a@b.c");
        let err = form.to_statement().unwrap_err();
        assert_eq!(err, FormError::MissingRequired(vec!["first_name".to_string()]));
        assert_eq!(err.to_string(), "Please fill in required fields: first_name");
    }

    #[test]
    fn add_form_needs_at_least_one_value() {
        let columns = vec![
            column("id", "int", false, "PRI", "auto_increment"),
            column("note", "text", true, "", ""),
        ];
        let form = RecordForm::for_add("notes", &columns);
        assert_eq!(form.to_statement().unwrap_err(), FormError::NoData);
    }

    #[test]
    fn add_form_inserts_only_filled_fields_and_keeps_zero() {
        let mut form = RecordForm::for_add("customer", &customer_columns());
        form.set_value("first_name", "Ada");
        form.set_value("loyalty_points", "0");
        let stmt = form.to_statement().unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `customer` (`first_name`, `loyalty_points`) VALUES (?, ?)"
        );
        assert_eq!(stmt.params, vec![text("Ada"), text("0")]);
    }

    #[test]
    fn labels_mark_required_and_key_columns() {
        let columns = customer_columns();
        let row = vec![text("5"), text("Ada"), None, text("10")];
        let form = RecordForm::for_edit("customer", &columns, &row).unwrap();
        assert_eq!(form.fields[0].label(&form.mode), "customer_id (int) [PK] *");
        assert_eq!(form.fields[1].label(&form.mode), "first_name (varchar(50)) *");
        assert_eq!(form.fields[2].label(&form.mode), "email (varchar(100))");

        let add = RecordForm::for_add("customer", &columns);
        assert_eq!(add.fields[0].label(&add.mode), "first_name (varchar(50)) *");
    }

    #[test]
    fn edit_form_locks_key_and_targets_captured_value() {
        let columns = customer_columns();
        let row = vec![text("5"), text("Ada"), None, text("10")];
        let mut form = RecordForm::for_edit("customer", &columns, &row).unwrap();

        assert!(form.fields[0].read_only);
        assert_eq!(form.active, 1);
        assert_eq!(form.fields[2].value, "");

        // Typing into the key field is ignored.
        form.active = 0;
        form.insert_char('9');
        assert_eq!(form.fields[0].value, "5");

        form.set_value("first_name", "Grace");
        form.set_value("loyalty_points", "");
        let stmt = form.to_statement().unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE `customer` SET `first_name` = ?, `loyalty_points` = ? WHERE `customer_id` = ?"
        );
        assert_eq!(stmt.params, vec![text("Grace"), None, text("5")]);
    }

    #[test]
    fn edit_form_writes_only_changed_fields() {
        let columns = customer_columns();
        let row = vec![text("5"), text("Ada"), text(""), None];
        let mut form = RecordForm::for_edit("customer", &columns, &row).unwrap();
        assert_eq!(form.to_statement().unwrap_err(), FormError::NoChanges);

        // Retyping the stored value is not a change.
        form.set_value("first_name", "Ad");
        form.insert_char('a');
        assert_eq!(form.to_statement().unwrap_err(), FormError::NoChanges);

        // '' and NULL both open blank and stay out of the update.
        form.set_value("first_name", "Grace");
        let stmt = form.to_statement().unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE `customer` SET `first_name` = ? WHERE `customer_id` = ?"
        );
        assert_eq!(stmt.params, vec![text("Grace"), text("5")]);

        // Clearing a stored '' on a nullable column is no change either.
        form.set_value("email", "");
        assert_eq!(form.to_statement().unwrap().params.len(), 2);

        form.set_value("loyalty_points", "7");
        assert_eq!(
            form.to_statement().unwrap().params,
            vec![text("Grace"), text("7"), text("5")]
        );
    }

    #[test]
    fn edit_form_locks_binary_columns() {
        let columns = vec![
            column("id", "INTEGER", false, "PRI", "auto_increment"),
            column("title", "TEXT", true, "", ""),
            column("data", "BLOB", true, "", ""),
            column("digest", "varbinary(32)", false, "", ""),
        ];
        let row = vec![text("1"), text("logo"), text("<BLOB: 4 bytes>"), text("\u{fffd}P")];
        let mut form = RecordForm::for_edit("img", &columns, &row).unwrap();
        assert!(form.fields[2].read_only);
        assert!(form.fields[3].read_only);

        form.active = 2;
        form.delete_char();
        assert_eq!(form.fields[2].value, "<BLOB: 4 bytes>");

        form.set_value("title", "banner");
        let stmt = form.to_statement().unwrap();
        assert_eq!(stmt.sql, "UPDATE `img` SET `title` = ? WHERE `id` = ?");
    }

    #[test]
    fn edit_form_ignores_untouched_blank_required_field() {
        let columns = vec![
            column("id", "int", false, "PRI", ""),
            column("code", "varchar(8)", false, "", ""),
            column("label", "varchar(8)", true, "", ""),
        ];
        let row = vec![text("1"), text(""), None];
        let mut form = RecordForm::for_edit("t", &columns, &row).unwrap();
        form.set_value("label", "x");
        let stmt = form.to_statement().unwrap();
        assert_eq!(stmt.sql, "UPDATE `t` SET `label` = ? WHERE `id` = ?");
    }

    #[test]
    fn edit_form_rejects_blank_required_non_key_field() {
        let columns = customer_columns();
        let row = vec![text("5"), text("Ada"), None, None];
        let mut form = RecordForm::for_edit("customer", &columns, &row).unwrap();
        form.set_value("first_name", "");
        assert_eq!(
            form.to_statement().unwrap_err(),
            FormError::MissingRequired(vec!["first_name".to_string()])
        );
    }

    #[test]
    fn edit_and_delete_need_a_primary_key() {
        let columns = vec![column("name", "text", false, "", "")];
        let row = vec![text("x")];
        assert_eq!(
            RecordForm::for_edit("t", &columns, &row).unwrap_err(),
            FormError::NoPrimaryKey
        );
        assert_eq!(delete_statement("t", &columns, &row).unwrap_err(), FormError::NoPrimaryKey);
    }

    #[test]
    fn first_pri_column_keys_the_delete() {
        let columns = vec![
            column("order_id", "int", false, "PRI", ""),
            column("line_no", "int", false, "PRI", ""),
        ];
        let row = vec![text("12"), text("3")];
        let (stmt, description) = delete_statement("order_line", &columns, &row).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `order_line` WHERE `order_id` = ?");
        assert_eq!(stmt.params, vec![text("12")]);
        assert_eq!(description, "order_id=12");
    }

    #[test]
    fn field_navigation_wraps() {
        let mut form = RecordForm::for_add("customer", &customer_columns());
        form.prev_field();
        assert_eq!(form.active, 2);
        form.next_field();
        assert_eq!(form.active, 0);
        form.insert_char('A');
        form.insert_char('l');
        form.delete_char();
        assert_eq!(form.fields[0].value, "A");
    }
}
