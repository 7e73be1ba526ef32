use crate::db::migrate::DB_SCHEMA;

/// Renders the CREATE TABLE statements from the canonical schema as prompt
/// text. Non-table statements are dropped so the model only sees column
/// definitions.
pub fn table_definitions() -> String {
    let tables: Vec<&str> = DB_SCHEMA
        .split(';')
        .filter(|statement| statement.to_uppercase().contains("CREATE TABLE"))
        .map(str::trim)
        .collect();

    format!("{};", tables.join(";\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_every_table() {
        let text = table_definitions();
        assert!(text.contains("CREATE TABLE IF NOT EXISTS drivers"));
        assert!(text.contains("CREATE TABLE IF NOT EXISTS devices"));
        assert!(text.contains("CREATE TABLE IF NOT EXISTS positions"));
    }

    #[test]
    fn statements_are_separated_and_terminated() {
        let text = table_definitions();
        assert_eq!(text.matches(";\n\n").count(), 2);
        assert!(text.ends_with(';'));
        assert!(!text.starts_with(char::is_whitespace));
    }

    #[test]
    fn keeps_column_and_constraint_lines() {
        let text = table_definitions();
        assert!(text.contains("latitude REAL NOT NULL"));
        assert!(text.contains("FOREIGN KEY (driver_id) REFERENCES drivers(id)"));
    }
}
