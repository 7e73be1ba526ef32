use crate::query::schema;

/// System instruction for SQL generation. Spells out the ground rules the
/// extractor and validator rely on: one SELECT statement, no commentary,
/// SQLite dialect only.
pub fn system_prompt() -> String {
    format!(
        r#"You are an assistant that generates SQL queries for a SQLite database.
Your task is to convert natural language questions into valid SQL queries.

IMPORTANT RULES:
1. Generate ONLY SELECT queries. Never generate INSERT, UPDATE, DELETE or any other operation that modifies data.
2. Do not use functions or syntax that SQLite does not support.
3. Return ONLY the SQL query, with no extra explanation, comments or markdown formatting.
4. Do not include text such as "Here is the SQL query:" or any other introduction.
5. Do not include your reasoning or thought process.
6. Always check that the tables and columns you reference exist in the schema below.
7. Use table aliases when they make the query clearer.

Here is the database schema:

{}"#,
        schema::table_definitions()
    )
}

/// User turn for a single question. Repeats the schema and the key
/// constraints; small local models follow them more reliably when they
/// appear in both turns.
pub fn user_prompt(question: &str) -> String {
    format!(
        r#"Based on the following database schema:

{}

Generate a SQL query that answers this question: "{}"

Remember:
- Return ONLY the SQL query, with no explanation
- Use SELECT statements only (never INSERT, UPDATE or DELETE)
- Do not use functions that SQLite does not support"#,
        schema::table_definitions(),
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_embeds_the_schema() {
        let text = system_prompt();
        assert!(text.contains("CREATE TABLE IF NOT EXISTS drivers"));
        assert!(text.contains("CREATE TABLE IF NOT EXISTS positions"));
    }

    #[test]
    fn system_prompt_states_the_select_only_rule() {
        let text = system_prompt();
        assert!(text.contains("ONLY SELECT queries"));
        assert!(text.contains("markdown"));
    }

    #[test]
    fn user_prompt_quotes_the_question() {
        let text = user_prompt("which device moved fastest today?");
        assert!(text.contains("\"which device moved fastest today?\""));
        assert!(text.contains("CREATE TABLE IF NOT EXISTS devices"));
    }
}
