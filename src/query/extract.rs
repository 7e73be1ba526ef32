/// Strips markdown code fence markers from a completion. Tagged openers go
/// first so a bare `"```"` pass cannot leave the `sql` tag behind.
pub fn remove_markdown_formatting(text: &str) -> String {
    text.replace("```sql\n", "")
        .replace("```sql", "")
        .replace("```\n", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Pulls the first SELECT statement out of a model completion.
///
/// The scan is line oriented: the statement starts at the first line whose
/// trimmed text begins with SELECT, and continues over following non-blank
/// lines, joined with single spaces, until a blank line or the end of the
/// text. A SELECT that starts mid-line is never picked up. If no line
/// matches but the whole cleaned text begins with SELECT, the whole text is
/// returned.
pub fn extract_sql_query(text: &str) -> Option<String> {
    let clean = remove_markdown_formatting(text);
    let lines: Vec<&str> = clean.lines().collect();

    for (index, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.to_uppercase().starts_with("SELECT") {
            let mut sql = line.to_string();
            for next in &lines[index + 1..] {
                let next = next.trim();
                if next.is_empty() {
                    break;
                }
                sql.push(' ');
                sql.push_str(next);
            }
            return Some(sql);
        }
    }

    if clean.to_uppercase().starts_with("SELECT") {
        return Some(clean);
    }

    None
}
