use std::fmt;

use crate::query::QueryError;

/// Substrings that mark a statement as mutating. Matched against the
/// lowercased statement, so quoted occurrences are rejected too; the scan
/// deliberately trades false positives for never executing a write.
const FORBIDDEN_KEYWORDS: [&str; 9] = [
    "insert into",
    "update ",
    "delete from",
    "drop table",
    "drop database",
    "truncate table",
    "alter table",
    "create table",
    "create database",
];

/// A statement that has passed the read-only check. Construction goes
/// through [`validate`]; nothing else hands SQL to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSql(String);

impl ValidatedSql {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks that a candidate statement is a plain SELECT with no mutation
/// keywords. The checks run in a fixed order: emptiness, then the SELECT
/// prefix, then the keyword scan.
pub fn validate(candidate: &str) -> Result<ValidatedSql, QueryError> {
    if candidate.trim().is_empty() {
        return Err(QueryError::EmptyQuery);
    }

    let normalized = candidate.trim().to_lowercase();
    if !normalized.starts_with("select") {
        return Err(QueryError::NotSelect);
    }

    for keyword in FORBIDDEN_KEYWORDS {
        if normalized.contains(keyword) {
            return Err(QueryError::ForbiddenKeyword(keyword));
        }
    }

    Ok(ValidatedSql(candidate.to_string()))
}

/// Predicate form of [`validate`].
pub fn is_select_query(candidate: &str) -> bool {
    validate(candidate).is_ok()
}
