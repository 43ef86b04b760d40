//! Predicate fragments with their positional parameters.
//!
//! SQL text and bind values travel together in a [`Fragment`] and are only
//! joined into a statement at the very end, so the number of `?` placeholders
//! always equals the number of values.

use chrono::NaiveDateTime;

use super::filter::{DateRange, SearchFilter, UpperBound};
use super::tables::SourceTable;

/// A positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Int(i64),
    DateTime(NaiveDateTime),
}

/// SQL text plus the values for the placeholders it contains, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    sql: String,
    binds: Vec<BindValue>,
}

/// Matches nothing. Used when a table lacks a column a filter requires.
pub const MATCH_NOTHING: &str = "1 = 0";

impl Fragment {
    fn new(sql: String, binds: Vec<BindValue>) -> Self {
        debug_assert_eq!(placeholder_count(&sql), binds.len(), "{sql}");
        Self { sql, binds }
    }

    /// Parameterless SQL. Must not contain placeholders.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql.into(), Vec::new())
    }

    /// `(a LIKE ? OR b LIKE ?)` over every field, sharing one pattern.
    pub fn like_any(fields: &[&str], pattern: &str) -> Self {
        let sql = fields
            .iter()
            .map(|field| format!("{field} LIKE ?"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let binds = fields
            .iter()
            .map(|_| BindValue::Text(pattern.to_string()))
            .collect();
        Self::new(format!("({sql})"), binds)
    }

    /// `(COALESCE(a, '') NOT LIKE ? AND ...)`; a `NULL` field never contains
    /// the excluded term.
    pub fn not_like_all(fields: &[&str], pattern: &str) -> Self {
        let sql = fields
            .iter()
            .map(|field| format!("COALESCE({field}, '') NOT LIKE ?"))
            .collect::<Vec<_>>()
            .join(" AND ");
        let binds = fields
            .iter()
            .map(|_| BindValue::Text(pattern.to_string()))
            .collect();
        Self::new(format!("({sql})"), binds)
    }

    /// `column IN (?, ?, ...)`. An empty list matches nothing.
    pub fn in_list(column: &str, values: &[String]) -> Self {
        if values.is_empty() {
            return Self::raw(MATCH_NOTHING);
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        let binds = values.iter().cloned().map(BindValue::Text).collect();
        Self::new(format!("{column} IN ({placeholders})"), binds)
    }

    /// `column <op> ?` against a timestamp.
    pub fn compare(column: &str, op: &str, value: NaiveDateTime) -> Self {
        Self::new(format!("{column} {op} ?"), vec![BindValue::DateTime(value)])
    }

    /// Parenthesized disjunction. An empty list matches nothing.
    pub fn any_of(parts: Vec<Fragment>) -> Self {
        Self::join(parts, " OR ", MATCH_NOTHING)
    }

    /// Parenthesized conjunction. An empty list matches everything.
    pub fn all_of(parts: Vec<Fragment>) -> Self {
        Self::join(parts, " AND ", "1 = 1")
    }

    fn join(parts: Vec<Fragment>, separator: &str, empty: &str) -> Self {
        if parts.is_empty() {
            return Self::raw(empty);
        }
        let mut sql = Vec::with_capacity(parts.len());
        let mut binds = Vec::new();
        for part in parts {
            sql.push(part.sql);
            binds.extend(part.binds);
        }
        Self::new(format!("({})", sql.join(separator)), binds)
    }

    /// Append raw SQL text.
    pub fn push_sql(&mut self, sql: &str) {
        debug_assert_eq!(placeholder_count(sql), 0, "{sql}");
        self.sql.push_str(sql);
    }

    /// Append another fragment, text and values both.
    pub fn push(&mut self, other: Fragment) {
        self.sql.push_str(&other.sql);
        self.binds.extend(other.binds);
    }

    /// Append a single placeholder and its value.
    pub fn push_bind(&mut self, value: BindValue) {
        self.sql.push('?');
        self.binds.push(value);
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }

    pub fn into_parts(self) -> (String, Vec<BindValue>) {
        (self.sql, self.binds)
    }
}

pub fn placeholder_count(sql: &str) -> usize {
    sql.matches('?').count()
}

/// Escape LIKE metacharacters so a term only ever matches literally.
///
/// MySQL treats backslash as the default LIKE escape character.
pub fn escape_like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        match ch {
            '\\' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// `%term%` with metacharacters escaped.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like_pattern(term))
}

/// Every predicate the filter imposes on one source table, in a stable order.
pub fn table_predicates(table: &SourceTable, filter: &SearchFilter) -> Vec<Fragment> {
    let fields = &table.text_fields[..];
    let mut predicates = Vec::new();

    if !filter.words.is_empty() {
        predicates.push(Fragment::any_of(
            filter
                .words
                .iter()
                .map(|word| Fragment::like_any(fields, &contains_pattern(word)))
                .collect(),
        ));
    }

    if let Some(phrase) = &filter.phrase {
        predicates.push(Fragment::like_any(fields, &contains_pattern(phrase)));
    }

    if !filter.any_words.is_empty() {
        predicates.push(Fragment::any_of(
            filter
                .any_words
                .iter()
                .map(|word| Fragment::like_any(fields, &contains_pattern(word)))
                .collect(),
        ));
    }

    for word in &filter.exclude_words {
        predicates.push(Fragment::not_like_all(fields, &contains_pattern(word)));
    }

    if !filter.categories.is_empty() {
        predicates.push(match table.category {
            Some(column) => Fragment::in_list(column, &filter.categories),
            None => Fragment::raw(MATCH_NOTHING),
        });
    }

    if filter.include_external_sources {
        predicates.push(match table.external_source {
            Some(column) => Fragment::raw(format!("({column} IS NOT NULL AND {column} <> '')")),
            None => Fragment::raw(MATCH_NOTHING),
        });
    }

    predicates.extend(range_predicates(table.created_at, &filter.created));

    // Tables without a publish column are not constrained by publish bounds.
    if let Some(column) = table.scheduled_publish_time {
        predicates.extend(range_predicates(column, &filter.published));
    }

    predicates
}

fn range_predicates(column: &str, range: &DateRange) -> Vec<Fragment> {
    let mut predicates = Vec::new();
    if let Some(start) = range.start {
        predicates.push(Fragment::compare(column, ">=", start));
    }
    match range.end {
        Some(UpperBound::Inclusive(end)) => predicates.push(Fragment::compare(column, "<=", end)),
        Some(UpperBound::Exclusive(end)) => predicates.push(Fragment::compare(column, "<", end)),
        None => {}
    }
    predicates
}
