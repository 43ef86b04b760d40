//! Union assembly: one `SELECT` per source table joined with `UNION ALL`,
//! ordered once over the combined rows.

use super::filter::SearchFilter;
use super::pagination::Pagination;
use super::predicate::{table_predicates, BindValue, Fragment};
use super::tables::{SourceTable, NORMALIZED_COLUMNS, SOURCE_TABLES};

/// A finished statement and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl From<Fragment> for CompiledQuery {
    fn from(fragment: Fragment) -> Self {
        let (sql, binds) = fragment.into_parts();
        Self { sql, binds }
    }
}

/// Unioned search over every source table for one filter.
///
/// The count and page queries share the same union, so they always see the
/// same predicate set.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    union: Fragment,
    order_by: &'static str,
}

impl SearchPlan {
    pub fn new(filter: &SearchFilter) -> Self {
        Self::for_tables(&SOURCE_TABLES, filter)
    }

    pub fn for_tables(tables: &[SourceTable], filter: &SearchFilter) -> Self {
        let mut union = Fragment::default();
        for (i, table) in tables.iter().enumerate() {
            if i > 0 {
                union.push_sql(" UNION ALL ");
            }
            union.push(table_select(table, filter));
        }

        Self {
            union,
            order_by: filter.sort.order_by(),
        }
    }

    /// `SELECT COUNT(*)` over the union.
    pub fn count_query(&self) -> CompiledQuery {
        let mut query = Fragment::raw("SELECT COUNT(*) AS total FROM (");
        query.push(self.union.clone());
        query.push_sql(") AS search_results");
        query.into()
    }

    /// One ordered page of the union. Ties on the sort key are broken by
    /// discriminator then id so pages never overlap.
    pub fn page_query(&self, pagination: &Pagination) -> CompiledQuery {
        let mut query = Fragment::raw(format!(
            "SELECT {} FROM (",
            NORMALIZED_COLUMNS.join(", ")
        ));
        query.push(self.union.clone());
        query.push_sql(&format!(
            ") AS search_results ORDER BY {}, source_table ASC, id ASC LIMIT ",
            self.order_by
        ));
        query.push_bind(BindValue::Int(to_i64(pagination.limit)));
        query.push_sql(" OFFSET ");
        query.push_bind(BindValue::Int(to_i64(pagination.offset)));
        query.into()
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn table_select(table: &SourceTable, filter: &SearchFilter) -> Fragment {
    let mut select = Fragment::raw(format!(
        "SELECT {} FROM {}",
        table.projection().join(", "),
        table.from
    ));

    let predicates = table_predicates(table, filter);
    if !predicates.is_empty() {
        select.push_sql(" WHERE ");
        select.push(Fragment::all_of(predicates));
    }
    select
}
