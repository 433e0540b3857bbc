//! Search/sort/pagination query construction.
//!
//! Accumulates WHERE/ORDER BY fragments plus positional parameter
//! values, then renders a windowed data query and its companion
//! count query for the deployed placeholder dialect. Only
//! allow-listed column names ever appear literally in the SQL text;
//! every user-supplied value travels through a bound parameter.

/// Fixed page size for contact listings.
pub const PAGE_SIZE: u32 = 5;

/// Columns that may appear literally in an ORDER BY clause.
const SORTABLE_COLUMNS: [&str; 3] = ["name", "email", "created_at"];

/// Placeholder syntax of the deployed backend.
///
/// Chosen once per deployment, never mixed within a build. The
/// builder runs one algorithm for both; only marker rendering
/// differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Unnumbered sequential markers (`?`), MySQL/SQLite style.
    Sequential,
    /// Explicit 1-based numbered markers (`$1`, `$2`, ...), Postgres style.
    Numbered,
}

impl Dialect {
    /// Render the marker for the `n`th parameter (1-based).
    fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::Sequential => "?".to_string(),
            Dialect::Numbered => format!("${n}"),
        }
    }
}

/// Sort direction. Anything that is not "desc" sorts ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("desc") => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Parse a 1-based page number leniently: non-numeric or sub-1
/// input degrades to page 1 rather than erroring.
pub fn parse_page(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&page| page >= 1)
        .unwrap_or(1)
}

/// Request-scoped search/sort/pagination parameters.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub keyword: Option<String>,
    pub sort: Option<String>,
    pub order: SortOrder,
    pub page: u32,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            keyword: None,
            sort: None,
            order: SortOrder::Ascending,
            page: 1,
        }
    }
}

/// A positional parameter value accompanying rendered SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
}

/// Rendered queries plus their parallel parameter lists.
///
/// `count_params` binds the count query; `data_params` is the same
/// filter values followed by limit and offset for the windowed
/// query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub data_query: String,
    pub count_query: String,
    pub count_params: Vec<SqlParam>,
    pub data_params: Vec<SqlParam>,
}

/// Stateful builder over a base `SELECT ... WHERE 1=1` predicate.
///
/// Filter, sort, and window fragments are held separately so the
/// chained operations compose in any order; `build` assembles them
/// in SQL clause order.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    dialect: Dialect,
    base: String,
    filter: String,
    order_by: Option<String>,
    params: Vec<SqlParam>,
    page: u32,
}

impl QueryBuilder {
    pub fn new(base: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            dialect,
            base: base.into(),
            filter: String::new(),
            order_by: None,
            params: Vec::new(),
            page: 1,
        }
    }

    /// Append the case-insensitive keyword filter, if any.
    ///
    /// Both sides are lowered so search behaves identically on
    /// backends with and without a case-insensitive LIKE operator.
    /// Pushes the wildcarded keyword twice, once per column.
    pub fn search(mut self, keyword: Option<&str>) -> Self {
        if let Some(keyword) = keyword.map(str::trim).filter(|k| !k.is_empty()) {
            let name_marker = self.dialect.placeholder(self.params.len() + 1);
            let email_marker = self.dialect.placeholder(self.params.len() + 2);
            self.filter.push_str(&format!(
                " AND (LOWER(name) LIKE {name_marker} OR LOWER(email) LIKE {email_marker})"
            ));

            let pattern = format!("%{}%", keyword.to_lowercase());
            self.params.push(SqlParam::Text(pattern.clone()));
            self.params.push(SqlParam::Text(pattern));
        }
        self
    }

    /// Request an ORDER BY on an allow-listed column.
    ///
    /// Unknown columns are silently ignored (no clause at all), so
    /// user input can never smuggle arbitrary SQL into the sort.
    pub fn sort(mut self, column: Option<&str>, order: SortOrder) -> Self {
        if let Some(column) = column {
            if SORTABLE_COLUMNS.contains(&column) {
                self.order_by = Some(format!(" ORDER BY {} {}", column, order.as_sql()));
            }
        }
        self
    }

    /// Fix the page window. Pages below 1 are treated as page 1 so
    /// the offset can never go negative.
    pub fn pagination(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Apply a whole spec in the conventional search/sort/pagination order.
    pub fn apply(self, spec: &QuerySpec) -> Self {
        self.search(spec.keyword.as_deref())
            .sort(spec.sort.as_deref(), spec.order)
            .pagination(spec.page)
    }

    /// Render both queries and their parameter lists.
    ///
    /// The parameter counter keeps running past the filter values,
    /// so numbered markers for limit/offset stay correct no matter
    /// how many search parameters preceded them. The count query
    /// wraps the filtered-but-unwindowed predicate.
    pub fn build(self) -> BuiltQuery {
        let offset = u64::from(PAGE_SIZE) * u64::from(self.page - 1);
        let limit_marker = self.dialect.placeholder(self.params.len() + 1);
        let offset_marker = self.dialect.placeholder(self.params.len() + 2);

        let filtered = format!("{}{}", self.base, self.filter);
        let order_by = self.order_by.as_deref().unwrap_or("");

        let data_query =
            format!("{filtered}{order_by} LIMIT {limit_marker} OFFSET {offset_marker}");
        let count_query = format!("SELECT COUNT(*) AS total FROM ({filtered}) AS count_rows");

        let count_params = self.params.clone();
        let mut data_params = self.params;
        data_params.push(SqlParam::Int(i64::from(PAGE_SIZE)));
        data_params.push(SqlParam::Int(offset as i64));

        BuiltQuery {
            data_query,
            count_query,
            count_params,
            data_params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "SELECT * FROM contacts WHERE 1=1";

    #[test]
    fn offset_follows_page() {
        for (page, offset) in [(1, 0i64), (2, 5), (4, 15)] {
            let built = QueryBuilder::new(BASE, Dialect::Numbered)
                .pagination(page)
                .build();
            assert_eq!(
                built.data_params,
                vec![SqlParam::Int(5), SqlParam::Int(offset)]
            );
        }
    }

    #[test]
    fn page_zero_clamps_to_one() {
        let built = QueryBuilder::new(BASE, Dialect::Numbered)
            .pagination(0)
            .build();
        assert_eq!(built.data_params, vec![SqlParam::Int(5), SqlParam::Int(0)]);
    }

    #[test]
    fn parse_page_degrades_to_default() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-2")), 1);
        assert_eq!(parse_page(Some("3")), 3);
    }

    #[test]
    fn search_parameterizes_keyword_twice() {
        let built = QueryBuilder::new(BASE, Dialect::Numbered)
            .search(Some("alice"))
            .build();
        assert_eq!(
            built.count_params,
            vec![
                SqlParam::Text("%alice%".into()),
                SqlParam::Text("%alice%".into())
            ]
        );
        assert!(built
            .data_query
            .contains("(LOWER(name) LIKE $1 OR LOWER(email) LIKE $2)"));
    }

    #[test]
    fn search_lowercases_pattern() {
        let built = QueryBuilder::new(BASE, Dialect::Numbered)
            .search(Some("Alice"))
            .build();
        assert_eq!(built.count_params[0], SqlParam::Text("%alice%".into()));
    }

    #[test]
    fn blank_keyword_adds_nothing() {
        let built = QueryBuilder::new(BASE, Dialect::Numbered)
            .search(Some("   "))
            .build();
        assert!(built.count_params.is_empty());
        assert_eq!(built.count_query, format!("SELECT COUNT(*) AS total FROM ({BASE}) AS count_rows"));
    }

    #[test]
    fn numbered_markers_keep_counting_past_search() {
        let built = QueryBuilder::new(BASE, Dialect::Numbered)
            .search(Some("alice"))
            .pagination(2)
            .build();
        assert!(built.data_query.ends_with("LIMIT $3 OFFSET $4"));
        assert_eq!(built.data_params.len(), 4);
    }

    #[test]
    fn sequential_markers_are_unnumbered() {
        let built = QueryBuilder::new(BASE, Dialect::Sequential)
            .search(Some("alice"))
            .build();
        assert!(built
            .data_query
            .contains("(LOWER(name) LIKE ? OR LOWER(email) LIKE ?)"));
        assert!(built.data_query.ends_with("LIMIT ? OFFSET ?"));
    }

    #[test]
    fn sort_accepts_allow_listed_columns_only() {
        let built = QueryBuilder::new(BASE, Dialect::Numbered)
            .sort(Some("email"), SortOrder::Descending)
            .build();
        assert!(built.data_query.contains("ORDER BY email DESC"));

        let built = QueryBuilder::new(BASE, Dialect::Numbered)
            .sort(Some("id; DROP TABLE x"), SortOrder::Ascending)
            .build();
        assert!(!built.data_query.contains("ORDER BY"));
    }

    #[test]
    fn unknown_order_defaults_to_ascending() {
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Ascending);
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Descending);
        assert_eq!(SortOrder::parse(Some("desc")), SortOrder::Descending);
        assert_eq!(SortOrder::parse(None), SortOrder::Ascending);
    }

    #[test]
    fn count_query_excludes_window_and_order() {
        let built = QueryBuilder::new(BASE, Dialect::Numbered)
            .search(Some("bob"))
            .sort(Some("name"), SortOrder::Ascending)
            .pagination(3)
            .build();
        assert!(!built.count_query.contains("LIMIT"));
        assert!(!built.count_query.contains("ORDER BY"));
        assert!(built.count_query.starts_with("SELECT COUNT(*) AS total FROM ("));
        assert_eq!(built.count_params.len(), 2);
    }

    #[test]
    fn operations_compose_in_any_order() {
        let spec_order = QueryBuilder::new(BASE, Dialect::Numbered)
            .search(Some("alice"))
            .sort(Some("name"), SortOrder::Ascending)
            .pagination(2)
            .build();
        let reversed = QueryBuilder::new(BASE, Dialect::Numbered)
            .pagination(2)
            .sort(Some("name"), SortOrder::Ascending)
            .search(Some("alice"))
            .build();
        assert_eq!(spec_order, reversed);
    }

    #[test]
    fn apply_matches_manual_chain() {
        let spec = QuerySpec {
            keyword: Some("alice".into()),
            sort: Some("created_at".into()),
            order: SortOrder::Descending,
            page: 2,
        };
        let applied = QueryBuilder::new(BASE, Dialect::Numbered).apply(&spec).build();
        let manual = QueryBuilder::new(BASE, Dialect::Numbered)
            .search(Some("alice"))
            .sort(Some("created_at"), SortOrder::Descending)
            .pagination(2)
            .build();
        assert_eq!(applied, manual);
    }
}
