//! Description filter: case-insensitive substring matching with highlighting

use regex::{Regex, RegexBuilder};
use tally_utils::escape_html;

/// Class of the element wrapping a matched substring
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// A normalized query ready to match and highlight descriptions
#[derive(Debug, Clone)]
pub struct DescriptionFilter {
    query: String,
    pattern: Option<Regex>,
}

impl DescriptionFilter {
    /// Build a filter from raw input; the query is trimmed and lower-cased
    pub fn new(input: &str) -> Self {
        let query = input.trim().to_lowercase();
        let pattern = if query.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(&query))
                .case_insensitive(true)
                .build()
                .map_err(|e| log::warn!("Cannot build highlight pattern for {:?}: {}", query, e))
                .ok()
        };
        Self { query, pattern }
    }

    /// The normalized query
    pub fn query(&self) -> &str {
        &self.query
    }

    /// An empty query matches everything
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Check whether a description contains the query, ignoring case
    pub fn matches(&self, description: &str) -> bool {
        self.is_empty() || description.to_lowercase().contains(&self.query)
    }

    /// Render a description as HTML with every occurrence of the query wrapped
    /// in a highlight span. Text outside the markers is escaped.
    pub fn highlight(&self, description: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return escape_html(description);
        };

        let mut html = String::with_capacity(description.len() + 32);
        let mut last = 0;
        for m in pattern.find_iter(description) {
            html.push_str(&escape_html(&description[last..m.start()]));
            html.push_str(&format!(
                "<span class='{}'>{}</span>",
                HIGHLIGHT_CLASS,
                escape_html(m.as_str())
            ));
            last = m.end();
        }
        html.push_str(&escape_html(&description[last..]));
        html
    }
}

/// Filter result for one row
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRow {
    /// Position of the row in the input
    pub index: usize,
    pub visible: bool,
    /// Description HTML (highlighted when visible)
    pub html: String,
}

/// Filter result for a whole list
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub rows: Vec<FilteredRow>,
    /// At least one row matched
    pub any_match: bool,
}

impl FilterOutcome {
    pub fn visible_count(&self) -> usize {
        self.rows.iter().filter(|r| r.visible).count()
    }
}

/// Apply a query to a list of rows.
///
/// Each item pairs the row's search text (its `data-desc`, the raw description
/// lower-cased) with the text displayed in its `.desc` element. Matching uses
/// the search text; highlighting is applied to the displayed text.
pub fn apply_filter<'a, I>(rows: I, query: &str) -> FilterOutcome
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let filter = DescriptionFilter::new(query);
    let rows: Vec<FilteredRow> = rows
        .into_iter()
        .enumerate()
        .map(|(index, (search, display))| {
            if filter.matches(search) {
                FilteredRow { index, visible: true, html: filter.highlight(display) }
            } else {
                FilteredRow { index, visible: false, html: escape_html(display) }
            }
        })
        .collect();
    let any_match = rows.iter().any(|r| r.visible);
    FilterOutcome { rows, any_match }
}
