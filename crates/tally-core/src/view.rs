//! Page-level state for the transaction list and the dark-mode control
//!
//! These types mirror the elements the history pages render: a search input,
//! a clear button, the list header, the "no match" message and one row per
//! transaction. Filtering mutates them the same way the page does.

use serde::Serialize;
use tally_utils::escape_html;

use crate::filter::apply_filter;
use crate::models::TransactionRow;

/// Element ids shared by the rendered pages and the inline script
pub mod ids {
    pub const DARK_MODE_TOGGLE: &str = "dark_mode_toggle";
    pub const SEARCH_INPUT: &str = "search_input";
    pub const CLEAR_BUTTON: &str = "clear_button";
    pub const TXN_HEADER: &str = "txn_header";
    pub const NO_MATCH_MSG: &str = "no_match_msg";
    pub const TXN_LIST: &str = "txn_list";
}

/// Class that hides an element
pub const HIDDEN_CLASS: &str = "hidden";
/// Class on `<body>` when dark mode is on
pub const DARK_CLASS: &str = "dark";
/// Endpoint notified when the dark-mode control changes
pub const TOGGLE_DARK_MODE_PATH: &str = "/toggle_dark_mode";

/// Visual theme of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Appearance {
    dark: bool,
}

impl Appearance {
    pub fn new(dark: bool) -> Self {
        Self { dark }
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    /// Flip the theme, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.dark = !self.dark;
        self.dark
    }

    /// Class attribute value for `<body>`
    pub fn body_class(&self) -> &'static str {
        if self.dark {
            DARK_CLASS
        } else {
            ""
        }
    }
}

/// One rendered row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub row: TransactionRow,
    pub visible: bool,
    /// Inner HTML of the `.desc` element
    pub desc_html: String,
}

/// State of a filterable transaction list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionListView {
    /// Current value of the search input
    pub query: String,
    pub rows: Vec<ListRow>,
    pub header_hidden: bool,
    pub no_match_hidden: bool,
    /// Set when the search input should take focus
    pub focus_input: bool,
}

impl TransactionListView {
    /// Initial state: every row visible, nothing highlighted
    pub fn new(rows: Vec<TransactionRow>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| ListRow {
                desc_html: escape_html(&row.desc),
                visible: true,
                row,
            })
            .collect();
        Self {
            query: String::new(),
            rows,
            header_hidden: false,
            no_match_hidden: true,
            focus_input: false,
        }
    }

    /// Build a view with a query already applied
    pub fn with_query(rows: Vec<TransactionRow>, query: &str) -> Self {
        let mut view = Self::new(rows);
        view.filter(query);
        view
    }

    /// Handle an input event on the search field
    pub fn filter(&mut self, input: &str) {
        self.query = input.to_string();
        let outcome = apply_filter(
            self.rows.iter().map(|r| (r.row.data_desc.as_str(), r.row.desc.as_str())),
            input,
        );
        for (list_row, filtered) in self.rows.iter_mut().zip(outcome.rows) {
            list_row.visible = filtered.visible;
            if filtered.visible {
                list_row.desc_html = filtered.html;
            }
        }
        self.no_match_hidden = outcome.any_match;
        self.header_hidden = !outcome.any_match;
    }

    /// Handle a click on the clear button
    pub fn clear(&mut self) {
        self.filter("");
        self.focus_input = true;
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &ListRow> {
        self.rows.iter().filter(|r| r.visible)
    }
}
