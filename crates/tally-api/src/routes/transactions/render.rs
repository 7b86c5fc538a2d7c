//! HTML fragments for transaction lists and forms

use chrono::Local;
use tally_core::view::ids;
use tally_core::{ListRow, TransactionListView};
use tally_store::{TransactionRecord, TransactionType};
use tally_utils::escape_html;

use crate::hidden_if;

/// Search input, clear button and the list container
pub fn render_filter_controls(filter_url: &str, list: &str) -> String {
    format!(
        r#"<input type='text' id='{input}' name='q' placeholder='Filter by description...'
            hx-get='{url}' hx-trigger='input' hx-target='#{list_id}' hx-swap='innerHTML' autocomplete='off'>
        <button type='button' id='{clear}'>Clear</button>
        <div id='{list_id}'>{list}</div>"#,
        input = ids::SEARCH_INPUT,
        url = filter_url,
        clear = ids::CLEAR_BUTTON,
        list_id = ids::TXN_LIST,
        list = list,
    )
}

/// Header, empty-state message and rows. `edit_user` renders rows as edit buttons.
pub fn render_txn_list(view: &TransactionListView, edit_user: Option<&str>) -> String {
    let mut html = format!(
        r#"<div class='grid_container header {}' id='{}'>
            <p>Date</p><p>Amount</p><p>Description</p><p>Total owing</p>
        </div>
        <p id='{}' class='{}'>No matching transactions found.</p>"#,
        hidden_if(view.header_hidden),
        ids::TXN_HEADER,
        ids::NO_MATCH_MSG,
        hidden_if(view.no_match_hidden),
    );
    for row in &view.rows {
        html.push_str(&render_row(row, edit_user));
    }
    html
}

fn render_row(list_row: &ListRow, edit_user: Option<&str>) -> String {
    let row = &list_row.row;
    let style = if list_row.visible { "" } else { " style='display: none'" };
    let content = format!(
        r#"<p class='date'>{}</p><p class='amount'>{}</p><p class='desc'>{}</p><p class='total'><span class='total_owing_desc'>Total owing: </span>{}</p>"#,
        row.date, row.amount, list_row.desc_html, row.total
    );
    match edit_user {
        Some(user) => format!(
            r#"<button class='grid_container {}' formaction='/edit/{}/transaction_{}' data-desc='{}'{}>{}</button>"#,
            row.kind,
            urlencoding::encode(user),
            row.index,
            escape_html(&row.data_desc),
            style,
            content
        ),
        None => format!(
            r#"<div class='grid_container {}' data-desc='{}'{}>{}</div>"#,
            row.kind,
            escape_html(&row.data_desc),
            style,
            content
        ),
    }
}

/// `<option>` list of users with an optional preselected name
pub fn render_user_options(names: &[&str], selected: Option<&str>) -> String {
    let mut html = format!(
        "<option value='' disabled{}>-- Select a name --</option>",
        if selected.is_none() { " selected" } else { "" }
    );
    for name in names {
        html.push_str(&format!(
            "<option value='{0}'{1}>{0}</option>",
            escape_html(name),
            if selected == Some(*name) { " selected" } else { "" }
        ));
    }
    html
}

/// Type, amount, date and description fields, prefilled when editing
pub fn render_txn_fields(existing: Option<&TransactionRecord>) -> String {
    let is_kind = |kind: TransactionType| {
        if existing.map(|t| t.kind) == Some(kind) {
            " selected"
        } else {
            ""
        }
    };
    format!(
        r#"<label for='type' class='mobile_gap'>Transaction type:</label>
        <select id='type' name='type'>
            <option value='debt'{}>Debt</option>
            <option value='repayment'{}>Repayment</option>
        </select>
        <label for='amount' class='mobile_gap'>Amount ($):</label>
        <input type='number' min='0' step='0.01' id='amount' name='amount' required value='{}'>
        <label for='date' class='mobile_gap'>Date:</label>
        <input type='date' id='date' name='date' max='{}' required value='{}'>
        <label for='desc' class='mobile_gap'>Description:</label>
        <textarea id='desc' name='desc' rows='3'>{}</textarea>"#,
        is_kind(TransactionType::Debt),
        is_kind(TransactionType::Repayment),
        existing.map(|t| t.amount.to_string()).unwrap_or_default(),
        Local::now().format("%Y-%m-%d"),
        existing.map(|t| t.date.to_string()).unwrap_or_default(),
        existing.map(|t| escape_html(&t.desc)).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tally_core::transaction_rows;

    fn view(query: &str) -> TransactionListView {
        let records = vec![
            TransactionRecord {
                kind: TransactionType::Repayment,
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                amount: Decimal::from(5),
                desc: "Paid <back>".to_string(),
            },
            TransactionRecord {
                kind: TransactionType::Debt,
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                amount: Decimal::from(20),
                desc: "Rent payment".to_string(),
            },
        ];
        TransactionListView::with_query(transaction_rows(&records), query)
    }

    #[test]
    fn test_list_without_query() {
        let html = render_txn_list(&view(""), None);
        assert!(html.contains("<div class='grid_container header ' id='txn_header'>"));
        assert!(html.contains("<p id='no_match_msg' class='hidden'>"));
        assert!(html.contains("data-desc='paid &lt;back&gt;'"));
        assert!(!html.contains("display: none"));
    }

    #[test]
    fn test_list_with_no_match() {
        let html = render_txn_list(&view("zzz"), None);
        assert!(html.contains("<div class='grid_container header hidden' id='txn_header'>"));
        assert!(html.contains("<p id='no_match_msg' class=''>"));
        assert_eq!(html.matches("style='display: none'").count(), 2);
    }

    #[test]
    fn test_list_highlights_match() {
        let html = render_txn_list(&view("rent"), None);
        assert!(html.contains("<span class='highlight'>Rent</span> payment"));
    }

    #[test]
    fn test_edit_rows_are_buttons() {
        let html = render_txn_list(&view(""), Some("Jane Doe"));
        assert!(html.contains("formaction='/edit/Jane%20Doe/transaction_0'"));
        assert!(html.contains("formaction='/edit/Jane%20Doe/transaction_1'"));
    }

    #[test]
    fn test_user_options() {
        let html = render_user_options(&["A B", "C D"], Some("C D"));
        assert!(html.contains("<option value='' disabled>"));
        assert!(html.contains("<option value='C D' selected>C D</option>"));
    }
}
