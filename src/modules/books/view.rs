//! HTML and plain-text rendering of a [`LendingTable`].

use std::fmt::Write as _;

use time::macros::format_description;
use time::Date;
use url::form_urlencoded;

use super::models::{Book, BorrowStatus, SortDirection, SortKey};
use super::table::LendingTable;

const LOADING: &str = "Loading...";
const AVAILABLE_COLOR: &str = "green";
const UNAVAILABLE_COLOR: &str = "red";

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `M/D/YYYY`, no padding.
pub fn format_date(date: Date) -> String {
    date.format(format_description!(
        "[month padding:none]/[day padding:none]/[year]"
    ))
    .unwrap_or_else(|_| date.to_string())
}

pub fn status_color(status: BorrowStatus) -> &'static str {
    if status.is_available() {
        AVAILABLE_COLOR
    } else {
        UNAVAILABLE_COLOR
    }
}

/// Query string for a sort trigger, carrying the current keyword along.
pub fn sort_href(key: SortKey, direction: SortDirection, keyword: &str) -> String {
    let mut query = form_urlencoded::Serializer::new(String::from("?"));
    query
        .append_pair("sort", key.as_str())
        .append_pair("dir", direction.as_str());
    if !keyword.is_empty() {
        query.append_pair("q", keyword);
    }
    query.finish()
}

/// A full HTML document wrapping [`render_table`].
pub fn render_page(table: &LendingTable) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Book lending</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        render_table(table)
    )
}

/// Search form plus table, or the loading indicator while loading.
pub fn render_table(table: &LendingTable) -> String {
    if table.is_loading() {
        return format!("<p class=\"loading\">{LOADING}</p>\n");
    }

    let mut html = String::new();
    render_search(&mut html, table);

    html.push_str("<div class=\"lending-table\">\n<table>\n<thead>\n<tr>\n");
    for key in SortKey::COLUMNS {
        render_header(&mut html, table, key);
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for book in table.displayed() {
        render_row(&mut html, book);
    }
    html.push_str("</tbody>\n</table>\n</div>\n");
    html
}

fn render_search(html: &mut String, table: &LendingTable) {
    html.push_str("<form class=\"search\" method=\"get\">\n");
    let _ = writeln!(
        html,
        "<input type=\"search\" name=\"q\" placeholder=\"Search title or author\" value=\"{}\">",
        escape_html(table.keyword())
    );
    if let Some(state) = table.sort_state() {
        let _ = writeln!(
            html,
            "<input type=\"hidden\" name=\"sort\" value=\"{}\">\n\
             <input type=\"hidden\" name=\"dir\" value=\"{}\">",
            state.key, state.direction
        );
    }
    html.push_str("</form>\n");
}

/// Glyph showing a column's sort state: up or down arrow for the active
/// direction, up-down arrow for unsorted columns.
pub fn sort_marker(table: &LendingTable, key: SortKey) -> &'static str {
    match table.sort_state() {
        Some(state) if state.key == key => match state.direction {
            SortDirection::Asc => "&#8593;",
            SortDirection::Desc => "&#8595;",
        },
        _ => "&#8597;",
    }
}

fn render_header(html: &mut String, table: &LendingTable, key: SortKey) {
    let _ = write!(
        html,
        "<th data-key=\"{}\"><span>{}</span> <span class=\"sort-state\">{}</span>",
        key,
        escape_html(key.header()),
        sort_marker(table, key)
    );
    for (direction, arrow) in [(SortDirection::Asc, "&#9650;"), (SortDirection::Desc, "&#9660;")] {
        let active = table
            .sort_state()
            .is_some_and(|state| state.key == key && state.direction == direction);
        let _ = write!(
            html,
            " <a class=\"sort {}{}\" href=\"{}\">{}</a>",
            direction,
            if active { " active\" aria-current=\"true" } else { "" },
            escape_html(&sort_href(key, direction, table.keyword())),
            arrow
        );
    }
    html.push_str("</th>\n");
}

fn render_row(html: &mut String, book: &Book) {
    let _ = writeln!(
        html,
        "<tr data-id=\"{id}\"><td>{id}</td><td>{title}</td><td>{author}</td><td>{year}</td>\
         <td><span style=\"color: {color}\">{status}</span></td><td>{date}</td></tr>",
        id = book.id,
        title = escape_html(&book.title),
        author = escape_html(&book.author),
        year = book.publication_year,
        color = status_color(book.borrow_status),
        status = book.borrow_status,
        date = format_date(book.date_borrowed),
    );
}

/// Fixed-width text table for terminals.
pub fn render_text(table: &LendingTable) -> String {
    if table.is_loading() {
        return format!("{LOADING}\n");
    }

    let rows: Vec<[String; 6]> = table
        .displayed()
        .iter()
        .map(|book| {
            [
                book.id.to_string(),
                book.title.clone(),
                book.author.clone(),
                book.publication_year.to_string(),
                book.borrow_status.to_string(),
                format_date(book.date_borrowed),
            ]
        })
        .collect();

    let headers = SortKey::COLUMNS.map(|key| match table.sort_state() {
        Some(state) if state.key == key => match state.direction {
            SortDirection::Asc => format!("{} ^", key.header()),
            SortDirection::Desc => format!("{} v", key.header()),
        },
        _ => key.header().to_string(),
    });

    let mut widths = headers.each_ref().map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_text_row(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_text_row(&mut out, &rule, &widths);
    for row in &rows {
        push_text_row(&mut out, row, &widths);
    }
    if rows.is_empty() {
        out.push_str("(no books)\n");
    }
    out
}

fn push_text_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
