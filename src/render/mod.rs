use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::paging::{compute_window, Limit, PagingConfig, PagingResponse, PagingWindow};
use crate::template::{self, Slot, Template};

/// Top-level keys that can never hold the row collection.
pub const RESERVED_KEYS: [&str; 2] = ["paging", "metadata"];

/// The response envelope: typed paging block, ordered header metadata, and
/// every remaining top-level field in document order.
#[derive(Clone, Debug, Deserialize)]
pub struct TableResponse {
    pub paging: PagingResponse,
    pub metadata: Map<String, Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum DataShapeError {
    #[error("response has no row collection field (expected a key besides 'paging' and 'metadata')")]
    MissingRowCollection,

    #[error("configured data key '{key}' is missing from the response")]
    DataKeyMissing { key: String },

    #[error("response field '{key}' is not an array of records")]
    NotACollection { key: String },

    #[error("row record at index {index} is not an object")]
    RowNotAnObject { index: usize },
}

/// One fully rendered page: pager + table markup, the key the row collection
/// was found under, and whether this render was in show-all mode.
#[derive(Clone, Debug)]
pub struct RenderedPage {
    pub markup: String,
    pub data_key: String,
    pub showing_all: bool,
}

/// Finds the row collection. An explicit key wins; otherwise the first
/// non-reserved top-level key holds the rows.
pub fn resolve_data_key<'a>(
    response: &'a TableResponse,
    configured: Option<&str>,
) -> Result<(String, &'a Vec<Value>), DataShapeError> {
    if let Some(key) = configured {
        let value = response
            .rest
            .get(key)
            .ok_or_else(|| DataShapeError::DataKeyMissing { key: key.to_string() })?;
        let rows = value
            .as_array()
            .ok_or_else(|| DataShapeError::NotACollection { key: key.to_string() })?;
        return Ok((key.to_string(), rows));
    }

    for (key, value) in response.rest.iter() {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let rows = value
            .as_array()
            .ok_or_else(|| DataShapeError::NotACollection { key: key.clone() })?;
        return Ok((key.clone(), rows));
    }

    Err(DataShapeError::MissingRowCollection)
}

fn push_item(out: &mut String, class: &str, active: bool, page: u64, limit: Limit, label: &str) {
    out.push_str("<li class=\"");
    out.push_str(class);
    if active {
        out.push_str(" active");
    }
    out.push_str("\" data-page=\"");
    out.push_str(&page.to_string());
    out.push_str("\" data-limit=\"");
    out.push_str(&limit.to_string());
    out.push_str("\">");
    out.push_str(label);
    out.push_str("</li>");
}

/// Builds the pager control. Outside show-all mode the items appear in order
/// `all`, `first`, `prev`, the numeric window, `next`, `last`; entries for the
/// current state carry the `active` class. In show-all mode the pager
/// collapses to a single `back` item restoring the pre-switch page/limit.
pub fn render_pager(
    config: &PagingConfig,
    paging: &PagingResponse,
    window: &PagingWindow,
) -> String {
    let mut out = String::from("<div class=\"pagination\"><ul>");
    if window.showing_all {
        push_item(
            &mut out,
            "back",
            false,
            config.last_page(),
            config.last_limit(),
            "back",
        );
    } else {
        let current = paging.current_page;
        let last = paging.last_page;
        let limit = config.limit;
        push_item(&mut out, "all", false, 1, Limit::All, "all");
        push_item(&mut out, "first", current == 1, 1, limit, "first");
        push_item(
            &mut out,
            "prev",
            current == 1,
            current.saturating_sub(1).max(1),
            limit,
            "prev",
        );
        for page in window.start..=window.end {
            push_item(&mut out, "numeric", page == current, page, limit, &page.to_string());
        }
        push_item(&mut out, "next", current == last, (current + 1).min(last), limit, "next");
        push_item(&mut out, "last", current == last, last, limit, "last");
    }
    out.push_str("</ul></div>");
    out
}

/// Builds the table: one header row from `metadata`, one body row per record.
pub fn render_table(
    response: &TableResponse,
    rows: &[Value],
    header_template: &Template,
    row_template: &Template,
) -> Result<String, DataShapeError> {
    let mut out = String::from("<table><thead>");
    out.push_str(&template::render(header_template, &response.metadata, Slot::Header));
    out.push_str("</thead><tbody>");
    for (index, row) in rows.iter().enumerate() {
        let record = row
            .as_object()
            .ok_or(DataShapeError::RowNotAnObject { index })?;
        out.push_str(&template::render(row_template, record, Slot::Row(index)));
    }
    out.push_str("</tbody></table>");
    Ok(out)
}

/// Renders one complete page fragment. Never mutates the response; the caller
/// memoizes the returned data key so later pages skip the scan.
pub fn render_page(
    config: &PagingConfig,
    response: &TableResponse,
    header_template: &Template,
    row_template: &Template,
) -> Result<RenderedPage, DataShapeError> {
    let window = compute_window(config, &response.paging);
    let (data_key, rows) = resolve_data_key(response, config.data_key())?;

    let mut markup = render_pager(config, &response.paging, &window);
    markup.push_str(&render_table(response, rows, header_template, row_template)?);

    Ok(RenderedPage {
        markup,
        data_key,
        showing_all: window.showing_all,
    })
}

/// Wraps a fragment into a minimal standalone document for file output.
pub fn wrap_standalone(title: &str, fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\"/>\n  <title>{title}</title>\n</head>\n<body>\n{fragment}\n</body>\n</html>\n"
    )
}
