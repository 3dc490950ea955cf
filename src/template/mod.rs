use std::fmt;

use serde_json::{Map, Value};

/// A record is one insertion-ordered JSON object: a row of the collection, or
/// the `metadata` map when rendering the header.
pub type Record = Map<String, Value>;

pub type RenderFn = Box<dyn Fn(&Record, Option<usize>) -> String + Send + Sync>;

/// Markup source for one template slot, decided once at assignment time.
pub enum Template {
    /// Invoked with `(record, Some(index))` for rows and `(record, None)` for
    /// the header; the result is emitted verbatim.
    Callback(RenderFn),
    /// Text with `{field}` tokens replaced by the record's values.
    Placeholder(String),
    /// Default rendering: one cell per record key in natural order.
    Unset,
}

impl Default for Template {
    fn default() -> Self {
        Template::Unset
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Template::Callback(_) => f.write_str("Template::Callback"),
            Template::Placeholder(text) => {
                f.debug_tuple("Template::Placeholder").field(text).finish()
            }
            Template::Unset => f.write_str("Template::Unset"),
        }
    }
}

/// Which slot a fragment is rendered for. Rows carry their 0-based index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Header,
    Row(usize),
}

impl Slot {
    fn cell_tag(self) -> &'static str {
        match self {
            Slot::Header => "th",
            Slot::Row(_) => "td",
        }
    }
}

/// Renders one markup fragment for a record. The same routine serves the
/// header and row slots; only the callback arity and the cell tag differ.
pub fn render(template: &Template, record: &Record, slot: Slot) -> String {
    match template {
        Template::Callback(callback) => {
            let index = match slot {
                Slot::Header => None,
                Slot::Row(index) => Some(index),
            };
            callback(record, index)
        }
        Template::Placeholder(text) => substitute(text, record),
        Template::Unset => default_row(record, slot),
    }
}

/// Replaces every `{key}` token with the value's text form, in record key
/// order. Tokens for absent keys are left as-is. Known limitation: a
/// substituted value that contains a later field's token is substituted
/// again.
fn substitute(template: &str, record: &Record) -> String {
    let mut out = template.to_string();
    for (key, value) in record.iter() {
        let token = format!("{{{key}}}");
        if out.contains(&token) {
            out = out.replace(&token, &value_text(value));
        }
    }
    out
}

fn default_row(record: &Record, slot: Slot) -> String {
    let tag = slot.cell_tag();
    let mut out = String::from("<tr>");
    for value in record.values() {
        out.push('<');
        out.push_str(tag);
        out.push('>');
        out.push_str(&value_text(value));
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
    out.push_str("</tr>");
    out
}

/// Text form used for substitution and default cells: strings verbatim, null
/// empty, everything else in its compact JSON form.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
