use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGER_LENGTH: u64 = 5;

/// Rows-per-page setting. `Rows(0)` is normalized to `All` on parse; the
/// query-string form is the decimal row count or the literal `all`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limit {
    All,
    Rows(u64),
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::All => f.write_str("all"),
            Limit::Rows(rows) => write!(f, "{rows}"),
        }
    }
}

impl FromStr for Limit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Limit::All);
        }
        let rows: u64 = trimmed
            .parse()
            .map_err(|_| format!("expected a row count or 'all', got '{trimmed}'"))?;
        if rows == 0 {
            Ok(Limit::All)
        } else {
            Ok(Limit::Rows(rows))
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::All => serializer.serialize_str("all"),
            Limit::Rows(rows) => serializer.serialize_u64(*rows),
        }
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Rows(u64),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Rows(0) => Ok(Limit::All),
            Repr::Rows(rows) => Ok(Limit::Rows(rows)),
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Paging block of the response envelope. Trusted as internally consistent:
/// `current_page <= last_page`, `last_page >= 1`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct PagingResponse {
    pub total_rows: u64,
    pub last_page: u64,
    pub current_page: u64,
    pub limit: u64,
}

/// Mutable paging state, one instance per table.
///
/// `last_page`/`last_limit` always hold the page/limit pair from immediately
/// before the most recent `set_paging_options` call; the show-all "back" link
/// is rendered from them.
#[derive(Clone, Debug)]
pub struct PagingConfig {
    pub action: String,
    pub page: u64,
    pub limit: Limit,
    default_page: u64,
    default_limit: Limit,
    last_page: u64,
    last_limit: Limit,
    pager_length: u64,
    data_key: Option<String>,
}

impl PagingConfig {
    pub fn new(action: impl Into<String>, page: u64, limit: Limit) -> Self {
        let page = page.max(1);
        Self {
            action: action.into(),
            page,
            limit,
            default_page: page,
            default_limit: limit,
            last_page: page,
            last_limit: limit,
            pager_length: DEFAULT_PAGER_LENGTH,
            data_key: None,
        }
    }

    pub fn with_pager_length(mut self, pager_length: u64) -> Self {
        self.pager_length = pager_length.max(1);
        self
    }

    pub fn with_data_key(mut self, data_key: impl Into<String>) -> Self {
        self.data_key = Some(data_key.into());
        self
    }

    pub fn pager_length(&self) -> u64 {
        self.pager_length
    }

    pub fn default_page(&self) -> u64 {
        self.default_page
    }

    pub fn default_limit(&self) -> Limit {
        self.default_limit
    }

    pub fn last_page(&self) -> u64 {
        self.last_page
    }

    pub fn last_limit(&self) -> Limit {
        self.last_limit
    }

    pub fn data_key(&self) -> Option<&str> {
        self.data_key.as_deref()
    }

    pub fn set_data_key(&mut self, data_key: impl Into<String>) {
        self.data_key = Some(data_key.into());
    }

    /// Snapshots the current page/limit pair into `last_page`/`last_limit`,
    /// then applies the new values. Omitted values fall back to the
    /// constructor-supplied defaults.
    pub fn set_paging_options(
        &mut self,
        action: impl Into<String>,
        page: Option<u64>,
        limit: Option<Limit>,
    ) {
        self.last_page = self.page;
        self.last_limit = self.limit;
        self.action = action.into();
        self.page = page.unwrap_or(self.default_page).max(1);
        self.limit = limit.unwrap_or(self.default_limit);
    }

    /// Changing the limit restarts paging from the first page.
    pub fn set_limit(&mut self, limit: Limit) {
        self.limit = limit;
        self.page = 1;
    }

    pub fn set_current_page(&mut self, page: u64) {
        self.page = page.max(1);
    }

    pub fn reset_limit_to_default(&mut self) {
        self.limit = self.default_limit;
    }
}

/// The contiguous range of numeric page links to render, clamped so that
/// `1 <= start <= end <= last_page`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagingWindow {
    pub start: u64,
    pub end: u64,
    pub showing_all: bool,
}

/// Computes the page-link window for the current paging state. Pure: no
/// markup, no mutation; call once per render.
pub fn compute_window(config: &PagingConfig, paging: &PagingResponse) -> PagingWindow {
    let last_page = paging.last_page.max(1);
    let current = paging.current_page.clamp(1, last_page);
    let length = config.pager_length().max(1);
    let remaining = last_page - current;
    let mut step = length / 2;

    let mut start;
    let mut end;
    if current == 1 {
        start = 1;
        end = if remaining == 0 {
            current
        } else if remaining < length {
            (current + remaining).min(length)
        } else {
            length
        };
    } else if remaining == 0 {
        end = last_page;
        start = last_page.saturating_sub(length - 1);
    } else {
        if remaining >= step {
            end = current + step;
        } else {
            // Short right side: widen the left side to compensate.
            end = last_page;
            step += remaining;
        }
        if current <= step {
            start = 1;
            end = current + start + step;
        } else {
            start = current - step;
            if start == 0 {
                start += 1;
                end += 1;
            }
        }
    }

    PagingWindow {
        start: start.max(1),
        end: end.min(last_page),
        showing_all: showing_all(config.limit, paging.total_rows),
    }
}

fn showing_all(limit: Limit, total_rows: u64) -> bool {
    match limit {
        Limit::All => true,
        Limit::Rows(rows) => rows == total_rows,
    }
}
