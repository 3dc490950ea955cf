use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc;

use crate::paging::Limit;

/// One click on a pager entry, as reported by the host's event layer. The
/// page/limit values come from the entry's `data-page`/`data-limit`
/// attributes; `active` entries are delivered but never acted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickEvent {
    pub page: Option<u64>,
    pub limit: Option<Limit>,
    pub active: bool,
}

#[derive(Debug, Error)]
pub enum DomError {
    #[error("container '{selector}' not found")]
    MissingContainer { selector: String },
}

/// Host-side markup surface. Implementations replace the container's markup
/// wholesale and forward pager clicks (default navigation suppressed) into
/// the supplied channel. Each render installs a fresh sender; clicks queued
/// against replaced markup die with the old sender.
pub trait Dom: Send {
    fn replace_markup(&mut self, selector: &str, markup: &str) -> Result<(), DomError>;

    fn install_click_delegation(
        &mut self,
        selector: &str,
        clicks: mpsc::Sender<ClickEvent>,
    ) -> Result<(), DomError>;
}

/// Surfaces load failures to the user.
pub trait Dialog: Send {
    fn show_error(&mut self, messages: &[String]);
}

#[derive(Debug, Default)]
struct BufferDomState {
    markup: Option<String>,
    clicks: Option<mpsc::Sender<ClickEvent>>,
}

/// In-memory `Dom` for headless hosts and tests: markup is held in a shared
/// buffer and clicks are injected programmatically. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct BufferDom {
    inner: Arc<Mutex<BufferDomState>>,
}

impl BufferDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markup(&self) -> Option<String> {
        self.inner.lock().unwrap().markup.clone()
    }

    /// Simulates a user click on a pager entry. Returns false when no
    /// delegation is installed or the receiver is gone.
    pub async fn click(&self, event: ClickEvent) -> bool {
        let sender = self.inner.lock().unwrap().clicks.clone();
        match sender {
            Some(sender) => sender.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Tears the delegation down; a controller waiting on clicks observes a
    /// closed channel and stops.
    pub fn close(&self) {
        self.inner.lock().unwrap().clicks = None;
    }
}

impl Dom for BufferDom {
    fn replace_markup(&mut self, _selector: &str, markup: &str) -> Result<(), DomError> {
        self.inner.lock().unwrap().markup = Some(markup.to_string());
        Ok(())
    }

    fn install_click_delegation(
        &mut self,
        _selector: &str,
        clicks: mpsc::Sender<ClickEvent>,
    ) -> Result<(), DomError> {
        self.inner.lock().unwrap().clicks = Some(clicks);
        Ok(())
    }
}

/// Dialog that reports through the log facade; the default for hosts without
/// a modal surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDialog;

impl Dialog for LogDialog {
    fn show_error(&mut self, messages: &[String]) {
        log::error!("table load failed: {}", messages.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffer_dom_shares_markup_across_clones() {
        let dom = BufferDom::new();
        let mut handle = dom.clone();
        handle.replace_markup("#flipscroll", "<table></table>").unwrap();
        assert_eq!(dom.markup().as_deref(), Some("<table></table>"));
    }

    #[tokio::test]
    async fn buffer_dom_forwards_clicks_until_closed() {
        let dom = BufferDom::new();
        let (tx, mut rx) = mpsc::channel(4);
        dom.clone().install_click_delegation("#flipscroll", tx).unwrap();

        let event = ClickEvent {
            page: Some(2),
            limit: Some(Limit::Rows(10)),
            active: false,
        };
        assert!(dom.click(event).await);
        assert_eq!(rx.recv().await, Some(event));

        dom.close();
        assert!(!dom.click(event).await);
        assert_eq!(rx.recv().await, None);
    }
}
