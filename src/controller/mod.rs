use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::dom::{ClickEvent, Dialog, Dom, DomError};
use crate::paging::{Limit, PagingConfig};
use crate::render::{self, DataShapeError};
use crate::template::Template;
use crate::transport::{Transport, TransportError};

const CLICK_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Data(#[from] DataShapeError),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("invalid handler: no post-bind handler registered under '{name}'")]
    InvalidHandler { name: String },
}

pub type AfterBindFn = Box<dyn FnMut() + Send>;

/// Post-bind callback: either a closure, or the name of a handler registered
/// on the controller (the form config files use). A name with no registered
/// handler fails `bind()`.
pub enum AfterBind {
    Handler(AfterBindFn),
    Named(String),
}

/// Owns the paging state and template slots, and drives the fetch → render →
/// swap → bind loop against the three collaborators.
pub struct TableController {
    container: String,
    paging: PagingConfig,
    header_template: Template,
    row_template: Template,
    transport: Box<dyn Transport>,
    dom: Box<dyn Dom>,
    dialog: Box<dyn Dialog>,
    handlers: HashMap<String, AfterBindFn>,
    after_bind: Option<AfterBind>,
    clicks: Option<mpsc::Receiver<ClickEvent>>,
}

impl TableController {
    pub fn new(
        container: impl Into<String>,
        paging: PagingConfig,
        transport: Box<dyn Transport>,
        dom: Box<dyn Dom>,
        dialog: Box<dyn Dialog>,
    ) -> Self {
        Self {
            container: container.into(),
            paging,
            header_template: Template::Unset,
            row_template: Template::Unset,
            transport,
            dom,
            dialog,
            handlers: HashMap::new(),
            after_bind: None,
            clicks: None,
        }
    }

    pub fn paging(&self) -> &PagingConfig {
        &self.paging
    }

    pub fn set_header_template(&mut self, template: Template) {
        self.header_template = template;
    }

    pub fn set_row_template(&mut self, template: Template) {
        self.row_template = template;
    }

    pub fn set_after_bind(&mut self, after_bind: AfterBind) {
        self.after_bind = Some(after_bind);
    }

    pub fn register_handler(&mut self, name: impl Into<String>, handler: AfterBindFn) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn set_paging_options(
        &mut self,
        action: impl Into<String>,
        page: Option<u64>,
        limit: Option<Limit>,
    ) {
        self.paging.set_paging_options(action, page, limit);
    }

    pub fn set_limit(&mut self, limit: Limit) {
        self.paging.set_limit(limit);
    }

    pub fn set_current_page(&mut self, page: u64) {
        self.paging.set_current_page(page);
    }

    /// Fetches the current page and replaces the container markup. On
    /// failure the error is surfaced through the dialog and returned; the
    /// previously rendered page stays in place, nothing is retried and no
    /// state is rolled back.
    pub async fn load(&mut self) -> Result<(), TableError> {
        let fetched = self
            .transport
            .fetch(&self.paging.action, self.paging.page, self.paging.limit)
            .await;
        let response = match fetched {
            Ok(response) => response,
            Err(err) => {
                self.dialog.show_error(&err.messages());
                return Err(err.into());
            }
        };

        let rendered = match render::render_page(
            &self.paging,
            &response,
            &self.header_template,
            &self.row_template,
        ) {
            Ok(rendered) => rendered,
            Err(err) => {
                self.dialog.show_error(&[err.to_string()]);
                return Err(err.into());
            }
        };

        self.paging.set_data_key(&rendered.data_key);
        self.dom.replace_markup(&self.container, &rendered.markup)?;
        self.bind()?;

        // A show-all render leaves the working limit primed for a normal
        // page-sized request; "back" restores the snapshotted pair instead.
        if rendered.showing_all {
            self.paging.reset_limit_to_default();
        }
        Ok(())
    }

    /// Installs click delegation for the freshly swapped markup, then runs
    /// the post-bind handler if one is set.
    pub fn bind(&mut self) -> Result<(), TableError> {
        let (tx, rx) = mpsc::channel(CLICK_CHANNEL_CAPACITY);
        self.dom.install_click_delegation(&self.container, tx)?;
        self.clicks = Some(rx);
        self.run_after_bind()
    }

    fn run_after_bind(&mut self) -> Result<(), TableError> {
        let name = match self.after_bind.as_mut() {
            None => return Ok(()),
            Some(AfterBind::Handler(handler)) => {
                handler();
                return Ok(());
            }
            Some(AfterBind::Named(name)) => name.clone(),
        };
        match self.handlers.get_mut(&name) {
            Some(handler) => {
                handler();
                Ok(())
            }
            None => Err(TableError::InvalidHandler { name }),
        }
    }

    /// Initial load, then the click loop: every click on a non-active entry
    /// applies its page/limit and loads again. Clicks are processed strictly
    /// in order on this task, so loads never overlap. Returns once the host
    /// tears the delegation down.
    pub async fn run(&mut self) -> Result<(), TableError> {
        self.load().await?;
        loop {
            let click = match self.clicks.as_mut() {
                Some(clicks) => clicks.recv().await,
                None => None,
            };
            let Some(click) = click else { break };
            if click.active {
                continue;
            }
            let action = self.paging.action.clone();
            self.paging.set_paging_options(action, click.page, click.limit);
            if let Err(err) = self.load().await {
                log::warn!("page load failed: {err}");
            }
        }
        Ok(())
    }
}
