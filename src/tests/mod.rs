use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::controller::{AfterBind, TableController, TableError};
use crate::dom::{BufferDom, ClickEvent, Dialog};
use crate::paging::{compute_window, Limit, PagingConfig, PagingResponse};
use crate::render::TableResponse;
use crate::transport::{Transport, TransportError};

struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Value>>>,
    requests: Arc<Mutex<Vec<(String, u64, Limit)>>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Value>) -> (Self, Arc<Mutex<Vec<(String, u64, Limit)>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let transport = Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: requests.clone(),
        };
        (transport, requests)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(
        &self,
        action: &str,
        page: u64,
        limit: Limit,
    ) -> Result<TableResponse, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((action.to_string(), page, limit));
        match self.responses.lock().unwrap().pop_front() {
            Some(body) => Ok(serde_json::from_value(body).unwrap()),
            None => Err(TransportError::Server {
                status: 503,
                messages: vec!["no more scripted responses".to_string()],
            }),
        }
    }
}

#[derive(Clone, Default)]
struct CapturingDialog {
    shown: Arc<Mutex<Vec<Vec<String>>>>,
}

impl Dialog for CapturingDialog {
    fn show_error(&mut self, messages: &[String]) {
        self.shown.lock().unwrap().push(messages.to_vec());
    }
}

fn body(current_page: u64, last_page: u64) -> Value {
    json!({
        "paging": {
            "total_rows": last_page * 10,
            "last_page": last_page,
            "current_page": current_page,
            "limit": 10
        },
        "metadata": {"id": "Id", "name": "Name"},
        "items": [
            {"id": current_page * 100, "name": format!("row-{current_page}")}
        ]
    })
}

fn controller(
    responses: Vec<Value>,
    page: u64,
    limit: Limit,
) -> (
    TableController,
    BufferDom,
    Arc<Mutex<Vec<(String, u64, Limit)>>>,
    Arc<Mutex<Vec<Vec<String>>>>,
) {
    let (transport, requests) = ScriptedTransport::new(responses);
    let dom = BufferDom::new();
    let dialog = CapturingDialog::default();
    let shown = dialog.shown.clone();
    let controller = TableController::new(
        "#flipscroll",
        PagingConfig::new("rows", page, limit),
        Box::new(transport),
        Box::new(dom.clone()),
        Box::new(dialog),
    );
    (controller, dom, requests, shown)
}

#[test]
fn window_bounds_hold_for_all_inputs() {
    for last_page in 1..=30u64 {
        for pager_length in 1..=8u64 {
            for current_page in 1..=last_page {
                let config = PagingConfig::new("rows", 1, Limit::Rows(10))
                    .with_pager_length(pager_length);
                let paging = PagingResponse {
                    total_rows: last_page * 10,
                    last_page,
                    current_page,
                    limit: 10,
                };
                let window = compute_window(&config, &paging);
                assert!(
                    window.start >= 1 && window.start <= window.end && window.end <= last_page,
                    "bounds violated for last_page={last_page} pager_length={pager_length} current_page={current_page}: {window:?}"
                );
            }
        }
    }
}

#[tokio::test]
async fn load_renders_and_memoizes_the_data_key() {
    let (mut controller, dom, requests, _) = controller(
        vec![
            body(1, 5),
            json!({
                "paging": {"total_rows": 50, "last_page": 5, "current_page": 2, "limit": 10},
                "metadata": {"id": "Id", "name": "Name"},
                "aux": [{"id": 0, "name": "decoy"}],
                "items": [{"id": 200, "name": "row-2"}]
            }),
        ],
        1,
        Limit::Rows(10),
    );

    controller.load().await.unwrap();
    assert_eq!(controller.paging().data_key(), Some("items"));
    assert_eq!(
        requests.lock().unwrap().as_slice(),
        &[("rows".to_string(), 1, Limit::Rows(10))]
    );
    assert!(dom.markup().unwrap().contains("row-1"));

    // A later response gains a non-reserved key ahead of "items"; the
    // memoized key must win over the scan order.
    controller.set_current_page(2);
    controller.load().await.unwrap();
    assert_eq!(controller.paging().data_key(), Some("items"));
    let markup = dom.markup().unwrap();
    assert!(markup.contains("row-2"));
    assert!(!markup.contains("decoy"));
}

#[tokio::test]
async fn show_all_renders_back_item_and_reprimes_the_limit() {
    let (mut controller, dom, requests, _) = controller(
        vec![body(3, 5), body(1, 1), body(3, 5)],
        3,
        Limit::Rows(10),
    );

    controller.load().await.unwrap();
    assert!(dom.markup().unwrap().contains("<li class=\"numeric active\" data-page=\"3\""));

    // Click on "all": page 1, limit all.
    controller.set_paging_options("rows", Some(1), Some(Limit::All));
    controller.load().await.unwrap();
    let markup = dom.markup().unwrap();
    assert!(markup.contains(
        "<ul><li class=\"back\" data-page=\"3\" data-limit=\"10\">back</li></ul>"
    ));
    assert!(!markup.contains("class=\"numeric"));

    // The show-all render re-primes the working limit for page-sized requests.
    assert_eq!(controller.paging().limit, Limit::Rows(10));

    // Click on "back": restores the snapshotted page/limit pair.
    controller.set_paging_options("rows", Some(3), Some(Limit::Rows(10)));
    controller.load().await.unwrap();
    let calls = requests.lock().unwrap();
    assert_eq!(calls[1], ("rows".to_string(), 1, Limit::All));
    assert_eq!(calls[2], ("rows".to_string(), 3, Limit::Rows(10)));
}

#[tokio::test]
async fn failed_load_surfaces_errors_and_keeps_the_previous_page() {
    let (mut controller, dom, _, shown) =
        controller(vec![body(1, 5)], 1, Limit::Rows(10));

    controller.load().await.unwrap();
    let first_markup = dom.markup().unwrap();

    controller.set_current_page(2);
    let err = controller.load().await.unwrap_err();
    assert!(matches!(err, TableError::Transport(_)));
    assert_eq!(
        shown.lock().unwrap().as_slice(),
        &[vec!["no more scripted responses".to_string()]]
    );
    // No rollback, no retry: the old markup stays, the new page sticks.
    assert_eq!(dom.markup().unwrap(), first_markup);
    assert_eq!(controller.paging().page, 2);
}

#[tokio::test]
async fn data_shape_failure_is_surfaced_like_a_transport_failure() {
    let (mut controller, _, _, shown) = controller(
        vec![json!({
            "paging": {"total_rows": 0, "last_page": 1, "current_page": 1, "limit": 10},
            "metadata": {}
        })],
        1,
        Limit::Rows(10),
    );

    let err = controller.load().await.unwrap_err();
    assert!(matches!(err, TableError::Data(_)));
    assert_eq!(shown.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn named_post_bind_handler_must_be_registered() {
    let (mut controller, _, _, _) =
        controller(vec![body(1, 5)], 1, Limit::Rows(10));
    controller.set_after_bind(AfterBind::Named("refresh-widgets".to_string()));

    let err = controller.load().await.unwrap_err();
    assert!(matches!(err, TableError::InvalidHandler { .. }));
}

#[tokio::test]
async fn registered_post_bind_handler_runs_on_every_bind() {
    let (mut controller, _, _, _) =
        controller(vec![body(1, 5), body(2, 5)], 1, Limit::Rows(10));
    let count = Arc::new(Mutex::new(0u32));
    let seen = count.clone();
    controller.register_handler(
        "refresh-widgets",
        Box::new(move || *seen.lock().unwrap() += 1),
    );
    controller.set_after_bind(AfterBind::Named("refresh-widgets".to_string()));

    controller.load().await.unwrap();
    controller.set_current_page(2);
    controller.load().await.unwrap();
    assert_eq!(*count.lock().unwrap(), 2);
}

#[tokio::test]
async fn run_loop_follows_clicks_until_the_host_unbinds() {
    let (mut controller, dom, requests, _) = controller(
        vec![body(1, 5), body(2, 5)],
        1,
        Limit::Rows(10),
    );

    let task = tokio::spawn(async move { controller.run().await });

    let mut waited = 0;
    while dom.markup().is_none() && waited < 100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += 1;
    }
    assert!(dom.markup().unwrap().contains("row-1"));

    // Clicks on active entries are no-ops.
    assert!(
        dom.click(ClickEvent {
            page: Some(1),
            limit: Some(Limit::Rows(10)),
            active: true,
        })
        .await
    );
    // A click on page 2 triggers the next load.
    assert!(
        dom.click(ClickEvent {
            page: Some(2),
            limit: Some(Limit::Rows(10)),
            active: false,
        })
        .await
    );

    let mut waited = 0;
    while requests.lock().unwrap().len() < 2 && waited < 100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += 1;
    }
    let mut waited = 0;
    while !dom.markup().unwrap().contains("row-2") && waited < 100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += 1;
    }
    assert!(dom.markup().unwrap().contains("row-2"));
    assert_eq!(
        requests.lock().unwrap().as_slice(),
        &[
            ("rows".to_string(), 1, Limit::Rows(10)),
            ("rows".to_string(), 2, Limit::Rows(10)),
        ]
    );

    dom.close();
    task.await.unwrap().unwrap();
}
