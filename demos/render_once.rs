use std::error::Error;

use flipscroll::controller::TableController;
use flipscroll::dom::{BufferDom, LogDialog};
use flipscroll::paging::{Limit, PagingConfig};
use flipscroll::transport::{HttpTransport, HttpTransportOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let transport = HttpTransport::new(HttpTransportOptions::new("https://example.com/api"))?;
    let paging = PagingConfig::new("users", 1, Limit::Rows(25)).with_pager_length(7);

    let dom = BufferDom::new();
    let mut controller = TableController::new(
        "#flipscroll",
        paging,
        Box::new(transport),
        Box::new(dom.clone()),
        Box::new(LogDialog),
    );

    controller.load().await?;

    println!("resolved data key: {:?}", controller.paging().data_key());
    println!("{}", dom.markup().unwrap_or_default());

    Ok(())
}
