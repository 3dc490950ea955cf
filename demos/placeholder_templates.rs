use std::error::Error;

use flipscroll::paging::{Limit, PagingConfig};
use flipscroll::render::{self, TableResponse};
use flipscroll::template::Template;

fn main() -> Result<(), Box<dyn Error>> {
    let response: TableResponse = serde_json::from_str(
        r#"{
            "paging": {"total_rows": 42, "last_page": 5, "current_page": 2, "limit": 10},
            "metadata": {"id": "Id", "name": "Name", "role": "Role"},
            "users": [
                {"id": 11, "name": "ada", "role": "admin"},
                {"id": 12, "name": "grace", "role": "editor"}
            ]
        }"#,
    )?;

    let config = PagingConfig::new("users", 2, Limit::Rows(10));
    let header = Template::Placeholder(
        "<tr><th>{id}</th><th>{name}</th><th>{role}</th></tr>".to_string(),
    );
    let row = Template::Placeholder(
        "<tr data-id=\"{id}\"><td>{name}</td><td>{role}</td></tr>".to_string(),
    );

    let page = render::render_page(&config, &response, &header, &row)?;
    println!("{}", page.markup);

    Ok(())
}
