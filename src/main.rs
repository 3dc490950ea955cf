use std::process::exit;

fn main() {
    if let Err(e) = flipscroll::app::run_cli() {
        eprintln!("error: {e}");
        exit(1);
    }
}
