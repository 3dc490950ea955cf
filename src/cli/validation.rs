use crate::cli::args::CliArgs;
use crate::paging::Limit;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.limit.as_deref() {
        raw.parse::<Limit>()
            .map_err(|e| format!("invalid --limit '{raw}': {e}"))?;
    }
    if let Some(page) = args.page {
        if page == 0 {
            return Err("invalid --page, pages are 1-indexed".to_string());
        }
    }
    if let Some(length) = args.pager_length {
        if length == 0 {
            return Err("invalid --pager-length, expected positive integer".to_string());
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid --timeout, expected positive seconds".to_string());
        }
    }
    if let Some(hostname) = args.hostname.as_deref() {
        if reqwest::Url::parse(hostname).is_err() {
            return Err(format!("invalid --hostname '{hostname}'"));
        }
    }
    Ok(())
}
