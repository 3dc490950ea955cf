use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "flipscroll",
    version,
    about = "remote-data paged table renderer",
    long_about = "Flipscroll fetches one page of structured data from a remote endpoint and renders it as an HTML table with pagination controls.\n\nExamples:\n  flipscroll --hostname https://example.com/api -a users\n  flipscroll --hostname https://example.com/api -a users -p 3 -l 25 -o table.html\n  flipscroll --config ~/.flipscroll/config.yml\n\nTip: Use --config to persist endpoint settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        long = "hostname",
        value_name = "URL",
        help_heading = "Endpoint",
        help = "Base URL of the data endpoint, e.g. https://host/api."
    )]
    pub hostname: Option<String>,

    #[arg(
        short = 'a',
        long = "action",
        value_name = "PATH",
        help_heading = "Endpoint",
        help = "Endpoint action; fetched as <hostname>/<action>.json."
    )]
    pub action: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "Paging",
        help = "Page to fetch (1-indexed)."
    )]
    pub page: Option<u64>,

    #[arg(
        short = 'l',
        long = "limit",
        value_name = "N|all",
        help_heading = "Paging",
        help = "Rows per page, or 'all' for every row."
    )]
    pub limit: Option<String>,

    #[arg(
        long = "pager-length",
        value_name = "N",
        help_heading = "Paging",
        help = "Number of numeric page links in the pager window."
    )]
    pub pager_length: Option<u64>,

    #[arg(
        short = 'k',
        long = "data-key",
        value_name = "KEY",
        help_heading = "Rendering",
        help = "Response field holding the row collection (auto-detected when omitted)."
    )]
    pub data_key: Option<String>,

    #[arg(
        long = "header-template",
        value_name = "TEMPLATE",
        help_heading = "Rendering",
        help = "Header row template with {field} tokens, substituted from metadata."
    )]
    pub header_template: Option<String>,

    #[arg(
        long = "row-template",
        value_name = "TEMPLATE",
        help_heading = "Rendering",
        help = "Row template with {field} tokens, substituted per record."
    )]
    pub row_template: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered markup to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        long = "standalone",
        help_heading = "Output",
        help = "Wrap the fragment in a standalone HTML document."
    )]
    pub standalone: bool,

    #[arg(
        long = "title",
        value_name = "TEXT",
        help_heading = "Output",
        help = "Document title for --standalone output."
    )]
    pub title: Option<String>,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored status output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "Route requests through an HTTP proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'H',
        long = "header",
        value_name = "'Key: Value'",
        help_heading = "HTTP",
        help = "Extra request header."
    )]
    pub header: Option<String>,

    #[arg(
        long = "config",
        value_name = "FILE",
        help_heading = "Config",
        help = "Load options from a YAML config file."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Config",
        help = "Write a commented default config to ~/.flipscroll/config.yml and exit."
    )]
    pub init_config: bool,
}
