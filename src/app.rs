use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::controller::TableController;
use crate::dom::{BufferDom, LogDialog};
use crate::paging::{Limit, PagingConfig, DEFAULT_PAGER_LENGTH};
use crate::render;
use crate::template::Template;
use crate::transport::{HttpTransport, HttpTransportOptions, DEFAULT_TIMEOUT};

const DEFAULT_CONTAINER: &str = "#flipscroll";
const DEFAULT_LIMIT: Limit = Limit::Rows(10);

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {}: {}", format!("{label:<10}").bold(), value);
}

#[derive(Clone, Debug)]
struct RunConfig {
    container: String,
    hostname: String,
    action: String,
    page: u64,
    limit: Limit,
    pager_length: u64,
    data_key: Option<String>,
    header_template: Option<String>,
    row_template: Option<String>,
    output: Option<PathBuf>,
    standalone: bool,
    title: String,
    timeout: u64,
    proxy: Option<String>,
    header: Option<String>,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let hostname = args
        .hostname
        .or(cfg.hostname)
        .ok_or_else(|| "hostname is required (--hostname or config)".to_string())?;
    let action = args
        .action
        .or(cfg.action)
        .ok_or_else(|| "action is required (--action or config)".to_string())?;

    let cli_limit = match args.limit.as_deref() {
        Some(raw) => Some(
            raw.parse::<Limit>()
                .map_err(|e| format!("invalid --limit '{raw}': {e}"))?,
        ),
        None => None,
    };
    let limit = cli_limit.or(cfg.limit).unwrap_or(DEFAULT_LIMIT);

    let page = args.page.or(cfg.page).unwrap_or(1);
    if page == 0 {
        return Err("invalid page, pages are 1-indexed".to_string());
    }

    let pager_length = args
        .pager_length
        .or(cfg.pager_length)
        .unwrap_or(DEFAULT_PAGER_LENGTH);
    if pager_length == 0 {
        return Err("invalid pager_length, expected positive integer".to_string());
    }

    let timeout = args
        .timeout
        .or(cfg.timeout)
        .unwrap_or(DEFAULT_TIMEOUT.as_secs());
    if timeout == 0 {
        return Err("invalid timeout, expected positive seconds".to_string());
    }

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde(&p));
    let standalone = args.standalone || cfg.standalone.unwrap_or(false);
    let title = args.title.or(cfg.title).unwrap_or_else(|| action.clone());

    Ok(RunConfig {
        container: cfg.container.unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
        hostname,
        action,
        page,
        limit,
        pager_length,
        data_key: args.data_key.or(cfg.data_key),
        header_template: args.header_template.or(cfg.header_template),
        row_template: args.row_template.or(cfg.row_template),
        output,
        standalone,
        title,
        timeout,
        proxy: args.proxy.or(cfg.proxy),
        header: args.header.or(cfg.header),
        no_color,
    })
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    format_kv_line(
        "Endpoint",
        &format!(
            "{}/{}.json",
            run.hostname.trim_end_matches('/'),
            run.action.trim_matches('/')
        ),
    );
    format_kv_line(
        "Paging",
        &format!(
            "page={} limit={} window={}",
            run.page, run.limit, run.pager_length
        ),
    );

    let mut options = HttpTransportOptions::new(run.hostname.clone());
    options.timeout = Duration::from_secs(run.timeout);
    options.proxy = run.proxy.clone();
    options.header = run.header.clone();
    let transport = HttpTransport::new(options).map_err(|e| e.to_string())?;

    let mut paging = PagingConfig::new(run.action.clone(), run.page, run.limit)
        .with_pager_length(run.pager_length);
    if let Some(key) = run.data_key.as_ref() {
        paging = paging.with_data_key(key.clone());
    }

    let dom = BufferDom::new();
    let mut controller = TableController::new(
        run.container.clone(),
        paging,
        Box::new(transport),
        Box::new(dom.clone()),
        Box::new(LogDialog),
    );
    if let Some(text) = run.header_template.as_ref() {
        controller.set_header_template(Template::Placeholder(text.clone()));
    }
    if let Some(text) = run.row_template.as_ref() {
        controller.set_row_template(Template::Placeholder(text.clone()));
    }

    let now = Instant::now();
    controller.load().await.map_err(|e| e.to_string())?;
    let elapsed = now.elapsed();

    let fragment = dom
        .markup()
        .ok_or_else(|| "render produced no markup".to_string())?;
    let rendered = if run.standalone {
        render::wrap_standalone(&run.title, &fragment)
    } else {
        let mut fragment = fragment;
        fragment.push('\n');
        fragment
    };

    match run.output.as_ref() {
        Some(path) => {
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .await
                .map_err(|e| format!("failed to open output file: {e}"))?;
            outfile
                .write_all(rendered.as_bytes())
                .await
                .map_err(|_| "failed to write output file".to_string())?;
            format_kv_line("Output", &path.display().to_string());
        }
        None => print!("{rendered}"),
    }

    eprintln!();
    eprintln!(":: Completed :: fetch took {}ms ::", elapsed.as_millis());
    Ok(())
}

fn init_logging(verbose: u8, no_color: bool) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    let color = if no_color {
        simplelog::ColorChoice::Never
    } else {
        simplelog::ColorChoice::Auto
    };
    let _ = simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        color,
    );
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_logging(args.verbose, args.no_color);

    if args.init_config {
        let path = config::default_config_path()
            .ok_or_else(|| "could not determine home directory".to_string())?;
        config::ensure_default_config_file(&path)?;
        format_kv_line("Config", &path.display().to_string());
        return Ok(());
    }

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
