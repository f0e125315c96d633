use std::io::Write;

use clap::{error::ErrorKind, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::HttpRecommendClient;
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::controller::{SearchController, SearchOutcome};
use crate::output::{self, ConsoleView, OutputFormat};

fn print_banner() {
    const BANNER: &str = r#"
         __   _ ____                           __
   _____/ /__(_) / /_____________  __  _______/ /_
  / ___/ //_/ / / / ___/ ___/ __ \/ / / / ___/ __/
 (__  ) ,< / / / (__  ) /__/ /_/ / /_/ / /__/ /_
/____/_/|_/_/_/_/____/\___/\____/\__,_/\___/\__/

       v0.1.0 - assessment recommendation search
    "#;
    print!("{}", BANNER);
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug)]
struct RunConfig {
    query: Option<String>,
    top_k: String,
    base_url: String,
    timeout: u64,
    output: Option<String>,
    output_format: Option<String>,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);
    let base_url = args
        .base_url
        .or(cfg.base_url)
        .unwrap_or_else(|| "http://127.0.0.1:8000".to_string());
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(30);
    let top_k = args
        .top_k
        .or_else(|| cfg.top_k.map(|k| k.to_string()))
        .unwrap_or_default();

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format = args.output_format.or(cfg.output_format);

    Ok(RunConfig {
        query: args.query,
        top_k,
        base_url,
        timeout,
        output,
        output_format,
        no_color,
    })
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn write_output(run: &RunConfig, response: &crate::api::RecommendResponse) -> Result<(), String> {
    let Some(path) = run.output.as_deref() else {
        return Ok(());
    };
    let format = run
        .output_format
        .as_deref()
        .and_then(OutputFormat::parse)
        .or_else(|| output::infer_format_from_path(path))
        .unwrap_or(OutputFormat::Text);
    let rendered = match format {
        OutputFormat::Text => output::render_text(response),
        OutputFormat::Json => output::render_json(response),
    };
    tokio::fs::write(path, rendered)
        .await
        .map_err(|e| format!("failed to write output file '{path}': {e}"))?;
    format_kv_line("Saved", path);
    Ok(())
}

async fn run_one_shot<S, V>(
    controller: &SearchController<S, V>,
    run: &RunConfig,
    query: &str,
) -> Result<(), String>
where
    S: crate::api::RecommendService,
    V: crate::output::SearchView,
{
    match controller.run_search(query, &run.top_k).await {
        SearchOutcome::Rendered { response } => write_output(run, &response).await,
        SearchOutcome::NoResults { .. } => Ok(()),
        SearchOutcome::EmptyQuery => Err(crate::controller::EMPTY_QUERY_MESSAGE.to_string()),
        SearchOutcome::Failed { message } => Err(message),
        SearchOutcome::Stale => Ok(()),
    }
}

async fn run_interactive<S, V>(
    controller: &SearchController<S, V>,
    run: &RunConfig,
) -> Result<(), String>
where
    S: crate::api::RecommendService,
    V: crate::output::SearchView,
{
    println!("Type a query to search, /quit to exit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("search> ");
        std::io::stdout()
            .flush()
            .map_err(|e| format!("failed to flush stdout: {e}"))?;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(format!("failed to read input: {e}")),
        };

        match line.trim() {
            "/quit" | "/q" => break,
            input => {
                if let SearchOutcome::Rendered { response } =
                    controller.run_search(input, &run.top_k).await
                {
                    write_output(run, &response).await?;
                }
                println!();
            }
        }
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();
    format_kv_line("Service", &run.base_url);
    format_kv_line(
        "Request",
        &format!(
            "top_k={} timeout={}s",
            crate::utils::resolve_top_k(&run.top_k),
            run.timeout
        ),
    );
    println!();

    let client = HttpRecommendClient::new(&run.base_url, run.timeout)
        .map_err(|e| format!("failed to build http client: {e}"))?;
    let view = ConsoleView::new(run.no_color);
    let controller = SearchController::new(client, view);

    match run.query.clone() {
        Some(query) => run_one_shot(&controller, &run, &query).await,
        None => run_interactive(&controller, &run).await,
    }
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

    init_tracing(args.verbose);

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
