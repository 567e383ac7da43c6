use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use domsearch::api::HttpSearchService;
use domsearch::config::CONFIG;
use domsearch::orchestrator::{Notification, Orchestrator, RunOutcome, SkipReason};
use domsearch::repl::{Command, HELP};
use domsearch::view::{SourceFormat, View, ViewOptions};

/// Index a site through the DomSearch service, then search it.
#[derive(Debug, Parser)]
#[command(name = "domsearch", version)]
struct Cli {
    /// Site to index. With --query, runs once and exits.
    #[arg(long)]
    url: Option<String>,

    /// Natural-language query to run after indexing.
    #[arg(long)]
    query: Option<String>,

    /// Result to expand after a one-shot run (1-based).
    #[arg(long)]
    expand: Option<usize>,

    /// Service base URL [env: DOMSEARCH_API_URL]
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds [env: DOMSEARCH_TIMEOUT_SECS]
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Snippet preview length [env: DOMSEARCH_SNIPPET_CHARS]
    #[arg(long)]
    snippet_chars: Option<usize>,

    /// Render HTML sources as plain text.
    #[arg(long)]
    text: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the rendered view.
    tracing_subscriber::fmt()
        .with_max_level(CONFIG.log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    // CONFIG was read above to pick the level, before any logger existed.
    CONFIG.report_rejected();

    let api_url = cli.api_url.as_deref().unwrap_or(&CONFIG.api_url);
    let timeout = Duration::from_secs(cli.timeout_secs.unwrap_or(CONFIG.timeout_secs));
    let service = HttpSearchService::new(api_url, timeout)?;
    tracing::info!("using search service at {api_url}");

    let options = ViewOptions {
        snippet_chars: cli.snippet_chars.unwrap_or(CONFIG.snippet_chars),
        source_format: if cli.text {
            SourceFormat::Text
        } else {
            SourceFormat::Raw
        },
    };

    let (orchestrator, notices) = Orchestrator::new(service);

    match (cli.url, cli.query) {
        (Some(url), Some(query)) => {
            let ok = run_once(&orchestrator, notices, &url, &query, cli.expand, &options).await;
            if !ok {
                std::process::exit(1);
            }
            Ok(())
        }
        (None, None) => interactive(orchestrator, notices, options).await,
        _ => anyhow::bail!("--url and --query must be given together"),
    }
}

async fn run_once(
    orchestrator: &Orchestrator<HttpSearchService>,
    mut notices: mpsc::UnboundedReceiver<Notification>,
    url: &str,
    query: &str,
    expand: Option<usize>,
    options: &ViewOptions,
) -> bool {
    let outcome = orchestrator.run_index_and_search(url, query).await;
    while let Ok(notice) = notices.try_recv() {
        eprintln!("{}", notice.message);
    }

    if let Some(n) = expand {
        if n == 0 || !orchestrator.toggle_expansion(n - 1) {
            eprintln!("no result number {n} to expand");
        }
    }
    print!("{}", View::project(&orchestrator.snapshot(), options));

    match outcome {
        RunOutcome::Searched { .. } => true,
        RunOutcome::Superseded { .. } => false,
        RunOutcome::Skipped(SkipReason::InvalidInput) => {
            eprintln!("both --url and --query must be non-blank");
            false
        }
        RunOutcome::Skipped(SkipReason::Busy) | RunOutcome::Failed(_) => false,
    }
}

async fn interactive(
    orchestrator: Orchestrator<HttpSearchService>,
    mut notices: mpsc::UnboundedReceiver<Notification>,
    options: ViewOptions,
) -> anyhow::Result<()> {
    // Re-render whenever the projection changes, including the loading state
    // while a run is waiting on the service.
    let mut updates = orchestrator.subscribe();
    let renderer = tokio::spawn(async move {
        let mut last: Option<View> = None;
        loop {
            let view = View::project(&updates.borrow_and_update(), &options);
            if last.as_ref().map(|v| &v.body) != Some(&view.body) {
                print!("{view}");
                last = Some(view);
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
    });
    let notifier = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            eprintln!("! {} ({})", notice.message, notice.raised_at.format("%H:%M:%S"));
        }
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        match command {
            Command::SetUrl(url) => orchestrator.set_url(&url),
            Command::SetQuery(query) => orchestrator.set_query(&query),
            Command::Search => {
                if !orchestrator.submit_enabled() {
                    eprintln!("set both `url` and `query` first");
                    continue;
                }
                let outcome = orchestrator.submit().await;
                tracing::debug!("run finished: {outcome:?}");
            }
            Command::Toggle(index) => {
                if !orchestrator.toggle_expansion(index) {
                    eprintln!("no result number {}", index + 1);
                }
            }
            Command::Show => print!("{}", View::project(&orchestrator.snapshot(), &options)),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Nothing => {}
        }
    }

    // Dropping the orchestrator closes both channels and ends the tasks.
    drop(orchestrator);
    renderer.await?;
    notifier.await?;
    Ok(())
}
