//! Command-line demo driving the orchestration core against a JSON endpoint.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::sync::mpsc;

use intentflow::config::{Config, ConfigStore};
use intentflow::dispatch::handler_fn;
use intentflow::logging::init_tracing;
use intentflow::mvi::Intent;
use intentflow::paging::{PagingEngine, PagingState};
use intentflow::screen::ScreenModel;
use intentflow::source::{DataSource, HttpPageSource, HttpRemote, MemoryStore, Repository};
use intentflow::store::{StateStore, UiState};
use intentflow::{ErrorClassifier, RetryPolicy};

#[derive(Parser)]
#[command(name = "intentflow")]
#[command(about = "Drive intent/state fetches against a JSON endpoint")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one value and print every state and event it produces
    Fetch {
        /// Absolute URL returning a response envelope
        url: String,

        /// Strategy override (network_only, local_only, local_first,
        /// network_first, cache_then_network)
        #[arg(long)]
        source: Option<DataSource>,

        /// Number of fetches; later ones can hit the cache
        #[arg(long, default_value_t = 2)]
        times: u32,
    },
    /// Load a paged endpoint page by page
    Page {
        /// Absolute URL of the paged endpoint; `page` and `size` are appended
        url: String,

        /// Pages to load, including the first
        #[arg(long, default_value_t = 2)]
        pages: u32,
    },
}

enum DemoIntent {
    Fetch,
}

impl Intent for DemoIntent {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = cli.config.unwrap_or_else(Config::config_path);
    let store = ConfigStore::open(path).context("loading configuration")?;
    let config = store.get();
    init_tracing(&config.logging);

    match cli.command {
        Command::Fetch { url, source, times } => run_fetch(&config, url, source, times).await,
        Command::Page { url, pages } => run_pages(&config, url, pages).await,
    }
}

fn remote(config: &Config) -> anyhow::Result<HttpRemote> {
    let timeout = Duration::from_secs(u64::from(config.remote.timeout_seconds));
    Ok(HttpRemote::new(String::new(), timeout)?)
}

async fn run_fetch(
    config: &Config,
    url: String,
    source: Option<DataSource>,
    times: u32,
) -> anyhow::Result<()> {
    let classifier = Arc::new(ErrorClassifier::new());
    let repository = Repository::new(
        Arc::new(MemoryStore::new()),
        config.data_source.to_runtime(),
        RetryPolicy::from(&config.retry),
        classifier.clone(),
    );
    let remote = remote(config)?;
    let state = StateStore::<UiState<Value>>::default();

    let model = ScreenModel::<DemoIntent>::from_config("fetch", config, classifier);
    let mut screen = model.bind_screen("cli");

    let mut changes = state.subscribe();
    screen.scope().spawn(async move {
        while changes.changed().await.is_ok() {
            let current = changes.borrow_and_update().clone();
            println!("state: {:?}", current);
        }
    });

    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let context = model.context().clone();
    let handler_state = state.clone();
    model.start(handler_fn(move |DemoIntent::Fetch| {
        let context = context.clone();
        let repository = repository.clone();
        let remote = remote.clone();
        let state = handler_state.clone();
        let url = url.clone();
        let done_tx = done_tx.clone();
        async move {
            let results = repository.fetch_stream(&url, source, || remote.get::<Value>(&url));
            context.observe(&state, results).await;
            let _ = done_tx.send(());
        }
    }));

    for _ in 0..times {
        model.send(DemoIntent::Fetch);
        loop {
            tokio::select! {
                Some(event) = screen.next_event() => println!("event: {:?}", event),
                _ = done_rx.recv() => break,
            }
        }
        while let Some(event) = screen.try_next_event() {
            println!("event: {:?}", event);
        }
    }

    println!("final: {:?}", state.get());
    Ok(())
}

async fn run_pages(config: &Config, url: String, pages: u32) -> anyhow::Result<()> {
    let source = Arc::new(HttpPageSource::<Value>::new(remote(config)?, url));
    let engine = PagingEngine::new(
        source,
        config.data_source.to_runtime(),
        config.paging.page_size,
    )
    .with_retry(RetryPolicy::from(&config.retry));

    engine.load_first().await;
    println!("page 1: {}", describe(&engine.state()));

    for page in 2..=pages {
        if !engine.load_more().await {
            println!("page {}: not loaded ({})", page, describe(&engine.state()));
            break;
        }
        println!("page {}: {}", page, describe(&engine.state()));
    }

    Ok(())
}

fn describe(state: &PagingState<Value>) -> String {
    let kind = match state {
        PagingState::Idle => "idle",
        PagingState::Loading => "loading",
        PagingState::LoadingMore { .. } => "loading more",
        PagingState::Success { .. } => "success",
        PagingState::Error { message, .. } => return format!("error: {} ({} items kept)", message, state.items().len()),
        PagingState::Empty => "empty",
        PagingState::NoMoreData { .. } => "no more data",
    };
    format!("{} ({} items)", kind, state.items().len())
}
