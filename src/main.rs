//! Sample consumer of the traffic observer.
//!
//! Issues one request (by default a JSON POST to httpbin) through an
//! observed client and lets the observer log it.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use http::header::CONTENT_TYPE;
use http::Method;

use traffic_observer::config::{loader, ConfigWatcher, ObserverConfig};
use traffic_observer::observability::init_logging;
use traffic_observer::{Level, LifecycleBus, ObservedClient, TrafficObserver};

#[derive(Parser)]
#[command(name = "traffic-observer")]
#[command(about = "Send sample HTTP requests through the traffic observer", long_about = None)]
struct Cli {
    /// Target URL.
    #[arg(short, long, default_value = "https://httpbin.org/post")]
    url: String,

    /// HTTP method.
    #[arg(short = 'X', long, default_value = "POST")]
    method: String,

    /// JSON body (ignored for GET and HEAD).
    #[arg(short, long, default_value = r#"{"key":"value"}"#)]
    body: String,

    /// Verbosity level, overriding configuration.
    #[arg(short, long)]
    level: Option<Level>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the configuration file between requests when it changes.
    #[arg(long)]
    watch: bool,

    /// Number of requests to send.
    #[arg(long, default_value_t = 1)]
    repeat: u32,

    /// Pause between requests, in seconds.
    #[arg(long, default_value_t = 2)]
    interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => loader::load_config(path)?,
        None => loader::apply_overrides(ObserverConfig::default(), |key| std::env::var(key).ok())?,
    };
    if let Some(level) = cli.level {
        config.level = level;
    }

    init_logging(&config.logging);

    let observer = TrafficObserver::from_config(LifecycleBus::global().clone(), &config);
    observer.start_observing();

    // Keep the watcher alive for the whole run.
    let (_watcher, mut updates) = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), Some(updates))
        }
        _ => (None, None),
    };

    let client = ObservedClient::new(reqwest::Client::new());
    let method: Method = cli.method.to_ascii_uppercase().parse()?;

    for attempt in 0..cli.repeat {
        if attempt > 0 {
            tokio::time::sleep(Duration::from_secs(cli.interval_secs)).await;
        }

        if let Some(updates) = updates.as_mut() {
            while let Ok(mut update) = updates.try_recv() {
                if let Some(level) = cli.level {
                    update.level = level;
                }
                observer.apply_config(&update);
            }
        }

        let mut request = client.request(method.clone(), &cli.url);
        if method != Method::GET && method != Method::HEAD {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(cli.body.clone());
        }

        // Failures are already reported by the observer.
        if let Err(e) = client.send(request).await {
            tracing::debug!(error = %e, "Sample request failed");
        }
    }

    observer.stop_observing();
    Ok(())
}
