use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use kanony::config::Settings;
use kanony::handlers::{handle_event, AppState, Flow};
use kanony::models::{ChatState, InboundEvent, ParticipantId};
use kanony::services::notify::{DeliveryError, Notifier};
use kanony::services::persistence;

/// Reference transport for the out-of-scope platform protocol: outbound
/// notifications as JSON lines on stdout, one object per delivery.
struct StdoutNotifier {
    out: tokio::sync::Mutex<tokio::io::Stdout>,
}

impl StdoutNotifier {
    fn new() -> Self {
        Self {
            out: tokio::sync::Mutex::new(tokio::io::stdout()),
        }
    }
}

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn deliver(&self, to: ParticipantId, text: &str) -> Result<(), DeliveryError> {
        let mut line = serde_json::json!({ "to": to, "text": text }).to_string();
        line.push('\n');
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting k-Anony pairing engine...");

    // Load configuration; a missing bot credential must not start serving.
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully");

    // Restore state; a broken data file is logged, not fatal.
    let data_file = PathBuf::from(&settings.storage.data_file);
    let state = persistence::load(&data_file)
        .unwrap_or_else(|e| {
            error!("Failed to load {}: {} (starting fresh)", data_file.display(), e);
            ChatState::default()
        })
        .shared();

    let autosave_every = Duration::from_secs(settings.storage.autosave_interval_secs);
    tokio::spawn(persistence::autosave(
        state.clone(),
        data_file.clone(),
        autosave_every,
    ));
    info!("Autosave every {:?} to {}", autosave_every, data_file.display());

    let app = AppState {
        state: state.clone(),
        notifier: Arc::new(StdoutNotifier::new()),
        settings,
    };

    info!("k-Anony started; reading events from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<InboundEvent>(line) {
                    Ok(event) => {
                        if handle_event(&app, event).await == Flow::Shutdown {
                            break;
                        }
                    }
                    Err(e) => warn!("ignoring malformed event: {}", e),
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!("failed to read event stream: {}", e);
                break;
            }
        }
    }

    // Flush a final snapshot before exit.
    persistence::persist(&state, &data_file).await;
    info!("k-Anony stopped.");
}
