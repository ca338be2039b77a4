//! # raidboard-server
//!
//! HTTP server for the raid sign-up board.
//!
//! This binary provides:
//! - **Account API** for registration and login (SHA-256 password digests,
//!   bearer-token sessions with a 7-day TTL)
//! - **Event roster API**: create events, join as primary or backup, leave,
//!   and the two-step creator-confirmed cancellation
//! - **Flat-file persistence**: every mutation rewrites the two CSV record
//!   files in full via the repository layer
//!
//! There is deliberately no cross-process locking: concurrent writers race
//! at the file level and the last one wins, which is acceptable for the
//! handful of users this board serves.

mod accounts;
mod api;
mod board;
mod config;
mod error;
mod sessions;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use raidboard_store::{AccountRepository, EventRepository, RecordStore};

use crate::accounts::AccountService;
use crate::api::AppState;
use crate::board::BoardService;
use crate::config::ServerConfig;
use crate::sessions::SessionProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,raidboard_server=debug")),
        )
        .init();

    info!("Starting raid board server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the record store and validate both files up front.
    //    A malformed record file aborts startup; running against corrupt
    //    state would let the next full-file rewrite destroy it.
    // -----------------------------------------------------------------------
    let store = Arc::new(RecordStore::new(
        config.accounts_file.clone(),
        config.events_file.clone(),
    ));

    let accounts = store.load_accounts()?;
    let events = store.load_events()?;
    info!(
        accounts = accounts.len(),
        events = events.len(),
        accounts_file = %config.accounts_file.display(),
        events_file = %config.events_file.display(),
        "Record files loaded"
    );

    // -----------------------------------------------------------------------
    // 4. Build services
    // -----------------------------------------------------------------------
    let account_service = AccountService::new(AccountRepository::new(store.clone()));
    let board_service = BoardService::new(EventRepository::new(store));
    let sessions = SessionProvider::new(config.session_ttl_days);

    let app_state = AppState {
        accounts: account_service,
        board: board_service,
        sessions: sessions.clone(),
        config: Arc::new(config.clone()),
    };

    // -----------------------------------------------------------------------
    // 5. Spawn background tasks
    // -----------------------------------------------------------------------

    // Periodic session cleanup (every hour).
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            sessions.purge_expired().await;
        }
    });

    // Periodic cleanup of abandoned cancellation confirmations
    // (every 5 minutes, drop entries older than 15 minutes).
    let board = app_state.board.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            board
                .purge_stale_cancellations(chrono::Duration::minutes(15))
                .await;
        }
    });

    // -----------------------------------------------------------------------
    // 6. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    let http_addr = config.http_addr;
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
