//! Tascboard CLI - drive detail editors from the command line.
//!
//! This tool runs scripted editing sessions against an in-memory workspace
//! so the auto-sync behavior (debounce, single-flight saves, failure
//! handling) can be observed, and prints the effective configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tascboard_app::{AppConfig, DetailEditor, Workspace};
use tascboard_common::{BoardId, OrgId, TascId, TrackId, UserId};
use tascboard_model::{Board, Organization, Tasc, Track};
use tascboard_store::{
    ActivityLog, MemoryActivityLog, MemoryStore, RoleCapabilities, WorkspaceStore,
};
use tascboard_sync::{AutoSyncConfig, AutoSyncOptions, SaveHandler};

#[derive(Parser)]
#[command(name = "tascboard")]
#[command(about = "Tascboard - boards, tracks and tascs with auto-synced editors")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (default: <config dir>/tascboard/config.json).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted editing session and print sync status transitions.
    Simulate {
        /// Which detail editor to drive.
        #[arg(short, long, value_enum, default_value = "tasc")]
        entity: Entity,

        /// Name edit as VALUE@OFFSET_MS, e.g. "Launch v2@150". Repeatable.
        #[arg(short = 'E', long = "edit", value_parser = parse_edit, required = true)]
        edits: Vec<Edit>,

        /// Override the debounce delay.
        #[arg(short, long)]
        debounce_ms: Option<u64>,

        /// Simulated latency of each save.
        #[arg(short, long, default_value_t = 0)]
        latency_ms: u64,

        /// Number of initial saves that fail.
        #[arg(short, long, default_value_t = 0)]
        fail_first: usize,

        /// Schedule a trailing save when edits land during a save.
        #[arg(short, long)]
        trailing_save: bool,
    },

    /// Print the effective configuration.
    Config,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Entity {
    Board,
    Track,
    Tasc,
}

/// One scripted edit: set the name to `value` at `at` after start.
#[derive(Debug, Clone)]
struct Edit {
    value: String,
    at: Duration,
}

fn parse_edit(raw: &str) -> std::result::Result<Edit, String> {
    let (value, offset) = raw
        .rsplit_once('@')
        .ok_or_else(|| format!("expected VALUE@OFFSET_MS, got {:?}", raw))?;
    let offset: u64 = offset
        .trim()
        .parse()
        .map_err(|e| format!("invalid offset {:?}: {}", offset, e))?;
    Ok(Edit {
        value: value.to_string(),
        at: Duration::from_millis(offset),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.as_deref().unwrap_or(default_level)))
        .context("Invalid log filter")?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Simulate {
            entity,
            mut edits,
            debounce_ms,
            latency_ms,
            fail_first,
            trailing_save,
        } => {
            let mut auto_sync = config.auto_sync.clone();
            if let Some(ms) = debounce_ms {
                auto_sync.debounce_delay_ms = ms;
            }
            auto_sync.trailing_save |= trailing_save;
            edits.sort_by_key(|edit| edit.at);

            let session = Session {
                latency: Duration::from_millis(latency_ms),
                fail_first,
                edits,
            };
            cmd_simulate(entity, auto_sync, session).await
        }

        Commands::Config => cmd_config(&config),
    }
}

/// Parameters of one simulated session.
struct Session {
    latency: Duration,
    fail_first: usize,
    edits: Vec<Edit>,
}

/// Ids of the seeded demo workspace.
struct Seeded {
    user: UserId,
    board: BoardId,
    track: TrackId,
    tasc: TascId,
}

async fn seed(store: &MemoryStore) -> Result<Seeded> {
    let user = UserId::new("demo")?;
    let org = OrgId::new("acme")?;
    let board = BoardId::new("roadmap")?;
    let track = TrackId::new("q3")?;
    let tasc = TascId::new("launch")?;

    store
        .create_organization(Organization::new(org.clone(), "Acme"))
        .await?;
    store
        .create_board(Board::new(board.clone(), org, "Roadmap", user.clone()))
        .await?;
    store
        .create_track(Track::new(track.clone(), board.clone(), "Q3"))
        .await?;
    store
        .create_tasc(Tasc::new(tasc.clone(), track.clone(), "Launch"))
        .await?;

    Ok(Seeded {
        user,
        board,
        track,
        tasc,
    })
}

/// Run a scripted session against an in-memory workspace.
async fn cmd_simulate(
    entity: Entity,
    auto_sync: AutoSyncConfig,
    session: Session,
) -> Result<()> {
    info!(
        "Simulating {:?} editor, debounce {} ms",
        entity, auto_sync.debounce_delay_ms
    );

    let memory = Arc::new(MemoryStore::new().with_latency(session.latency));
    let ids = seed(&memory).await.context("Failed to seed workspace")?;
    memory.fail_next_updates(session.fail_first);

    let store: Arc<dyn WorkspaceStore> = memory;
    let settle = (auto_sync.debounce_delay() + session.latency) * 2 + Duration::from_millis(100);
    let workspace = Workspace::new(
        store.clone(),
        Arc::new(MemoryActivityLog::new()),
        Arc::new(RoleCapabilities::new(store.clone())),
        auto_sync,
    );

    let start = Instant::now();
    match entity {
        Entity::Board => {
            let editor = workspace
                .open_board_editor(&ids.board, &ids.user, reporting_options(&workspace, start))
                .await?;
            run_session(editor, &session.edits, start, settle, |b, v| b.name = v.to_string())
                .await?;
            println!("Final board name: {:?}", store.get_board(&ids.board).await?.name);
        }
        Entity::Track => {
            let editor = workspace
                .open_track_editor(&ids.track, &ids.user, reporting_options(&workspace, start))
                .await?;
            run_session(editor, &session.edits, start, settle, |t, v| t.name = v.to_string())
                .await?;
            println!("Final track name: {:?}", store.get_track(&ids.track).await?.name);
        }
        Entity::Tasc => {
            let editor = workspace
                .open_tasc_editor(&ids.tasc, &ids.user, reporting_options(&workspace, start))
                .await?;
            run_session(editor, &session.edits, start, settle, |t, v| t.name = v.to_string())
                .await?;
            println!("Final tasc name: {:?}", store.get_tasc(&ids.tasc).await?.name);
        }
    }

    let entries = workspace.activity().entries_for(&ids.board).await?;
    println!("Activity ({} entries):", entries.len());
    for entry in entries {
        println!("  {} {}", entry.at.format("%H:%M:%S%.3f"), entry.summary);
    }

    Ok(())
}

fn stamp(start: Instant) -> String {
    format!("[{:>6} ms]", start.elapsed().as_millis())
}

fn reporting_options<T: Send + 'static>(workspace: &Workspace, start: Instant) -> AutoSyncOptions<T> {
    workspace
        .options()
        .on_success(move |_: &T| println!("{} save succeeded", stamp(start)))
        .on_error(move |err| println!("{} save failed: {}", stamp(start), err))
}

async fn run_session<S, H>(
    mut editor: DetailEditor<S, H>,
    edits: &[Edit],
    start: Instant,
    settle: Duration,
    apply: impl Fn(&mut S, &str),
) -> Result<()>
where
    S: Serialize + Debug + Clone + Send + Sync + 'static,
    H: SaveHandler<S> + 'static,
{
    let mut status = editor.subscribe();
    let watcher = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let state = *status.borrow_and_update();
            println!("{} status: {}", stamp(start), state);
        }
    });

    for edit in edits {
        sleep_until(start + edit.at).await;
        editor
            .edit(|values| apply(values, &edit.value))
            .context("Edit rejected")?;
        println!("{} edit name = {:?}", stamp(start), edit.value);
    }

    sleep(settle).await;
    if editor.close() {
        println!("{} flushed pending edit on close", stamp(start));
        sleep(settle).await;
    }
    watcher.abort();
    Ok(())
}

/// Print the effective configuration.
fn cmd_config(config: &AppConfig) -> Result<()> {
    println!("{}", config.to_json()?);
    if let Some(path) = AppConfig::default_path() {
        println!("Default location: {}", path.display());
    }
    Ok(())
}
