use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn, LevelFilter};
use std::io;
use std::path::{Path, PathBuf};

mod ui;
mod utils;

use crate::ui::{ChatUI, UiCommand};
use quadchat::chat::{ConversationDirectory, MessageStore, SimulatorConfig};
use quadchat::storage::{self, LocalStore};

/// Command line arguments for Quadchat
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Quadchat: a campus social-network chat client for the terminal.",
    long_about = "Quadchat is a terminal client for the campus social network's chat.\n\n\
    Conversations can be picked from the list, or opened directly with\n\
    --chat <ID> the way a /chat/<id> deep link would.\n\
    Use -h or --help to see all options."
)]
struct Args {
    /// Open a conversation directly (directory id or ad-hoc identifier)
    #[arg(long, value_name = "ID")]
    chat: Option<String>,

    /// Override the directory for local state and the log file
    #[arg(long, value_name = "PATH")]
    state_dir: Option<PathBuf>,

    /// Disable simulated inbound messages
    #[arg(long)]
    no_simulator: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments FIRST
    let args = Args::parse();

    if let Some(dir) = &args.state_dir {
        storage::set_state_dir_override(dir.clone());
    }
    let state_dir = storage::state_dir().context("could not resolve a state directory")?;
    if !state_dir.exists() {
        std::fs::create_dir_all(&state_dir)
            .with_context(|| format!("could not create state directory {}", state_dir.display()))?;
    }

    let log_path = state_dir.join("quadchat.log");
    utils::setup_logging(Some(log_path.as_path()), LevelFilter::Debug)?;

    info!("Quadchat client starting up");
    info!(
        "System information: {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    info!("Logging to file: {}", log_path.display());

    // Seed data stands in for the backend: the directory of known
    // conversations and their message history
    let directory = ConversationDirectory::from_seed()?;
    let store = MessageStore::from_seed()?;
    let local_store = LocalStore::open_default()?;

    let simulator_config = if args.no_simulator {
        info!("delivery simulation disabled on the command line");
        SimulatorConfig::disabled()
    } else {
        SimulatorConfig::default()
    };

    let mut chat_ui = ChatUI::new(directory, store, simulator_config);

    // Entry points: a --chat deep link opens a session immediately;
    // otherwise the list view comes up with the last-open chat selected
    if let Some(identifier) = args.chat.as_deref() {
        info!("deep link into chat {:?}", identifier);
        remember_last_chat(&local_store, identifier);
        chat_ui.open_chat(Some(identifier));
    } else {
        match local_store.get::<String>("last-chat") {
            Ok(Some(last)) => chat_ui.preselect(&last),
            Ok(None) => {}
            Err(e) => warn!("could not read last-chat blob: {}", e),
        }
    }

    let mut terminal = ui::setup_terminal()?;
    let result = run_main_loop(&mut chat_ui, &mut terminal, &local_store).await;
    ui::restore_terminal(terminal)?;

    info!("Quadchat client shutting down");
    result
}

/// Run the main event loop
async fn run_main_loop(
    chat_ui: &mut ChatUI,
    terminal: &mut ui::Terminal<ui::CrosstermBackend<io::Stdout>>,
    local_store: &LocalStore,
) -> Result<()> {
    loop {
        // Draw the UI
        terminal.draw(|f| chat_ui.draw(f))?;

        // Handle user input; handle_input polls with a short timeout so
        // this loop doubles as the redraw tick
        match chat_ui.handle_input()? {
            Some(UiCommand::Quit) => break,
            Some(UiCommand::OpenChat(id)) => {
                remember_last_chat(local_store, &id);
                chat_ui.open_chat(Some(&id));
            }
            Some(UiCommand::SendImage(path)) => {
                send_image_from_disk(chat_ui, &path).await;
            }
            None => {}
        }

        // Pull in anything the delivery simulator produced since the
        // last iteration
        chat_ui.pump_simulated();
    }
    Ok(())
}

fn remember_last_chat(local_store: &LocalStore, identifier: &str) {
    if identifier.trim().is_empty() {
        return;
    }
    if let Err(e) = local_store.put("last-chat", &identifier.to_string()) {
        warn!("could not persist last-chat blob: {}", e);
    }
}

/// Read an image off disk and attach it to the open session. The read is
/// asynchronous so a large file never stalls the transcript; the message
/// is appended only once the payload has been encoded.
async fn send_image_from_disk(chat_ui: &mut ChatUI, path: &Path) {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("could not read image {}: {}", path.display(), e);
            chat_ui.set_status(format!("could not read {}: {}", path.display(), e));
            return;
        }
    };
    let mime = guess_image_mime(path);
    let sent = chat_ui
        .session_mut()
        .and_then(|session| session.send_image(mime, &bytes).map(|m| m.id.clone()));
    match sent {
        Some(id) => info!("image message {} attached from {}", id, path.display()),
        None => chat_ui.set_status(format!("could not attach {}", path.display())),
    }
}

fn guess_image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
