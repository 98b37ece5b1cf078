mod config;
mod face;
mod types;

use anyhow::Result;
use browser_steps::Recorder;
use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::mpsc;
use tracing::{error, info};
use types::{Command, SessionInfo};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = config::Config::parse();
    browser_steps::logging::init(&config.log)?;

    let recorder = Recorder::new();
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(32);

    // 1. Web front end first, reading snapshots straight from the recorder's feed
    let state = face::AppState {
        cmd_tx,
        steps: recorder.subscribe(),
        recipe_dir: config.recipe_dir(),
    };
    let listener = face::bind(&config.host, config.port).await?;
    info!(addr = %listener.local_addr()?, recipe_dir = %state.recipe_dir.display(), "recorder listening");

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, face::router(state)).await {
            error!(error = %err, "web server stopped");
        }
    });

    // 2. The session loop owns the recorder; every write goes through it
    tokio::select! {
        _ = run_session_loop(recorder, cmd_rx) => {}
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}

/// Applies commands one at a time until every sender is gone.
pub(crate) async fn run_session_loop(mut recorder: Recorder, mut cmd_rx: mpsc::Receiver<Command>) {
    while let Some(command) = cmd_rx.recv().await {
        handle_command(&mut recorder, command);
    }
}

fn handle_command(recorder: &mut Recorder, command: Command) {
    // A dropped reply means the client went away; the state change still stands.
    match command {
        Command::Status { reply } => {
            let _ = reply.send(session_info(recorder));
        }
        Command::Start { reply } => {
            recorder.start();
            let _ = reply.send(session_info(recorder));
        }
        Command::Discard { reply } => {
            recorder.discard();
            let _ = reply.send(session_info(recorder));
        }
        Command::Finish {
            name,
            recipe_dir,
            reply,
        } => {
            // Saved inline so nothing can be recorded between snapshot and write;
            // a failed write leaves the session open.
            let result = recorder.finish_with(name, |recipe| {
                let path = recipe_dir.join(recipe.file_name());
                recipe.save(&path)?;
                Ok(path)
            });
            let _ = reply.send(result);
        }
        Command::Apply { command, reply } => {
            let _ = reply.send(recorder.apply(command));
        }
    }
}

fn session_info(recorder: &Recorder) -> SessionInfo {
    SessionInfo {
        recording: recorder.is_recording(),
        session_id: recorder.session_id(),
        steps: recorder.store().map(|store| store.len()).unwrap_or_default(),
    }
}
