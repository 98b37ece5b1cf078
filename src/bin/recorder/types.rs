use browser_steps::{CommandOutcome, Recipe, StepCommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::oneshot;

/// Requests the web handlers hand to the session loop, each with its reply slot.
pub enum Command {
    Status {
        reply: oneshot::Sender<SessionInfo>,
    },
    Start {
        reply: oneshot::Sender<SessionInfo>,
    },
    Discard {
        reply: oneshot::Sender<SessionInfo>,
    },
    Finish {
        name: String,
        recipe_dir: PathBuf,
        reply: oneshot::Sender<browser_steps::Result<(Recipe, PathBuf)>>,
    },
    Apply {
        command: StepCommand,
        reply: oneshot::Sender<browser_steps::Result<CommandOutcome>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub recording: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<u64>,
    pub steps: usize,
}

#[derive(Deserialize)]
pub struct FinishPayload {
    #[serde(default = "default_recipe_name")]
    pub name: String,
}

fn default_recipe_name() -> String {
    "recording".to_string()
}

#[derive(Deserialize)]
pub struct LabelPayload {
    pub label: String,
}

#[derive(Serialize)]
pub struct FinishResponse {
    pub path: PathBuf,
    pub recipe: Recipe,
}
