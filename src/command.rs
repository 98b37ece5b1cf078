use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::step::{Pagination, SelectorDescriptor, StepId, TextStep};
use crate::store::{ListUpsert, StepSequenceStore};

/// A single mutation the capture side asks the store to perform.
///
/// This is the serialized write surface: the recorder service receives it as
/// a request body and `browser-steps replay` reads it one per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum StepCommand {
    AddText {
        label: String,
        data: String,
        #[serde(rename = "selectorObj")]
        selector: SelectorDescriptor,
    },
    #[serde(rename_all = "camelCase")]
    AddList {
        list_selector: String,
        #[serde(default)]
        fields: IndexMap<String, TextStep>,
        list_id: StepId,
        #[serde(default)]
        pagination: Option<Pagination>,
        #[serde(default)]
        limit: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    AddScreenshot {
        #[serde(default)]
        full_page: bool,
    },
    Delete {
        id: StepId,
    },
    Relabel {
        id: StepId,
        label: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "id", rename_all = "camelCase")]
pub enum CommandOutcome {
    Appended(StepId),
    Merged(StepId),
    Deleted(StepId),
    Relabeled(StepId),
    Unchanged(StepId),
}

impl CommandOutcome {
    pub fn step_id(&self) -> StepId {
        match *self {
            CommandOutcome::Appended(id)
            | CommandOutcome::Merged(id)
            | CommandOutcome::Deleted(id)
            | CommandOutcome::Relabeled(id)
            | CommandOutcome::Unchanged(id) => id,
        }
    }

    pub fn changed(&self) -> bool {
        !matches!(self, CommandOutcome::Unchanged(_))
    }
}

impl StepCommand {
    pub fn apply(self, store: &mut StepSequenceStore) -> CommandOutcome {
        match self {
            StepCommand::AddText {
                label,
                data,
                selector,
            } => CommandOutcome::Appended(store.add_text_step(label, data, selector)),
            StepCommand::AddList {
                list_selector,
                fields,
                list_id,
                pagination,
                limit,
            } => match store.add_list_step(list_selector, fields, list_id, pagination, limit) {
                ListUpsert::Created => CommandOutcome::Appended(list_id),
                ListUpsert::Merged => CommandOutcome::Merged(list_id),
            },
            StepCommand::AddScreenshot { full_page } => {
                CommandOutcome::Appended(store.add_screenshot_step(full_page))
            }
            StepCommand::Delete { id } => {
                if store.delete_browser_step(id) {
                    CommandOutcome::Deleted(id)
                } else {
                    CommandOutcome::Unchanged(id)
                }
            }
            StepCommand::Relabel { id, label } => {
                if store.update_browser_text_step_label(id, label) {
                    CommandOutcome::Relabeled(id)
                } else {
                    CommandOutcome::Unchanged(id)
                }
            }
        }
    }
}
