//! The ordered step sequence a recording session accumulates.
//!
//! Every mutation builds a fresh `Vec<Step>` and publishes it as a new
//! [`Snapshot`]; readers holding an older snapshot keep seeing exactly what
//! they were handed. The store has a single writer (`&mut self`), so no
//! locking is involved.

use indexmap::IndexMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tracing::debug;

use crate::step::{ListStep, Pagination, ScreenshotStep, SelectorDescriptor, Step, StepId, TextStep};

/// Immutable view of the sequence at one point in time.
pub type Snapshot = Arc<Vec<Step>>;

/// What `add_list_step` did with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListUpsert {
    Created,
    Merged,
}

/// Hands out time-based ids that never repeat within a store.
#[derive(Debug, Default)]
struct IdGenerator {
    last: StepId,
}

impl IdGenerator {
    fn next_id(&mut self, in_use: impl Fn(StepId) -> bool) -> StepId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as StepId)
            .unwrap_or_default();

        let mut id = now.max(self.last.saturating_add(1));
        while in_use(id) {
            id = match id.checked_add(1) {
                Some(next) => next,
                // Top of the id space is taken; fall back to the lowest free id.
                None => (1..StepId::MAX)
                    .find(|candidate| !in_use(*candidate))
                    .unwrap_or_default(),
            };
        }
        self.last = id;
        id
    }
}

pub struct StepSequenceStore {
    steps: Snapshot,
    ids: IdGenerator,
    tx: watch::Sender<Snapshot>,
}

impl Default for StepSequenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StepSequenceStore {
    pub fn new() -> Self {
        let steps: Snapshot = Arc::new(Vec::new());
        let (tx, _) = watch::channel(steps.clone());
        Self {
            steps,
            ids: IdGenerator::default(),
            tx,
        }
    }

    /// Current ordered sequence.
    pub fn steps(&self) -> Snapshot {
        self.steps.clone()
    }

    /// Receiver that observes every snapshot published after this call.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub fn get(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|step| step.id() == id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a text capture with a freshly generated id.
    pub fn add_text_step(
        &mut self,
        label: impl Into<String>,
        data: impl Into<String>,
        selector: SelectorDescriptor,
    ) -> StepId {
        let id = self.fresh_id();
        let label = label.into();
        debug!(step_id = id, label = %label, selector = %selector.selector, "add text step");

        let mut next = self.steps.as_ref().clone();
        next.push(Step::Text(TextStep {
            id,
            label,
            data: data.into(),
            selector,
        }));
        self.publish(next);
        id
    }

    /// Upsert the list step keyed by `list_id`.
    ///
    /// An existing list step is replaced in place: `fields` are merged with the
    /// incoming names winning, while `list_selector`, `pagination` and `limit`
    /// take the incoming value outright (`None` clears them).
    pub fn add_list_step(
        &mut self,
        list_selector: impl Into<String>,
        fields: IndexMap<String, TextStep>,
        list_id: StepId,
        pagination: Option<Pagination>,
        limit: Option<u32>,
    ) -> ListUpsert {
        let list_selector = list_selector.into();
        let mut next = self.steps.as_ref().clone();

        let existing = next.iter_mut().find_map(|step| match step {
            Step::List(list) if list.id == list_id => Some(list),
            _ => None,
        });

        let outcome = match existing {
            Some(list) => {
                debug!(
                    list_id,
                    incoming = fields.len(),
                    existing = list.fields.len(),
                    "merge list step fields"
                );
                list.list_selector = list_selector;
                list.fields.extend(fields);
                list.pagination = pagination;
                list.limit = limit;
                ListUpsert::Merged
            }
            None => {
                debug!(list_id, fields = fields.len(), "add list step");
                next.push(Step::List(ListStep {
                    id: list_id,
                    list_selector,
                    fields,
                    pagination,
                    limit,
                }));
                ListUpsert::Created
            }
        };

        self.publish(next);
        outcome
    }

    /// Append a screenshot directive. Identical directives are still distinct steps.
    pub fn add_screenshot_step(&mut self, full_page: bool) -> StepId {
        let id = self.fresh_id();
        debug!(step_id = id, full_page, "add screenshot step");

        let mut next = self.steps.as_ref().clone();
        next.push(Step::Screenshot(ScreenshotStep { id, full_page }));
        self.publish(next);
        id
    }

    /// Remove the step(s) carrying `id`. Returns `false` when nothing matched.
    pub fn delete_browser_step(&mut self, id: StepId) -> bool {
        if self.get(id).is_none() {
            debug!(step_id = id, "delete ignored, no such step");
            return false;
        }

        let next: Vec<Step> = self
            .steps
            .iter()
            .filter(|step| step.id() != id)
            .cloned()
            .collect();
        debug!(step_id = id, remaining = next.len(), "delete step");
        self.publish(next);
        true
    }

    /// Relabel a text step. Missing ids and non-text steps are left alone.
    pub fn update_browser_text_step_label(
        &mut self,
        id: StepId,
        new_label: impl Into<String>,
    ) -> bool {
        let Some(index) = self
            .steps
            .iter()
            .position(|step| matches!(step, Step::Text(text) if text.id == id))
        else {
            debug!(step_id = id, "relabel ignored, no text step with this id");
            return false;
        };

        let mut next = self.steps.as_ref().clone();
        if let Step::Text(text) = &mut next[index] {
            text.label = new_label.into();
            debug!(step_id = id, label = %text.label, "relabel text step");
        }
        self.publish(next);
        true
    }

    /// Empty the sequence. Used when a recording starts over or is discarded.
    pub fn clear(&mut self) {
        if self.steps.is_empty() {
            return;
        }
        debug!(dropped = self.steps.len(), "clear step sequence");
        self.publish(Vec::new());
    }

    fn fresh_id(&mut self) -> StepId {
        let steps = &self.steps;
        self.ids
            .next_id(|candidate| steps.iter().any(|step| step.id() == candidate))
    }

    fn publish(&mut self, next: Vec<Step>) {
        self.steps = Arc::new(next);
        self.tx.send_replace(self.steps.clone());
    }
}
