//! Recording session lifecycle.
//!
//! The [`Recorder`] owns the store for as long as the process runs, but only
//! lets callers reach it between `start` and `finish`/`discard`. Steps never
//! survive a session boundary.

use tokio::sync::watch;
use tracing::{info, warn};

use crate::command::{CommandOutcome, StepCommand};
use crate::error::{RecorderError, Result};
use crate::recipe::Recipe;
use crate::store::{Snapshot, StepSequenceStore};

#[derive(Default)]
pub struct Recorder {
    store: StepSequenceStore,
    active: Option<u64>,
    sessions_started: u64,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn session_id(&self) -> Option<u64> {
        self.active
    }

    /// Snapshot feed; keeps working across sessions.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.store.subscribe()
    }

    /// Begin a new recording, dropping whatever the previous one held.
    pub fn start(&mut self) -> &mut StepSequenceStore {
        if let Some(previous) = self.active {
            info!(
                session_id = previous,
                dropped = self.store.len(),
                "restarting recording, previous steps discarded"
            );
        }
        self.store.clear();
        self.sessions_started += 1;
        self.active = Some(self.sessions_started);
        info!(session_id = self.sessions_started, "recording started");
        &mut self.store
    }

    /// End the session without producing a recipe.
    pub fn discard(&mut self) {
        if let Some(session_id) = self.active.take() {
            info!(session_id, dropped = self.store.len(), "recording discarded");
        }
        self.store.clear();
    }

    /// End the session and return what was recorded.
    pub fn finish(&mut self, name: impl Into<String>) -> Result<Recipe> {
        self.finish_with(name, |_| Ok(())).map(|(recipe, ())| recipe)
    }

    /// Like [`Recorder::finish`], but hands the recipe to `persist` first.
    ///
    /// The session only ends once `persist` succeeds; on error the recording
    /// stays active with every step intact.
    pub fn finish_with<T>(
        &mut self,
        name: impl Into<String>,
        persist: impl FnOnce(&Recipe) -> Result<T>,
    ) -> Result<(Recipe, T)> {
        let session_id = self.active.ok_or(RecorderError::NoActiveSession)?;
        let recipe = Recipe::from_snapshot(name, &self.store.steps());

        let persisted = match persist(&recipe) {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!(session_id, error = %err, "recipe not persisted, recording kept open");
                return Err(err);
            }
        };

        self.active = None;
        info!(session_id, steps = recipe.steps.len(), name = %recipe.name, "recording finished");
        self.store.clear();
        Ok((recipe, persisted))
    }

    pub fn store(&self) -> Result<&StepSequenceStore> {
        match self.active {
            Some(_) => Ok(&self.store),
            None => Err(RecorderError::NoActiveSession),
        }
    }

    pub fn store_mut(&mut self) -> Result<&mut StepSequenceStore> {
        match self.active {
            Some(_) => Ok(&mut self.store),
            None => Err(RecorderError::NoActiveSession),
        }
    }

    pub fn apply(&mut self, command: StepCommand) -> Result<CommandOutcome> {
        Ok(command.apply(self.store_mut()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::SelectorDescriptor;

    #[test]
    fn store_is_unreachable_outside_a_session() {
        let mut recorder = Recorder::new();
        assert!(!recorder.is_recording());
        assert!(matches!(
            recorder.store(),
            Err(RecorderError::NoActiveSession)
        ));
        assert!(matches!(
            recorder.apply(StepCommand::AddScreenshot { full_page: true }),
            Err(RecorderError::NoActiveSession)
        ));
        assert!(matches!(
            recorder.finish("nothing"),
            Err(RecorderError::NoActiveSession)
        ));
    }

    #[test]
    fn start_resets_previous_recording() {
        let mut recorder = Recorder::new();
        recorder
            .start()
            .add_text_step("Title", "Foo", SelectorDescriptor::new("h1"));
        assert_eq!(recorder.session_id(), Some(1));
        assert_eq!(recorder.store().unwrap().len(), 1);

        recorder.start();
        assert_eq!(recorder.session_id(), Some(2));
        assert!(recorder.store().unwrap().is_empty());
    }

    #[test]
    fn finish_returns_recipe_and_closes_session() {
        let mut recorder = Recorder::new();
        recorder.start();
        recorder
            .apply(StepCommand::AddScreenshot { full_page: false })
            .unwrap();

        let recipe = recorder.finish("shots").unwrap();

        assert_eq!(recipe.name, "shots");
        assert_eq!(recipe.steps.len(), 1);
        assert!(!recorder.is_recording());
        assert!(recorder.store_mut().is_err());
    }

    #[test]
    fn failed_persist_keeps_the_recording() {
        let mut recorder = Recorder::new();
        recorder.start().add_screenshot_step(true);

        let result = recorder.finish_with("shots", |_| {
            Err::<(), _>(RecorderError::Io(std::io::Error::other("disk full")))
        });

        assert!(matches!(result, Err(RecorderError::Io(_))));
        assert!(recorder.is_recording());
        assert_eq!(recorder.session_id(), Some(1));
        assert_eq!(recorder.store().unwrap().len(), 1);

        let (recipe, written) = recorder
            .finish_with("shots", |recipe| Ok(recipe.steps.len()))
            .unwrap();
        assert_eq!(written, 1);
        assert_eq!(recipe.steps.len(), 1);
        assert!(!recorder.is_recording());
    }

    #[tokio::test]
    async fn subscription_survives_discard_and_restart() {
        let mut recorder = Recorder::new();
        let mut rx = recorder.subscribe();

        recorder.start().add_screenshot_step(true);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        recorder.discard();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());

        recorder.start().add_screenshot_step(false);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
