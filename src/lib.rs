pub mod command;
pub mod error;
pub mod logging;
pub mod recipe;
pub mod session;
pub mod step;
pub mod store;

pub use command::{CommandOutcome, StepCommand};
pub use error::{RecorderError, Result};
pub use recipe::Recipe;
pub use session::Recorder;
pub use step::{ListStep, Pagination, ScreenshotStep, SelectorDescriptor, Step, StepId, StepKind, TextStep};
pub use store::{ListUpsert, Snapshot, StepSequenceStore};
