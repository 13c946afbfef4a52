pub mod intake;
pub mod orchestrator;
pub mod preview;
pub mod selection;
mod types;

pub use intake::{FileIntake, IntakeOutcome};
pub use orchestrator::{Completion, UploadEvent, UploadOrchestrator, UploadPhase};
pub use preview::{decode_thumbnail, load_thumbnail, PreviewStore, Thumbnail};
pub use selection::{FileInput, PreparedSelection, Selection};
pub use types::{FileKey, RejectedFile, SelectedFile};
