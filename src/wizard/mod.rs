mod engine;
mod outcome;
mod state;
mod types;
mod validator;

pub use engine::WizardEngine;
pub use outcome::{AdvanceOutcome, ArtifactKind, BlockReason, EnterOutcome, Warning};
pub use state::{Submission, WizardState};
pub use types::{FieldKey, InputKind, Step};
pub use validator::StepValidator;
