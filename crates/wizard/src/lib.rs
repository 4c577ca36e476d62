pub mod machine;
pub mod place;
pub mod register;
pub mod session;

pub use machine::{
    BackOutcome, Direction, StepDef, SubmitStatus, Wizard, WizardError, WizardSignal,
};
pub use place::PlaceDraft;
pub use register::RegisterDraft;
pub use session::FormSession;
