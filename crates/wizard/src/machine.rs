use foundation::time::TimeMs;
use runtime::delay::DelaySlot;

/// One step of a wizard: a stable tag plus its exit-validation gate.
///
/// Steps are an explicit tagged sequence rather than bare array indices, so
/// adding/removing/reordering steps cannot silently change which validation
/// runs where.
pub struct StepDef<D> {
    pub id: &'static str,
    pub validate: fn(&D) -> Result<(), String>,
}

impl<D> StepDef<D> {
    pub fn new(id: &'static str, validate: fn(&D) -> Result<(), String>) -> Self {
        Self { id, validate }
    }

    /// A step with no exit gate.
    pub fn open(id: &'static str) -> Self {
        fn always_ok<D>(_: &D) -> Result<(), String> {
            Ok(())
        }
        Self {
            id,
            validate: always_ok::<D>,
        }
    }
}

/// Direction of the last navigation, for direction-aware transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    InFlight,
    Success,
    Error,
}

/// Outcome of `back()`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackOutcome {
    MovedBack,
    /// Already at the first step: the host should invoke its cancel
    /// collaborator and reset the form data.
    CancelRequested,
    /// Navigation is ignored while a submission is being displayed.
    Ignored,
}

/// Timed transition fired by `poll` after the status display delay.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WizardSignal {
    /// Success was displayed; the host should reset the form data and
    /// navigate away.
    Completed,
    /// Error was displayed; the wizard reverted to the form with the data
    /// preserved so the user can retry.
    ErrorCleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    NoSteps,
    SubmitNotFromLastStep,
    SubmitWhileBusy,
    Validation(String),
}

impl std::fmt::Display for WizardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardError::NoSteps => write!(f, "a wizard needs at least one step"),
            WizardError::SubmitNotFromLastStep => {
                write!(f, "submission is only reachable from the final step")
            }
            WizardError::SubmitWhileBusy => write!(f, "a submission is already in progress"),
            WizardError::Validation(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for WizardError {}

/// Ordered-step form wizard.
///
/// The wizard owns navigation, per-step validation gates, and the timed
/// submission-status transitions. It does not own the form data: the host
/// keeps it in a `FormSession` and passes a reference to the gates, so the
/// machine stays generic over the record shape.
///
/// Invariant: the step index is always in `[0, step_count)`.
pub struct Wizard<D> {
    steps: Vec<StepDef<D>>,
    index: usize,
    direction: Direction,
    status: SubmitStatus,
    status_slot: DelaySlot<WizardSignal>,
    status_display_ms: u64,
}

impl<D> Wizard<D> {
    pub const DEFAULT_STATUS_DISPLAY_MS: u64 = 1500;

    pub fn new(steps: Vec<StepDef<D>>) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::NoSteps);
        }
        Ok(Self {
            steps,
            index: 0,
            direction: Direction::Forward,
            status: SubmitStatus::Idle,
            status_slot: DelaySlot::new(),
            status_display_ms: Self::DEFAULT_STATUS_DISPLAY_MS,
        })
    }

    pub fn with_status_display_ms(mut self, ms: u64) -> Self {
        self.status_display_ms = ms;
        self
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step_index(&self) -> usize {
        self.index
    }

    pub fn current_step_id(&self) -> &'static str {
        self.steps[self.index].id
    }

    pub fn is_last_step(&self) -> bool {
        self.index + 1 == self.steps.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn status(&self) -> SubmitStatus {
        self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SubmitStatus::InFlight
    }

    /// Advance past the current step.
    ///
    /// Runs the step's validation gate first; on failure returns the
    /// user-facing message and does not move. Returns `Ok(false)` when
    /// there is nowhere to go (last step) or a submission is displayed.
    pub fn next(&mut self, data: &D) -> Result<bool, String> {
        if self.status != SubmitStatus::Idle || self.is_last_step() {
            return Ok(false);
        }
        (self.steps[self.index].validate)(data)?;
        self.index += 1;
        self.direction = Direction::Forward;
        Ok(true)
    }

    pub fn back(&mut self) -> BackOutcome {
        if self.status != SubmitStatus::Idle {
            return BackOutcome::Ignored;
        }
        if self.index == 0 {
            return BackOutcome::CancelRequested;
        }
        self.index -= 1;
        self.direction = Direction::Backward;
        BackOutcome::MovedBack
    }

    /// Start submission from the final step. The final step's gate runs
    /// here since `next` never passes it.
    pub fn begin_submit(&mut self, data: &D) -> Result<(), WizardError> {
        if self.status != SubmitStatus::Idle {
            return Err(WizardError::SubmitWhileBusy);
        }
        if !self.is_last_step() {
            return Err(WizardError::SubmitNotFromLastStep);
        }
        (self.steps[self.index].validate)(data).map_err(WizardError::Validation)?;
        self.status = SubmitStatus::InFlight;
        Ok(())
    }

    /// The external create/register collaborator succeeded. Success is
    /// displayed for a fixed delay, then `poll` signals completion.
    pub fn submit_succeeded(&mut self, now: TimeMs) {
        if self.status != SubmitStatus::InFlight {
            return;
        }
        self.status = SubmitStatus::Success;
        self.status_slot
            .schedule(now.plus_ms(self.status_display_ms), WizardSignal::Completed);
    }

    /// The collaborator failed. The error is displayed transiently, then
    /// the wizard reverts to the form; the data is preserved for retry.
    pub fn submit_failed(&mut self, now: TimeMs) {
        if self.status != SubmitStatus::InFlight {
            return;
        }
        self.status = SubmitStatus::Error;
        self.status_slot.schedule(
            now.plus_ms(self.status_display_ms),
            WizardSignal::ErrorCleared,
        );
    }

    /// Drive the timed status transitions.
    pub fn poll(&mut self, now: TimeMs) -> Option<WizardSignal> {
        let signal = self.status_slot.poll(now)?;
        self.status = SubmitStatus::Idle;
        Some(signal)
    }

    pub fn next_deadline(&self) -> Option<TimeMs> {
        self.status_slot.next_deadline()
    }

    /// Teardown: cancel the display-delay timer so no transition fires
    /// into a dead context.
    pub fn cancel_timers(&mut self) {
        self.status_slot.cancel();
    }
}
