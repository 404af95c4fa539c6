//! Desktop confirmation channel that answers on command.

use acey_core::effects::{DesktopConfirmation, DesktopConfirmationEffects};
use acey_core::{AceyError, AceyResult, CeremonyId};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

/// Blocks every call until the test sets an answer.
///
/// The answer is sticky: once set, every current and future call returns
/// it.
#[derive(Debug)]
pub struct GatedDesktop {
    answer: watch::Sender<Option<AceyResult<DesktopConfirmation>>>,
    calls: Mutex<Vec<CeremonyId>>,
}

impl GatedDesktop {
    /// No answer yet
    pub fn new() -> Self {
        Self {
            answer: watch::channel(None).0,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Approve
    pub fn confirm(&self) {
        self.answer
            .send_replace(Some(Ok(DesktopConfirmation { confirmed: true })));
    }

    /// Deny
    pub fn deny(&self) {
        self.answer
            .send_replace(Some(Ok(DesktopConfirmation { confirmed: false })));
    }

    /// Answer with a channel error
    pub fn fail_with(&self, error: AceyError) {
        self.answer.send_replace(Some(Err(error)));
    }

    /// Ceremonies that asked for confirmation
    pub fn calls(&self) -> Vec<CeremonyId> {
        self.calls.lock().clone()
    }
}

impl Default for GatedDesktop {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DesktopConfirmationEffects for GatedDesktop {
    async fn await_confirmation(
        &self,
        ceremony_id: CeremonyId,
    ) -> AceyResult<DesktopConfirmation> {
        self.calls.lock().push(ceremony_id);

        let mut rx = self.answer.subscribe();
        loop {
            let answer = rx.borrow_and_update().clone();
            if let Some(answer) = answer {
                return answer;
            }
            if rx.changed().await.is_err() {
                return Err(AceyError::unavailable("desktop channel closed"));
            }
        }
    }
}
