//! Capabilities answered by the operator at the terminal.

use acey_core::effects::{
    BiometricAuthResult, BiometricEffects, DesktopConfirmation, DesktopConfirmationEffects,
    RiskLevel,
};
use acey_core::{AceyError, AceyResult, CeremonyId};
use async_trait::async_trait;
use std::io::{BufRead, Write};

/// Ask a yes/no question on stdin without blocking the runtime.
async fn prompt_yes_no(question: String) -> AceyResult<bool> {
    tokio::task::spawn_blocking(move || -> AceyResult<bool> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{question} [y/N] ")?;
        stdout.flush()?;
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(matches!(line.trim(), "y" | "Y" | "yes" | "YES"))
    })
    .await
    .map_err(|e| AceyError::internal(format!("console prompt task failed: {e}")))?
}

/// Biometric step confirmed by the operator.
///
/// Stands in for a sensor on hosts without biometric hardware.
#[derive(Debug, Clone, Default)]
pub struct ConsoleBiometric;

#[async_trait]
impl BiometricEffects for ConsoleBiometric {
    async fn authenticate(
        &self,
        purpose: &str,
        risk_level: RiskLevel,
    ) -> AceyResult<BiometricAuthResult> {
        let question = format!("[{risk_level}] Biometric check for \"{purpose}\". Present?");
        if prompt_yes_no(question).await? {
            Ok(BiometricAuthResult::accepted())
        } else {
            Ok(BiometricAuthResult::rejected("operator declined biometric check"))
        }
    }
}

/// Desktop approval typed at the terminal.
#[derive(Debug, Clone, Default)]
pub struct ConsoleDesktop;

#[async_trait]
impl DesktopConfirmationEffects for ConsoleDesktop {
    async fn await_confirmation(
        &self,
        ceremony_id: CeremonyId,
    ) -> AceyResult<DesktopConfirmation> {
        let question = format!("Approve unlock {ceremony_id} from the desktop?");
        let confirmed = prompt_yes_no(question).await?;
        Ok(DesktopConfirmation { confirmed })
    }
}
