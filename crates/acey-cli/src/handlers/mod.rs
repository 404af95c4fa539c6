//! CLI command handlers.

use acey_unlock::{
    CeremonyScheduler, CeremonyStatus, UnlockCeremony, UnlockCeremonyEffects, UnlockRequest,
};
use anyhow::Result;

pub mod console;
pub mod drill;
pub mod simulated;
pub mod unlock;

/// Start a ceremony, drive it to a terminal status and print progress.
///
/// Returns the process exit code: 0 for `Completed`, 1 otherwise.
pub async fn run_ceremony<E: UnlockCeremonyEffects>(
    ceremony: UnlockCeremony<E>,
    reason: &str,
) -> Result<i32> {
    let request = ceremony.start(reason).await?;
    println!("Ceremony {} started", request.id());
    println!("  reason:  {}", request.reason());
    println!(
        "  window:  {}s",
        request.remaining_ms(request.created_at_ms()) / 1000
    );

    let outcome = CeremonyScheduler::new(ceremony.clone())
        .run_until_terminal_with(request.id(), |snapshot| {
            println!("  -> {}", snapshot.stage());
        })
        .await?;

    ceremony.shutdown();
    print_outcome(&outcome);
    ceremony.acknowledge(outcome.id()).await?;

    Ok(match outcome.status() {
        CeremonyStatus::Completed => 0,
        _ => 1,
    })
}

fn print_outcome(request: &UnlockRequest) {
    println!();
    println!("Ceremony {}: {}", request.id(), request.status());
    if let Some(results) = request.results() {
        println!("  {}", results.summary());
        if let Some(checks) = results.integrity_checks() {
            for check in checks {
                let mark = if check.passed { "ok  " } else { "FAIL" };
                println!("  [{mark}] {:<24} {}", check.name, check.details);
            }
        }
    }
}
