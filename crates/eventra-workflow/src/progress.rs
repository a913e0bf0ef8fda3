//! Derived milestone progress.
//!
//! Pure functions of the task statuses: recomputing twice with no
//! intervening task change yields the same result.

use eventra_core::models::milestone::MilestoneStatus;
use eventra_core::models::task::TaskStatus;

/// Completion percentage: `round(100 * done / total)`, `0` for an empty
/// task list.
pub fn milestone_progress(statuses: &[TaskStatus]) -> u8 {
    if statuses.is_empty() {
        return 0;
    }
    let done = statuses.iter().filter(|s| s.counts_as_done()).count();
    (100.0 * done as f64 / statuses.len() as f64).round() as u8
}

/// Lifecycle state as derived from the task statuses alone.
///
/// Readiness requires every task done, not a rounded 100: a large
/// milestone can round to 100 while a task is still open.
pub fn derive_status(statuses: &[TaskStatus]) -> MilestoneStatus {
    if statuses.is_empty() {
        MilestoneStatus::NoTasks
    } else if statuses.iter().all(|s| s.counts_as_done()) {
        MilestoneStatus::ReadyForApproval
    } else {
        MilestoneStatus::InProgress
    }
}

/// Combine the stored state with the freshly derived one.
///
/// A review verdict survives recomputation while the task statuses
/// still support it; once a task reopens (or completes again after
/// changes were requested), the derived state wins.
pub fn effective_status(stored: MilestoneStatus, derived: MilestoneStatus) -> MilestoneStatus {
    match (stored, derived) {
        (MilestoneStatus::Approved, MilestoneStatus::ReadyForApproval) => MilestoneStatus::Approved,
        (MilestoneStatus::ChangesRequested, MilestoneStatus::InProgress) => {
            MilestoneStatus::ChangesRequested
        }
        _ => derived,
    }
}
