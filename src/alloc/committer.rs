use crate::inventory::{ContactRecord, InventoryStore, MarkOutcome};
use chrono::NaiveDate;
use std::fmt;
use tracing::warn;

/// Why a candidate could not be claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitFailure {
    /// Issued by someone else after our snapshot.
    AlreadyIssued,
    /// Vanished from the store after our snapshot.
    Missing,
    /// The store failed or timed out on this write.
    Store(String),
}

impl fmt::Display for CommitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitFailure::AlreadyIssued => f.write_str("already issued"),
            CommitFailure::Missing => f.write_str("record missing"),
            CommitFailure::Store(msg) => write!(f, "store error: {msg}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct CommitReport {
    pub claimed: Vec<ContactRecord>,
    pub failed: Vec<(ContactRecord, CommitFailure)>,
}

/// Claim each candidate with a conditional write. A failed candidate never
/// aborts the batch.
pub fn commit<S: InventoryStore + ?Sized>(
    store: &S,
    candidates: Vec<ContactRecord>,
    today: NaiveDate,
) -> CommitReport {
    let mut report = CommitReport::default();
    for candidate in candidates {
        let failure = match store.conditional_mark_issued(candidate.position, today) {
            Ok(MarkOutcome::Claimed(record)) => {
                report.claimed.push(record);
                continue;
            }
            Ok(MarkOutcome::AlreadyIssued) => CommitFailure::AlreadyIssued,
            Ok(MarkOutcome::Missing) => CommitFailure::Missing,
            Err(e) => CommitFailure::Store(e.to_string()),
        };
        warn!(position = candidate.position, reason = %failure, "issuance commit failed");
        report.failed.push((candidate, failure));
    }
    report
}
