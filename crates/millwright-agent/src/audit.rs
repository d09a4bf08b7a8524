//! Append-only audit log for delivered responses

use millwright_domain::AuditRecord;
use std::sync::{Mutex, MutexGuard};

/// Grounding score below which an audited response raises a warn-level
/// alert event
pub const ALERT_THRESHOLD: f64 = 0.6;

/// In-memory append-only audit log.
///
/// Every delivered response is recorded here and emitted as a structured
/// tracing event for the observability pipeline. Records are never
/// modified or removed.
#[derive(Debug, Default)]
pub struct AuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl AuditLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, emitting the audit event (and the low-grounding
    /// alert when the score is below [`ALERT_THRESHOLD`])
    pub fn append(&self, record: AuditRecord) {
        tracing::info!(
            response_id = %record.response_id,
            grounding_score = record.grounding_score,
            citations = record.citations.len(),
            "response audited"
        );
        if record.grounding_score < ALERT_THRESHOLD {
            tracing::warn!(
                response_id = %record.response_id,
                grounding_score = record.grounding_score,
                ungrounded = record.ungrounded_claims.len(),
                "grounding score below alert threshold"
            );
        }
        self.lock().push(record);
    }

    /// Snapshot of all records, oldest first
    pub fn records(&self) -> Vec<AuditRecord> {
        self.lock().clone()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AuditRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
