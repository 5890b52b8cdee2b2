//! Spin audit trail

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::spin::Grid;

/// One audited spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinAudit {
    pub spin_id: String,
    pub grid: Grid,
    pub bet: u64,
    pub total: u64,
    pub timestamp: DateTime<Utc>,
}

/// Receives every resolved spin
///
/// Failures are reported back but never affect the spin.
pub trait AuditSink: Send + Sync {
    fn record(&self, audit: &SpinAudit) -> Result<(), String>;
}

/// Writes audits to the log
#[derive(Debug, Clone)]
pub struct LogAuditSink {
    endpoint: String,
}

impl LogAuditSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl AuditSink for LogAuditSink {
    fn record(&self, audit: &SpinAudit) -> Result<(), String> {
        let body = serde_json::to_string(audit).map_err(|e| e.to_string())?;
        log::info!("POST {} (stub) {}", self.endpoint, body);
        Ok(())
    }
}

/// Keeps audits in memory
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<SpinAudit>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SpinAudit> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, audit: &SpinAudit) -> Result<(), String> {
        self.records.lock().push(audit.clone());
        Ok(())
    }
}

impl<T: AuditSink + ?Sized> AuditSink for std::sync::Arc<T> {
    fn record(&self, audit: &SpinAudit) -> Result<(), String> {
        (**self).record(audit)
    }
}
