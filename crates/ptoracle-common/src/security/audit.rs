//! Audit observations
//!
//! Every state mutation of the oracle is mirrored as an [`Observation`]:
//! - Committed discount parameter changes
//! - Cache-updating price refreshes
//! - Limit replacements
//!
//! Emission is fire-and-forget; sinks never report back to the engine.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::fixed::Fixed;
use crate::types::parameters::UpdateLimits;

/// A mirrored state mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observation {
    ParameterChanged {
        old_slope: Fixed,
        old_intercept: Fixed,
        slope: Fixed,
        intercept: Fixed,
    },
    PriceUpdated {
        price: Fixed,
        timestamp: u64,
    },
    LimitsChanged {
        old_limits: UpdateLimits,
        limits: UpdateLimits,
    },
}

impl Observation {
    /// Short name used in log lines and category filters
    pub fn kind(&self) -> &'static str {
        match self {
            Observation::ParameterChanged { .. } => "parameter_changed",
            Observation::PriceUpdated { .. } => "price_updated",
            Observation::LimitsChanged { .. } => "limits_changed",
        }
    }
}

/// Observation stamped with an id and wall-clock time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique event ID
    pub event_id: String,
    /// Timestamp (Unix millis)
    pub recorded_at: i64,
    pub observation: Observation,
}

impl AuditRecord {
    pub fn new(observation: Observation) -> Self {
        Self {
            event_id: uuid::Uuid::now_v7().to_string(),
            recorded_at: chrono::Utc::now().timestamp_millis(),
            observation,
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Audit log sink
#[cfg_attr(test, mockall::automock)]
pub trait AuditSink: Send + Sync {
    /// Write an audit record
    fn write(&self, record: &AuditRecord);

    /// Flush pending records
    fn flush(&self);
}

/// Writes records to the tracing log
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn write(&self, record: &AuditRecord) {
        info!(
            event_id = %record.event_id,
            kind = record.observation.kind(),
            "audit {}",
            record.to_json()
        );
    }

    fn flush(&self) {}
}

/// Buffers records in memory
#[derive(Default)]
pub struct MemoryAuditSink {
    buffer: Arc<RwLock<Vec<AuditRecord>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.buffer.read().clone()
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.buffer
            .read()
            .iter()
            .map(|r| r.observation.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.read().is_empty()
    }

    pub fn clear(&self) {
        self.buffer.write().clear();
    }
}

impl AuditSink for MemoryAuditSink {
    fn write(&self, record: &AuditRecord) {
        self.buffer.write().push(record.clone());
    }

    fn flush(&self) {
        debug!(count = self.len(), "Memory audit sink holds records");
    }
}

/// Fans records out to several sinks
pub struct AuditLogger {
    sinks: Vec<Arc<dyn AuditSink>>,
    /// Observation kinds to forward (empty = all)
    enabled_kinds: Vec<&'static str>,
}

impl AuditLogger {
    /// Create a logger writing to the tracing log
    pub fn new() -> Self {
        Self {
            sinks: vec![Arc::new(TracingAuditSink)],
            enabled_kinds: vec![],
        }
    }

    /// Create a logger with no sinks
    pub fn empty() -> Self {
        Self {
            sinks: vec![],
            enabled_kinds: vec![],
        }
    }

    /// Add a sink
    pub fn add_sink(&mut self, sink: Arc<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    /// Builder form of [`add_sink`](Self::add_sink)
    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.add_sink(sink);
        self
    }

    /// Restrict forwarding to the given observation kinds
    pub fn set_enabled_kinds(&mut self, kinds: Vec<&'static str>) {
        self.enabled_kinds = kinds;
    }

    /// Stamp and forward an observation
    pub fn log(&self, observation: Observation) {
        self.write(&AuditRecord::new(observation));
    }
}

impl AuditSink for AuditLogger {
    fn write(&self, record: &AuditRecord) {
        if !self.enabled_kinds.is_empty()
            && !self.enabled_kinds.contains(&record.observation.kind())
        {
            return;
        }
        for sink in &self.sinks {
            sink.write(record);
        }
    }

    fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}
