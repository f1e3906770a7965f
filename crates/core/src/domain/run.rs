// Update Run Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Run ID (UUID v4)
pub type RunId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Started,
    Completed,
    CompletedWithErrors,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Started => "started",
            RunStatus::Completed => "completed",
            RunStatus::CompletedWithErrors => "completed_with_errors",
            RunStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "started" => Some(RunStatus::Started),
            "completed" => Some(RunStatus::Completed),
            "completed_with_errors" => Some(RunStatus::CompletedWithErrors),
            "failed" => Some(RunStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Started)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pass of the refresh scheduler over its worklist.
///
/// Counters only move through `record_success`/`record_failure`, which keeps
/// `processed_items == success_count + failure_count` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRun {
    pub id: RunId,
    pub month_year: String,
    pub status: RunStatus,
    pub started_at: i64, // epoch ms
    pub ended_at: Option<i64>,
    pub total_items: u32,
    pub processed_items: u32,
    pub success_count: u32,
    pub failure_count: u32,
    pub errors: Vec<String>,
}

impl UpdateRun {
    pub fn new(id: impl Into<String>, started_at: i64) -> Self {
        Self {
            id: id.into(),
            month_year: crate::domain::trend::month_key(started_at),
            status: RunStatus::Started,
            started_at,
            ended_at: None,
            total_items: 0,
            processed_items: 0,
            success_count: 0,
            failure_count: 0,
            errors: Vec::new(),
        }
    }

    pub fn set_total(&mut self, total: usize) {
        self.total_items = u32::try_from(total).unwrap_or(u32::MAX);
    }

    pub fn record_success(&mut self) {
        self.processed_items += 1;
        self.success_count += 1;
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.processed_items += 1;
        self.failure_count += 1;
        self.errors.push(error.into());
    }

    /// Note a pass that stopped before its worklist was exhausted.
    /// Counters are untouched; `finish` then reports `CompletedWithErrors`.
    pub fn record_interruption(&mut self) {
        self.errors.push(format!(
            "stopped after {} of {} items",
            self.processed_items, self.total_items
        ));
    }

    pub fn is_truncated(&self) -> bool {
        self.processed_items < self.total_items
    }

    /// Close a run once its item loop has ended
    pub fn finish(&mut self, now_millis: i64) -> Result<RunStatus> {
        let status = if self.failure_count == 0 && !self.is_truncated() {
            RunStatus::Completed
        } else {
            RunStatus::CompletedWithErrors
        };
        self.transition(status, now_millis)?;
        Ok(status)
    }

    /// Close a run aborted by an error outside the per-item loop
    pub fn fail(&mut self, message: impl Into<String>, now_millis: i64) -> Result<()> {
        self.transition(RunStatus::Failed, now_millis)?;
        self.errors.push(message.into());
        Ok(())
    }

    fn transition(&mut self, to: RunStatus, now_millis: i64) -> Result<()> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidRunTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        self.ended_at = Some(now_millis);
        Ok(())
    }

    pub fn duration_minutes(&self) -> Option<f64> {
        self.ended_at
            .map(|end| (end - self.started_at).max(0) as f64 / 60_000.0)
    }
}
