//! Audit trail of admission reviews.
//!
//! Events are fire-and-forget: a sink must never influence the verdict, so
//! [`AuditSink::record`] cannot fail.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::product::Product;

pub const AUDIT_TARGET: &str = "audit";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Review,
    Mutate,
    Validate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Start,
    Skip,
    Error,
    Complete,
    Received,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Step::Review => write!(f, "review"),
            Step::Mutate => write!(f, "mutate"),
            Step::Validate => write!(f, "validate"),
        }
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StepState::Start => write!(f, "start"),
            StepState::Skip => write!(f, "skip"),
            StepState::Error => write!(f, "error"),
            StepState::Complete => write!(f, "complete"),
            StepState::Received => write!(f, "received"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    ObjectReceived {
        object: Product,
    },
    ObjectChanged {
        before: Product,
        after: Product,
    },
    Step {
        step: Step,
        state: StepState,
        message: String,
    },
}

impl AuditEvent {
    pub fn step(step: Step, state: StepState, message: impl Into<String>) -> Self {
        AuditEvent::Step {
            step,
            state,
            message: message.into(),
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Emits audit events as `tracing` events under the [`AUDIT_TARGET`] target.
#[derive(Clone, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        match &event {
            AuditEvent::Step {
                step,
                state,
                message,
            } => info!(
                target: AUDIT_TARGET,
                step = %step,
                step_state = %state,
                "{}",
                message
            ),
            AuditEvent::ObjectReceived { object } => info!(
                target: AUDIT_TARGET,
                name = object.name(),
                namespace = object.namespace(),
                object = %serde_json::to_string(object).unwrap_or_default(),
                "object received"
            ),
            AuditEvent::ObjectChanged { before, after } => info!(
                target: AUDIT_TARGET,
                name = after.name(),
                namespace = after.namespace(),
                before = %serde_json::to_string(before).unwrap_or_default(),
                after = %serde_json::to_string(after).unwrap_or_default(),
                "object changed"
            ),
        }
    }
}
