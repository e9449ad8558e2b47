//! Session notifications for the presentation layer.

use super::types::{ElementId, FallOutcome};

/// Something the session did that a collaborator may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Spawned { id: ElementId, x: f64 },
    Tapped { id: ElementId, score: u32 },
    Resolved { id: ElementId, outcome: FallOutcome },
    GameOver { final_score: u32 },
    Restarted,
}

/// Receives every [`SessionEvent`] in the order it happened.
pub trait SessionObserver {
    fn on_event(&mut self, event: &SessionEvent);
}

/// Observer that keeps every event it sees. Cloning shares the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: std::sync::Arc<std::sync::Mutex<Vec<SessionEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all recorded events, leaving the log empty.
    pub fn drain(&self) -> Vec<SessionEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionObserver for EventLog {
    fn on_event(&mut self, event: &SessionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Spawned { id, x } => {
                tracing::debug!(element = %id, x = *x, "element spawned");
            }
            SessionEvent::Tapped { id, score } => {
                tracing::debug!(element = %id, score = *score, "element tapped");
            }
            SessionEvent::Resolved { id, outcome } => {
                tracing::debug!(element = %id, ?outcome, "element reached bottom");
            }
            SessionEvent::GameOver { final_score } => {
                tracing::info!(final_score = *final_score, "game over");
            }
            SessionEvent::Restarted => {
                tracing::info!("session restarted");
            }
        }
    }
}
