#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Progress events for pkgrepo
//!
//! Library crates never log or print. They send typed [`AppEvent`]s over an
//! unbounded channel; the binary drains it and decides how to render them.

pub mod events;
pub use events::{
    AppEvent, DownloadEvent, FailureContext, GeneralEvent, MetadataEvent, ResolverEvent,
};

use tokio::sync::mpsc::UnboundedSender;

pub type EventSender = UnboundedSender<AppEvent>;

pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Anything that may hold an event sender.
///
/// Emitting is fire and forget: with no sender, or after the receiver is
/// dropped, events are discarded.
pub trait EventEmitter {
    fn event_sender(&self) -> Option<&EventSender>;

    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            let _ = sender.send(event);
        }
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }

    fn emit_operation_started(&self, operation: &str, coordinates: Vec<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.to_string(),
            coordinates,
        }));
    }

    fn emit_operation_completed(&self, operation: &str, artifacts: usize, duration_ms: u64) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.to_string(),
            artifacts,
            duration_ms,
        }));
    }

    fn emit_operation_failed(&self, operation: &str, failure: FailureContext) {
        self.emit(AppEvent::General(GeneralEvent::OperationFailed {
            operation: operation.to_string(),
            failure,
        }));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
