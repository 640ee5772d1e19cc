use crate::domain::events::UserDomainEvent;
use crate::domain::ports::EventPublisher;

/// Records each domain event as a structured `tracing` event.
#[derive(Debug, Default, Clone)]
pub struct TracingEventPublisher;

impl EventPublisher<UserDomainEvent> for TracingEventPublisher {
    fn publish(&self, event: &UserDomainEvent) {
        tracing::info!(
            target: "users_info::events",
            kind = event.kind(),
            user_id = %event.user_id(),
            at = %event.at().to_rfc3339(),
            "user event"
        );
    }
}

/// Drops every event; used when `publish_events` is off.
#[derive(Debug, Default, Clone)]
pub struct NoopEventPublisher;

impl EventPublisher<UserDomainEvent> for NoopEventPublisher {
    fn publish(&self, _event: &UserDomainEvent) {}
}
