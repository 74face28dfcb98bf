use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::OrderStatus;

/// Order events pushed to the owning user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "event")]
pub enum OrderEvent {
    #[serde(rename = "novo_pedido_criado")]
    OrderCreated {
        #[serde(rename = "pedidoId")]
        order_id: Uuid,
        #[serde(rename = "usuarioId")]
        user_id: Uuid,
        #[serde(rename = "valorTotal")]
        total_amount: Decimal,
        status: OrderStatus,
        #[serde(rename = "criadoPorAdmin")]
        created_by_staff: bool,
    },
    #[serde(rename = "status_pedido_atualizado")]
    StatusChanged {
        #[serde(rename = "pedidoId")]
        order_id: Uuid,
        #[serde(rename = "usuarioId")]
        user_id: Uuid,
        status: OrderStatus,
    },
    #[serde(rename = "pedido_deletado")]
    OrderDeleted {
        #[serde(rename = "pedidoId")]
        order_id: Uuid,
        #[serde(rename = "usuarioId")]
        user_id: Uuid,
    },
}

impl OrderEvent {
    pub fn user_id(&self) -> Uuid {
        match self {
            OrderEvent::OrderCreated { user_id, .. }
            | OrderEvent::StatusChanged { user_id, .. }
            | OrderEvent::OrderDeleted { user_id, .. } => *user_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated { .. } => "novo_pedido_criado",
            OrderEvent::StatusChanged { .. } => "status_pedido_atualizado",
            OrderEvent::OrderDeleted { .. } => "pedido_deletado",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification channel closed")]
    Closed,
    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Fire-and-forget publisher for order events. Callers publish after their
/// transaction has committed and only log a failure.
pub trait Notifier: Send + Sync {
    fn publish(&self, event: OrderEvent) -> Result<(), NotifyError>;

    /// Live feed of every published event, when the transport supports one.
    fn subscribe(&self) -> Option<broadcast::Receiver<OrderEvent>> {
        None
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn publish(&self, event: OrderEvent) -> Result<(), NotifyError> {
        tracing::trace!(event = event.name(), "notification dropped");
        Ok(())
    }
}

/// In-process fan-out to connected clients.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<OrderEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
}

impl Notifier for BroadcastNotifier {
    fn publish(&self, event: OrderEvent) -> Result<(), NotifyError> {
        let name = event.name();
        let user_id = event.user_id();
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(event = name, %user_id, receivers, "notification published");
            }
            // Nobody listening is not a failure.
            Err(_) => {
                tracing::debug!(event = name, %user_id, "no subscribers for notification");
            }
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<OrderEvent>> {
        Some(self.sender.subscribe())
    }
}

/// Publish and swallow the error; delivery never decides an HTTP outcome.
pub fn publish_best_effort(notifier: &dyn Notifier, event: OrderEvent) {
    let name = event.name();
    if let Err(err) = notifier.publish(event) {
        tracing::warn!(error = %err, event = name, "notification failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn publish(&self, _event: OrderEvent) -> Result<(), NotifyError> {
            Err(NotifyError::Closed)
        }
    }

    fn status_event(user_id: Uuid) -> OrderEvent {
        OrderEvent::StatusChanged {
            order_id: Uuid::new_v4(),
            user_id,
            status: OrderStatus::Enviado,
        }
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe().expect("broadcast supports subscribe");

        let user_id = Uuid::new_v4();
        notifier.publish(status_event(user_id)).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.user_id(), user_id);
        assert_eq!(received.name(), "status_pedido_atualizado");
    }

    #[test]
    fn publishing_without_subscribers_succeeds() {
        let notifier = BroadcastNotifier::new(8);
        assert!(notifier.publish(status_event(Uuid::new_v4())).is_ok());
        assert!(NoopNotifier.publish(status_event(Uuid::new_v4())).is_ok());
        assert!(NoopNotifier.subscribe().is_none());
    }

    #[test]
    fn best_effort_publish_swallows_failures() {
        publish_best_effort(&FailingNotifier, status_event(Uuid::new_v4()));
    }

    #[test]
    fn events_serialize_with_wire_names() {
        let order_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let value = serde_json::to_value(OrderEvent::OrderDeleted { order_id, user_id }).unwrap();
        assert_eq!(value["event"], "pedido_deletado");
        assert_eq!(value["pedidoId"], order_id.to_string());
        assert_eq!(value["usuarioId"], user_id.to_string());
    }
}
