use std::{convert::Infallible, pin::Pin, time::Duration};

use axum::{
    Router,
    extract::State,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};
use uuid::Uuid;

use crate::{middleware::auth::AuthUser, notify::OrderEvent, state::AppState};

type EventStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

const KEEP_ALIVE_SECS: u64 = 15;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(subscribe))
}

fn to_sse(event: &OrderEvent) -> Option<Event> {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(err) => {
            tracing::warn!(error = %err, event = event.name(), "failed to encode notification");
            None
        }
    }
}

fn user_stream(
    feed: BroadcastStream<OrderEvent>,
    user_id: Uuid,
) -> impl Stream<Item = Result<Event, Infallible>> + Send {
    feed.filter_map(move |item| match item {
        Ok(event) if event.user_id() == user_id => to_sse(&event).map(Ok),
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(%user_id, skipped, "notification subscriber lagged");
            None
        }
    })
}

#[utoipa::path(
    get,
    path = "/api/notificacoes",
    responses(
        (status = 200, description = "Server-sent stream of the caller's order events", content_type = "text/event-stream", body = OrderEvent),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn subscribe(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    let stream: EventStream = match state.notifier.subscribe() {
        Some(rx) => {
            tracing::debug!(user_id = %user.user_id, "notification subscriber connected");
            Box::pin(user_stream(BroadcastStream::new(rx), user.user_id))
        }
        // Transport without a live feed: the connection only receives keep-alives.
        None => Box::pin(tokio_stream::pending::<Result<Event, Infallible>>()),
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(KEEP_ALIVE_SECS))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderStatus;
    use crate::notify::{BroadcastNotifier, Notifier};

    #[tokio::test]
    async fn stream_only_yields_events_for_the_subscriber() {
        let notifier = BroadcastNotifier::new(8);
        let rx = notifier.subscribe().unwrap();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let stream = Box::pin(user_stream(BroadcastStream::new(rx), me));

        notifier
            .publish(OrderEvent::OrderDeleted {
                order_id: Uuid::new_v4(),
                user_id: other,
            })
            .unwrap();
        notifier
            .publish(OrderEvent::StatusChanged {
                order_id: Uuid::new_v4(),
                user_id: me,
                status: OrderStatus::Processando,
            })
            .unwrap();
        drop(notifier);

        let received: Vec<_> = stream.collect().await;
        assert_eq!(received.len(), 1);
    }
}
