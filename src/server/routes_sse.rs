use crate::jobs::JobUpdate;
use crate::server::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tokio_stream::StreamExt;

pub fn sse_routes() -> Router<AppContext> {
    Router::new().route("/events", get(events_handler))
}

/// Push a `job` event every time a job changes status or progress.
pub async fn events_handler(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = ctx.supervisor.subscribe();

    // Lagged receivers just skip what they missed; clients re-poll the job.
    let updates = BroadcastStream::new(rx)
        .filter_map(|result| result.ok())
        .map(|update: JobUpdate| {
            let data = serde_json::to_string(&update).unwrap_or_else(|e| {
                format!(r#"{{"error": "serialization failed: {}"}}"#, e)
            });
            Ok(Event::default().event("job").data(data))
        });

    let heartbeat = IntervalStream::new(tokio::time::interval(Duration::from_secs(30)))
        .map(|_| Ok(Event::default().event("heartbeat").data("{}")));

    Sse::new(updates.merge(heartbeat)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
