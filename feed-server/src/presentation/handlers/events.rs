use std::sync::Arc;

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::feed_service::FeedService;
use crate::data::FeedStore;
use crate::infrastructure::fanout::FanoutRegistry;

/// Removes the subscriber from the registry once its stream is dropped.
struct SubscriberGuard {
    fanout: Arc<FanoutRegistry>,
    id: Uuid,
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        let fanout = Arc::clone(&self.fanout);
        let id = self.id;
        tokio::spawn(async move {
            if fanout.unsubscribe(id).await {
                info!(subscriber = %id, "event stream closed");
            }
        });
    }
}

/// Streams every feed event as Server-Sent Events until the client goes away.
pub async fn stream<S: FeedStore>(feed: web::Data<FeedService<S>>) -> HttpResponse {
    let fanout = Arc::clone(feed.fanout());
    let subscription = fanout.subscribe().await;
    info!(
        subscriber = %subscription.id,
        subscribers = fanout.subscriber_count().await,
        "event stream opened"
    );
    let guard = SubscriberGuard {
        fanout,
        id: subscription.id,
    };

    let hello = stream::once(async {
        Ok::<_, actix_web::Error>(web::Bytes::from_static(b": connected\n\n"))
    });
    let frames = stream::unfold(
        (subscription.receiver, guard),
        |(mut receiver, guard)| async move {
            loop {
                let event = receiver.recv().await?;
                match event.to_sse_frame() {
                    Ok(frame) => {
                        let bytes = web::Bytes::from(frame);
                        return Some((Ok::<_, actix_web::Error>(bytes), (receiver, guard)));
                    }
                    Err(err) => warn!(error = %err, topic = event.topic(), "failed to encode event"),
                }
            }
        },
    );

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(hello.chain(frames))
}
