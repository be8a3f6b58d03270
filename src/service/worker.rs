use crate::service::processor::{InboundJob, MessageProcessor};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

/// Spawn the background processing pipeline and hand back its job channel.
///
/// The webhook handler acknowledges first and enqueues here; jobs drain
/// through a bounded-concurrency stream. Messages from the same sender are
/// deliberately not serialized against each other.
pub fn spawn(
    processor: MessageProcessor,
    queue_depth: usize,
    concurrency: usize,
) -> mpsc::Sender<InboundJob> {
    let (job_tx, job_rx) = mpsc::channel::<InboundJob>(queue_depth.max(1));
    let concurrency = concurrency.max(1);
    let processor = Arc::new(processor);

    tokio::spawn(async move {
        info!(concurrency, "inbound worker started");

        let mut pipeline = ReceiverStream::new(job_rx)
            .map(|job| {
                let processor = processor.clone();
                async move { processor.process(job).await }
            })
            .buffer_unordered(concurrency);

        while pipeline.next().await.is_some() {}

        info!("inbound worker stopped");
    });

    job_tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::twilio::MessageSender;
    use crate::db::Storage;
    use crate::error::MerkbotError;
    use crate::nlp::GermanTimeParser;
    use async_trait::async_trait;
    use sqlx::sqlite::SqlitePoolOptions;

    struct ChannelSender {
        tx: mpsc::UnboundedSender<(String, String)>,
    }

    #[async_trait]
    impl MessageSender for ChannelSender {
        async fn send(&self, to: &str, body: &str) -> Result<(), MerkbotError> {
            let _ = self.tx.send((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn queued_jobs_are_processed_and_replied_to() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let storage = Storage::new(pool);
        storage.init_schema().await.unwrap();

        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
        let processor = MessageProcessor::new(
            storage,
            Arc::new(ChannelSender { tx: reply_tx }),
            Arc::new(GermanTimeParser::new()),
        );
        let jobs = spawn(processor, 8, 2);

        jobs.send(InboundJob {
            from: "whatsapp:+49170".to_string(),
            body: "Hilfe".to_string(),
            num_media: 0,
        })
        .await
        .unwrap();

        let (to, body) = reply_rx.recv().await.expect("worker must reply");
        assert_eq!(to, "whatsapp:+49170");
        assert!(!body.is_empty());
    }
}
