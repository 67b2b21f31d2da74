//! Per-job progress channels.
//!
//! Every job owns a channel with a bounded replay buffer and at most one
//! subscriber. Publishing never blocks and never fails: events are buffered
//! and forwarded to whoever is attached at that moment. A subscriber that
//! attaches late first receives the buffered events, then live ones.

use crate::pipeline::events::StageEvent;
use crate::utils::toml_config::ProgressConfig;
use futures::Stream;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;

struct Subscriber {
    id: u64,
    tx: mpsc::UnboundedSender<StageEvent>,
}

#[derive(Default)]
struct JobChannel {
    buffer: VecDeque<StageEvent>,
    subscriber: Option<Subscriber>,
    finished: bool,
}

/// Registry of progress channels shared by all jobs.
pub struct ProgressHub {
    channels: Mutex<HashMap<String, JobChannel>>,
    replay_capacity: usize,
    retention: Duration,
    next_subscriber: AtomicU64,
}

impl ProgressHub {
    pub fn new(replay_capacity: usize, retention: Duration) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            replay_capacity: replay_capacity.max(1),
            retention,
            next_subscriber: AtomicU64::new(1),
        }
    }

    pub fn from_config(config: &ProgressConfig) -> Self {
        Self::new(
            config.replay_capacity,
            Duration::from_secs(config.retention_secs),
        )
    }

    /// Create the channel for a new job. Existing channels are left untouched.
    pub fn register(&self, job_id: &str) {
        self.channels
            .lock()
            .entry(job_id.to_string())
            .or_default();
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.channels.lock().contains_key(job_id)
    }

    /// Jobs that are registered and not yet finished.
    pub fn active_jobs(&self) -> usize {
        self.channels
            .lock()
            .values()
            .filter(|channel| !channel.finished)
            .count()
    }

    /// Record an event and forward it to the current subscriber, if any.
    pub fn publish(&self, event: StageEvent) {
        let mut channels = self.channels.lock();
        let Some(channel) = channels.get_mut(&event.job_id) else {
            tracing::debug!(job_id = %event.job_id, "Ignoring event for unknown job");
            return;
        };

        if channel.finished {
            tracing::debug!(job_id = %event.job_id, "Ignoring event for finished job");
            return;
        }

        if let Some(subscriber) = &channel.subscriber {
            if subscriber.tx.send(event.clone()).is_err() {
                tracing::debug!(job_id = %event.job_id, "Subscriber went away");
                channel.subscriber = None;
            }
        }

        if channel.buffer.len() == self.replay_capacity {
            channel.buffer.pop_front();
        }
        channel.buffer.push_back(event);
    }

    /// Attach a subscriber to a registered job, replacing any previous one.
    ///
    /// Buffered events are queued for the new subscriber under the same lock
    /// that `publish` takes, so nothing is lost or duplicated between replay
    /// and live forwarding. Returns `None` for unknown or evicted jobs.
    pub fn attach(self: &Arc<Self>, job_id: &str) -> Option<Subscription> {
        let mut channels = self.channels.lock();
        let channel = channels.get_mut(job_id)?;

        let (tx, rx) = mpsc::unbounded_channel();
        for event in &channel.buffer {
            // The receiver is alive in this scope.
            let _ = tx.send(event.clone());
        }

        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        if channel.finished {
            drop(tx);
        } else {
            if channel.subscriber.is_some() {
                tracing::info!(job_id = %job_id, "Replacing existing progress subscriber");
            }
            channel.subscriber = Some(Subscriber { id, tx });
        }

        tracing::debug!(
            job_id = %job_id,
            replayed = channel.buffer.len(),
            "Progress subscriber attached"
        );

        Some(Subscription {
            id,
            job_id: job_id.to_string(),
            rx,
            hub: Arc::downgrade(self),
        })
    }

    /// Remove the subscriber if it is still the one identified by `subscriber_id`.
    pub fn detach(&self, job_id: &str, subscriber_id: u64) {
        let mut channels = self.channels.lock();
        if let Some(channel) = channels.get_mut(job_id) {
            if channel
                .subscriber
                .as_ref()
                .is_some_and(|s| s.id == subscriber_id)
            {
                channel.subscriber = None;
                tracing::debug!(job_id = %job_id, "Progress subscriber detached");
            }
        }
    }

    /// Close the job's channel and evict it after the retention period.
    ///
    /// The subscriber's stream ends once it has drained the events already sent.
    pub fn complete(self: &Arc<Self>, job_id: &str) {
        {
            let mut channels = self.channels.lock();
            let Some(channel) = channels.get_mut(job_id) else {
                return;
            };
            channel.finished = true;
            channel.subscriber = None;
        }

        let hub: Weak<Self> = Arc::downgrade(self);
        let job_id = job_id.to_string();
        let retention = self.retention;
        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            if let Some(hub) = hub.upgrade() {
                hub.channels.lock().remove(&job_id);
                tracing::debug!(job_id = %job_id, "Evicted progress channel");
            }
        });
    }
}

/// Receiving side of a job's progress channel.
///
/// Dropping it detaches from the hub.
pub struct Subscription {
    id: u64,
    job_id: String,
    rx: mpsc::UnboundedReceiver<StageEvent>,
    hub: Weak<ProgressHub>,
}

impl Subscription {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Next event, or `None` once the channel is closed or this subscriber was replaced.
    pub async fn recv(&mut self) -> Option<StageEvent> {
        self.rx.recv().await
    }

    pub fn into_stream(mut self) -> impl Stream<Item = StageEvent> {
        async_stream::stream! {
            while let Some(event) = self.recv().await {
                yield event;
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.detach(&self.job_id, self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::events::Step;
    use futures::StreamExt;

    fn hub(capacity: usize) -> Arc<ProgressHub> {
        Arc::new(ProgressHub::new(capacity, Duration::from_secs(60)))
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_buffered() {
        let hub = hub(8);
        hub.register("job");
        hub.publish(StageEvent::running("job", Step::Search, "Refining"));

        let mut sub = hub.attach("job").unwrap();
        let event = sub.recv().await.unwrap();
        assert_eq!(event.step, Step::Search);
    }

    #[tokio::test]
    async fn test_replay_is_bounded() {
        let hub = hub(2);
        hub.register("job");
        for step in [Step::Search, Step::Profiling, Step::Selection] {
            hub.publish(StageEvent::running("job", step, "m"));
        }
        hub.complete("job");

        let events: Vec<_> = hub.attach("job").unwrap().into_stream().collect().await;
        let steps: Vec<_> = events.iter().map(|e| e.step).collect();
        assert_eq!(steps, vec![Step::Profiling, Step::Selection]);
    }

    #[tokio::test]
    async fn test_new_attach_replaces_old() {
        let hub = hub(8);
        hub.register("job");
        let mut first = hub.attach("job").unwrap();
        let mut second = hub.attach("job").unwrap();

        hub.publish(StageEvent::running("job", Step::Search, "m"));
        assert!(first.recv().await.is_none());
        assert_eq!(second.recv().await.unwrap().step, Step::Search);
    }

    #[tokio::test]
    async fn test_dropping_replaced_subscription_keeps_new_one() {
        let hub = hub(8);
        hub.register("job");
        let first = hub.attach("job").unwrap();
        let mut second = hub.attach("job").unwrap();
        drop(first);

        hub.publish(StageEvent::running("job", Step::Search, "m"));
        assert!(second.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_complete_ends_stream_and_ignores_later_events() {
        let hub = hub(8);
        hub.register("job");
        let sub = hub.attach("job").unwrap();
        hub.publish(StageEvent::failed("job", Step::Search, "no coverage"));
        hub.complete("job");
        hub.publish(StageEvent::running("job", Step::Profiling, "late"));

        let events: Vec<_> = sub.into_stream().collect().await;
        assert_eq!(events.len(), 1);
        assert_eq!(hub.active_jobs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_after_retention() {
        let hub = Arc::new(ProgressHub::new(8, Duration::from_secs(5)));
        hub.register("job");
        hub.complete("job");
        assert!(hub.contains("job"));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(!hub.contains("job"));
        assert!(hub.attach("job").is_none());
    }

    #[test]
    fn test_publish_for_unknown_job_is_dropped() {
        let hub = hub(8);
        hub.publish(StageEvent::running("ghost", Step::Search, "m"));
        assert!(!hub.contains("ghost"));
        assert_eq!(hub.active_jobs(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_after_eviction_does_not_revive_job() {
        let hub = Arc::new(ProgressHub::new(8, Duration::from_secs(5)));
        hub.register("job");
        hub.complete("job");
        tokio::time::sleep(Duration::from_secs(6)).await;

        hub.publish(StageEvent::running("job", Step::Profiling, "late"));
        assert!(!hub.contains("job"));
        assert!(hub.attach("job").is_none());
    }

    #[test]
    fn test_unknown_job_cannot_be_attached() {
        let hub = hub(8);
        assert!(hub.attach("missing").is_none());
    }
}
