use crate::rounds::RoundView;
use crate::store::RoundId;
use hitstand_engine::outcome::Outcome;
use hitstand_engine::round::PlayerAction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll};
use tokio::sync::mpsc;

// Slow subscribers lose events once their buffer fills.
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<RoundEvent>;
pub type EventReceiver = mpsc::Receiver<RoundEvent>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    RoundStarted {
        round_id: RoundId,
        round: RoundView,
    },
    ActionApplied {
        round_id: RoundId,
        action: PlayerAction,
        round: RoundView,
    },
    RoundResolved {
        round_id: RoundId,
        outcome: Outcome,
        payout: u32,
        bankroll: u32,
    },
}

impl RoundEvent {
    pub fn round_id(&self) -> &RoundId {
        match self {
            RoundEvent::RoundStarted { round_id, .. }
            | RoundEvent::ActionApplied { round_id, .. }
            | RoundEvent::RoundResolved { round_id, .. } => round_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoundEvent::RoundStarted { .. } => "round_started",
            RoundEvent::ActionApplied { .. } => "action_applied",
            RoundEvent::RoundResolved { .. } => "round_resolved",
        }
    }
}

/// Receiving end of a round's event stream; unsubscribes on drop.
pub struct EventSubscription {
    bus: EventBus,
    round_id: RoundId,
    subscriber_id: usize,
    receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }

    /// Ends the stream right after the round's `round_resolved` event.
    pub fn until_resolved(self) -> UntilResolved {
        UntilResolved {
            subscription: Some(self),
        }
    }
}

impl tokio_stream::Stream for EventSubscription {
    type Item = RoundEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<RoundEvent>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

/// See [`EventSubscription::until_resolved`]. The subscription is dropped,
/// and so unsubscribed, as soon as the stream ends.
pub struct UntilResolved {
    subscription: Option<EventSubscription>,
}

impl tokio_stream::Stream for UntilResolved {
    type Item = RoundEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<RoundEvent>> {
        let this = self.get_mut();
        let Some(subscription) = this.subscription.as_mut() else {
            return Poll::Ready(None);
        };
        let polled = subscription.receiver.poll_recv(cx);
        if let Poll::Ready(Some(RoundEvent::RoundResolved { .. }) | None) = &polled {
            this.subscription = None;
        }
        polled
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.round_id, self.subscriber_id);
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<RoundId, Vec<(usize, EventSender)>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, round_id: RoundId) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(round_id.clone());
        EventSubscription {
            bus: self.clone(),
            round_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, round_id: RoundId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(round_id.clone())
            .or_default()
            .push((id, tx));

        tracing::info!(round_id = %round_id, subscriber_id = id, "client subscribed to round events");
        (id, rx)
    }

    pub fn publish(&self, event: RoundEvent) {
        let round_id = event.round_id().clone();
        tracing::debug!(round_id = %round_id, event = event.name(), "publishing round event");

        let subscribers = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&round_id)
            .cloned();

        let Some(list) = subscribers else {
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    round_id = %round_id,
                    subscriber_id = id,
                    error = ?e,
                    "failed to send event to subscriber"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(&round_id, &failed);
        }
    }

    pub fn unsubscribe(&self, round_id: &RoundId, subscriber_id: usize) {
        self.remove_subscribers(round_id, &[subscriber_id]);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    fn remove_subscribers(&self, round_id: &RoundId, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = guard.get_mut(round_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(round_id);
            }
        }
    }
}
