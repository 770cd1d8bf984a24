//! # Event Subscriber
//!
//! Receiving side of the bus: a `Subscription` narrows the broadcast feed
//! to the topics a subsystem cares about, and `EventStream` adapts one for
//! stream combinators.

use crate::events::{EventFilter, PayrollEvent};
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// A filtered view of the event feed.
///
/// Lag is tolerated: a subscriber that falls behind the channel capacity
/// skips the dropped events and keeps going. Every consumer in this core
/// re-reads authoritative state from its service, so a missed notification
/// delays a transition rather than corrupting one.
pub struct Subscription {
    receiver: broadcast::Receiver<PayrollEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<PayrollEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next matching event, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<PayrollEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, events dropped");
                }
            }
        }
    }

    /// Receive without blocking.
    ///
    /// `Ok(None)` when no matching event is queued; `Err(Closed)` once the
    /// bus is gone.
    pub fn try_recv(&mut self) -> Result<Option<PayrollEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            }
        }
    }

    /// The filter this subscription was created with.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// `Stream` adapter over a subscription.
pub struct EventStream {
    subscription: Subscription,
}

impl EventStream {
    /// Wrap a subscription for use with stream combinators.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// The filter this stream was created with.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        self.subscription.filter()
    }
}

impl Stream for EventStream {
    type Item = PayrollEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.subscription.try_recv() {
            Ok(Some(event)) => Poll::Ready(Some(event)),
            Err(SubscriptionError::Closed) => Poll::Ready(None),
            // The broadcast receiver exposes no poll surface, so schedule
            // an immediate re-poll instead of parking on a waker.
            Ok(None) => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }
}
