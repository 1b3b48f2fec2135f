// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Client-side request spacing for the node transport.
//!
//! Public Fantom endpoints start answering 429 well before a scan's natural
//! request rate, so every request first reserves a send slot. Slots are
//! handed out with the generic cell rate algorithm: one slot per
//! `period / requests`, with up to `requests` slots usable as a burst.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use tokio::sync::Mutex;
use tokio::time::Instant;
use tower::Layer;

/// A Tower layer that spaces out requests sent through it.
///
/// Clones share one schedule, so a single layer can be applied to several
/// clients that must stay under the same endpoint limit.
///
/// # Example
///
/// ```rust,ignore
/// use transferscan::transport::RateLimitLayer;
/// use alloy_rpc_client::ClientBuilder;
///
/// let client = ClientBuilder::default()
///     .layer(RateLimitLayer::per_second(10))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug)]
pub struct RateLimitLayer {
    schedule: Arc<Mutex<SlotSchedule>>,
}

impl RateLimitLayer {
    /// At most `requests` requests per `period`, bursting up to `requests`
    pub fn new(requests: u32, period: Duration) -> Self {
        Self {
            schedule: Arc::new(Mutex::new(SlotSchedule::new(requests, period))),
        }
    }

    pub fn per_second(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(1))
    }

    /// No bursting: consecutive requests are at least `delay` apart
    pub fn with_min_delay(delay: Duration) -> Self {
        Self::new(1, delay)
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimitService {
            service,
            schedule: self.schedule.clone(),
        }
    }
}

/// Theoretical-arrival-time bookkeeping.
#[derive(Debug)]
struct SlotSchedule {
    /// Spacing between two slots at the sustained rate
    interval: Duration,
    /// How far ahead of the sustained schedule a request may run
    tolerance: Duration,
    /// Theoretical arrival time of the next request
    next_arrival: Option<Instant>,
}

impl SlotSchedule {
    fn new(requests: u32, period: Duration) -> Self {
        let requests = requests.max(1);
        let interval = period / requests;
        Self {
            interval,
            tolerance: interval * (requests - 1),
            next_arrival: None,
        }
    }

    /// Reserves the next slot and returns how long the caller must wait for it
    fn reserve(&mut self, now: Instant) -> Duration {
        let arrival = match self.next_arrival {
            Some(tat) if tat > now => tat,
            _ => now,
        };
        self.next_arrival = Some(arrival + self.interval);

        // `arrival - tolerance` may precede `now`; saturate to no wait
        arrival
            .checked_sub(self.tolerance)
            .map(|earliest| earliest.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }
}

/// A Tower service that waits for its reserved slot before forwarding.
#[derive(Clone, Debug)]
pub struct RateLimitService<S> {
    service: S,
    schedule: Arc<Mutex<SlotSchedule>>,
}

impl<S, Request> tower::Service<Request> for RateLimitService<S>
where
    S: tower::Service<Request> + Clone + Send + 'static,
    S::Future: Send,
    Request: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let schedule = self.schedule.clone();
        let mut service = self.service.clone();

        Box::pin(async move {
            let wait = schedule.lock().await.reserve(Instant::now());
            if !wait.is_zero() {
                tracing::trace!(wait_ms = wait.as_millis() as u64, "Waiting for request slot");
                tokio::time::sleep(wait).await;
            }
            service.call(request).await
        })
    }
}
