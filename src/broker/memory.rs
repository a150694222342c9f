//! # In-process broker.
//!
//! [`MemoryBroker`] implements [`Broker`] on top of unbounded tokio channels.
//!
//! ## Semantics
//! ```text
//! exchange "amq.fanout" ──► [sub 1] [sub 2] ... [sub N]     (every live subscriber)
//! queue    "temp-1"     ──► consumer A | consumer B | ...   (one consumer, round-robin)
//!                           └─► backlog while nobody consumes
//! ```
//!
//! - `amq.fanout` exists from the start; other exchanges must be declared before
//!   publishing, otherwise [`BrokerError::ExchangeNotFound`].
//! - Queues are created on first use and keep a FIFO backlog while they have no consumer.
//!   A new consumer receives the backlog first.
//! - Dropped subscriptions are pruned lazily on the next publish.
//! - `close()` drops every sender, so all streams end; later calls fail with
//!   [`BrokerError::Closed`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;

use super::{Broker, Delivery, DeliveryStream, FANOUT_EXCHANGE};
use crate::error::BrokerError;

type Sink = mpsc::UnboundedSender<Delivery>;

#[derive(Default)]
struct Queue {
    backlog: VecDeque<Delivery>,
    consumers: Vec<Sink>,
    next: usize,
}

impl Queue {
    /// Hands the delivery to one live consumer, or keeps it in the backlog.
    fn push(&mut self, mut delivery: Delivery) {
        loop {
            self.consumers.retain(|c| !c.is_closed());
            if self.consumers.is_empty() {
                self.backlog.push_back(delivery);
                return;
            }
            let idx = self.next % self.consumers.len();
            self.next = self.next.wrapping_add(1);
            match self.consumers[idx].send(delivery) {
                Ok(()) => return,
                Err(mpsc::error::SendError(back)) => delivery = back,
            }
        }
    }

    fn attach(&mut self, sink: Sink) {
        while let Some(d) = self.backlog.pop_front() {
            if let Err(mpsc::error::SendError(back)) = sink.send(d) {
                self.backlog.push_front(back);
                return;
            }
        }
        self.consumers.push(sink);
    }
}

#[derive(Default)]
struct State {
    exchanges: HashMap<String, Vec<Sink>>,
    queues: HashMap<String, Queue>,
    closed: bool,
}

/// In-process [`Broker`].
pub struct MemoryBroker {
    state: Mutex<State>,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBroker {
    /// Creates a broker with the default fanout exchange declared.
    pub fn new() -> Self {
        let mut state = State::default();
        state.exchanges.insert(FANOUT_EXCHANGE.to_string(), Vec::new());
        Self {
            state: Mutex::new(state),
        }
    }

    /// Number of live consumers on `queue`.
    pub fn consumer_count(&self, queue: &str) -> usize {
        self.lock()
            .queues
            .get(queue)
            .map_or(0, |q| q.consumers.iter().filter(|c| !c.is_closed()).count())
    }

    /// Number of messages waiting in `queue` for a consumer.
    pub fn backlog_len(&self, queue: &str) -> usize {
        self.lock().queues.get(queue).map_or(0, |q| q.backlog.len())
    }

    /// Number of live subscribers of `exchange`.
    pub fn subscriber_count(&self, exchange: &str) -> usize {
        self.lock()
            .exchanges
            .get(exchange)
            .map_or(0, |subs| subs.iter().filter(|s| !s.is_closed()).count())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&self) -> Result<MutexGuard<'_, State>, BrokerError> {
        let state = self.lock();
        if state.closed {
            return Err(BrokerError::Closed);
        }
        Ok(state)
    }
}

fn into_stream(rx: mpsc::UnboundedReceiver<Delivery>) -> DeliveryStream {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|d| (d, rx)) }).boxed()
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn declare_exchange(&self, exchange: &str) -> Result<(), BrokerError> {
        self.open()?
            .exchanges
            .entry(exchange.to_string())
            .or_default();
        Ok(())
    }

    async fn subscribe_exchange(&self, exchange: &str) -> Result<DeliveryStream, BrokerError> {
        let mut state = self.open()?;
        let subs = state
            .exchanges
            .get_mut(exchange)
            .ok_or_else(|| BrokerError::ExchangeNotFound {
                name: exchange.to_string(),
            })?;
        let (tx, rx) = mpsc::unbounded_channel();
        subs.push(tx);
        Ok(into_stream(rx))
    }

    async fn publish_exchange(
        &self,
        exchange: &str,
        routing_key: &str,
        body: Vec<u8>,
    ) -> Result<(), BrokerError> {
        let mut state = self.open()?;
        let subs = state
            .exchanges
            .get_mut(exchange)
            .ok_or_else(|| BrokerError::ExchangeNotFound {
                name: exchange.to_string(),
            })?;
        let delivery = Delivery::new(routing_key, body);
        subs.retain(|s| s.send(delivery.clone()).is_ok());
        Ok(())
    }

    async fn subscribe_queue(&self, queue: &str) -> Result<DeliveryStream, BrokerError> {
        let mut state = self.open()?;
        let (tx, rx) = mpsc::unbounded_channel();
        state.queues.entry(queue.to_string()).or_default().attach(tx);
        Ok(into_stream(rx))
    }

    async fn publish_queue(&self, queue: &str, body: Vec<u8>) -> Result<(), BrokerError> {
        let mut state = self.open()?;
        state
            .queues
            .entry(queue.to_string())
            .or_default()
            .push(Delivery::new(queue, body));
        Ok(())
    }

    async fn close(&self) -> Result<(), BrokerError> {
        let mut state = self.lock();
        state.closed = true;
        state.exchanges.clear();
        state.queues.clear();
        Ok(())
    }
}
