// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The consumer side of the bus: a channel with an explicit closed state.

use super::Event;
use crate::error::RecvError;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

struct Shared<T> {
    // `None` once closed. Taking the sender out is what closes the channel.
    sender: Mutex<Option<flume::Sender<Event<T>>>>,
    receiver: flume::Receiver<Event<T>>,
    #[cfg(test)]
    close_calls: std::sync::atomic::AtomicUsize,
}

/// A consumer endpoint registered on a [`Bus`](crate::Bus).
///
/// A `Listener` is a handle: clones refer to the same endpoint, and the bus
/// compares registrations by that identity, never by buffered contents. The
/// same listener may be registered under any number of topics.
///
/// Only the bus closes a listener, on [`Bus::off`](crate::Bus::off) or
/// [`Bus::destroy`](crate::Bus::destroy). Once closed, the receiving methods
/// keep returning already delivered events and then report
/// [`RecvError::Closed`].
pub struct Listener<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Listener<T> {
    /// Creates a listener whose buffer grows without limit.
    pub fn unbounded() -> Self {
        Self::from_channel(flume::unbounded())
    }

    /// Creates a listener buffering at most `capacity` events.
    ///
    /// Deliveries to a full listener wait for room without holding up the
    /// publisher or other listeners. A capacity of zero makes every delivery
    /// a rendezvous with the receiver.
    pub fn bounded(capacity: usize) -> Self {
        Self::from_channel(flume::bounded(capacity))
    }

    fn from_channel((sender, receiver): (flume::Sender<Event<T>>, flume::Receiver<Event<T>>)) -> Self {
        Self {
            shared: Arc::new(Shared {
                sender: Mutex::new(Some(sender)),
                receiver,
                #[cfg(test)]
                close_calls: std::sync::atomic::AtomicUsize::new(0),
            }),
        }
    }

    /// Blocks until an event arrives or the listener is closed and drained.
    pub fn recv(&self) -> Result<Event<T>, RecvError> {
        Ok(self.shared.receiver.recv()?)
    }

    /// Like [`recv`](Self::recv), giving up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Event<T>, RecvError> {
        Ok(self.shared.receiver.recv_timeout(timeout)?)
    }

    /// Returns a buffered event without blocking.
    pub fn try_recv(&self) -> Result<Event<T>, RecvError> {
        Ok(self.shared.receiver.try_recv()?)
    }

    /// Waits asynchronously for the next event.
    pub async fn recv_async(&self) -> Result<Event<T>, RecvError> {
        Ok(self.shared.receiver.recv_async().await?)
    }

    /// A blocking iterator over incoming events, ending once the listener is
    /// closed and drained.
    pub fn iter(&self) -> impl Iterator<Item = Event<T>> + '_ {
        self.shared.receiver.iter()
    }

    /// Returns `true` once the bus has closed this listener.
    pub fn is_closed(&self) -> bool {
        self.sender_slot().is_none()
    }

    /// Number of delivered events waiting to be received.
    pub fn len(&self) -> usize {
        self.shared.receiver.len()
    }

    /// Returns `true` if no delivered event is waiting.
    pub fn is_empty(&self) -> bool {
        self.shared.receiver.is_empty()
    }

    /// Returns `true` if both handles refer to the same endpoint.
    pub fn same(&self, other: &Listener<T>) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Address of the shared endpoint, stable for the listener's lifetime.
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.shared) as *const () as usize
    }

    /// A sender for one delivery, or `None` if the listener is closed.
    pub(crate) fn sender(&self) -> Option<flume::Sender<Event<T>>> {
        self.sender_slot().clone()
    }

    /// Closes the listener. Returns `false` if it was already closed.
    ///
    /// Deliveries already holding a sender still complete; receivers observe
    /// the closed state after those are drained.
    pub(crate) fn close(&self) -> bool {
        #[cfg(test)]
        self.shared
            .close_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        self.sender_slot().take().is_some()
    }

    #[cfg(test)]
    pub(crate) fn close_calls(&self) -> usize {
        self.shared
            .close_calls
            .load(std::sync::atomic::Ordering::SeqCst)
    }

    fn sender_slot(&self) -> MutexGuard<'_, Option<flume::Sender<Event<T>>>> {
        self.shared
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> PartialEq for Listener<T> {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl<T> Eq for Listener<T> {}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &format_args!("{:#x}", self.identity()))
            .field("pending", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let a = Listener::<u8>::unbounded();
        let b = a.clone();
        let c = Listener::<u8>::unbounded();

        assert!(a.same(&b));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn try_recv_on_empty_listener() {
        let listener = Listener::<u8>::unbounded();
        assert_eq!(listener.try_recv().unwrap_err(), RecvError::Empty);
        assert_eq!(
            listener.recv_timeout(Duration::from_millis(10)).unwrap_err(),
            RecvError::Timeout
        );
    }

    #[test]
    fn close_drains_then_reports_closed() {
        let listener = Listener::unbounded();
        let sender = listener.sender().expect("open listener has a sender");
        sender.send(Event::new("t", 1)).unwrap();
        drop(sender);

        assert!(listener.close());
        assert!(listener.is_closed());
        assert!(listener.sender().is_none());

        assert_eq!(*listener.recv().unwrap().data(), 1);
        assert_eq!(listener.recv().unwrap_err(), RecvError::Closed);
        assert_eq!(listener.try_recv().unwrap_err(), RecvError::Closed);
    }

    #[test]
    fn second_close_is_reported() {
        let listener = Listener::<u8>::unbounded();
        assert!(listener.close());
        assert!(!listener.close());
        assert_eq!(listener.close_calls(), 2);
    }

    #[test]
    fn iter_ends_when_closed() {
        let listener = Listener::unbounded();
        let sender = listener.sender().unwrap();
        for i in 0..3 {
            sender.send(Event::new("t", i)).unwrap();
        }
        drop(sender);
        listener.close();

        let received: Vec<i32> = listener.iter().map(|e| *e.data()).collect();
        assert_eq!(received, vec![0, 1, 2]);
    }

    #[test]
    fn bounded_listener_reports_pending() {
        let listener = Listener::bounded(2);
        let sender = listener.sender().unwrap();
        sender.send(Event::new("t", ())).unwrap();

        assert_eq!(listener.len(), 1);
        assert!(!listener.is_empty());
        assert!(sender.try_send(Event::new("t", ())).is_ok());
        assert!(sender.try_send(Event::new("t", ())).is_err());
    }
}
