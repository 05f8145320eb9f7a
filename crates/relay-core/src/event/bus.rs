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

use super::{resolve_topic, Event, Listener};
use crate::config::{BusConfig, Dispatch};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use tokio::runtime::Handle;

type Registry<T> = HashMap<String, Vec<Listener<T>>>;

/// Routes published events to the listeners registered on their topic.
///
/// The bus keeps, per topic name, the listeners registered on it in
/// registration order. A single lock guards that registry; it is held while
/// registering, unregistering, tearing down and while a publish takes its
/// snapshot of the listeners, but never while an event is being delivered.
///
/// Each delivery is its own unit of work (see [`Dispatch`]), so a listener
/// that stops receiving only ever stalls its own deliveries.
pub struct Bus<T> {
    listeners: Mutex<Registry<T>>,
    dispatch: Dispatch,
    separator: char,
}

impl<T: Send + Sync + 'static> Bus<T> {
    /// Creates an empty bus with the default configuration.
    ///
    /// ## Returns
    /// A bus dispatching on the publisher's multi-thread tokio runtime if
    /// there is one, and on dedicated threads otherwise.
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Creates an empty bus from an explicit configuration.
    ///
    /// ## Arguments
    /// * `config` - Dispatch strategy and topic separator to use.
    pub fn with_config(config: BusConfig) -> Self {
        log::info!("Event bus initialized ({:?} dispatch).", config.dispatch);
        Self {
            listeners: Mutex::new(HashMap::new()),
            dispatch: config.dispatch,
            separator: config.separator,
        }
    }

    /// Registers `listener` under every topic in `topics`.
    ///
    /// Registrations are not deduplicated: registering the same listener
    /// twice on a topic yields two deliveries per publish on that topic.
    ///
    /// ## Arguments
    /// * `listener` - The endpoint to deliver to. The bus keeps a handle to it.
    /// * `topics` - Exact topic names, without instance suffix.
    pub fn on<I, S>(&self, listener: &Listener<T>, topics: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = self.registry();
        for topic in topics {
            let topic: String = topic.into();
            log::debug!("Registering listener {:#x} on '{topic}'.", listener.identity());
            registry.entry(topic).or_default().push(listener.clone());
        }
    }

    /// Unregisters `listener` from every topic in `topics`.
    ///
    /// On each topic only the first registration of the listener is removed.
    /// The listener is closed once, on the first successful removal; if it was
    /// not registered under any of `topics` it is left open and nothing
    /// happens.
    ///
    /// ## Returns
    /// `true` if at least one registration was removed.
    pub fn off<I, S>(&self, listener: &Listener<T>, topics: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = self.registry();
        let mut closed = false;

        for topic in topics {
            let topic = topic.as_ref();
            if !remove_first(&mut registry, topic, listener) {
                continue;
            }
            log::debug!("Unregistered listener {:#x} from '{topic}'.", listener.identity());

            if !closed {
                if !listener.close() {
                    log::debug!("Listener {:#x} was already closed.", listener.identity());
                }
                closed = true;
            }
        }

        closed
    }

    /// Publishes `data` under `topic`.
    ///
    /// The topic is routed by its name up to the first separator, so
    /// `"job completed:42"` reaches the listeners of `"job completed"`, and the
    /// delivered [`Event`] carries the resolved name. Publishing to a topic
    /// without listeners drops `data`.
    ///
    /// Deliveries are scheduled and not awaited; this never blocks on a
    /// listener and never fails.
    ///
    /// ## Returns
    /// The number of deliveries scheduled. Registrations pointing at a closed
    /// listener are matched but not counted.
    pub fn publish(&self, topic: &str, data: T) -> usize {
        let topic = resolve_topic(topic, self.separator);

        let snapshot = {
            let registry = self.registry();
            match registry.get(topic) {
                Some(listeners) if !listeners.is_empty() => listeners.clone(),
                _ => {
                    log::trace!("No listener on '{topic}', event dropped.");
                    return 0;
                }
            }
        };

        let event = Event::new(topic, data);
        let runtime = self.dispatch.runtime();
        let mut scheduled = 0;
        for listener in &snapshot {
            if Self::deliver(runtime.as_ref(), listener, event.clone()) {
                scheduled += 1;
            }
        }
        log::trace!(
            "Published on '{topic}': {scheduled} of {} delivery(ies) scheduled.",
            snapshot.len()
        );
        scheduled
    }

    /// Closes every registered listener and empties the bus.
    ///
    /// A listener registered under several topics is closed once. Afterwards
    /// the bus behaves as if freshly constructed.
    ///
    /// ## Returns
    /// The number of distinct listeners closed.
    pub fn destroy(&self) -> usize {
        let mut registry = self.registry();
        let mut closed = HashSet::new();

        for listener in registry.values().flatten() {
            if closed.insert(listener.identity()) {
                listener.close();
            }
        }
        *registry = HashMap::new();

        log::info!("Event bus destroyed, {} listener(s) closed.", closed.len());
        closed.len()
    }

    /// Spawns one delivery, on `runtime` if given and on its own thread
    /// otherwise. Returns `false` if nothing was spawned.
    fn deliver(runtime: Option<&Handle>, listener: &Listener<T>, event: Event<T>) -> bool {
        let Some(sender) = listener.sender() else {
            log::trace!("Listener {:#x} is closed, delivery skipped.", listener.identity());
            return false;
        };

        match runtime {
            Some(handle) => {
                handle.spawn(async move {
                    if sender.send_async(event).await.is_err() {
                        log::trace!("Listener dropped before delivery.");
                    }
                });
                true
            }
            None => {
                let spawned = thread::Builder::new()
                    .name("relay-delivery".into())
                    .spawn(move || {
                        if sender.send(event).is_err() {
                            log::trace!("Listener dropped before delivery.");
                        }
                    });
                match spawned {
                    Ok(_) => true,
                    Err(e) => {
                        log::error!("Failed to spawn delivery thread: {e}.");
                        false
                    }
                }
            }
        }
    }
}

impl<T> Bus<T> {
    /// Number of registrations under the exact topic name `topic`.
    pub fn listener_count(&self, topic: &str) -> usize {
        self.registry().get(topic).map_or(0, Vec::len)
    }

    /// Number of topics with at least one registration.
    pub fn topic_count(&self) -> usize {
        self.registry().values().filter(|l| !l.is_empty()).count()
    }

    /// Sorted names of the topics with at least one registration.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .registry()
            .iter()
            .filter(|(_, l)| !l.is_empty())
            .map(|(topic, _)| topic.clone())
            .collect();
        topics.sort();
        topics
    }

    /// Returns `true` if no listener is registered on any topic.
    pub fn is_empty(&self) -> bool {
        self.registry().values().all(Vec::is_empty)
    }

    fn registry(&self) -> MutexGuard<'_, Registry<T>> {
        // Every edit is a single map or vector operation, a poisoned lock
        // still guards a consistent registry.
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn remove_first<T>(registry: &mut Registry<T>, topic: &str, listener: &Listener<T>) -> bool {
    let Some(listeners) = registry.get_mut(topic) else {
        return false;
    };
    match listeners.iter().position(|l| l.same(listener)) {
        Some(index) => {
            listeners.remove(index);
            true
        }
        None => false,
    }
}

impl<T: Send + Sync + 'static> Default for Bus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Bus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("topics", &self.topic_count())
            .field("dispatch", &self.dispatch)
            .field("separator", &self.separator)
            .finish()
    }
}
