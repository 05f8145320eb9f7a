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

//! Topic resolution and the event value delivered to listeners.

use std::fmt;
use std::sync::Arc;

/// Separator between a topic name and its instance suffix.
pub const DEFAULT_SEPARATOR: char = ':';

/// Resolves a published topic to the name listeners subscribe with.
///
/// Everything after the first `separator` is an instance suffix (for example
/// the id of the job that completed) and is dropped for routing. A topic
/// without a separator resolves to itself.
///
/// ```rust
/// use relay_core::resolve_topic;
///
/// assert_eq!(resolve_topic("job completed:42", ':'), "job completed");
/// assert_eq!(resolve_topic("a:b:c", ':'), "a");
/// assert_eq!(resolve_topic("plain", ':'), "plain");
/// ```
pub fn resolve_topic(topic: &str, separator: char) -> &str {
    match topic.split_once(separator) {
        Some((name, _suffix)) => name,
        None => topic,
    }
}

/// An event delivered over a [`Bus`](crate::Bus).
///
/// One `Event` is built per publish and shared by every delivery: cloning it
/// clones two reference counts, never the payload.
pub struct Event<T> {
    topic: Arc<str>,
    data: Arc<T>,
}

impl<T> Event<T> {
    pub(crate) fn new(topic: &str, data: T) -> Self {
        Self {
            topic: Arc::from(topic),
            data: Arc::new(data),
        }
    }

    /// The resolved topic, without any instance suffix.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The payload attached by the publisher.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Splits the event into its topic and a shared handle to the payload.
    pub fn into_parts(self) -> (Arc<str>, Arc<T>) {
        (self.topic, self.data)
    }
}

impl<T> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self {
            topic: Arc::clone(&self.topic),
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("topic", &self.topic)
            .field("data", &self.data)
            .finish()
    }
}

impl<T: PartialEq> PartialEq for Event<T> {
    fn eq(&self, other: &Self) -> bool {
        self.topic == other.topic && self.data == other.data
    }
}
