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

//! Provides the topic-routed event bus and its building blocks.
//!
//! - [`Bus`] owns the topic registry and schedules deliveries.
//! - [`Listener`] is the consumer side: a channel with an explicit closed state.
//! - [`Event`] is the immutable value handed to every listener of a publish.
//!
//! Topics published with an instance suffix (`"job completed:42"`) are routed
//! by their coarse name only, see [`resolve_topic`].

mod bus;
mod listener;
mod topic;

pub use self::bus::Bus;
pub use self::listener::Listener;
pub use self::topic::{resolve_topic, Event, DEFAULT_SEPARATOR};
