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

//! # Relay Core
//!
//! An in-process publish/subscribe event bus. Producers publish payloads under
//! a topic name, consumers register channel-backed [`Listener`]s against one or
//! more topics and receive matching [`Event`]s asynchronously.
//!
//! ```rust
//! use relay_core::{Bus, BusConfig, Dispatch, Listener};
//!
//! let bus = Bus::with_config(BusConfig::default().with_dispatch(Dispatch::Threads));
//! let listener = Listener::unbounded();
//! bus.on(&listener, ["job completed"]);
//!
//! bus.publish("job completed:42", 42u32);
//!
//! let event = listener.recv().unwrap();
//! assert_eq!(event.topic(), "job completed");
//! assert_eq!(*event.data(), 42);
//!
//! bus.destroy();
//! assert!(listener.is_closed());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::{BusConfig, Dispatch};
pub use error::RecvError;
pub use event::{resolve_topic, Bus, Event, Listener};
