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

//! Configuration for a [`Bus`](crate::Bus).

use crate::event::DEFAULT_SEPARATOR;
use tokio::runtime::{Handle, RuntimeFlavor};

/// How a bus schedules the delivery of one event to one listener.
///
/// Every delivery is an independent unit of work that the publisher never
/// waits on, whichever strategy is chosen.
#[derive(Debug, Clone, Default)]
pub enum Dispatch {
    /// Decide per delivery: spawn on the publisher's tokio runtime when it is
    /// a multi-thread one, otherwise on a dedicated thread.
    #[default]
    Auto,
    /// Spawn one task per delivery on the given runtime.
    ///
    /// The runtime must outlive the bus. Once it shuts down, spawned
    /// deliveries are dropped without reaching the listener.
    Runtime(Handle),
    /// Spawn one OS thread per delivery.
    Threads,
}

impl Dispatch {
    /// The runtime the next delivery should be spawned on, or `None` if it
    /// gets its own thread.
    ///
    /// For [`Dispatch::Auto`] this looks at the caller's context every time.
    /// A current-thread runtime is skipped: its tasks would only run once the
    /// publisher yields.
    pub fn runtime(&self) -> Option<Handle> {
        match self {
            Dispatch::Auto => Handle::try_current()
                .ok()
                .filter(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread),
            Dispatch::Runtime(handle) => Some(handle.clone()),
            Dispatch::Threads => None,
        }
    }
}

/// Settings applied when constructing a bus.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Delivery scheduling strategy.
    pub dispatch: Dispatch,
    /// Character splitting a published topic from its instance suffix.
    pub separator: char,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            dispatch: Dispatch::Auto,
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl BusConfig {
    /// Sets the delivery scheduling strategy.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Sets the instance suffix separator.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }
}
