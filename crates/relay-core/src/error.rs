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

//! Error types for the receiving side of a [`Listener`](crate::Listener).
//!
//! Bus operations themselves never fail: registering, unregistering,
//! publishing and tearing down are either applied or documented no-ops.

use thiserror::Error;

/// An error returned when a listener cannot hand out an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecvError {
    /// The listener was closed by the bus and every delivered event has been
    /// drained. No further events will arrive.
    #[error("listener is closed")]
    Closed,
    /// No event arrived before the deadline.
    #[error("timed out waiting for an event")]
    Timeout,
    /// No event is currently buffered.
    #[error("no event available")]
    Empty,
}

impl From<flume::RecvError> for RecvError {
    fn from(_: flume::RecvError) -> Self {
        RecvError::Closed
    }
}

impl From<flume::TryRecvError> for RecvError {
    fn from(err: flume::TryRecvError) -> Self {
        match err {
            flume::TryRecvError::Empty => RecvError::Empty,
            flume::TryRecvError::Disconnected => RecvError::Closed,
        }
    }
}

impl From<flume::RecvTimeoutError> for RecvError {
    fn from(err: flume::RecvTimeoutError) -> Self {
        match err {
            flume::RecvTimeoutError::Timeout => RecvError::Timeout,
            flume::RecvTimeoutError::Disconnected => RecvError::Closed,
        }
    }
}
