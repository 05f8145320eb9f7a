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

// Relay Sandbox
// Publishes a few job notifications and tears the bus down.

use std::time::Duration;

use anyhow::{Context, Result};
use relay_core::{Bus, Listener, RecvError};

enum Job {
    Completed { id: u32, duration: Duration },
    Failed { id: u32, reason: &'static str },
}

impl Job {
    fn describe(&self) -> String {
        match self {
            Job::Completed { id, duration } => format!("job {id} completed in {duration:?}"),
            Job::Failed { id, reason } => format!("job {id} failed: {reason}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let bus = Bus::new();
    let completions = Listener::unbounded();
    let all_jobs = Listener::unbounded();
    bus.on(&completions, ["job completed"]);
    bus.on(&all_jobs, ["job completed", "job failed"]);

    bus.publish(
        "job completed:1",
        Job::Completed {
            id: 1,
            duration: Duration::from_millis(120),
        },
    );
    bus.publish(
        "job failed:2",
        Job::Failed {
            id: 2,
            reason: "checksum mismatch",
        },
    );

    let event = tokio::time::timeout(Duration::from_secs(1), completions.recv_async())
        .await
        .context("no completion received")??;
    log::info!("'{}' listener: {}", event.topic(), event.data().describe());

    bus.destroy();

    loop {
        match all_jobs.recv_async().await {
            Ok(event) => log::info!("'{}': {}", event.topic(), event.data().describe()),
            Err(RecvError::Closed) => break,
            Err(e) => return Err(e.into()),
        }
    }
    log::info!("All listeners closed.");

    Ok(())
}
