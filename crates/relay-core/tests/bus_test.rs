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

use relay_core::{Bus, BusConfig, Dispatch, Listener, RecvError};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn thread_bus<T: Send + Sync + 'static>() -> Bus<T> {
    Bus::with_config(BusConfig::default().with_dispatch(Dispatch::Threads))
}

#[derive(Debug, Clone, PartialEq)]
enum JobEvent {
    Completed { id: u32 },
    Failed { id: u32, reason: String },
}

#[test]
fn test_job_lifecycle_routing() {
    init_logging();

    // --- 1. ARRANGE ---
    let bus = thread_bus();
    let completions = Listener::unbounded();
    let everything = Listener::unbounded();
    bus.on(&completions, ["job completed"]);
    bus.on(&everything, ["job completed", "job failed"]);

    // --- 2. ACT ---
    bus.publish("job completed:1", JobEvent::Completed { id: 1 });
    bus.publish(
        "job failed:2",
        JobEvent::Failed {
            id: 2,
            reason: "disk full".to_string(),
        },
    );

    // --- 3. ASSERT ---
    let event = completions.recv_timeout(WAIT).unwrap();
    assert_eq!(event.topic(), "job completed");
    assert_eq!(*event.data(), JobEvent::Completed { id: 1 });
    assert_eq!(
        completions.recv_timeout(Duration::from_millis(50)).unwrap_err(),
        RecvError::Timeout
    );

    let mut topics: Vec<String> = (0..2)
        .map(|_| everything.recv_timeout(WAIT).unwrap().topic().to_string())
        .collect();
    topics.sort();
    assert_eq!(topics, vec!["job completed", "job failed"]);

    assert_eq!(bus.destroy(), 2);
    assert!(completions.is_closed());
    assert!(everything.is_closed());
}

#[test]
fn test_concurrent_publishers_and_subscribers() {
    init_logging();

    let bus = Arc::new(thread_bus::<(usize, usize)>());
    let listeners: Vec<Listener<(usize, usize)>> = (0..4).map(|_| Listener::unbounded()).collect();
    for listener in &listeners {
        bus.on(listener, ["tick"]);
    }

    // Publishers race with registrations and removals on an unrelated topic.
    let churn = {
        let bus = Arc::clone(&bus);
        thread::spawn(move || {
            for _ in 0..100 {
                let transient = Listener::unbounded();
                bus.on(&transient, ["other"]);
                assert!(bus.off(&transient, ["other"]));
                assert!(transient.is_closed());
            }
        })
    };
    let publishers: Vec<_> = (0..4)
        .map(|p| {
            let bus = Arc::clone(&bus);
            thread::spawn(move || {
                for i in 0..25 {
                    assert_eq!(bus.publish("tick", (p, i)), 4);
                }
            })
        })
        .collect();

    for handle in publishers {
        handle.join().expect("publisher panicked");
    }
    churn.join().expect("churn thread panicked");

    for listener in &listeners {
        let received: HashSet<(usize, usize)> = (0..100)
            .map(|_| *listener.recv_timeout(WAIT).unwrap().data())
            .collect();
        assert_eq!(received.len(), 100);
    }
    assert_eq!(bus.listener_count("other"), 0);
    assert_eq!(bus.topics(), vec!["tick".to_string()]);
}

#[test]
fn test_destroy_drains_then_closes() {
    init_logging();

    let bus = thread_bus();
    let listener = Listener::unbounded();
    bus.on(&listener, ["a", "b"]);

    bus.publish("a", 1);
    bus.publish("b", 2);

    // Wait for both deliveries before tearing down.
    let mut received: Vec<i32> = (0..2)
        .map(|_| *listener.recv_timeout(WAIT).unwrap().data())
        .collect();
    received.sort();
    assert_eq!(received, vec![1, 2]);

    assert_eq!(bus.destroy(), 1);
    assert_eq!(listener.recv_timeout(WAIT).unwrap_err(), RecvError::Closed);
    assert_eq!(listener.iter().count(), 0);

    // Publishing after teardown reaches nobody.
    assert_eq!(bus.publish("a", 3), 0);
}

#[test]
fn test_blocked_listener_leaves_bus_responsive() {
    init_logging();

    let bus = thread_bus();
    let never_drained = Listener::bounded(1);
    let drained = Listener::unbounded();
    bus.on(&never_drained, ["t"]);
    bus.on(&drained, ["t"]);

    for i in 0..10 {
        bus.publish("t", i);
    }
    for _ in 0..10 {
        drained.recv_timeout(WAIT).expect("drained listener starved");
    }

    let late = Listener::unbounded();
    bus.on(&late, ["t"]);
    assert!(bus.off(&drained, ["t"]));
    assert_eq!(bus.listener_count("t"), 2);
    assert_eq!(bus.destroy(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_runtime_dispatch_fan_out() {
    init_logging();

    let bus = Bus::new();
    let a = Listener::unbounded();
    let b = Listener::bounded(0);
    bus.on(&a, ["t"]);
    bus.on(&b, ["t", "t"]);

    assert_eq!(bus.publish("t:instance", "payload"), 3);

    let event = tokio::time::timeout(WAIT, a.recv_async()).await.unwrap().unwrap();
    assert_eq!(event.topic(), "t");
    for _ in 0..2 {
        let event = tokio::time::timeout(WAIT, b.recv_async()).await.unwrap().unwrap();
        assert_eq!(*event.data(), "payload");
    }

    assert_eq!(bus.destroy(), 2);
    assert_eq!(a.recv_async().await.unwrap_err(), RecvError::Closed);
}
