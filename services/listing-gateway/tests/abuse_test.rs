// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse simulations against the listing gateway limiter.
//!
//! These replay traffic patterns on a manual clock and check how the
//! fixed-window budgets hold up, including the known weaknesses of the
//! scheme.

mod harness;

use harness::{
    generators,
    scenarios::TrafficScenario,
    tally::{Outcome, Tally},
};
use listing_gateway::{
    classify,
    clock::ManualClock,
    config::{ClassLimit, RateLimitConfig},
    EndpointClass, InMemoryStore, RateLimitStore, RateLimiter,
};
use std::sync::Arc;
use std::time::Duration;

const START_MS: u64 = 1_700_000_000_000;

struct Rig {
    limiter: RateLimiter,
    clock: Arc<ManualClock>,
    store: Arc<InMemoryStore>,
}

fn rig(config: RateLimitConfig) -> Rig {
    let clock = Arc::new(ManualClock::new(START_MS));
    let store = Arc::new(InMemoryStore::new());
    let limiter = RateLimiter::with_parts(config, store.clone(), clock.clone());
    Rig {
        limiter,
        clock,
        store,
    }
}

fn deterministic() -> RateLimitConfig {
    RateLimitConfig {
        cleanup_probability: 0.0,
        ..Default::default()
    }
}

/// Replay a scenario and count the outcomes.
fn run(scenario: &TrafficScenario, rig: &Rig) -> Tally {
    let clients: Vec<String> = generators::generate_ips(scenario.unique_clients)
        .into_iter()
        .map(|ip| ip.to_string())
        .collect();
    let mut tally = Tally::new();

    for i in 0..scenario.total_requests {
        let client = &clients[i % clients.len()];
        match rig
            .limiter
            .check_request(client, &scenario.method, scenario.path)
        {
            Ok(admission) => tally.admitted(admission.class, client),
            Err(exceeded) => tally.rejected(exceeded.class, client, exceeded.retry_after_secs),
        }
        rig.clock.advance(scenario.spacing);
    }

    tally
}

// ============================================================================
// Flood Tests
// ============================================================================

#[test]
fn test_single_client_flood() {
    let rig = rig(deterministic());
    let tally = run(&TrafficScenario::single_client_flood(), &rig);
    println!("{}", tally);

    assert_eq!(tally.count(Outcome::Admitted(EndpointClass::Strict)), 50);
    assert_eq!(tally.count(Outcome::Rejected(EndpointClass::Strict)), 150);
    assert_eq!(tally.first_rejection(), Some(50));

    // 51st request lands 0.5s into the window.
    assert_eq!(tally.max_retry_after_secs(), 900);
}

#[test]
fn test_map_panning_stays_within_lenient_budget() {
    let rig = rig(deterministic());
    let tally = run(&TrafficScenario::map_panning(), &rig);
    println!("{}", tally);

    assert_eq!(tally.count(Outcome::Admitted(EndpointClass::Lenient)), 600);
    assert_eq!(tally.count(Outcome::Rejected(EndpointClass::Lenient)), 100);
}

#[test]
fn test_slow_drip_allowed() {
    let rig = rig(deterministic());
    let tally = run(&TrafficScenario::slow_drip(), &rig);
    println!("{}", tally);

    // 40 writes over 20 minutes never reach 50 in one window.
    assert_eq!(tally.total_rejected(), 0);
}

// ============================================================================
// Window Boundary
// ============================================================================

#[test]
fn test_burst_straddling_boundary_admits_twice_the_budget() {
    let config = RateLimitConfig {
        strict: ClassLimit {
            max_requests: 50,
            window_ms: 15 * 60 * 1000,
        },
        ..deterministic()
    };
    let rig = rig(config);

    // Open the window, then wait until just before it closes.
    rig.limiter.check("10.9.9.9", EndpointClass::Strict).unwrap();
    rig.clock.advance(Duration::from_millis(15 * 60 * 1000 - 1_000));

    let mut admitted = 1;
    for _ in 0..49 {
        rig.limiter.check("10.9.9.9", EndpointClass::Strict).unwrap();
        admitted += 1;
    }
    rig.clock.advance(Duration::from_millis(1_001));
    while rig.limiter.check("10.9.9.9", EndpointClass::Strict).is_ok() {
        admitted += 1;
    }

    // 99 of these 100 requests fell inside roughly one second.
    assert_eq!(admitted, 100);
}

// ============================================================================
// Memory Growth
// ============================================================================

#[test]
fn test_one_off_clients_are_swept() {
    let rig = rig(RateLimitConfig {
        lenient: ClassLimit {
            max_requests: 600,
            window_ms: 60_000,
        },
        moderate: ClassLimit {
            max_requests: 300,
            window_ms: 60_000,
        },
        ..deterministic()
    });

    let tally = run(&TrafficScenario::one_off_churn(), &rig);
    assert_eq!(tally.total(), 1_000);
    assert_eq!(tally.unique_clients(), 1_000);
    assert_eq!(tally.total_rejected(), 0);
    assert_eq!(rig.store.len(), 1_000);

    rig.limiter.cleanup();
    // Requests are 2s apart; only the last 30 clients are inside a window.
    assert_eq!(rig.store.len(), 30);
}

#[test]
fn test_capacity_bound_holds_without_sweeps() {
    let rig = rig(RateLimitConfig {
        max_entries: 100,
        ..deterministic()
    });

    let tally = run(&TrafficScenario::one_off_churn(), &rig);
    assert_eq!(tally.total_rejected(), 0);
    assert!(rig.store.len() <= 100);
}

#[test]
fn test_sampled_sweep_keeps_store_small() {
    let rig = rig(RateLimitConfig {
        cleanup_probability: 1.0,
        moderate: ClassLimit {
            max_requests: 300,
            window_ms: 10_000,
        },
        ..Default::default()
    });

    run(&TrafficScenario::one_off_churn(), &rig);
    // Windows of 10s with 2s spacing: at most 6 live keys at a time.
    assert!(rig.store.len() <= 6, "store holds {} keys", rig.store.len());
}

// ============================================================================
// Class Isolation
// ============================================================================

#[test]
fn test_exhausting_strict_leaves_other_classes_untouched() {
    let rig = rig(deterministic());
    let client = "10.1.2.3";

    let mut strict_admitted = 0;
    for (method, path) in generators::strict_requests().iter().cycle().take(80) {
        if rig.limiter.check_request(client, method, path).is_ok() {
            strict_admitted += 1;
        }
    }
    assert_eq!(strict_admitted, 50);

    for (method, path) in generators::moderate_requests() {
        let admission = rig.limiter.check_request(client, &method, path).unwrap();
        assert_eq!(admission.class, EndpointClass::Moderate);
    }
    for (method, path) in generators::lenient_requests() {
        let admission = rig.limiter.check_request(client, &method, path).unwrap();
        assert_eq!(admission.class, EndpointClass::Lenient);
    }
}

#[test]
fn test_generated_requests_classify_as_labelled() {
    for (method, path) in generators::strict_requests() {
        assert_eq!(classify(&method, path), EndpointClass::Strict, "{method} {path}");
    }
    for (method, path) in generators::moderate_requests() {
        assert_eq!(classify(&method, path), EndpointClass::Moderate, "{method} {path}");
    }
    for (method, path) in generators::lenient_requests() {
        assert_eq!(classify(&method, path), EndpointClass::Lenient, "{method} {path}");
    }
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_never_exceed_budget() {
    let rig = Arc::new(rig(deterministic()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let rig = Arc::clone(&rig);
            tokio::spawn(async move {
                let mut admitted = 0usize;
                for _ in 0..25 {
                    if rig.limiter.check("10.7.7.7", EndpointClass::Strict).is_ok() {
                        admitted += 1;
                    }
                    tokio::task::yield_now().await;
                }
                admitted
            })
        })
        .collect();

    let mut admitted = 0;
    for task in tasks {
        admitted += task.await.unwrap();
    }

    assert_eq!(admitted, 50);
    assert_eq!(rig.store.get("10.7.7.7:strict").map(|e| e.count), Some(50));
}
