//! End-to-end tests for dependency-gated startup: graph validation, probe
//! retry budgets, skip propagation, and outcome reporting.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use bootvisor::{
    Config, Event, EventKind, ProbeError, ProbeFn, ProbeRef, RuntimeError, ServiceOutcome,
    ServiceSpec, Subscribe, Supervisor,
};

/// Fast supervisor config: tiny intervals, no monitoring, short grace.
fn test_config() -> Config {
    Config {
        grace: Duration::from_secs(2),
        bus_capacity: 64,
        probe_interval: Duration::from_millis(10),
        probe_retries: 3,
        probe_timeout: Duration::ZERO,
        monitor: false,
    }
}

fn supervisor() -> Supervisor {
    Supervisor::new(test_config(), Vec::new())
}

/// Probe that fails until the `n`-th attempt, counting invocations.
fn healthy_after(n: u32) -> (ProbeRef, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let probe = ProbeFn::arc(move |_ctx: CancellationToken| {
        let counter = Arc::clone(&counter);
        async move {
            let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt >= n {
                Ok(())
            } else {
                Err(ProbeError::Failed {
                    message: format!("attempt {attempt} of {n}"),
                })
            }
        }
    });
    (probe, calls)
}

fn never_healthy() -> (ProbeRef, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let probe = ProbeFn::arc(move |_ctx: CancellationToken| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ProbeError::Failed {
                message: "down".into(),
            })
        }
    });
    (probe, calls)
}

#[tokio::test]
async fn diamond_bootstraps_in_dependency_order() {
    let specs = vec![
        ServiceSpec::builder("top").probe(healthy_after(1).0).build(),
        ServiceSpec::builder("left")
            .probe(healthy_after(1).0)
            .depends_on(["top"])
            .build(),
        ServiceSpec::builder("right")
            .probe(healthy_after(1).0)
            .depends_on(["top"])
            .build(),
        ServiceSpec::builder("bottom")
            .probe(healthy_after(1).0)
            .depends_on(["left", "right"])
            .build(),
    ];

    let report = supervisor().run(specs).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.len(), 4);
    for name in ["top", "left", "right", "bottom"] {
        assert_eq!(
            report.get(name),
            Some(&ServiceOutcome::Healthy { attempts: 1 }),
            "service {name}"
        );
    }
}

#[tokio::test]
async fn cycle_is_rejected_before_any_probe_runs() {
    let (probe_a, calls_a) = healthy_after(1);
    let (probe_b, calls_b) = healthy_after(1);
    let specs = vec![
        ServiceSpec::builder("a")
            .probe(probe_a)
            .depends_on(["b"])
            .build(),
        ServiceSpec::builder("b")
            .probe(probe_b)
            .depends_on(["a"])
            .build(),
    ];

    match supervisor().run(specs).await {
        Err(RuntimeError::CyclicDependency { cycle }) => {
            assert_eq!(cycle, vec!["a", "b"]);
        }
        other => panic!("expected CyclicDependency, got {other:?}"),
    }
    assert_eq!(calls_a.load(Ordering::SeqCst), 0);
    assert_eq!(calls_b.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_dependency_is_rejected() {
    let specs = vec![ServiceSpec::builder("api").depends_on(["ghost"]).build()];
    match supervisor().run(specs).await {
        Err(RuntimeError::UnknownDependency {
            service,
            dependency,
        }) => {
            assert_eq!(service, "api");
            assert_eq!(dependency, "ghost");
        }
        other => panic!("expected UnknownDependency, got {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_service_is_rejected() {
    let specs = vec![
        ServiceSpec::builder("db").build(),
        ServiceSpec::builder("db").build(),
    ];
    assert!(matches!(
        supervisor().run(specs).await,
        Err(RuntimeError::DuplicateService { name }) if name == "db"
    ));
}

#[tokio::test]
async fn unhealthy_upstream_skips_the_whole_chain() {
    let specs = vec![
        ServiceSpec::builder("a").probe(never_healthy().0).build(),
        ServiceSpec::builder("b").depends_on(["a"]).build(),
        ServiceSpec::builder("c").depends_on(["b"]).build(),
        ServiceSpec::builder("solo").probe(healthy_after(1).0).build(),
    ];

    let report = supervisor().run(specs).await.unwrap();
    assert!(!report.is_success());
    assert_eq!(
        report.get("a"),
        Some(&ServiceOutcome::Unhealthy { attempts: 3 })
    );
    assert_eq!(
        report.get("b"),
        Some(&ServiceOutcome::Skipped {
            upstream: "a".into()
        })
    );
    // Transitive: c is skipped because its direct upstream b was skipped.
    assert_eq!(
        report.get("c"),
        Some(&ServiceOutcome::Skipped {
            upstream: "b".into()
        })
    );
    // The independent branch is unaffected by the failure.
    assert_eq!(
        report.get("solo"),
        Some(&ServiceOutcome::Healthy { attempts: 1 })
    );
}

#[tokio::test]
async fn skip_names_the_upstream_that_failed() {
    let specs = vec![
        ServiceSpec::builder("a").probe(healthy_after(1).0).build(),
        ServiceSpec::builder("b").probe(never_healthy().0).build(),
        ServiceSpec::builder("x").depends_on(["a", "b"]).build(),
    ];

    let report = supervisor().run(specs).await.unwrap();
    assert_eq!(
        report.get("x"),
        Some(&ServiceOutcome::Skipped {
            upstream: "b".into()
        })
    );
}

#[tokio::test]
async fn retry_budget_is_honored_exactly() {
    let (probe, calls) = healthy_after(3);
    let specs = vec![ServiceSpec::builder("db").probe(probe).build()];

    let report = supervisor().run(specs).await.unwrap();
    assert_eq!(
        report.get("db"),
        Some(&ServiceOutcome::Healthy { attempts: 3 })
    );
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn budget_exhaustion_is_terminal() {
    let (probe, calls) = healthy_after(4); // would succeed on attempt 4; budget is 3
    let specs = vec![ServiceSpec::builder("db").probe(probe).build()];

    let report = supervisor().run(specs).await.unwrap();
    assert_eq!(
        report.get("db"),
        Some(&ServiceOutcome::Unhealthy { attempts: 3 })
    );
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn first_success_stops_probing_when_monitoring_is_off() {
    let (probe, calls) = healthy_after(1);
    let specs = vec![ServiceSpec::builder("db").probe(probe).build()];

    supervisor().run(specs).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn probe_less_service_opens_its_gate_immediately() {
    let specs = vec![
        ServiceSpec::builder("external-db").build(),
        ServiceSpec::builder("api")
            .probe(healthy_after(1).0)
            .depends_on(["external-db"])
            .build(),
    ];

    let report = supervisor().run(specs).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.get("external-db"), Some(&ServiceOutcome::Started));
    assert_eq!(
        report.get("api"),
        Some(&ServiceOutcome::Healthy { attempts: 1 })
    );
}

#[tokio::test]
async fn render_failure_is_terminal_and_skips_dependents() {
    let dir = TempDir::new().unwrap();
    let specs = vec![
        ServiceSpec::builder("db")
            .render(dir.path().join("missing.tpl"), dir.path().join("out.conf"))
            .build(),
        ServiceSpec::builder("api").depends_on(["db"]).build(),
    ];

    let report = supervisor().run(specs).await.unwrap();
    assert!(!report.is_success());
    assert!(matches!(
        report.get("db"),
        Some(ServiceOutcome::RenderFailed { .. })
    ));
    assert_eq!(
        report.get("api"),
        Some(&ServiceOutcome::Skipped {
            upstream: "db".into()
        })
    );
}

#[cfg(unix)]
#[tokio::test]
async fn spawned_command_counts_as_started() {
    let specs = vec![ServiceSpec::builder("oneshot").command(&["true"]).build()];
    let report = supervisor().run(specs).await.unwrap();
    assert_eq!(report.get("oneshot"), Some(&ServiceOutcome::Started));
}

#[tokio::test]
async fn panicking_probe_exhausts_its_budget() {
    let panicking = ProbeFn::arc(|_ctx: CancellationToken| async {
        let poisoned = true;
        assert!(!poisoned, "connection pool poisoned");
        Ok::<(), ProbeError>(())
    });
    // Monitoring keeps the healthy sibling's actor alive after bootstrap;
    // the run must still settle once the panicking service spends its budget.
    let mut cfg = test_config();
    cfg.monitor = true;

    let specs = vec![
        ServiceSpec::builder("flaky").probe(panicking).build(),
        ServiceSpec::builder("steady")
            .probe(healthy_after(1).0)
            .build(),
    ];

    let report = Supervisor::new(cfg, Vec::new()).run(specs).await.unwrap();
    assert!(!report.is_success());
    assert_eq!(
        report.get("flaky"),
        Some(&ServiceOutcome::Unhealthy { attempts: 3 })
    );
    assert_eq!(
        report.get("steady"),
        Some(&ServiceOutcome::Healthy { attempts: 1 })
    );
}

/// Counts `ServiceHealthy` deliveries across runs of one supervisor.
struct HealthyCounter {
    healthy: AtomicU32,
}

#[async_trait::async_trait]
impl Subscribe for HealthyCounter {
    async fn on_event(&self, event: &Event) {
        if event.kind == EventKind::ServiceHealthy {
            self.healthy.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[tokio::test]
async fn reused_supervisor_delivers_each_event_once() {
    let counter = Arc::new(HealthyCounter {
        healthy: AtomicU32::new(0),
    });
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::clone(&counter) as Arc<dyn Subscribe>];
    let sup = Supervisor::new(test_config(), subs);

    for _ in 0..2 {
        let specs = vec![ServiceSpec::builder("db").probe(healthy_after(1).0).build()];
        sup.run(specs).await.unwrap();
    }

    // Fan-out is asynchronous; let the listener and worker drain.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(counter.healthy.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_binary_is_a_launch_failure() {
    let specs = vec![
        ServiceSpec::builder("bad")
            .command(&["/definitely/not/a/real/binary"])
            .build(),
        ServiceSpec::builder("dependent").depends_on(["bad"]).build(),
    ];

    let report = supervisor().run(specs).await.unwrap();
    assert!(matches!(
        report.get("bad"),
        Some(ServiceOutcome::LaunchFailed { .. })
    ));
    assert_eq!(
        report.get("dependent"),
        Some(&ServiceOutcome::Skipped {
            upstream: "bad".into()
        })
    );
}
