//! Performance benchmarks for phishguard
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use phishguard::host::frame;
use phishguard::{
    classify, is_non_web_url, AlertDispatcher, BrowserEvent, DedupScope, Guard, GuardConfig,
    MemoryBroadcaster, MemoryInjector, MemoryNavigator, MemoryNotifier, MemoryStateStore,
    NavigationEvent, NavigationGate, SecurityProbe, StubReachability, StubVerdictService,
};
use std::sync::Arc;

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify redirect", |b| {
        b.iter(|| classify("Vulnerable domain found! Do not access this domain."))
    });
    c.bench_function("classify safe", |b| {
        b.iter(|| classify("This URL seems safe to visit."))
    });
}

fn bench_gate(c: &mut Criterion) {
    c.bench_function("is_non_web_url", |b| {
        b.iter(|| is_non_web_url("chrome-extension://abcdefghijklmnop/popup.html"))
    });

    let mut group = c.benchmark_group("gate_admit");
    for scope in [DedupScope::Global, DedupScope::PerTab] {
        let gate = NavigationGate::with_scope(scope);
        let events: Vec<_> = (0..100)
            .map(|i| NavigationEvent::top_level(i % 8, format!("https://site{}.example/", i)))
            .collect();
        group.bench_function(format!("{:?}", scope), |b| {
            b.iter(|| {
                for event in &events {
                    gate.admit(event, true);
                }
            })
        });
    }
    group.finish();
}

fn bench_frame_read(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let event = BrowserEvent::NavigationCommitted(
        NavigationEvent::top_level(3, "https://example.com/login")
            .with_referrer("https://mail.example"),
    );
    let bytes = frame::encode(&event).unwrap();

    c.bench_function("frame read_message", |b| {
        b.to_async(&rt).iter(|| async {
            let mut reader = bytes.as_slice();
            frame::read_message::<_, BrowserEvent>(&mut reader)
                .await
                .unwrap()
        })
    });
}

fn bench_guard_pipeline(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("guard_pipeline");
    for (name, reply) in [
        ("safe", "No threats detected."),
        ("warn", "Vulnerable: suspicious form detected."),
    ] {
        let guard = Guard::new(
            &GuardConfig::default(),
            Arc::new(MemoryStateStore::with_enabled(true)),
            SecurityProbe::new(
                StubReachability::reachable(),
                StubVerdictService::replying(reply),
            ),
            AlertDispatcher::new(
                Arc::new(MemoryNotifier::default()),
                Arc::new(MemoryInjector::default()),
                Arc::new(MemoryBroadcaster::default()),
            ),
            Arc::new(MemoryNavigator::default()),
        )
        .unwrap();

        let mut n = 0u64;
        group.bench_function(name, |b| {
            b.to_async(&rt).iter(|| {
                n += 1;
                let event = NavigationEvent::top_level(1, format!("https://site{}.example/", n));
                let guard = &guard;
                async move { guard.on_navigation_committed(&event).await }
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_classify,
    bench_gate,
    bench_frame_read,
    bench_guard_pipeline,
);
criterion_main!(benches);
