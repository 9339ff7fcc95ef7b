// Criterion benchmarks for the k-Anony matching engine

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use kanony::core::{engine, premium, scoring};
use kanony::models::{normalize_interests, ChatState, Gender};

const INTEREST_POOL: &[&str] = &[
    "anime", "gaming", "music", "chess", "movies", "books", "football", "art", "cooking", "travel",
];

fn build_state(waiting: usize) -> ChatState {
    let mut state = ChatState::default();
    for i in 0..waiting {
        let id = i as i64 + 1;
        let profile = state.profiles.get_or_create(id);
        profile.gender = if i % 2 == 0 { Gender::Girl } else { Gender::Boy };
        profile.interests = normalize_interests(&format!(
            "{}, {}",
            INTEREST_POOL[i % INTEREST_POOL.len()],
            INTEREST_POOL[(i * 3 + 1) % INTEREST_POOL.len()]
        ));
        state.waiting.push(id);
    }
    state
}

fn bench_interest_overlap(c: &mut Criterion) {
    let mut state = ChatState::default();
    state.profiles.get_or_create(1).interests =
        normalize_interests("anime, gaming, music, chess, movies");
    state.profiles.get_or_create(2).interests =
        normalize_interests("music, chess, cooking, travel, art");
    let a = state.profiles.get(1).unwrap().clone();
    let b = state.profiles.get(2).unwrap().clone();

    c.bench_function("interest_overlap", |bench| {
        bench.iter(|| scoring::interest_overlap(black_box(&a), black_box(&b)));
    });
}

fn bench_queue_scan(c: &mut Criterion) {
    let now = Utc::now();
    let mut group = c.benchmark_group("matching");

    for waiting in [10, 50, 100, 500, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("request_match", waiting),
            waiting,
            |bench, &waiting| {
                bench.iter_batched(
                    || {
                        let mut state = build_state(waiting);
                        state.profiles.get_or_create(10_000).interests =
                            normalize_interests("anime, chess, travel");
                        state
                    },
                    |mut state| engine::request_match(&mut state, 10_000, black_box(now)),
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_queue_scan_premium(c: &mut Criterion) {
    let now = Utc::now();
    let mut group = c.benchmark_group("matching_premium");

    for waiting in [100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("request_match_girls_only", waiting),
            waiting,
            |bench, &waiting| {
                bench.iter_batched(
                    || {
                        let mut state = build_state(waiting);
                        let requester = state.profiles.get_or_create(10_000);
                        requester.interests = normalize_interests("anime, chess, travel");
                        premium::grant(requester, now, 14);
                        state
                    },
                    |mut state| engine::request_match(&mut state, 10_000, black_box(now)),
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_interest_overlap,
    bench_queue_scan,
    bench_queue_scan_premium
);

criterion_main!(benches);
