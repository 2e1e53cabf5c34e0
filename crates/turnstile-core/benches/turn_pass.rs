use std::sync::Arc;
use std::thread;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use turnstile_core::turnstile::Turnstile;

const ROUNDS_PER_WORKER: usize = 100;

fn benchmark_turn_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("turn_pass");

    group.throughput(Throughput::Elements(1));
    group.bench_function("uncontended_single_participant", |b| {
        let turnstile = Turnstile::new(1).unwrap();
        b.iter(|| {
            let pass = turnstile.await_turn(black_box(0)).unwrap();
            black_box(pass.turn());
            pass.complete();
        });
    });

    for workers in [2_usize, 4, 8] {
        group.throughput(Throughput::Elements((workers * ROUNDS_PER_WORKER) as u64));
        group.bench_with_input(
            BenchmarkId::new("full_rotation", workers),
            &workers,
            |b, &workers| {
                b.iter(|| {
                    let turnstile = Arc::new(Turnstile::new(workers).unwrap());
                    let handles: Vec<_> = (0..workers)
                        .map(|id| {
                            let turnstile = Arc::clone(&turnstile);
                            thread::spawn(move || {
                                for _ in 0..ROUNDS_PER_WORKER {
                                    turnstile.await_turn(id).unwrap().complete();
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                    black_box(turnstile.turn_count())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_turn_pass);
criterion_main!(benches);
