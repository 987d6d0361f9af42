//! Basic benchmarks for the `courier` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use courier::{ClientId, Message, MessagingService};
use criterion::{Criterion, criterion_group, criterion_main};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const PAYLOAD: &[u8] = b"the quick brown fox jumps over the lazy dog";

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("courier_ping");

    group.bench_function("new_delete", |b| {
        let service = MessagingService::new();

        b.iter(|| {
            let message = service.new_message().unwrap();
            service.delete_message(black_box(message));
        });
    });

    group.bench_function("store_load", |b| {
        let service = MessagingService::new();
        let message = service.new_message().unwrap();
        let contents = Message::new(PAYLOAD).unwrap();

        b.iter(|| {
            service.store(&message, black_box(&contents)).unwrap();
            black_box(service.load(&message).unwrap());
        });

        service.delete_message(message);
    });

    group.bench_function("send_recv_same_thread", |b| {
        let service = MessagingService::new();
        let me = ClientId::new(0).unwrap();
        service.register(me).unwrap();

        b.iter(|| {
            let message = service.compose(PAYLOAD).unwrap();
            service.send(me, message).unwrap();

            let received = service.recv(me).unwrap();
            service.delete_message(black_box(received));
        });
    });

    group.bench_function("ping_pong_two_threads", |b| {
        b.iter_custom(|iters| {
            let service = Arc::new(MessagingService::new());
            let pinger = ClientId::new(0).unwrap();
            let ponger = ClientId::new(1).unwrap();

            service.register(pinger).unwrap();

            let echo = thread::spawn({
                let service = Arc::clone(&service);

                move || {
                    service.register(ponger).unwrap();
                    service.send(pinger, service.new_message().unwrap()).unwrap();

                    for _ in 0..iters {
                        let message = service.recv(ponger).unwrap();
                        service.send(pinger, message).unwrap();
                    }
                }
            });

            // Wait until the echo thread is reachable.
            let ready = service.recv(pinger).unwrap();

            let start = Instant::now();

            let mut message = ready;
            for _ in 0..iters {
                service.send(ponger, message).unwrap();
                message = service.recv(pinger).unwrap();
            }

            let elapsed = start.elapsed();

            service.delete_message(message);
            echo.join().unwrap();

            elapsed
        });
    });

    group.finish();
}
