//! Exercises messaging between real threads through the public API only.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use courier::{ClientId, MESSAGE_CAPACITY, Message, MessagingError, MessagingService};
use testing::{wait_until, with_watchdog};

fn id(value: u8) -> ClientId {
    ClientId::new(value).unwrap()
}

#[cfg_attr(miri, ignore)] // Too slow under Miri.
#[test]
fn blocked_receiver_gets_exact_bytes() {
    with_watchdog(|| {
        let service = Arc::new(MessagingService::new());

        let receiver = thread::spawn({
            let service = Arc::clone(&service);

            move || {
                let message = service.recv(id(5)).unwrap();
                let contents = service.load(&message).unwrap();
                service.delete_message(message);
                contents
            }
        });

        // The receiver registers itself on its first receive.
        wait_until("receiver is registered", || {
            service.registry().find(id(5)).is_some()
        });

        let payload = (0..=254_u8).collect::<Vec<_>>();
        assert_eq!(payload.len(), MESSAGE_CAPACITY);

        let message = service.compose(&payload).unwrap();
        service.send(id(5), message).unwrap();

        let contents = receiver.join().unwrap();
        assert_eq!(contents.payload(), payload.as_slice());
        assert_eq!(service.pool_stats().used_count, 0);
    });
}

#[test]
fn send_to_unknown_client_fails_and_keeps_message() {
    let service = MessagingService::new();
    let message = service.compose(b"nobody home").unwrap();

    let (reason, message) = service.send(id(200), message).unwrap_err().into_parts();

    assert!(matches!(
        reason,
        MessagingError::ClientNotFound { client_id } if client_id == id(200)
    ));
    assert_eq!(service.load(&message).unwrap().payload(), b"nobody home");

    service.delete_message(message);
    assert_eq!(service.pool_stats().used_count, 0);
}

#[test]
fn recv_timeout_expires_without_sender() {
    let service = MessagingService::new();

    let result = service.recv_timeout(id(9), Duration::from_millis(10));

    assert!(matches!(
        result,
        Err(MessagingError::TimedOut { client_id }) if client_id == id(9)
    ));
}

#[cfg_attr(miri, ignore)] // Too slow under Miri.
#[test]
fn shutdown_releases_every_blocked_receiver() {
    with_watchdog(|| {
        const RECEIVERS: u8 = 4;

        let service = Arc::new(MessagingService::new());

        let handles = (0..RECEIVERS)
            .map(|value| {
                let service = Arc::clone(&service);
                thread::spawn(move || service.recv(id(value)))
            })
            .collect::<Vec<_>>();

        wait_until("all receivers are registered", || {
            service.registry().len() == usize::from(RECEIVERS)
        });

        service.shutdown();

        for handle in handles {
            assert!(matches!(
                handle.join().unwrap(),
                Err(MessagingError::ShutDown)
            ));
        }
    });
}

#[cfg_attr(miri, ignore)] // Too slow under Miri.
#[test]
fn acknowledged_exchange_delivers_every_message() {
    with_watchdog(|| {
        const ROUNDS: u8 = 50;

        let service = Arc::new(MessagingService::new());
        let server = id(1);
        let client = id(2);

        let ready = Arc::new(Barrier::new(2));

        let server_thread = thread::spawn({
            let service = Arc::clone(&service);
            let ready = Arc::clone(&ready);

            move || {
                service.register(server).unwrap();
                ready.wait();

                for _ in 0..ROUNDS {
                    let request = service.recv(server).unwrap();
                    let mut contents = service.load(&request).unwrap();

                    let doubled = contents
                        .payload()
                        .iter()
                        .map(|byte| byte.wrapping_mul(2))
                        .collect::<Vec<_>>();
                    contents.set_payload(&doubled).unwrap();

                    // Reuse the request block for the reply.
                    service.store(&request, &contents).unwrap();
                    service.send(client, request).unwrap();
                }
            }
        });

        service.register(client).unwrap();
        ready.wait();

        for round in 0..ROUNDS {
            service
                .send(server, service.compose(&[round, round]).unwrap())
                .unwrap();

            let reply = service.recv(client).unwrap();
            let expected = round.wrapping_mul(2);
            assert_eq!(service.load(&reply).unwrap().payload(), &[expected, expected]);
            service.delete_message(reply);
        }

        server_thread.join().unwrap();

        let stats = service.pool_stats();
        assert_eq!(stats.used_count, 0);
        assert_eq!(stats.free_count, stats.block_count);
    });
}

#[cfg_attr(miri, ignore)] // Too slow under Miri.
#[test]
fn concurrent_first_messages_share_one_pool() {
    with_watchdog(|| {
        const THREADS: usize = 8;

        let service = Arc::new(MessagingService::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles = (0..THREADS)
            .map(|_| {
                let service = Arc::clone(&service);
                let barrier = Arc::clone(&barrier);

                thread::spawn(move || {
                    barrier.wait();
                    service.new_message().unwrap()
                })
            })
            .collect::<Vec<_>>();

        let messages = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(service.pool_stats().used_count, THREADS);

        for message in messages {
            assert!(service.load(&message).unwrap().is_empty());
            service.delete_message(message);
        }
    });
}

#[test]
fn message_handles_are_not_valid_in_other_services() {
    let first = MessagingService::new();
    let second = MessagingService::new();

    let message = first.compose(b"mine").unwrap();

    // Rejected before the second pool is even allocated.
    assert!(matches!(
        second.store(&message, &Message::EMPTY),
        Err(MessagingError::ForeignMessage { .. })
    ));
    assert!(!second.pool_stats().initialized);

    // Still rejected once the second pool exists and holds a block at the same address.
    let local = second.compose(b"local").unwrap();
    assert_eq!(local.address(), message.address());

    assert!(matches!(
        second.load(&message),
        Err(MessagingError::ForeignMessage { .. })
    ));

    second.delete_message(message);
    assert_eq!(second.load(&local).unwrap().payload(), b"local");
    assert_eq!(second.pool_stats().used_count, 1);

    second.delete_message(local);
    assert_eq!(second.pool_stats().used_count, 0);
    assert_eq!(first.pool_stats().used_count, 1);
}
