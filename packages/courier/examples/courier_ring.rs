//! A ring of threads passing a message around with the `courier` crate.
//!
//! Every thread receives on its own client ID and forwards what it receives to the next ID in
//! the ring, copying the contents into a fresh message and deleting the received one to keep the
//! message pool busy. The main thread injects an `EXIT` message, which every thread forwards once
//! before stopping.

use std::sync::{Arc, Barrier};
use std::thread;

use courier::{ClientId, MessagingService};

const RING_SIZE: u8 = 5;
const EXIT: &[u8] = b"EXIT";

fn main() {
    let service = Arc::new(MessagingService::new());
    let registered = Arc::new(Barrier::new(usize::from(RING_SIZE) + 1));

    let members = (0..RING_SIZE)
        .map(|index| {
            let service = Arc::clone(&service);
            let registered = Arc::clone(&registered);

            thread::spawn(move || ring_member(&service, &registered, index))
        })
        .collect::<Vec<_>>();

    // Nobody can be sent to before registering, so wait for the whole ring.
    registered.wait();

    println!("main - sending EXIT into the ring");
    let message = service.compose(EXIT).unwrap();
    service.send(client(0), message).unwrap();

    for member in members {
        member.join().unwrap();
    }

    // The last member forwarded EXIT to the first one, which had already stopped listening.
    service.shutdown();

    println!("main - {}", service.pool_stats());
}

fn ring_member(service: &MessagingService, registered: &Barrier, index: u8) {
    let me = client(index);
    let next = client((index + 1) % RING_SIZE);

    service.register(me).unwrap();
    println!("{me} - started on {:?}", thread::current().id());
    registered.wait();

    loop {
        let received = service.recv(me).unwrap();
        let contents = service.load(&received).unwrap();

        println!(
            "{me} - received {}",
            String::from_utf8_lossy(contents.payload())
        );

        // Copy into a new message and delete the received one to exercise the pool.
        let forwarded = service.new_message().unwrap();
        service.store(&forwarded, &contents).unwrap();
        service.delete_message(received);

        service.send(next, forwarded).unwrap();

        if contents.payload() == EXIT {
            break;
        }
    }
}

fn client(index: u8) -> ClientId {
    ClientId::new(index).unwrap()
}
