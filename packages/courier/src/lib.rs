#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Thread-to-thread messaging over pre-allocated, fixed-size message blocks.
//!
//! A [`MessagingService`] lets threads address each other by [`ClientId`]. Messages are
//! [`MESSAGE_SIZE`]-byte blocks taken from a [`block_pool::BlockPool`] owned by the service, so
//! passing a message never touches the general-purpose heap once the pool exists.
//!
//! A thread becomes reachable by registering under an identifier, either explicitly via
//! [`MessagingService::register()`] or implicitly by calling [`MessagingService::recv()`]. Other
//! threads then [`send()`][MessagingService::send] it messages, which the receiver wakes up for.
//!
//! # Delivery contract
//!
//! Each client has exactly one mailbox slot. Sending never blocks and never queues: a message
//! sent to a client that has not yet received the previous one replaces it, and the replaced
//! message is returned to the pool. Protocols that need every message delivered must wait for an
//! acknowledgement before sending the next message to the same client.
//!
//! # Ownership
//!
//! A message is represented by a [`MessageHandle`], which cannot be copied. Sending moves the
//! handle to the receiver, and a failed send hands it back inside the [`SendError`]. Whoever holds
//! the handle is responsible for eventually passing it to
//! [`delete_message()`][MessagingService::delete_message].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//!
//! use courier::{ClientId, MessagingService};
//!
//! let service = Arc::new(MessagingService::new());
//! let echo = ClientId::new(1).unwrap();
//! let main = ClientId::new(0).unwrap();
//!
//! service.register(main).unwrap();
//!
//! let echo_thread = thread::spawn({
//!     let service = Arc::clone(&service);
//!
//!     move || {
//!         service.register(echo).unwrap();
//!         service.send(main, service.compose(b"ready").unwrap()).unwrap();
//!
//!         // Bounce one message back to the main thread.
//!         let message = service.recv(echo).unwrap();
//!         service.send(main, message).unwrap();
//!     }
//! });
//!
//! let ready = service.recv(main).unwrap();
//! service.delete_message(ready);
//!
//! service.send(echo, service.compose(b"marco").unwrap()).unwrap();
//!
//! let reply = service.recv(main).unwrap();
//! assert_eq!(service.load(&reply).unwrap().payload(), b"marco");
//! service.delete_message(reply);
//!
//! echo_thread.join().unwrap();
//! ```

mod builder;
mod client_id;
mod error;
mod message;
mod registry;
mod semaphore;
mod service;

pub use builder::*;
pub use client_id::*;
pub use error::{MessagingError, SendError};
pub(crate) use error::Result;
pub use message::*;
pub use registry::*;
pub use service::*;
