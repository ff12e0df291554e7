//! # pubsub-adapter
//!
//! `pubsub_adapter` exposes a Google Cloud Pub/Sub publisher to load-test
//! code. It turns a loosely typed option map into typed publisher settings
//! and forwards publish calls, one round trip each, to the Pub/Sub client
//! together with the caller's execution context.
//!
//! ## Core Modules
//!
//! - `client`: The publisher handle and `create_publisher`.
//! - `config`: Publisher settings, decoded from a dynamic map or loaded from file and environment.
//! - `context`: The execution context of a virtual user, required by every publish call.
//! - `message`: The message envelope (id, payload and attributes).
//! - `runner`: A small load driver running virtual users against a publisher.
//! - `transport`: The Pub/Sub transport and an in-memory one for dry runs.
//! - `utils`: Error handling and logging.

pub mod client;
pub mod config;
pub mod context;
pub mod message;
pub mod runner;
pub mod transport;
pub mod utils;

pub use client::{Publisher, create_publisher};
pub use context::{ExecutionContext, VuState};
pub use utils::{Error, Result};
