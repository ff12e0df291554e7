//! The `utils` module provides the pieces shared by every other module of
//! `pubsub_adapter`: the error taxonomy and logging initialisation.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
