//! Core infrastructure shared by every `spooled` crate.
//!
//! This crate provides the pieces that cut across the transport, worker, and
//! realtime cores:
//! - [`error::SpooledError`], the unified error taxonomy surfaced to callers
//! - [`events`], a listener-based event system used for worker and realtime
//!   lifecycle notifications
//! - [`case`], the bidirectional `lowerCamel` <-> `lower_snake` key converter
//!   used at every wire boundary

pub mod case;
pub mod error;
pub mod events;

pub use error::SpooledError;
pub use events::{EventListener, EventListeners, FnListener, SpooledEvent};
