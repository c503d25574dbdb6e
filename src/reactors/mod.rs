//! Event reactors: bound handlers with retry, timeout, and terminal
//! callbacks.
//!
//! ## Contents
//! - [`Handler`] / [`HandlerFn`] - async handler trait and its
//!   closure-backed implementation
//! - [`ReactorRequest`] - immutable request value passed to handlers
//! - [`RetryPolicy`] - per-reactor retry discipline
//! - [`EventReactor`] / [`ReactorBuilder`] - the bound handler itself

mod handler;
mod reactor;
mod retry;

pub use handler::{Handler, HandlerFn, ReactorRequest};
pub use reactor::{EventReactor, ReactorBuilder};
pub use retry::RetryPolicy;
