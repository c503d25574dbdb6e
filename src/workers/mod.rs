//! Worker abstractions, registry, and the built-in event worker.
//!
//! This module provides the core worker-related types:
//! - [`Worker`] - trait for implementing async cancelable workers
//! - [`WorkerFn`] - function-based worker implementation
//! - [`WorkerRef`] - shared reference to a worker (`Arc<dyn Worker>`)
//! - [`WorkerProps`] - immutable scheduling descriptor for one worker
//! - [`WorkerResult`] / [`WorkOutcome`] - outcome reported per dispatch
//! - [`WorkerRegistry`] / [`RegisterMode`] - name → worker lookup table
//! - [`EventWorker`] - loop worker that drains the event bus each tick

mod event_worker;
mod props;
mod registry;
mod result;
mod worker;
mod worker_fn;

pub use event_worker::EventWorker;
pub use props::WorkerProps;
pub use registry::{RegisterMode, WorkerRegistry};
pub use result::{WorkOutcome, WorkerResult};
pub use worker::{Worker, WorkerRef};
pub use worker_fn::WorkerFn;
