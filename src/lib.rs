//! # workbus
//!
//! **Workbus** is a lightweight worker-scheduling and event-bus library
//! for Rust.
//!
//! It combines a tick-driven scheduler (the *waiter*) with a
//! priority-aware, channel-isolated event bus. Workers run on the
//! scheduler's ticks and publish results onto the bus; reactors consume
//! events from the bus with per-reactor retry, timeout, and callback
//! discipline. The crate is designed as a building block for services
//! that need periodic background work coordinated with asynchronous
//! event handling.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Worker    │   │    Worker    │   │ EventWorker  │
//!     │ (user, loop) │   │(user, 1-shot)│   │  (built-in)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Waiter (tick loop)                                               │
//! │  - WorkerRegistry (name → worker + props)                         │
//! │  - dispatch records (at most one in-flight per worker)            │
//! │  - WaiterPolicy (Simple / Safe / Stable permit discipline)        │
//! │  - publishes every WorkerResult to the result channel             │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ChannelManager (publish surface + authorization)                 │
//! │   ┌────────────────┐  ┌────────────────┐  ┌────────────────┐      │
//! │   │ EventChannel   │  │ EventChannel   │  │ EventChannel   │      │
//! │   │  EventFifo     │  │  EventFifo     │  │  EventFifo     │      │
//! │   │  topic→reactors│  │  topic→reactors│  │  (private)     │      │
//! │   └────────────────┘  └────────────────┘  └────────────────┘      │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!              EventWorker drains each channel per tick:
//!              sweep expired → pop by effective priority →
//!              resolve reactors (mechanism + grants) → join
//! ```
//!
//! ### Dispatch lifecycle
//! ```text
//! register(worker, props) ──► Waiter tick ──► dispatch record
//!
//! per dispatch {
//!   ├─► on_create (first dispatch only)
//!   ├─► execute(child_token)
//!   │       ├─ run_timeout hit ─► drop future, cancel child token
//!   │       ├─ panic           ─► caught at the boundary
//!   │       └─ Ok/Err          ─► classified WorkerResult
//!   ├─► publish WorkerResult to cfg.result_channel
//!   ├─► delay_time sleep (cancellable)
//!   └─► one-shot: unregister + on_destroy
//! }
//!
//! shutdown: cancel token ─► drain ≤ grace ─► abort stragglers
//! ```
//!
//! ## Features
//! | Area           | Description                                                      | Key types / traits                        |
//! |----------------|------------------------------------------------------------------|-------------------------------------------|
//! | **Workers**    | Async cancelable units of work with lifecycle hooks.             | [`Worker`], [`WorkerFn`], [`WorkerProps`] |
//! | **Scheduling** | Tick loop, dispatch disciplines, graceful shutdown.              | [`Waiter`], [`WaiterPolicy`]              |
//! | **Events**     | Priority queue with anti-starvation wait bonus and expiry.       | [`EventNode`], [`EventFifo`]              |
//! | **Channels**   | Isolated queues with visibility and reactor authorization.       | [`EventChannel`], [`ChannelManager`]      |
//! | **Reactors**   | Retrying, timeout-bounded event handlers with callbacks.         | [`EventReactor`], [`RetryPolicy`]         |
//! | **Errors**     | Typed errors per failure boundary.                               | [`WorkerError`], [`ReactorError`]         |
//! | **Config**     | Centralized runtime settings.                                    | [`Config`]                                |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use workbus::{
//!     ChannelManager, Config, EventReactor, EventWorker, PriorityWeights,
//!     Waiter, WorkerFn, WorkerProps, WorkerRegistry, WorkerResult,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let registry = Arc::new(WorkerRegistry::new(cfg.register_mode));
//!     let bus = Arc::new(ChannelManager::new(cfg.weights));
//!
//!     // React to heartbeat events.
//!     bus.register_reactor(
//!         "system",
//!         "heartbeat",
//!         EventReactor::builder("heartbeat-logger").build(|req| {
//!             let n = req.content["n"].clone();
//!             async move {
//!                 println!("heartbeat {n}");
//!                 Ok(())
//!             }
//!         }),
//!     )
//!     .await;
//!
//!     // A loop worker publishing a heartbeat every tick.
//!     let beat_bus = Arc::clone(&bus);
//!     let beat = WorkerFn::arc("heartbeat", move |_ctx| {
//!         let bus = Arc::clone(&beat_bus);
//!         async move {
//!             bus.publish("system", "heartbeat", serde_json::json!({ "n": 1 }))
//!                 .await
//!                 .ok();
//!             Ok(WorkerResult::ok("heartbeat", "heartbeat.sent", serde_json::json!(null)))
//!         }
//!     });
//!     registry
//!         .register(beat, WorkerProps::new("heartbeat").looped())
//!         .await?;
//!
//!     // The built-in event worker drains the bus each tick.
//!     let drainer = EventWorker::new(Arc::clone(&bus), cfg.join_timeout);
//!     registry
//!         .register(Arc::new(drainer), EventWorker::props())
//!         .await?;
//!
//!     let waiter = Waiter::new(cfg, registry, bus);
//!     let token = waiter.cancellation_token();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_secs(3)).await;
//!         token.cancel();
//!     });
//!     waiter.run().await?;
//!     # let _ = PriorityWeights::default();
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod events;
mod reactors;
mod waiter;
mod workers;

// ---- Public re-exports ----

pub use config::Config;
pub use error::{PublishError, ReactorError, RegistryError, RuntimeError, WorkerError};
pub use events::{
    ChannelManager, ChannelRegistry, EventChannel, EventFifo, EventNode, ExpireCallback,
    PriorityWeights, ResponseMechanism,
};
pub use reactors::{EventReactor, Handler, HandlerFn, ReactorBuilder, ReactorRequest, RetryPolicy};
pub use waiter::{Waiter, WaiterPolicy, wait_for_shutdown_signal};
pub use workers::{
    EventWorker, RegisterMode, WorkOutcome, Worker, WorkerFn, WorkerProps, WorkerRef,
    WorkerRegistry, WorkerResult,
};
