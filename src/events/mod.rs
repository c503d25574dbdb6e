//! Topic-addressed events: node type, priority queue, channels, and the
//! publish surface.
//!
//! ## Contents
//! - [`EventNode`] / [`ResponseMechanism`] - queued unit of asynchronous
//!   work with priority, timeout, and retry metadata
//! - [`PriorityWeights`] - anti-starvation wait-bonus parameters
//! - [`EventFifo`] - FIFO-admission, priority-retrieval queue
//! - [`EventChannel`] - named queue plus its topic → reactor bindings
//! - [`ChannelRegistry`] - get-or-create channel table
//! - [`ChannelManager`] - publish surface, authorization, and dispatch
//!   resolution

mod channel;
mod fifo;
mod manager;
mod node;
mod registry;

pub use channel::EventChannel;
pub use fifo::EventFifo;
pub use manager::ChannelManager;
pub use node::{EventNode, ExpireCallback, PriorityWeights, ResponseMechanism};
pub use registry::ChannelRegistry;
