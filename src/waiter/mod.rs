//! The waiter: the scheduling loop that drives registered workers.
//!
//! - [`Waiter`] - tick loop, dispatch records, graceful shutdown
//! - [`WaiterPolicy`] - dispatch discipline (`Simple` / `Safe` / `Stable`)
//! - [`wait_for_shutdown_signal`] - cross-platform OS signal helper

mod core;
mod policy;
mod shutdown;

pub use core::Waiter;
pub use policy::WaiterPolicy;
pub use shutdown::wait_for_shutdown_signal;
