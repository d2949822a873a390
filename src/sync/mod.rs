//! Job synchronization: diffing, the sync cycle and its periodic trigger.

pub mod differ;
pub mod scheduler;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use differ::{compare, ChangeReport};
pub use scheduler::run_periodic;
pub use service::JobService;
