//! One-way forks between lists.
//!
//! A fork starts as a copy of its source and then follows the source's
//! appends for as long as it stays subscribed. Appends made to the fork
//! itself never reach the source.

mod bridge;

pub(crate) use bridge::ForkBridge;
