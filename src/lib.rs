//! # Live List
//!
//! A thread-safe, append-only list that publishes its appends, meant for
//! live registries (helpers, partials, decorators) that many worker
//! threads read while others keep extending them.
//!
//! ## Core Concepts
//!
//! - **List**: Ordered elements, appended at the end and never removed
//! - **Snapshots**: Lock-free iteration over a private copy
//! - **Subscriptions**: Synchronous, isolated fan-out of append events
//! - **Forks**: A list seeded from another that keeps following it, one way
//!
//! ## Example
//!
//! ```ignore
//! use livelist::{ListEvent, ObservableList};
//!
//! let global = ObservableList::from_vec(vec!["if", "each"]);
//!
//! // A per-environment registry that sees everything registered globally
//! let local = ObservableList::fork(&global);
//!
//! let handle = local.subscribe_fn(|event: &ListEvent<&str>| {
//!     println!("registered {:?}", event);
//!     Ok(())
//! });
//!
//! global.append("with");
//! local.append("lookup");
//!
//! handle.dispose();
//! ```

pub mod error;
mod forks;
pub mod list;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{ListError, Result};
pub use list::ObservableList;
pub use subscriptions::{ChannelSubscription, Observable, Observer, Subscription};
pub use types::*;
