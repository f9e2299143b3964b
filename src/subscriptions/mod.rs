//! Subscription system for list change events.
//!
//! Every list owns an observer set, guarded by a lock of its own. An
//! append publishes one [`ListEvent::Appended`](crate::ListEvent) to each
//! observer registered at that moment, synchronously on the appending
//! thread and in registration order.
//!
//! Delivery is isolated per observer: an observer that returns an error
//! or panics does not stop the others and never fails the append.
//!
//! # Example
//!
//! ```ignore
//! let list = ObservableList::new();
//!
//! let handle = list.subscribe_channel(64);
//! list.append("each");
//!
//! match handle.recv() {
//!     Ok(ListEvent::Appended { index, value }) => println!("{index}: {value}"),
//!     _ => {}
//! }
//!
//! handle.dispose();
//! ```

mod manager;
mod types;

pub(crate) use manager::ObserverSet;
pub(crate) use types::ChannelObserver;
pub use types::{ChannelSubscription, Observable, Observer, Subscription};
