//! Storage event module
//!
//! Models the storage service's object-created notifications as an explicit
//! channel. The storage layer publishes with a non-blocking enqueue; the
//! cleaner consumes at its own pace.
//!
//! # Overview
//!
//! - `StorageEvent` - `(bucket, key)` of a newly created object
//! - `EventBus` - creates a connected publisher/receiver pair
//! - `parse_notification` - reads the service's JSON notification document

mod bus;
mod notification;

pub use bus::{EventBus, EventPublisher, EventReceiver, StorageEvent};
pub use notification::{decode_key, parse_notification};
