//! Message records: line codec, file-backed stores, and the service composing them.

pub mod codec;
pub mod latest;
pub mod log_store;
mod service;
pub mod types;

pub use latest::LatestMessageStore;
pub use log_store::AppendLogStore;
pub use service::{RecordApi, RecordService};
pub use types::{
    ASSISTANT_SOURCE, PlainMessage, PostedMessage, Record, RecordError, StoreError, USER_SOURCE,
};
