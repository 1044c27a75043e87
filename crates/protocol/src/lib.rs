//! # Analyzer Protocol
//!
//! Data model shared by the task watcher, the paged collector and the HTTP
//! collaborators: poll targets and states, status reports, invalidation keys,
//! pages and the error taxonomy.

mod error;
mod key;
mod notice;
mod page;
mod status;
mod target;

pub use error::{CollectError, PreconditionError, TransportError};
pub use key::InvalidationKey;
pub use notice::{status_message, LogNotifier, NoticeOptions, NoticePosition, Notifier};
pub use page::{CollectionResult, Page};
pub use status::{TaskStatus, TaskStatusReport};
pub use target::{PollState, PollTarget};
