//! Short-term conversation memory for the relay.
//!
//! Each user owns an independent bounded buffer of recent turns. The rendered
//! tail of that buffer is what the reply generator injects into its prompt.

pub mod buffer;
pub mod model;
pub mod policy;
pub mod store;

/// Bounded single-user buffer.
pub use buffer::{CONTEXT_BANNER, ConversationBuffer};
/// Memory record model.
pub use model::{MemoryRecord, MemoryRole, UserId};
/// Window sizing policy.
pub use policy::MemoryWindowPolicy;
/// Per-user memory keyed by sender.
pub use store::ConversationMemory;
