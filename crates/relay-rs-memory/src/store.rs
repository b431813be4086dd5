//! Per-user conversation memory shared across handler invocations.

use crate::buffer::ConversationBuffer;
use crate::model::{MemoryRole, UserId};
use crate::policy::MemoryWindowPolicy;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Map of user id to an independent bounded buffer.
///
/// Eviction is applied per user, so one busy conversation never pushes
/// another user's turns out of memory.
#[derive(Debug, Default)]
pub struct ConversationMemory {
    policy: MemoryWindowPolicy,
    buffers: RwLock<HashMap<UserId, ConversationBuffer>>,
}

impl ConversationMemory {
    /// Create an empty memory with the given window policy.
    pub fn new(policy: MemoryWindowPolicy) -> Self {
        Self {
            policy,
            buffers: RwLock::new(HashMap::new()),
        }
    }

    /// Append a turn to the user's buffer.
    pub fn append(&self, user_id: UserId, role: MemoryRole, content: impl Into<String>) {
        let mut buffers = self.buffers.write();
        let buffer = buffers
            .entry(user_id)
            .or_insert_with(|| ConversationBuffer::new(self.policy));
        buffer.append(role, content, user_id);
        debug!(
            "remembered turn (user_id={}, role={}, size={})",
            user_id,
            role,
            buffer.len()
        );
    }

    /// Rendered context for the user, or an empty string without history.
    pub fn render_context(&self, user_id: UserId) -> String {
        self.buffers
            .read()
            .get(&user_id)
            .map(ConversationBuffer::render_context)
            .unwrap_or_default()
    }

    /// Forget everything remembered for the user.
    pub fn clear(&self, user_id: UserId) {
        let removed = self.buffers.write().remove(&user_id).is_some();
        debug!("cleared memory (user_id={user_id}, had_history={removed})");
    }

    /// Number of records held for the user.
    pub fn len(&self, user_id: UserId) -> usize {
        self.buffers
            .read()
            .get(&user_id)
            .map(ConversationBuffer::len)
            .unwrap_or(0)
    }

    /// Whether nothing is remembered for the user.
    pub fn is_empty(&self, user_id: UserId) -> bool {
        self.len(user_id) == 0
    }

    /// Snapshot of the user's buffer in chronological order.
    pub fn snapshot(&self, user_id: UserId) -> Vec<crate::MemoryRecord> {
        self.buffers
            .read()
            .get(&user_id)
            .map(|buffer| buffer.records().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::ConversationMemory;
    use crate::{MemoryRole, MemoryWindowPolicy, UserId};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn users_have_independent_bounds() {
        let memory = ConversationMemory::new(MemoryWindowPolicy {
            max_records: 2,
            context_window: 5,
        });
        memory.append(UserId(1), MemoryRole::User, "a1");
        for index in 0..5 {
            memory.append(UserId(2), MemoryRole::User, format!("b{index}"));
        }
        assert_eq!(memory.len(UserId(1)), 1);
        assert_eq!(memory.len(UserId(2)), 2);
        assert_eq!(memory.snapshot(UserId(1))[0].content, "a1");
    }

    #[test]
    fn clear_only_touches_one_user() {
        let memory = ConversationMemory::new(MemoryWindowPolicy::default());
        memory.append(UserId(1), MemoryRole::User, "keep");
        memory.append(UserId(2), MemoryRole::User, "drop");
        memory.clear(UserId(2));
        assert_eq!(memory.render_context(UserId(2)), "");
        assert!(memory.render_context(UserId(1)).ends_with("user: keep"));
        assert!(!memory.buffers.read().contains_key(&UserId(2)));
        assert_eq!(memory.buffers.read().len(), 1);
    }

    #[test]
    fn unknown_user_has_no_context() {
        let memory = ConversationMemory::new(MemoryWindowPolicy::default());
        assert!(memory.is_empty(UserId(99)));
        assert_eq!(memory.render_context(UserId(99)), "");
        memory.clear(UserId(99));
    }

    #[test]
    fn concurrent_appends_respect_bound() {
        let memory = Arc::new(ConversationMemory::new(MemoryWindowPolicy {
            max_records: 10,
            context_window: 5,
        }));
        let handles = (0..4)
            .map(|worker| {
                let memory = memory.clone();
                std::thread::spawn(move || {
                    for index in 0..50 {
                        memory.append(UserId(1), MemoryRole::User, format!("{worker}-{index}"));
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().expect("join");
        }
        assert_eq!(memory.len(UserId(1)), 10);
    }
}
