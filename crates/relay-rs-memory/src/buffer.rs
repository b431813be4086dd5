//! Bounded recency buffer for a single user.

use crate::model::{MemoryRecord, MemoryRole, UserId};
use crate::policy::MemoryWindowPolicy;
use std::collections::VecDeque;

/// Banner placed in front of a rendered transcript.
pub const CONTEXT_BANNER: &str = "\n\nContexto de conversación reciente:\n";

/// FIFO buffer holding the most recent turns of one conversation.
#[derive(Debug, Clone)]
pub struct ConversationBuffer {
    policy: MemoryWindowPolicy,
    records: VecDeque<MemoryRecord>,
}

impl ConversationBuffer {
    /// Create an empty buffer with the given window policy.
    pub fn new(policy: MemoryWindowPolicy) -> Self {
        Self {
            policy,
            records: VecDeque::with_capacity(policy.max_records.min(64)),
        }
    }

    /// Append a turn, evicting the oldest records past the bound.
    pub fn append(&mut self, role: MemoryRole, content: impl Into<String>, user_id: UserId) {
        self.records.push_back(MemoryRecord::new(role, content, user_id));
        while self.records.len() > self.policy.max_records {
            self.records.pop_front();
        }
    }

    /// Render the tail of the buffer behind the context banner.
    ///
    /// Returns an empty string when nothing has been remembered.
    pub fn render_context(&self) -> String {
        if self.records.is_empty() {
            return String::new();
        }
        let start = self
            .records
            .len()
            .saturating_sub(self.policy.context_window);
        let lines = self
            .records
            .iter()
            .skip(start)
            .map(MemoryRecord::transcript_line)
            .collect::<Vec<_>>();
        format!("{CONTEXT_BANNER}{}", lines.join("\n"))
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the buffer holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in chronological order.
    pub fn records(&self) -> impl Iterator<Item = &MemoryRecord> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{CONTEXT_BANNER, ConversationBuffer};
    use crate::{MemoryRole, MemoryWindowPolicy, UserId};
    use pretty_assertions::assert_eq;

    fn buffer(max_records: usize, context_window: usize) -> ConversationBuffer {
        ConversationBuffer::new(MemoryWindowPolicy {
            max_records,
            context_window,
        })
    }

    #[test]
    fn append_never_exceeds_bound_and_evicts_oldest() {
        let mut buffer = buffer(3, 5);
        for index in 0..7 {
            buffer.append(MemoryRole::User, format!("m{index}"), UserId(1));
            assert!(buffer.len() <= 3);
        }
        let contents = buffer
            .records()
            .map(|record| record.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(contents, vec!["m4", "m5", "m6"]);
    }

    #[test]
    fn render_context_is_empty_without_history() {
        let buffer = buffer(10, 5);
        assert_eq!(buffer.render_context(), "");
    }

    #[test]
    fn render_context_includes_last_window_in_order() {
        let mut buffer = buffer(10, 5);
        for index in 0..7 {
            let role = if index % 2 == 0 {
                MemoryRole::User
            } else {
                MemoryRole::Assistant
            };
            buffer.append(role, format!("m{index}"), UserId(1));
        }
        let expected = format!(
            "{CONTEXT_BANNER}user: m2\nassistant: m3\nuser: m4\nassistant: m5\nuser: m6"
        );
        assert_eq!(buffer.render_context(), expected);
    }

    #[test]
    fn render_context_uses_all_records_below_window() {
        let mut buffer = buffer(10, 5);
        buffer.append(MemoryRole::User, "hola", UserId(7));
        buffer.append(MemoryRole::Assistant, "¡Hola!", UserId(7));
        assert_eq!(
            buffer.render_context(),
            format!("{CONTEXT_BANNER}user: hola\nassistant: ¡Hola!")
        );
    }

    #[test]
    fn clear_then_render_yields_empty() {
        let mut buffer = buffer(10, 5);
        buffer.append(MemoryRole::User, "one", UserId(1));
        buffer.append(MemoryRole::Assistant, "two", UserId(1));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.render_context(), "");
    }
}
