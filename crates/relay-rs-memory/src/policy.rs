//! Window sizing for conversation memory.

/// Default number of records retained per user.
pub const DEFAULT_MAX_RECORDS: usize = 10;
/// Default number of records rendered into the prompt.
pub const DEFAULT_CONTEXT_WINDOW: usize = 5;

/// Bounds applied to every user buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryWindowPolicy {
    /// Maximum records kept before the oldest are evicted.
    pub max_records: usize,
    /// Most recent records included when rendering context.
    pub context_window: usize,
}

impl Default for MemoryWindowPolicy {
    /// Default window settings.
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            context_window: DEFAULT_CONTEXT_WINDOW,
        }
    }
}
