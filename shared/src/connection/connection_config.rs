use std::default::Default;

use crate::constants::{FRAGMENT_SIZE, MAX_FRAGMENTED_MESSAGE_SIZE};

/// Contains Config properties which will be used by a Server or Client
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Payloads longer than this many bytes are split into fragments. Zero
    /// is treated as one.
    pub fragment_size: usize,
    /// Hard ceiling on any single message, fragmented or not
    pub max_message_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            fragment_size: FRAGMENT_SIZE,
            max_message_size: MAX_FRAGMENTED_MESSAGE_SIZE,
        }
    }
}
