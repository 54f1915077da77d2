// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded conversation buffer.
//!
//! Holds the working context sent to the model on each step. When the buffer
//! exceeds its capacity the oldest non-system message is evicted, so the
//! system prompt and any injected memory block survive long tool exchanges.

use cogent_core::{ChatMessage, Role};

/// A capacity-bounded message buffer that preserves system messages.
pub struct ConversationBuffer {
    messages: Vec<ChatMessage>,
    capacity: usize,
}

impl ConversationBuffer {
    /// Creates a buffer holding at most `capacity` messages. Capacity below 2
    /// is raised to 2 so a system prompt and one user message always fit.
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: Vec::new(),
            capacity: capacity.max(2),
        }
    }

    /// Appends a message, evicting the oldest non-system messages while the
    /// buffer is over capacity.
    ///
    /// A tool-call message is evicted together with all tool results that
    /// answer it: a `Role::Tool` message must never appear without the
    /// assistant message carrying its call, or the provider rejects the
    /// request. Group eviction may leave the buffer below capacity.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        while self.messages.len() > self.capacity {
            let Some(pos) = self.messages.iter().position(|m| m.role != Role::System) else {
                break;
            };
            let evicted = self.messages.remove(pos);
            if !evicted.tool_calls.is_empty() {
                let call_ids: Vec<&str> =
                    evicted.tool_calls.iter().map(|c| c.id.as_str()).collect();
                self.messages.retain(|m| {
                    !(m.role == Role::Tool
                        && m.tool_call_id.as_deref().is_some_and(|id| call_ids.contains(&id)))
                });
            }
        }
    }

    /// The full buffer, in order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The last `n` messages, in order.
    pub fn tail(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
