// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible chat-completions client.
//!
//! [`ChatClient`] implements the `ModelProvider` trait from `cogent-core`:
//! it serializes the conversation and tool specs into the wire format,
//! classifies rate limits as fatal, and retries transient server errors once.

pub mod client;
pub mod types;

pub use client::ChatClient;
