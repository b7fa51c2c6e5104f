//! Upstream model clients.
//!
//! Concrete [`FragmentSource`](agentdesk_core::source::FragmentSource)
//! implementations. Only the OpenAI-compatible chat-completions protocol is
//! spoken.

pub mod openai_compat;
