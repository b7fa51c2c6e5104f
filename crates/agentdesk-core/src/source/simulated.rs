//! Local simulated generator.
//!
//! Plays back a fixed Markdown reply one fragment at a time so the streaming
//! path can be exercised without an upstream model or credentials.

use std::time::Duration;

use async_stream::stream;

use super::{FragmentStream, NO_QUESTION_PLACEHOLDER};

/// Default pause between simulated fragments.
pub const DEFAULT_FRAGMENT_DELAY: Duration = Duration::from_millis(300);

/// Scripted fragment producer. Never fails.
#[derive(Debug, Clone)]
pub struct SimulatedGenerator {
    delay: Duration,
}

impl SimulatedGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// The full reply for `seed`, split into fragments. The seed appears
    /// verbatim in the second fragment.
    pub fn script(seed: &str) -> Vec<String> {
        let question = if seed.trim().is_empty() {
            NO_QUESTION_PLACEHOLDER
        } else {
            seed
        };

        vec![
            "## Simulated reply (streaming demo)\n\n".to_string(),
            format!("You asked: **{question}**.\n\n"),
            "Here is some sample Markdown content:\n\n".to_string(),
            "1. Lists are supported\n".to_string(),
            "2. **Bold text**\n".to_string(),
            "3. `Inline code`\n\n".to_string(),
            "```rust\n".to_string(),
            "fn hello() {\n".to_string(),
            "    println!(\"Hello from the simulated stream\");\n".to_string(),
            "}\n".to_string(),
            "```\n\n".to_string(),
            "Configure an upstream model key to get real answers.".to_string(),
        ]
    }

    /// Stream the script for `seed`, pausing between fragments.
    pub fn generate(&self, seed: &str) -> FragmentStream {
        let fragments = Self::script(seed);
        let delay = self.delay;

        Box::pin(stream! {
            for (i, fragment) in fragments.into_iter().enumerate() {
                if i > 0 && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                yield Ok(fragment);
            }
        })
    }
}

impl Default for SimulatedGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_FRAGMENT_DELAY)
    }
}
