//! Stream relay: conversation history in, framed SSE frames out.
//!
//! Opening a stream resolves the conversation and agent, loads history and
//! picks a source. Errors up to that point are returned as [`RelayError`].
//! After that, everything (upstream failures, storage hiccups while polling
//! the abort flag) is reported inside the stream, and the stream always ends
//! with exactly one [`StreamFrame::End`].

use std::pin::Pin;
use std::sync::Arc;

use async_stream::stream;
use futures_util::{Stream, StreamExt};

use agentdesk_types::config::RelayConfig;
use agentdesk_types::conversation::{ConversationId, Message};
use agentdesk_types::error::{RelayError, RepositoryError};
use agentdesk_types::llm::CompletionRequest;
use agentdesk_types::stream::{EndReason, StreamFrame};

use crate::repository::agent::AgentRepository;
use crate::repository::conversation::ConversationRepository;
use crate::source::simulated::SimulatedGenerator;
use crate::source::{FragmentSource, FragmentStream, SourcePlan};

/// Stream of frames for one session.
pub type FrameStream = Pin<Box<dyn Stream<Item = StreamFrame> + Send + 'static>>;

/// Fresh read of a conversation's abort flag.
///
/// Called before every emitted fragment. Implementations must not cache.
pub trait AbortProbe: Send + Sync {
    fn is_aborted(&self) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}

/// [`AbortProbe`] that queries the conversation store on every poll.
pub struct StoreAbortProbe<C> {
    store: Arc<C>,
    conversation_id: ConversationId,
}

impl<C: ConversationRepository> StoreAbortProbe<C> {
    pub fn new(store: Arc<C>, conversation_id: ConversationId) -> Self {
        Self {
            store,
            conversation_id,
        }
    }
}

impl<C: ConversationRepository> AbortProbe for StoreAbortProbe<C> {
    async fn is_aborted(&self) -> Result<bool, RepositoryError> {
        self.store.is_aborted(&self.conversation_id).await
    }
}

/// Frame a fragment stream, polling `probe` before each emitted fragment.
/// Lifecycle events are recorded under `span`.
///
/// - source exhausted: `End(Completed)`
/// - probe reports abort: `End(Aborted)`, the source is dropped unread
/// - source yields an error: one `Error` frame, then `End(Failed)`
/// - probe itself fails: one `Error` frame, then `End(Failed)`
pub fn relay_frames<P>(mut fragments: FragmentStream, probe: P, span: tracing::Span) -> FrameStream
where
    P: AbortProbe + 'static,
{
    Box::pin(stream! {
        loop {
            let item = match fragments.next().await {
                Some(item) => item,
                None => {
                    tracing::debug!(parent: &span, "stream completed");
                    yield StreamFrame::End(EndReason::Completed);
                    break;
                }
            };

            match probe.is_aborted().await {
                Ok(false) => {}
                Ok(true) => {
                    tracing::info!(parent: &span, "conversation aborted, closing stream");
                    yield StreamFrame::End(EndReason::Aborted);
                    break;
                }
                Err(e) => {
                    tracing::warn!(parent: &span, error = %e, "abort flag read failed");
                    yield StreamFrame::Error(format!("could not read conversation state: {e}"));
                    yield StreamFrame::End(EndReason::Failed);
                    break;
                }
            }

            match item {
                Ok(text) => yield StreamFrame::Fragment(text),
                Err(e) => {
                    tracing::warn!(parent: &span, error = %e, "source failed mid-stream");
                    yield StreamFrame::Error(format!("upstream model call failed: {e}"));
                    yield StreamFrame::End(EndReason::Failed);
                    break;
                }
            }
        }
    })
}

/// Relay behaviour taken from `[relay]` in config.toml.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub upstream_prefixes: Vec<String>,
    pub persist_replies: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::from(&RelayConfig::default())
    }
}

impl From<&RelayConfig> for RelaySettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            upstream_prefixes: config.upstream_prefixes.clone(),
            persist_replies: config.persist_replies,
        }
    }
}

/// Turns a stored conversation into a live frame stream.
///
/// Generic over repository traits; agentdesk-core never depends on
/// agentdesk-infra. `upstream` is `None` when no client could be built at
/// startup (e.g. missing credential).
pub struct StreamRelay<A: AgentRepository, C: ConversationRepository> {
    agents: Arc<A>,
    conversations: Arc<C>,
    upstream: Option<Arc<dyn FragmentSource>>,
    simulated: SimulatedGenerator,
    settings: RelaySettings,
}

impl<A, C> StreamRelay<A, C>
where
    A: AgentRepository + 'static,
    C: ConversationRepository + 'static,
{
    pub fn new(
        agents: Arc<A>,
        conversations: Arc<C>,
        upstream: Option<Arc<dyn FragmentSource>>,
        simulated: SimulatedGenerator,
        settings: RelaySettings,
    ) -> Self {
        Self {
            agents,
            conversations,
            upstream,
            simulated,
            settings,
        }
    }

    /// Name of the configured upstream source, if any.
    pub fn upstream_name(&self) -> Option<&str> {
        self.upstream.as_deref().map(|s| s.name())
    }

    /// Open the stream for a conversation.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` / `AgentNotFound` for dangling references
    /// - `UpstreamUnavailable` when the agent routes upstream but no client
    ///   is configured
    /// - `StorageError` if history cannot be loaded
    pub async fn open(&self, conversation_id: &ConversationId) -> Result<FrameStream, RelayError> {
        let conversation = self
            .conversations
            .get_conversation(conversation_id)
            .await?
            .ok_or(RelayError::ConversationNotFound)?;

        let agent = self
            .agents
            .get_by_id(&conversation.agent_id)
            .await
            .map_err(|e| RelayError::StorageError(e.to_string()))?
            .ok_or(RelayError::AgentNotFound)?;

        let history = self.conversations.get_messages(conversation_id).await?;
        let plan = SourcePlan::select(&agent.model_key, &self.settings.upstream_prefixes, &history);

        let fragments = match &plan {
            SourcePlan::Upstream { model } => {
                let upstream = self.upstream.as_ref().ok_or_else(|| {
                    RelayError::UpstreamUnavailable {
                        model: model.clone(),
                    }
                })?;
                let request = CompletionRequest::from_history(
                    model.clone(),
                    &agent.description,
                    &history,
                    agent.temperature,
                );
                upstream.open(request)
            }
            SourcePlan::Simulated { seed } => self.simulated.generate(seed),
        };

        let span = tracing::info_span!(
            "relay_session",
            conversation.id = %conversation_id,
            gen_ai.request.model = %agent.model_key,
            gen_ai.request.temperature = agent.temperature,
            source = plan.kind(),
        );
        tracing::info!(parent: &span, history_len = history.len(), "opening conversation stream");

        let probe = StoreAbortProbe::new(Arc::clone(&self.conversations), conversation_id.clone());
        let frames = relay_frames(fragments, probe, span);

        if self.settings.persist_replies {
            Ok(persist_completed_reply(
                frames,
                Arc::clone(&self.conversations),
                conversation_id.clone(),
            ))
        } else {
            Ok(frames)
        }
    }
}

/// Pass frames through, appending the delivered text as an assistant
/// message when (and only when) the stream completed normally.
fn persist_completed_reply<C>(
    mut frames: FrameStream,
    store: Arc<C>,
    conversation_id: ConversationId,
) -> FrameStream
where
    C: ConversationRepository + 'static,
{
    Box::pin(stream! {
        let mut reply = String::new();
        while let Some(frame) = frames.next().await {
            match &frame {
                StreamFrame::Fragment(text) => reply.push_str(text),
                StreamFrame::End(EndReason::Completed) if !reply.trim().is_empty() => {
                    let message = Message::assistant(conversation_id.clone(), std::mem::take(&mut reply));
                    if let Err(e) = store.append_message(&message).await {
                        tracing::warn!(conversation.id = %conversation_id, error = %e, "failed to persist reply");
                    }
                }
                _ => {}
            }
            yield frame;
        }
    })
}
