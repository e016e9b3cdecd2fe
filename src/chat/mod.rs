//! Conversation context assembly and chat relay.
//!
//! Given a paper and the current message thread, this module assembles the
//! ordered context sent to the generation API: the paper-specific system
//! prompt, any retrieved prior discussion of the same paper, the latest
//! user turn, and the running session memory. After a successful reply the
//! updated thread is written back to the memory store.
//!
//! # Context order
//!
//! 1. System prompt embedding the paper title and summary verbatim
//! 2. Replayed turns from the stored record, oldest first
//! 3. The latest user turn (final entry of the inbound thread)
//! 4. Accumulated session memory turns
//!
//! Replayed turns that were originally authored by the assistant re-enter
//! the context as **system** turns, not assistant turns. This mirrors the
//! long-standing behavior of the service; see DESIGN.md before changing it,
//! since it affects how the model attributes authorship of prior answers.

use thiserror::Error;
use tracing::{debug, warn};

use crate::generation::{GenerationError, GenerationProvider};
use crate::memory::{MemoryError, MemoryStore};
use crate::models::{ChatRole, ChatTurn, Paper, PaperThreadRecord};

/// Reply shown to the user when any external call fails mid-chat.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I encountered an error while processing your request.";

/// Validation errors surfaced to the client before any external call.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The inbound thread was empty or did not end with a user turn
    #[error("chat thread must end with a user message")]
    MissingUserTurn,
}

/// Failures from external collaborators, caught at the chat boundary.
#[derive(Debug, Error)]
enum ExternalError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Outcome of a chat call.
///
/// Both variants carry an assistant turn; `Failed` signals that an external
/// collaborator (store or generation API) errored and the turn is the fixed
/// fallback text. The transport layer is responsible for pairing `Failed`
/// with a failure status code rather than coercing it to success.
#[derive(Debug, Clone)]
pub enum ChatOutcome {
    /// The generation API produced a reply and the thread was persisted
    Reply(ChatTurn),

    /// An external call failed; the turn holds the fallback text
    Failed(ChatTurn),
}

impl ChatOutcome {
    /// The assistant turn, regardless of outcome.
    pub fn turn(&self) -> &ChatTurn {
        match self {
            ChatOutcome::Reply(turn) | ChatOutcome::Failed(turn) => turn,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ChatOutcome::Failed(_))
    }
}

/// Per-session accumulation of chat turns.
///
/// The session is an explicit value owned by the caller and threaded through
/// each chat call, so there is no hidden process-global buffer. It grows by
/// one user/assistant pair per successful chat and is never trimmed here.
#[derive(Debug, Clone, Default)]
pub struct SessionMemory {
    turns: Vec<ChatTurn>,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns accumulated so far, in creation order.
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Record a completed user/assistant exchange.
    pub fn push_exchange(&mut self, user: ChatTurn, assistant: ChatTurn) {
        self.turns.push(user);
        self.turns.push(assistant);
    }
}

/// Coordinates memory lookup, context assembly, generation, and write-back.
pub struct ChatService<G, M>
where
    G: GenerationProvider,
    M: MemoryStore,
{
    generation: G,
    memory: M,
}

impl<G, M> ChatService<G, M>
where
    G: GenerationProvider,
    M: MemoryStore,
{
    pub fn new(generation: G, memory: M) -> Self {
        Self { generation, memory }
    }

    /// Run one chat exchange about `paper`.
    ///
    /// `thread` is the inbound conversation as the client sees it; only its
    /// final entry (which must be a user turn) feeds the context, since the
    /// rest of the history is reconstructed from the store and the session.
    ///
    /// # Errors
    /// Returns `ChatError::MissingUserTurn` if the thread is empty or does
    /// not end with a user turn. External failures never propagate: they
    /// degrade to `ChatOutcome::Failed` with the fixed fallback reply.
    pub async fn chat(
        &self,
        paper: &Paper,
        thread: &[ChatTurn],
        session: &mut SessionMemory,
    ) -> Result<ChatOutcome, ChatError> {
        let latest_user = latest_user_turn(thread)?.clone();

        match self.try_chat(paper, latest_user, session).await {
            Ok(reply) => Ok(ChatOutcome::Reply(reply)),
            Err(error) => {
                warn!(paper = %paper.title, %error, "chat degraded to fallback reply");
                Ok(ChatOutcome::Failed(ChatTurn::assistant(FALLBACK_REPLY)))
            }
        }
    }

    async fn try_chat(
        &self,
        paper: &Paper,
        latest_user: ChatTurn,
        session: &mut SessionMemory,
    ) -> Result<ChatTurn, ExternalError> {
        let prior = self
            .memory
            .similarity_search(&format!("title: {}", paper.title), 1)
            .await?
            .into_iter()
            .next();

        debug!(
            paper = %paper.title,
            prior_found = prior.is_some(),
            session_turns = session.turns.len(),
            "assembling chat context"
        );

        let messages = assemble_context(paper, prior.as_ref(), &latest_user, session);

        let reply_text = self.generation.complete(&messages).await?;
        let reply = ChatTurn::assistant(reply_text);

        session.push_exchange(latest_user, reply.clone());
        self.memory
            .upsert(PaperThreadRecord {
                title: paper.title.clone(),
                summary: paper.summary.clone(),
                turns: session.turns.clone(),
            })
            .await?;

        Ok(reply)
    }
}

/// The turn that feeds the context: the final entry of the inbound thread,
/// which must be a user turn.
///
/// Exposed so callers can validate a thread before acquiring any per-paper
/// resources.
pub fn latest_user_turn(thread: &[ChatTurn]) -> Result<&ChatTurn, ChatError> {
    match thread.last() {
        Some(turn) if turn.role == ChatRole::User => Ok(turn),
        _ => Err(ChatError::MissingUserTurn),
    }
}

/// Fixed system prompt template embedding the paper's title and summary.
pub fn system_prompt(paper: &Paper) -> String {
    format!(
        "You are a helpful assistant discussing the research paper titled '{}'. \
         Here's a brief summary of the paper: {}",
        paper.title, paper.summary
    )
}

/// Assemble the ordered message list for one generation call.
fn assemble_context(
    paper: &Paper,
    prior: Option<&PaperThreadRecord>,
    latest_user: &ChatTurn,
    session: &SessionMemory,
) -> Vec<ChatTurn> {
    let mut messages = vec![ChatTurn::system(system_prompt(paper))];

    if let Some(record) = prior {
        for turn in &record.turns {
            match turn.role {
                ChatRole::User => messages.push(ChatTurn::user(turn.content.clone())),
                // historical assistant output re-enters as system context
                ChatRole::Assistant | ChatRole::System => {
                    messages.push(ChatTurn::system(turn.content.clone()))
                }
            }
        }
    }

    messages.push(latest_user.clone());
    messages.extend(session.turns.iter().cloned());
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationError, GenerationResult};
    use crate::memory::{MemoryError, MemoryResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Generation mock that records the context it was called with.
    struct MockGeneration {
        reply: String,
        should_fail: bool,
        seen: Mutex<Vec<Vec<ChatTurn>>>,
    }

    impl MockGeneration {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                should_fail: false,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: String::new(),
                should_fail: true,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationProvider for MockGeneration {
        async fn complete(&self, messages: &[ChatTurn]) -> GenerationResult<String> {
            self.seen.lock().unwrap().push(messages.to_vec());
            if self.should_fail {
                return Err(GenerationError::ApiError("mock outage".to_string()));
            }
            Ok(self.reply.clone())
        }

        fn model_name(&self) -> &str {
            "mock-model"
        }
    }

    struct MockMemory {
        prior: Option<PaperThreadRecord>,
        fail_search: bool,
        upserts: Mutex<Vec<PaperThreadRecord>>,
    }

    impl MockMemory {
        fn empty() -> Self {
            Self {
                prior: None,
                fail_search: false,
                upserts: Mutex::new(Vec::new()),
            }
        }

        fn with_prior(record: PaperThreadRecord) -> Self {
            Self {
                prior: Some(record),
                fail_search: false,
                upserts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                prior: None,
                fail_search: true,
                upserts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MemoryStore for MockMemory {
        async fn similarity_search(
            &self,
            _query: &str,
            _top_k: usize,
        ) -> MemoryResult<Vec<PaperThreadRecord>> {
            if self.fail_search {
                return Err(MemoryError::Unavailable("mock store down".to_string()));
            }
            Ok(self.prior.clone().into_iter().collect())
        }

        async fn upsert(&self, record: PaperThreadRecord) -> MemoryResult<()> {
            self.upserts.lock().unwrap().push(record);
            Ok(())
        }
    }

    fn paper() -> Paper {
        Paper::new("Attention Is All You Need", "We propose the Transformer.")
    }

    #[tokio::test]
    async fn test_system_turn_first_then_latest_user() {
        let generation = MockGeneration::replying("It is about attention.");
        let service = ChatService::new(generation, MockMemory::empty());
        let mut session = SessionMemory::new();

        let thread = vec![ChatTurn::user("what is this paper about?")];
        let outcome = service.chat(&paper(), &thread, &mut session).await.unwrap();
        assert!(!outcome.is_failure());

        let seen = service.generation.seen.lock().unwrap();
        let context = &seen[0];
        assert_eq!(context[0].role, ChatRole::System);
        assert!(context[0].content.contains("Attention Is All You Need"));
        assert!(context[0].content.contains("We propose the Transformer."));
        assert_eq!(context[1], ChatTurn::user("what is this paper about?"));
    }

    #[tokio::test]
    async fn test_replayed_assistant_turns_become_system() {
        let prior = PaperThreadRecord {
            title: "Attention Is All You Need".to_string(),
            summary: "We propose the Transformer.".to_string(),
            turns: vec![
                ChatTurn::user("earlier question"),
                ChatTurn::assistant("earlier answer"),
            ],
        };
        let generation = MockGeneration::replying("ok");
        let service = ChatService::new(generation, MockMemory::with_prior(prior));
        let mut session = SessionMemory::new();

        let thread = vec![ChatTurn::user("follow-up")];
        service.chat(&paper(), &thread, &mut session).await.unwrap();

        let seen = service.generation.seen.lock().unwrap();
        let context = &seen[0];
        // [system prompt, replayed user, replayed-as-system, latest user]
        assert_eq!(context.len(), 4);
        assert_eq!(context[1], ChatTurn::user("earlier question"));
        assert_eq!(context[2].role, ChatRole::System);
        assert_eq!(context[2].content, "earlier answer");
        assert_eq!(context[3], ChatTurn::user("follow-up"));
    }

    #[tokio::test]
    async fn test_latest_user_precedes_session_tail() {
        let generation = MockGeneration::replying("second reply");
        let service = ChatService::new(generation, MockMemory::empty());
        let mut session = SessionMemory::new();
        session.push_exchange(
            ChatTurn::user("first question"),
            ChatTurn::assistant("first reply"),
        );

        let thread = vec![ChatTurn::user("second question")];
        service.chat(&paper(), &thread, &mut session).await.unwrap();

        let seen = service.generation.seen.lock().unwrap();
        let context = &seen[0];
        assert_eq!(context[1], ChatTurn::user("second question"));
        assert_eq!(context[2], ChatTurn::user("first question"));
        assert_eq!(context[3], ChatTurn::assistant("first reply"));
    }

    #[tokio::test]
    async fn test_success_persists_updated_record() {
        let generation = MockGeneration::replying("the answer");
        let service = ChatService::new(generation, MockMemory::empty());
        let mut session = SessionMemory::new();

        let thread = vec![ChatTurn::user("the question")];
        service.chat(&paper(), &thread, &mut session).await.unwrap();

        assert_eq!(session.turns().len(), 2);
        let upserts = service.memory.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0].title, "Attention Is All You Need");
        assert_eq!(upserts[0].turns.len(), 2);
        assert_eq!(upserts[0].turns[1], ChatTurn::assistant("the answer"));
    }

    #[tokio::test]
    async fn test_generation_failure_degrades_to_fallback() {
        let service = ChatService::new(MockGeneration::failing(), MockMemory::empty());
        let mut session = SessionMemory::new();

        let thread = vec![ChatTurn::user("hello")];
        let outcome = service.chat(&paper(), &thread, &mut session).await.unwrap();

        assert!(outcome.is_failure());
        assert_eq!(outcome.turn().role, ChatRole::Assistant);
        assert_eq!(outcome.turn().content, FALLBACK_REPLY);
        // nothing persisted and the session stays clean on failure
        assert!(session.turns().is_empty());
        assert!(service.memory.upserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_fallback() {
        let generation = MockGeneration::replying("unused");
        let service = ChatService::new(generation, MockMemory::failing());
        let mut session = SessionMemory::new();

        let thread = vec![ChatTurn::user("hello")];
        let outcome = service.chat(&paper(), &thread, &mut session).await.unwrap();
        assert!(outcome.is_failure());
        assert_eq!(outcome.turn().content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_empty_thread_is_validation_error() {
        let service = ChatService::new(MockGeneration::replying("x"), MockMemory::empty());
        let mut session = SessionMemory::new();
        let result = service.chat(&paper(), &[], &mut session).await;
        assert!(matches!(result, Err(ChatError::MissingUserTurn)));
    }

    #[tokio::test]
    async fn test_thread_ending_with_assistant_is_validation_error() {
        let service = ChatService::new(MockGeneration::replying("x"), MockMemory::empty());
        let mut session = SessionMemory::new();
        let thread = vec![ChatTurn::user("q"), ChatTurn::assistant("a")];
        let result = service.chat(&paper(), &thread, &mut session).await;
        assert!(matches!(result, Err(ChatError::MissingUserTurn)));
    }
}
