//! paper-chat - an HTTP backend for chatting about research papers.
//!
//! The backend relays chat messages to an external LLM chat-completion API,
//! fetches paper metadata from arXiv and Scholar-style search services,
//! downloads PDFs through an external CLI tool, and recommends similar
//! papers with lexical TF-IDF ranking.
//!
//! # Architecture
//!
//! The system is organized into several key modules:
//!
//! - **models**: Core data structures (Paper, ChatTurn, PaperThreadRecord)
//! - **ranker**: TF-IDF cosine similarity ranking of candidate papers
//! - **generation**: Chat-completion provider abstraction (Groq-backed)
//! - **memory**: Similarity-searchable store of per-paper chat threads
//! - **chat**: Conversation context assembly and relay to the provider
//! - **search**: arXiv and Scholar paper search providers
//! - **download**: PDF fetch via the `arxiv-downloader` tool
//! - **server**: Axum HTTP surface mapping routes to the above
//! - **config**: Environment-based configuration
//!
//! # Chat workflow
//!
//! 1. Receive a paper identity and the current message thread
//! 2. Look up prior discussion of the paper in the memory store
//! 3. Assemble the ordered context (system prompt, replayed history,
//!    latest user turn, session memory)
//! 4. Relay to the generation API and persist the updated thread
//! 5. Return the assistant turn; external failures degrade to a fixed
//!    fallback reply with a failure status, never a crash
//!
//! # Example
//!
//! ```no_run
//! use paper_chat::chat::{ChatService, SessionMemory};
//! use paper_chat::generation::groq::GroqProvider;
//! use paper_chat::memory::lexical::LexicalMemoryStore;
//! use paper_chat::models::{ChatTurn, Paper};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let generation = GroqProvider::new("api-key".to_string())?;
//! let service = ChatService::new(generation, LexicalMemoryStore::new());
//!
//! let paper = Paper::new("Attention Is All You Need", "We propose the Transformer.");
//! let thread = vec![ChatTurn::user("What problem does this paper solve?")];
//! let mut session = SessionMemory::new();
//!
//! let outcome = service.chat(&paper, &thread, &mut session).await?;
//! println!("{}", outcome.turn().content);
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod chat;
pub mod config;
pub mod download;
pub mod generation;
pub mod memory;
pub mod models;
pub mod ranker;
pub mod search;
pub mod server;

// Re-export commonly used types at the crate root
pub use chat::{ChatOutcome, ChatService, SessionMemory};
pub use generation::GenerationProvider;
pub use memory::MemoryStore;
pub use models::{ChatRole, ChatTurn, Paper, PaperThreadRecord, RankedPaper};
pub use ranker::rank;
pub use search::SearchProvider;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
