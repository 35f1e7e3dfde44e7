//! # swapdeck-content
//!
//! The generative content boundary: candidate items for the swipe deck and
//! chat replies from the simulated counterpart.
//!
//! The [`ContentProvider`] trait fails closed by construction — its methods
//! return plain values, never errors. [`LlmProvider`] talks to any
//! OpenAI-format chat-completions endpoint and substitutes deterministic
//! catalog content whenever the remote side misbehaves; [`ScriptedProvider`]
//! serves that catalog content directly and never performs I/O.

pub mod config;
pub mod llm;
pub mod provider;
pub mod scripted;

pub use config::ProviderConfig;
pub use llm::LlmProvider;
pub use provider::ContentProvider;
pub use scripted::ScriptedProvider;
