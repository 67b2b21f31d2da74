//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for interacting with the Large
//! Language Model providers that back the pipeline's agents. Provider-specific
//! implementations live behind the [`LLMClient`] trait, so the orchestrator
//! never knows which backend produced a response.
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)
//! - `openai` - OpenAI API and compatible endpoints

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider};
