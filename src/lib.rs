// Library interface for secdigest modules
// This allows tests and other binaries to import modules

pub mod config;
pub mod model;
pub mod fingerprint;
pub mod collector;
pub mod llm;
pub mod summarizer;
pub mod publisher;
pub mod pipeline;
