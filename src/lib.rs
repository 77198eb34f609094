//! ChromeForge Engine
//!
//! A local HTTP service that turns a natural-language instruction into a
//! working Manifest V3 browser extension. Each instruction runs a two-pass
//! pipeline: a draft pass generates the extension bundle, an audit pass
//! reviews and corrects it, and the final bundle is materialized onto disk
//! as a clean directory replace.

pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod launcher;
pub mod llm;
pub mod materializer;
pub mod orchestrator;
pub mod packaging;
pub mod server;
pub mod session;
pub mod telemetry;
