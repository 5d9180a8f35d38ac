//! # baton-core
//!
//! Foundation types for the Baton handoff subsystem.
//!
//! This crate provides the shared vocabulary the other Baton crates depend on:
//!
//! - **Messages**: [`Message`](messages::Message) enum with `User`, `Assistant`,
//!   and `System` variants, each carrying an epoch-millisecond timestamp
//! - **Content blocks**: user/assistant content including `tool_use` blocks
//! - **Tools**: the [`Tool`](tools::Tool) schema handed to the host when
//!   registering agent-invocable tools
//! - **Errors**: [`BatonError`](errors::BatonError) hierarchy via `thiserror`
//! - **Logging**: `tracing` subscriber bootstrap

#![deny(unsafe_code)]

pub mod content;
pub mod errors;
pub mod logging;
pub mod messages;
pub mod time;
pub mod tools;
