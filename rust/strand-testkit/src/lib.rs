//! Test utilities for the strand workspace.
//!
//! This crate provides:
//! - [`message::MessageBuilder`] for hand-assembling wire-format messages,
//!   including encodings a regular protobuf encoder never emits (descending
//!   tags, repeated singular fields, message-set items, truncated payloads)
//! - Random data generation for property-style tests
//!
//! # Usage
//!
//! This crate is intended for use within the workspace's test suites and
//! development tools only.

pub mod data_gen;
pub mod message;

pub use message::MessageBuilder;
