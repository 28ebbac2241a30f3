//! # Engine Module
//!
//! The stateful assembly machinery. Composition trees are stored as arenas of nodes keyed
//! by [`NodeId`](crate::core::models::ids::NodeId); assembling a node first assembles its
//! upstream nodes depth-first, then streams its candidate combinations chunk by chunk
//! through fuse and screen until the combinations run out or the per-node cap is reached.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Chunk size, per-node cap and provenance logging
//! - **Run Context** ([`context`]) - Named input pools, executor and reporter for one run,
//!   plus the per-run memo and provenance state
//! - **Composition Nodes** ([`node`]) - The screen/fuse contract shared by every node kind
//!   and the chunked expansion loop
//! - **Fragment Trees** ([`fragment`]) - N-ary fusion on shared attachment-point labels
//! - **Synthon Graphs** ([`synthon`]) - Binary, reaction-driven fusion over mark-indexed pools
//! - **Streaming** ([`stream`]) - Lazy, chunk-at-a-time sources of combinations
//! - **Provenance** ([`provenance`]) - Per-node input/output snapshots of a run
//! - **Progress Monitoring** ([`progress`]) - Optional callbacks for user feedback
//! - **Error Handling** ([`error`]) - Configuration and tree-construction faults

pub mod config;
pub mod context;
pub mod error;
pub mod fragment;
pub mod graph;
pub mod node;
pub mod progress;
pub mod provenance;
pub mod stream;
pub mod synthon;
