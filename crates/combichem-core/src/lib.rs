//! # combichem Core Library
//!
//! An enumeration engine for large virtual combinatorial libraries. Small pools of building
//! blocks (attachment-point fragments or reactive synthons) are fused recursively along an
//! explicit composition tree, with acceptance templates applied at every fusion point.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `Synthon`), the
//!   annotation side channel, item pools with mark indexing, the worker-pool executor and
//!   the contracts of the external chemistry collaborators (structure toolkit, templates,
//!   reaction rules).
//!
//! - **[`engine`]: The Logic Core.** Composition trees (`FragmentTree`, `SynthonGraph`), the
//!   chunked cartesian-product and reaction-matching streams, run configuration, provenance
//!   logging and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Validates a run against its input pools, drives the
//!   root node's assembly and hands back the accepted pool together with its provenance.

pub mod core;
pub mod engine;
pub mod workflows;

#[cfg(test)]
pub(crate) mod testing;
