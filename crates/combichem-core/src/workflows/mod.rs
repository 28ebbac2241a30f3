//! # Workflows Module
//!
//! High-level entry points that run a complete enumeration over a built composition tree.
//!
//! ## Overview
//!
//! A workflow checks the run against its inputs before any work starts, assembles the
//! root node (which pulls every upstream node along with it) and returns the accepted pool
//! together with the provenance log when one was requested.
//!
//! ## Architecture
//!
//! - **Enumeration Workflow** ([`enumerate`]) - Validates configuration and input pools,
//!   then assembles any [`AssemblyGraph`](crate::engine::graph::AssemblyGraph), be it a
//!   fragment tree or a synthon graph.

pub mod enumerate;
