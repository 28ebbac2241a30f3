//! # Core Module
//!
//! Stateless building blocks shared by every composition tree.
//!
//! - **Items** ([`models`]) - Structures, synthons, compatibility marks and the typed
//!   annotation bag that carries template outcomes and provenance
//! - **Pools** ([`pools`]) - Ordered, immutable-once-built item containers, including the
//!   mark-indexed pool used for synthon pairing
//! - **Execution** ([`executor`]) - The sequential or worker-pool executor every filter and
//!   fuse step is mapped through
//! - **Collaborators** ([`chem`]) - Contracts for the structure toolkit, acceptance
//!   templates and reaction rules, plus attachment-point mapping utilities

pub mod chem;
pub mod executor;
pub mod models;
pub mod pools;
