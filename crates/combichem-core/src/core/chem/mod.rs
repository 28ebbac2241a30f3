//! Contracts for the external chemistry collaborators.
//!
//! The engine never inspects chemistry itself. Canonicalization and attachment-point fusion
//! go through a [`toolkit::StructureToolkit`], acceptance decisions through a
//! [`template::Template`], and reaction application through the
//! [`reaction::ReactionUniverse`] and [`reaction::ReactionRule`] traits. The
//! [`attachment`] module holds the purely textual mapping utilities shared by fragment nodes.

pub mod attachment;
pub mod reaction;
pub mod template;
pub mod toolkit;
