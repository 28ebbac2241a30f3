//! # Core Models Module
//!
//! Data structures for the items that flow through an assembly run.
//!
//! - [`item`] - The [`item::Item`] and [`item::Marked`] traits implemented by every pooled item
//! - [`annotation`] - Append-only, typed annotations recorded on items
//! - [`structure`] - Fragment structures exposing mapped attachment points
//! - [`synthon`] - Reactive synthons and their compatibility marks
//! - [`ids`] - Arena keys for composition nodes

pub mod annotation;
pub mod ids;
pub mod item;
pub mod structure;
pub mod synthon;
