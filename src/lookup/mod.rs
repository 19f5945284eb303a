//! # Lookup Module
//!
//! Turns a user search into an ordered list of results tagged against the
//! library cache, and drives the add flows on top of it.
//!
//! - [`reconciler::reconcile`] is pure: backend results plus a cache generation in, an
//!   ordered [`Reconciliation`] out.
//! - [`MediaService`] wires a gateway and its cache together for the chat
//!   commands and implements [`crate::scheduler::Backend`].

pub mod reconciler;
pub mod service;

pub use reconciler::{ClassifiedEntry, LookupItem, LookupStatus, Reconciliation, DEFAULT_MAX_RESULTS};
pub use service::{AddOutcome, MediaService, ReleaseOutcome};
