//! Cooperative cancellation for long matching runs
//!
//! The engine checks the token once per bank transaction. Clones observe the
//! same state, so a caller can hand one clone to the run and keep another to
//! cancel it from elsewhere. Child tokens let one run be cancelled without
//! affecting its siblings.

/// Token shared between a run and whoever may cancel it
pub type CancelToken = tokio_util::sync::CancellationToken;
