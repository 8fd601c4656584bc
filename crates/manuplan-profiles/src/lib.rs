// manuplan-profiles/src/lib.rs
// ============================================================================
// Module: Profile & Bundle Governance
// Description: Lifecycle state machine and versioning rules for standards
//              profiles, independent of any plan's own approval state.
// Purpose: Give every profile a single, auditable governance path from
//          draft through approval (or rejection) to eventual deprecation.
// Dependencies: manuplan-core
// ============================================================================

//! ## Overview
//! A [`manuplan_core::domain::StandardsProfile`] moves through
//! `draft -> submitted -> {approved, rejected}`, with `rejected` returning
//! to `draft` on the same version and `approved` forking a new version for
//! further edits. None of the functions here touch storage: callers read
//! the current version through [`manuplan_core::interfaces::ProfileStore`],
//! apply a transition, and persist the result through
//! `ProfileStore::create_version`, which enforces the compare-and-swap
//! discipline.

mod lifecycle;
mod version;

pub use lifecycle::approve;
pub use lifecycle::deprecate;
pub use lifecycle::reject;
pub use lifecycle::revise;
pub use lifecycle::submit;
pub use version::VersionBump;
pub use version::bump_version;
pub use version::fork;
