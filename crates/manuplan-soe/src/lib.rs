// manuplan-soe/src/lib.rs
// ============================================================================
// Module: Standards Overlay Engine
// Description: Pure evaluator turning a layered profile stack + context into
//              an auditable SOERun.
// Purpose: Implement the single source of truth for "what does compliance
//          require here".
// Dependencies: manuplan-core
// ============================================================================

//! ## Overview
//! [`evaluate`] is the Standards Overlay Engine: a pure function from
//! `(SoeInput, &dyn ProfileCatalog, &dyn PackCatalog)` to a `Result<SOERun,
//! DatumError>`. It never performs I/O, reads the clock, or consults
//! randomness; every ordering decision it makes is spelled out so that two
//! hosts given the same inputs produce byte-identical output.

mod engine;
mod resolve;

pub use engine::SoeInput;
pub use engine::evaluate;
pub use resolve::ProfileSelection;
pub use resolve::ResolvedProfile;
