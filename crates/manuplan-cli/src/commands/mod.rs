// manuplan-cli/src/commands/mod.rs
// ============================================================================
// Module: Command Modules
// Description: Wires the per-domain subcommand modules together.
// Purpose: Keep `main.rs` limited to argument parsing and dispatch.
// ============================================================================

/// Compliance subcommands.
pub mod compliance;
/// Plan subcommands.
pub mod plan;
/// Profile subcommands.
pub mod profile;
/// SOE (statement of estimate) subcommands.
pub mod soe;
