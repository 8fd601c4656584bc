// manuplan-compliance/src/lib.rs
// ============================================================================
// Module: Compliance Trace, Report & Export
// Description: Per-item traceability, the nine-section HTML compliance
//              report, hardened export, and the audit integrity check.
// Purpose: Turn an approved plan and its SOE run into the auditable
//          artifacts a quality organization files against a build.
// Dependencies: manuplan-core
// ============================================================================

//! ## Overview
//! Everything in this crate is a pure function: given the same plan, SOE
//! run, and caller-supplied timestamps, the output (including every hash)
//! is byte-identical. None of it writes anything; persistence and access
//! control live above this layer.

mod audit;
mod export;
mod report;
mod trace;

pub use audit::AuditIntegrityReport;
pub use audit::check_audit_integrity;
pub use export::ExportArtifact;
pub use export::ExportFormat;
pub use export::Provenance;
pub use export::export;
pub use report::render_report;
pub use trace::TraceItemKind;
pub use trace::TracedItem;
pub use trace::trace_plan;

/// Re-exported so callers of [`render_report`] and [`trace_plan`] don't need
/// a direct `manuplan-core` dependency just to name these result types.
pub use manuplan_core::domain::ComplianceReport;
pub use manuplan_core::domain::ReportSection;
pub use manuplan_core::domain::TraceEntry;
