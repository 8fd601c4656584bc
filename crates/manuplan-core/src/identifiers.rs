// manuplan-core/src/identifiers.rs
// ============================================================================
// Module: Datum Identifiers
// Description: Newtype identifiers for every addressable entity in the core.
// Purpose: Prevent accidental mixing of string ids across unrelated entities.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every entity that flows through the core is addressed by an opaque,
//! string-backed identifier. These newtypes exist purely to keep the type
//! checker from letting a `RuleId` stand in for a `PackId`; no validation
//! beyond non-emptiness is performed here.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Builds a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the owned string.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(PackId, "Identifier of a [`crate::domain::StandardsPack`].");
string_id!(RuleId, "Identifier of a [`crate::domain::Rule`] within a pack.");
string_id!(ProfileId, "Identifier of a [`crate::domain::StandardsProfile`].");
string_id!(IndustryId, "Identifier of an [`crate::domain::IndustryProfile`].");
string_id!(BundleId, "Identifier of a [`crate::domain::ProfileBundle`].");
string_id!(SoeRunId, "Identifier of an [`crate::domain::SOERun`].");
string_id!(DecisionId, "Content-addressed identifier of a [`crate::domain::Decision`].");
string_id!(GateId, "Identifier of a [`crate::domain::Gate`].");
string_id!(PlanId, "Identifier of a [`crate::domain::DatumPlan`].");
string_id!(StepId, "Content-addressed identifier of a [`crate::domain::Step`].");
string_id!(QuoteId, "Identifier of the external quote a plan is generated from.");
string_id!(ReportId, "Identifier of a rendered [`crate::domain::ComplianceReport`].");
string_id!(UserId, "Identifier of the actor that performed a governed action.");
