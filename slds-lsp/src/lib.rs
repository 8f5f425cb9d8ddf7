//! Editor integration for SLDS recommendations
//!
//!     Reports produced by the recommendation engine are translated into Language Server
//!     Protocol values so any LSP capable editor can show them. The transport (stdio server,
//!     document sync) is left to the host; this crate only owns the translation.
//!
//! Diagnostics
//!
//!     Every diagnostic carries the source `SLDS` and a numeric code:
//!
//!         0  invalid tokens        Error
//!         1  alternative tokens    Information
//!         2  utility classes       Error
//!         3  component override    Warning
//!         4  mobile readiness      Warning
//!
//! Positions
//!
//!     Analysis ranges count columns in bytes. The plain functions keep them, matching a
//!     client that negotiated the `utf-8` position encoding; the `_with` variants take a
//!     [`PositionEncoder`] holding document texts and write UTF-16 columns for those.
//!
//! Code Actions
//!
//!     Quick fixes are rebuilt from the same report the diagnostics came from, so a client
//!     only needs the document uri and the cursor range to ask for them.

mod convert;

pub mod code_actions;
pub mod diagnostics;

pub use code_actions::{code_actions, code_actions_with};
pub use convert::PositionEncoder;
pub use diagnostics::{
    diagnostics, diagnostics_with, findings, findings_with, DiagnosticCode, Finding, SOURCE,
};
