//! ABAP Test Cockpit (ATC) client for adtstack.
//!
//! This crate declares the ATC and ADT core documents as bound objects and
//! drives the check-run workflow over any [`adtstack_core::Transport`]:
//!
//! 1. create a work list for a check variant (once per [`ChecksRunner`])
//! 2. submit a [`RunRequest`] for a selection of [`ObjectSets`]
//! 3. fetch the resulting [`WorkList`]
//!
//! [`fetch_customizing`] reads the system default check variant.

mod customizing;
mod error;
pub mod model;
pub mod objects;
mod runner;

#[cfg(test)]
mod testing;

pub use customizing::{CUSTOMIZING_MIME_TYPE_V1, Customizing, fetch_customizing};
pub use error::{AtcError, AtcResult};
pub use model::{
    AtcFinding, AtcInfo, AtcObject, RunRequest, RunResponse, WorkList, WorkListObjectSet,
    WorkListRunResult,
};
pub use objects::{AdtObjectKind, ObjectReference, ObjectSetKind, ObjectSets};
pub use runner::{ChecksRunner, DEFAULT_MAX_VERDICTS, WORKLIST_MIME_TYPE_V1};
