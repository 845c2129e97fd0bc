//! The check-run workflow: work list, run submission, result fetch.

use adtstack_core::{AdtRequest, Transport};
use adtstack_xml::Marshal;
use http::Method;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::AtcError;
use crate::model::{self, RunRequest, RunResponse, WorkList, WorkListRunResult};
use crate::objects::ObjectSets;

/// Verdict limit used when the caller has no preference.
pub const DEFAULT_MAX_VERDICTS: u32 = 100;

/// Media type of work list documents.
pub const WORKLIST_MIME_TYPE_V1: &str = "application/atc.worklist.v1+xml";

/// Runs ATC checks of one check variant.
///
/// The runner creates one work list on first use and records every
/// subsequent run in it, so repeated runs accumulate history in the same
/// work list. Construct a new runner to start from a fresh one.
#[derive(Debug)]
pub struct ChecksRunner<T> {
    transport: T,
    variant: String,
    marshal: Marshal,
    worklist_id: Mutex<Option<String>>,
}

impl<T: Transport> ChecksRunner<T> {
    /// Create a runner executing `variant` over `transport`.
    #[must_use]
    pub fn new(transport: T, variant: impl Into<String>) -> Self {
        Self {
            transport,
            variant: variant.into(),
            marshal: Marshal::new(model::registry().clone()),
            worklist_id: Mutex::new(None),
        }
    }

    /// The executed check variant.
    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// The work list identifier, creating the work list on first call.
    ///
    /// The identifier is created at most once per runner, also under
    /// concurrent calls. A failed creation leaves the runner without an
    /// identifier, so the next call tries again.
    pub fn obtain_work_list_id(&self) -> Result<String, AtcError> {
        let mut cached = self.worklist_id.lock();
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let request = AdtRequest::new(Method::POST, "atc/worklists")
            .param("checkVariant", self.variant.as_str())
            .accept("text/plain");
        let response = self.transport.execute(&request)?;

        info!(worklist_id = %response.text, variant = %self.variant, "created ATC work list");
        *cached = Some(response.text.clone());
        Ok(response.text)
    }

    /// Check `object_sets` and return the run acknowledgement together with
    /// the resulting work list.
    ///
    /// Previously exempted findings are excluded from the work list.
    pub fn run_for(
        &self,
        object_sets: ObjectSets,
        max_verdicts: u32,
    ) -> Result<WorkListRunResult, AtcError> {
        let body = self
            .marshal
            .serialize(&RunRequest::new(object_sets, max_verdicts))?;

        let worklist_id = self.obtain_work_list_id()?;

        let request = AdtRequest::new(Method::POST, "atc/runs")
            .param("worklistId", worklist_id.as_str())
            .accept("application/xml")
            .content_type("application/xml")
            .body(body);
        let response = self.transport.execute(&request)?;
        debug!(worklist_id = %worklist_id, body = %response.text, "ATC run response");

        let mut run_response = RunResponse::default();
        self.marshal.deserialize(&response.text, &mut run_response)?;

        let request = AdtRequest::new(Method::GET, format!("atc/worklists/{worklist_id}"))
            .param("includeExemptedFindings", "false")
            .accept(WORKLIST_MIME_TYPE_V1);
        let response = self.transport.execute(&request)?;

        let mut worklist = WorkList::default();
        self.marshal.deserialize(&response.text, &mut worklist)?;
        debug!(
            worklist_id = %worklist_id,
            objects = worklist.objects.len(),
            "fetched ATC work list"
        );

        Ok(WorkListRunResult {
            run_response,
            worklist,
        })
    }
}
