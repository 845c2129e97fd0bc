//! ATC request and response documents.

use std::fmt;
use std::sync::LazyLock;

use adtstack_xml::{NamespaceRegistry, ObjectType, XmlNamespace, define_container, xml_object};

use crate::objects::{ObjectSets, XMLNS_ADTCORE};

/// `atc` namespace.
pub const XMLNS_ATC: XmlNamespace = XmlNamespace::new("atc", "http://www.sap.com/adt/atc");
/// `atcinfo` namespace.
pub const XMLNS_ATCINFO: XmlNamespace =
    XmlNamespace::new("atcinfo", "http://www.sap.com/adt/atc/info");
/// `atcworklist` namespace.
pub const XMLNS_ATCWORKLIST: XmlNamespace =
    XmlNamespace::new("atcworklist", "http://www.sap.com/adt/atc/worklist");
/// `atcobject` namespace.
pub const XMLNS_ATCOBJECT: XmlNamespace =
    XmlNamespace::new("atcobject", "http://www.sap.com/adt/atc/object");
/// `atcfinding` namespace.
pub const XMLNS_ATCFINDING: XmlNamespace =
    XmlNamespace::new("atcfinding", "http://www.sap.com/adt/atc/finding");

/// Every namespace used by ATC documents.
pub const NAMESPACES: [XmlNamespace; 6] = [
    XMLNS_ADTCORE,
    XMLNS_ATC,
    XMLNS_ATCINFO,
    XMLNS_ATCWORKLIST,
    XMLNS_ATCOBJECT,
    XMLNS_ATCFINDING,
];

static REGISTRY: LazyLock<NamespaceRegistry> = LazyLock::new(|| {
    NamespaceRegistry::with_namespaces(NAMESPACES).expect("ATC namespace prefixes should be distinct")
});

/// The registry holding [`NAMESPACES`].
#[must_use]
pub fn registry() -> &'static NamespaceRegistry {
    &REGISTRY
}

/// Root descriptor of [`RunRequest`].
pub static RUN_REQUEST_TYPE: ObjectType = ObjectType::new(XMLNS_ATC, "application/xml", "run");
/// Root descriptor of [`AtcInfo`].
pub static INFO_TYPE: ObjectType = ObjectType::new(XMLNS_ATCINFO, "application/xml", "info");
/// Root descriptor of [`RunResponse`].
pub static RUN_RESPONSE_TYPE: ObjectType =
    ObjectType::new(XMLNS_ATCWORKLIST, "application/xml", "worklistRun");
/// Root descriptor of [`AtcObject`].
pub static OBJECT_TYPE: ObjectType = ObjectType::new(XMLNS_ATCOBJECT, "application/xml", "object");
/// Root descriptor of [`WorkList`].
pub static WORKLIST_TYPE: ObjectType =
    ObjectType::new(XMLNS_ATCWORKLIST, "application/xml", "worklist");

/// Request to run the checks of a work list against a selection of objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunRequest {
    /// Upper bound of reported findings.
    pub max_verdicts: Option<u32>,
    /// Objects to check.
    pub sets: Option<ObjectSets>,
}

xml_object! {
    RunRequest as RUN_REQUEST_TYPE {
        attribute max_verdicts => "maximumVerdicts",
        element sets => "objectSets",
    }
}

impl RunRequest {
    /// A request checking `sets` with at most `max_verdicts` findings.
    #[must_use]
    pub fn new(sets: ObjectSets, max_verdicts: u32) -> Self {
        Self {
            max_verdicts: Some(max_verdicts),
            sets: Some(sets),
        }
    }
}

/// A message attached to a run acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtcInfo {
    /// Message category.
    pub typ: Option<String>,
    /// Message text.
    pub description: Option<String>,
}

xml_object! {
    AtcInfo as INFO_TYPE {
        text typ => "atcinfo:type",
        text description => "atcinfo:description",
    }
}

impl fmt::Display for AtcInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description.as_deref().unwrap_or_default())
    }
}

define_container! {
    /// `atcinfo:info` elements.
    pub AtcInfoList => "atcinfo:info", AtcInfo
}

/// Acknowledgement of a submitted run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResponse {
    /// Work list the run was recorded in.
    pub worklist_id: Option<String>,
    /// Work list timestamp after the run.
    pub timestamp: Option<String>,
    /// Messages of the run.
    pub infos: AtcInfoList,
}

xml_object! {
    RunResponse as RUN_RESPONSE_TYPE {
        text worklist_id => "atcworklist:worklistId",
        text timestamp => "atcworklist:worklistTimestamp",
        wrapped_container infos => "atcworklist:infos",
    }
}

/// An object set known to a work list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkListObjectSet {
    /// Technical name.
    pub name: Option<String>,
    /// Display title.
    pub title: Option<String>,
    /// Set kind.
    pub kind: Option<String>,
}

xml_object! {
    WorkListObjectSet {
        attribute name => "atcworklist:name",
        attribute title => "atcworklist:title",
        attribute kind => "atcworklist:kind",
    }
}

define_container! {
    /// `atcworklist:objectSet` elements.
    pub WorkListObjectSetList => "atcworklist:objectSet", WorkListObjectSet
}

/// One issue reported for a checked object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtcFinding {
    /// Finding URI.
    pub uri: Option<String>,
    /// Source position of the issue.
    pub location: Option<String>,
    /// Priority as sent by the system, `1` is the most severe.
    pub priority: Option<String>,
    /// Check identifier.
    pub check_id: Option<String>,
    /// Check title.
    pub check_title: Option<String>,
    /// Message identifier.
    pub message_id: Option<String>,
    /// Message title.
    pub message_title: Option<String>,
    /// Exemption approval state.
    pub exemption_approval: Option<String>,
    /// Exemption kind.
    pub exemption_kind: Option<String>,
}

xml_object! {
    AtcFinding {
        attribute uri => "adtcore:uri",
        attribute location => "atcfinding:location",
        attribute priority => "atcfinding:priority",
        attribute check_id => "atcfinding:checkId",
        attribute check_title => "atcfinding:checkTitle",
        attribute message_id => "atcfinding:messageId",
        attribute message_title => "atcfinding:messageTitle",
        attribute exemption_approval => "atcfinding:exemptionApproval",
        attribute exemption_kind => "atcfinding:exemptionKind",
    }
}

define_container! {
    /// `atcfinding:finding` elements.
    pub AtcFindingList => "atcfinding:finding", AtcFinding
}

/// A checked object with its findings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtcObject {
    /// Object URI.
    pub uri: Option<String>,
    /// ADT type code.
    pub typ: Option<String>,
    /// Object name.
    pub name: Option<String>,
    /// Package of the object.
    pub package_name: Option<String>,
    /// Last author.
    pub author: Option<String>,
    /// Transport object type, e.g. `CLAS`.
    pub object_type_id: Option<String>,
    /// Findings in document order.
    pub findings: AtcFindingList,
}

xml_object! {
    AtcObject as OBJECT_TYPE {
        attribute uri => "adtcore:uri",
        attribute typ => "adtcore:type",
        attribute name => "adtcore:name",
        attribute package_name => "adtcore:packageName",
        attribute author => "atcobject:author",
        attribute object_type_id => "atcobject:objectTypeId",
        wrapped_container findings => "atcobject:findings",
    }
}

define_container! {
    /// `atcobject:object` elements.
    pub AtcObjectList => "atcobject:object", AtcObject
}

/// A work list: accumulated results of one or more runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkList {
    /// Work list identifier.
    pub worklist_id: Option<String>,
    /// Time of the last change.
    pub timestamp: Option<String>,
    /// Name of the object set the results belong to.
    pub used_objectset: Option<String>,
    /// Whether the object set was checked completely.
    pub object_set_is_complete: Option<String>,
    /// Object sets known to the work list.
    pub object_sets: WorkListObjectSetList,
    /// Checked objects.
    pub objects: AtcObjectList,
}

xml_object! {
    WorkList as WORKLIST_TYPE {
        attribute worklist_id => "atcworklist:id",
        attribute timestamp => "atcworklist:timestamp",
        attribute used_objectset => "atcworklist:usedObjectSet",
        attribute object_set_is_complete => "atcworklist:objectSetIsComplete",
        wrapped_container object_sets => "atcworklist:objectSets",
        wrapped_container objects => "atcworklist:objects",
    }
}

impl WorkList {
    /// All findings across objects, paired with their object.
    pub fn findings(&self) -> impl Iterator<Item = (&AtcObject, &AtcFinding)> {
        self.objects
            .iter()
            .flat_map(|object| object.findings.iter().map(move |finding| (object, finding)))
    }
}

/// Outcome of [`ChecksRunner::run_for`](crate::ChecksRunner::run_for).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkListRunResult {
    /// Acknowledgement of the submitted run.
    pub run_response: RunResponse,
    /// The work list after the run.
    pub worklist: WorkList,
}
