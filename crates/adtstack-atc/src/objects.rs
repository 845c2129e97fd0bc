//! ADT core object references and object-set selections.
//!
//! An [`ObjectSets`] document selects the repository objects a check run
//! covers: inclusive sets add objects, exclusive sets remove them again.
//!
//! ```text
//! <objectSets xmlns:adtcore="http://www.sap.com/adt/core">
//!   <objectSet kind="inclusive">
//!     <adtcore:objectReferences>
//!       <adtcore:objectReference adtcore:uri="/sap/bc/adt/packages/%24pkg" .../>
//!     </adtcore:objectReferences>
//!   </objectSet>
//! </objectSets>
//! ```

use adtstack_xml::{
    ObjectType, XmlContainer, XmlError, XmlNamespace, XmlScalar, define_container, xml_object,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The ADT core namespace.
pub const XMLNS_ADTCORE: XmlNamespace =
    XmlNamespace::new("adtcore", "http://www.sap.com/adt/core");

/// Root descriptor of [`ObjectSets`].
pub static OBJECT_SETS_TYPE: ObjectType =
    ObjectType::new(XMLNS_ADTCORE, "application/xml", "objectSets");

/// Characters kept verbatim in object URIs.
const URI_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Repository object kinds that can be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdtObjectKind {
    /// Development package (`DEVC/K`).
    Package,
    /// ABAP class (`CLAS/OC`).
    Class,
    /// ABAP program (`PROG/P`).
    Program,
    /// ABAP interface (`INTF/OI`).
    Interface,
}

impl AdtObjectKind {
    /// ADT type code of the kind.
    #[must_use]
    pub fn type_code(self) -> &'static str {
        match self {
            Self::Package => "DEVC/K",
            Self::Class => "CLAS/OC",
            Self::Program => "PROG/P",
            Self::Interface => "INTF/OI",
        }
    }

    /// Collection URI under which objects of the kind live.
    #[must_use]
    pub fn collection_uri(self) -> &'static str {
        match self {
            Self::Package => "/sap/bc/adt/packages",
            Self::Class => "/sap/bc/adt/oo/classes",
            Self::Program => "/sap/bc/adt/programs/programs",
            Self::Interface => "/sap/bc/adt/oo/interfaces",
        }
    }

    /// URI of the object `name` of this kind.
    #[must_use]
    pub fn object_uri(self, name: &str) -> String {
        let encoded = utf8_percent_encode(&name.to_lowercase(), URI_NAME).to_string();
        format!("{}/{encoded}", self.collection_uri())
    }
}

/// A reference to one repository object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectReference {
    /// Object URI.
    pub uri: Option<String>,
    /// ADT type code, e.g. `CLAS/OC`.
    pub typ: Option<String>,
    /// Object name.
    pub name: Option<String>,
    /// URI of the containing object.
    pub parent_uri: Option<String>,
}

xml_object! {
    ObjectReference {
        attribute uri => "adtcore:uri",
        attribute typ => "adtcore:type",
        attribute name => "adtcore:name",
        attribute parent_uri => "adtcore:parentUri",
    }
}

impl ObjectReference {
    /// Reference an object by URI only.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// Reference the object `name` of `kind`.
    #[must_use]
    pub fn of_kind(kind: AdtObjectKind, name: &str) -> Self {
        Self {
            uri: Some(kind.object_uri(name)),
            typ: Some(kind.type_code().to_owned()),
            name: Some(name.to_uppercase()),
            parent_uri: None,
        }
    }

    /// Reference a development package.
    #[must_use]
    pub fn package(name: &str) -> Self {
        Self::of_kind(AdtObjectKind::Package, name)
    }

    /// Reference a class.
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self::of_kind(AdtObjectKind::Class, name)
    }

    /// Reference a program.
    #[must_use]
    pub fn program(name: &str) -> Self {
        Self::of_kind(AdtObjectKind::Program, name)
    }

    /// Reference an interface.
    #[must_use]
    pub fn interface(name: &str) -> Self {
        Self::of_kind(AdtObjectKind::Interface, name)
    }
}

define_container! {
    /// `adtcore:objectReference` elements.
    pub ObjectReferences => "adtcore:objectReference", ObjectReference
}

/// Whether an object set adds or removes objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectSetKind {
    /// Objects are checked.
    Inclusive,
    /// Objects are excluded from the check.
    Exclusive,
}

impl XmlScalar for ObjectSetKind {
    fn to_xml_text(&self) -> String {
        String::from(match self {
            Self::Inclusive => "inclusive",
            Self::Exclusive => "exclusive",
        })
    }

    fn from_xml_text(text: &str) -> Result<Self, XmlError> {
        match text.trim() {
            "inclusive" => Ok(Self::Inclusive),
            "exclusive" => Ok(Self::Exclusive),
            other => Err(XmlError::ParseError(format!("invalid object set kind: {other}"))),
        }
    }
}

/// One selection of objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSet {
    /// Inclusive or exclusive.
    pub kind: Option<ObjectSetKind>,
    /// The selected objects.
    pub references: ObjectReferences,
}

xml_object! {
    ObjectSet {
        attribute kind => "kind",
        wrapped_container references => "adtcore:objectReferences",
    }
}

impl ObjectSet {
    /// An empty set of the given kind.
    #[must_use]
    pub fn new(kind: ObjectSetKind) -> Self {
        Self {
            kind: Some(kind),
            references: ObjectReferences::new(),
        }
    }
}

define_container! {
    /// `objectSet` elements.
    pub ObjectSetList => "objectSet", ObjectSet
}

/// The object selection of a check run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSets {
    /// Inclusive and exclusive sets, in document order.
    pub sets: ObjectSetList,
}

xml_object! {
    ObjectSets as OBJECT_SETS_TYPE {
        container sets,
    }
}

impl ObjectSets {
    /// An empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `reference` to the checked objects.
    pub fn include_object(&mut self, reference: ObjectReference) {
        self.set_of_kind(ObjectSetKind::Inclusive).references.push(reference);
    }

    /// Add the package `name` to the checked objects.
    pub fn include_package(&mut self, name: &str) {
        self.include_object(ObjectReference::package(name));
    }

    /// Exclude `reference` from the check.
    pub fn exclude_object(&mut self, reference: ObjectReference) {
        self.set_of_kind(ObjectSetKind::Exclusive).references.push(reference);
    }

    /// All references of sets of `kind`.
    pub fn references(&self, kind: ObjectSetKind) -> impl Iterator<Item = &ObjectReference> {
        self.sets
            .iter()
            .filter(move |set| set.kind == Some(kind))
            .flat_map(|set| set.references.iter())
    }

    fn set_of_kind(&mut self, kind: ObjectSetKind) -> &mut ObjectSet {
        let position = self.sets.iter().position(|set| set.kind == Some(kind));
        let index = match position {
            Some(index) => index,
            None => {
                self.sets.push(ObjectSet::new(kind));
                self.sets.len() - 1
            }
        };
        &mut self.sets[index]
    }
}
