//! Per-kind document root descriptors.

use crate::namespace::XmlNamespace;

/// Describes how instances of one object kind root themselves in a document.
///
/// Declared once per kind as a `static` and shared by every instance.
///
/// ```
/// use adtstack_xml::{ObjectType, XmlNamespace};
///
/// static RUN: ObjectType = ObjectType::new(
///     XmlNamespace::new("atc", "http://www.sap.com/adt/atc"),
///     "application/xml",
///     "run",
/// );
/// assert_eq!(RUN.qualified_name(), "atc:run");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectType {
    namespace: XmlNamespace,
    content_type: &'static str,
    element: &'static str,
}

impl ObjectType {
    /// Describe a kind rooted at `namespace:element`.
    #[must_use]
    pub const fn new(
        namespace: XmlNamespace,
        content_type: &'static str,
        element: &'static str,
    ) -> Self {
        Self {
            namespace,
            content_type,
            element,
        }
    }

    /// Namespace owning the root element.
    #[must_use]
    pub const fn namespace(&self) -> XmlNamespace {
        self.namespace
    }

    /// Media type accepted and produced for this kind.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Local name of the root element.
    #[must_use]
    pub const fn element(&self) -> &'static str {
        self.element
    }

    /// Root element name including the namespace prefix.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.namespace.prefix(), self.element)
    }
}
