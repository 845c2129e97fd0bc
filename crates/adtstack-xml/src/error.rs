//! Error types for XML marshalling.

use std::io;

/// Errors that can occur while serializing or deserializing bound objects.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library, including malformed documents.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// An error from quick-xml attribute handling.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// A required XML element was missing.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// An error parsing a value from XML text content.
    #[error("failed to parse value: {0}")]
    ParseError(String),

    /// The object kind being serialized has no root element descriptor.
    #[error("object kind {0} declares no object type and cannot be a document root")]
    MissingObjectType(String),

    /// A qualified name uses a prefix that no namespace is registered for.
    #[error("unknown XML namespace prefix: {0}")]
    UnknownPrefix(String),

    /// A prefix was registered twice with different URIs.
    #[error("namespace prefix {prefix} is bound to {existing}, cannot rebind it to {requested}")]
    NamespaceConflict {
        /// The contested prefix.
        prefix: String,
        /// URI already registered for the prefix.
        existing: String,
        /// URI of the rejected registration.
        requested: String,
    },

    /// A nested instance of the wrong kind was handed to a binding.
    #[error("expected an instance of {expected}, got {found}")]
    KindMismatch {
        /// Kind declared by the binding.
        expected: &'static str,
        /// Kind actually supplied.
        found: &'static str,
    },
}
