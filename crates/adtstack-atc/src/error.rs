//! ATC workflow error type.

use adtstack_core::TransportError;
use adtstack_xml::XmlError;

/// Errors surfaced by ATC operations.
///
/// Both variants are transparent: callers see the transport or XML error
/// exactly as the lower layer raised it.
#[derive(Debug, thiserror::Error)]
pub enum AtcError {
    /// The request could not be sent or the server rejected it.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A request could not be serialized or a response could not be parsed.
    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// Convenience result alias for ATC operations.
pub type AtcResult<T> = Result<T, AtcError>;
