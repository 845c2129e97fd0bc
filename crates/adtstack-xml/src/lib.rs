//! Declarative XML object binding and marshalling for adtstack.
//!
//! ADT endpoints speak namespace-qualified XML only. Instead of hand-written
//! readers and writers per document, every object kind declares once how its
//! fields map to XML, and [`Marshal`] converts in both directions.
//!
//! # Key components
//!
//! - [`NamespaceRegistry`] maps prefixes to namespace URIs
//! - [`xml_object!`] declares the ordered bindings of a struct
//! - [`define_container!`] declares a container of repeated elements
//! - [`ObjectType`] names the document root of a kind
//! - [`Marshal`] serializes and deserializes bound objects
//!
//! # Conventions
//!
//! - Binding declaration order is the child element order on the wire
//! - Absent optional values are omitted; absent XML leaves fields untouched
//! - Unbound elements and attributes are skipped on input
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`

mod binding;
mod container;
mod deserialize;
mod error;
mod marshal;
mod namespace;
mod object;
mod object_type;
mod scalar;
mod serialize;

pub use binding::{BindingKind, BindingSpec, Bindings, BindingsBuilder, ContainerStyle};
pub use container::XmlContainer;
pub use error::XmlError;
pub use marshal::Marshal;
pub use namespace::{NamespaceRegistry, XmlNamespace, split_qname};
pub use object::{XmlObject, ordered_bindings};
pub use object_type::ObjectType;
pub use scalar::XmlScalar;
