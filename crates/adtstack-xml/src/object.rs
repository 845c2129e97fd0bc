//! Bound object kinds and their type-erased view.
//!
//! A kind implements [`XmlObject`] by pointing at its static [`Bindings`]
//! table and, if it can be a document root, at its [`ObjectType`]. The
//! marshaller walks instances through the crate-internal `Node` trait, which
//! erases the concrete kind so nested objects of any kind can share one
//! explicit frame stack.

use std::any::{Any, type_name};

use crate::binding::{BindingSpec, Bindings, Slot};
use crate::error::XmlError;
use crate::object_type::ObjectType;

/// An object kind whose fields are declared as mapping to XML constructs.
///
/// Implement it with [`xml_object!`](crate::xml_object) rather than by hand.
pub trait XmlObject: Sized + 'static {
    /// Root descriptor of the kind, `None` for kinds that only appear nested.
    fn object_type() -> Option<&'static ObjectType> {
        None
    }

    /// The ordered binding table of the kind.
    fn bindings() -> &'static Bindings<Self>;
}

/// The bindings of `T`, in declaration order.
///
/// ```
/// use adtstack_xml::{ordered_bindings, xml_object};
///
/// #[derive(Debug, Default)]
/// struct Finding {
///     priority: Option<u32>,
///     check_id: Option<String>,
/// }
///
/// xml_object! {
///     Finding {
///         attribute priority => "atcfinding:priority",
///         attribute check_id => "atcfinding:checkId",
///     }
/// }
///
/// let fields: Vec<_> = ordered_bindings::<Finding>().iter().map(|b| b.field()).collect();
/// assert_eq!(fields, ["priority", "check_id"]);
/// ```
#[must_use]
pub fn ordered_bindings<T: XmlObject>() -> &'static [BindingSpec] {
    T::bindings().specs()
}

/// Type-erased access to a bound object, addressed by binding index.
pub(crate) trait Node: Any {
    fn kind_name(&self) -> &'static str;
    fn node_type(&self) -> Option<&'static ObjectType>;
    fn binding_specs(&self) -> &'static [BindingSpec];
    fn read_scalar(&self, index: usize) -> Option<String>;
    fn write_scalar(&mut self, index: usize, text: &str) -> Result<(), XmlError>;
    fn nested(&self, index: usize) -> Vec<&dyn Node>;
    fn create_nested(&self, index: usize) -> Option<Box<dyn Node>>;
    fn commit_nested(&mut self, index: usize, child: Box<dyn Node>) -> Result<(), XmlError>;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: XmlObject> Node for T {
    fn kind_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn node_type(&self) -> Option<&'static ObjectType> {
        <T as XmlObject>::object_type()
    }

    fn binding_specs(&self) -> &'static [BindingSpec] {
        <T as XmlObject>::bindings().specs()
    }

    fn read_scalar(&self, index: usize) -> Option<String> {
        match <T as XmlObject>::bindings().slot(index) {
            Some(Slot::Scalar(slot)) => slot.read(self),
            _ => None,
        }
    }

    fn write_scalar(&mut self, index: usize, text: &str) -> Result<(), XmlError> {
        match <T as XmlObject>::bindings().slot(index) {
            Some(Slot::Scalar(slot)) => slot.write(self, text),
            _ => Ok(()),
        }
    }

    fn nested(&self, index: usize) -> Vec<&dyn Node> {
        match <T as XmlObject>::bindings().slot(index) {
            Some(Slot::Nested(slot)) => slot.items(self),
            _ => Vec::new(),
        }
    }

    fn create_nested(&self, index: usize) -> Option<Box<dyn Node>> {
        match <T as XmlObject>::bindings().slot(index) {
            Some(Slot::Nested(slot)) => Some(slot.create()),
            _ => None,
        }
    }

    fn commit_nested(&mut self, index: usize, child: Box<dyn Node>) -> Result<(), XmlError> {
        match <T as XmlObject>::bindings().slot(index) {
            Some(Slot::Nested(slot)) => slot.commit(self, child),
            _ => Ok(()),
        }
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Recover a concrete kind from an erased instance.
pub(crate) fn downcast<N: XmlObject>(node: Box<dyn Node>) -> Result<N, XmlError> {
    let found = node.kind_name();
    node.into_any()
        .downcast::<N>()
        .map(|boxed| *boxed)
        .map_err(|_| XmlError::KindMismatch {
            expected: type_name::<N>(),
            found,
        })
}

/// Declare the XML bindings of a struct.
///
/// Each line binds one field; the declaration order is the XML order.
///
/// | Line | Field type | XML |
/// |------|------------|-----|
/// | `attribute f => "p:name"` | `Option<S: XmlScalar>` | attribute |
/// | `text f => "p:name"` | `Option<S: XmlScalar>` | text-only child element |
/// | `element f => "p:name"` | `Option<N: XmlObject + Default>` | nested child element |
/// | `wrapped_container f => "p:name"` | `C: XmlContainer` | wrapper element holding the items |
/// | `container f` | `C: XmlContainer` | items directly under the owner |
///
/// An optional `as PATH` names the kind's root [`ObjectType`] static.
///
/// ```
/// use adtstack_xml::{Marshal, ObjectType, XmlNamespace, xml_object};
///
/// static INFO: ObjectType = ObjectType::new(
///     XmlNamespace::new("atcinfo", "http://www.sap.com/adt/atc/info"),
///     "application/xml",
///     "info",
/// );
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Info {
///     typ: Option<String>,
///     description: Option<String>,
/// }
///
/// xml_object! {
///     Info as INFO {
///         text typ => "atcinfo:type",
///         text description => "atcinfo:description",
///     }
/// }
///
/// let info = Info { typ: Some("FINDING".into()), description: Some("done".into()) };
/// let xml = Marshal::default().serialize(&info).unwrap();
/// assert!(xml.contains("<atcinfo:type>FINDING</atcinfo:type>"));
/// ```
#[macro_export]
macro_rules! xml_object {
    (
        $ty:ty $(as $kind:path)? {
            $($binding:ident $field:ident $(=> $name:literal)?),* $(,)?
        }
    ) => {
        impl $crate::XmlObject for $ty {
            $(
                fn object_type() -> ::std::option::Option<&'static $crate::ObjectType> {
                    ::std::option::Option::Some(&$kind)
                }
            )?

            fn bindings() -> &'static $crate::Bindings<Self> {
                static BINDINGS: ::std::sync::OnceLock<$crate::Bindings<$ty>> =
                    ::std::sync::OnceLock::new();
                BINDINGS.get_or_init(|| {
                    $crate::Bindings::builder()
                        $(
                            .$binding(
                                $($name,)?
                                stringify!($field),
                                |object: &$ty| &object.$field,
                                |object: &mut $ty| &mut object.$field,
                            )
                        )*
                        .build()
                })
            }
        }
    };
}
