//! Homogeneous containers of repeated elements.
//!
//! [`define_container!`](crate::define_container) builds a container type
//! for one repeated element name and one item kind. Containers are ordered
//! and append-only while a document is being parsed; iteration order is
//! document order.

use crate::error::XmlError;
use crate::object::{Node, XmlObject, downcast};

/// An ordered collection of one item kind bound to one repeated element name.
pub trait XmlContainer: Default + 'static {
    /// Kind of every item.
    type Item: XmlObject + Default;

    /// Qualified name of the repeated element.
    const ELEMENT: &'static str;

    /// Items in document order.
    fn items(&self) -> &[Self::Item];

    /// Append an item.
    fn push(&mut self, item: Self::Item);
}

/// Append an erased instance, checking that it is of the container's item kind.
pub(crate) fn append_node<C: XmlContainer>(
    container: &mut C,
    node: Box<dyn Node>,
) -> Result<(), XmlError> {
    container.push(downcast::<C::Item>(node)?);
    Ok(())
}

/// Define a container type for repeated `element` children of kind `item`.
///
/// ```
/// use adtstack_xml::{XmlContainer, define_container, xml_object};
///
/// #[derive(Debug, Clone, Default, PartialEq)]
/// pub struct ObjectSet {
///     name: Option<String>,
/// }
///
/// xml_object! {
///     ObjectSet {
///         attribute name => "atcworklist:name",
///     }
/// }
///
/// define_container! {
///     /// Object sets of a work list.
///     pub ObjectSetList => "atcworklist:objectSet", ObjectSet
/// }
///
/// let mut sets = ObjectSetList::new();
/// sets.push(ObjectSet { name: Some("LAST_RUN".into()) });
/// assert_eq!(sets.len(), 1);
/// assert_eq!(ObjectSetList::ELEMENT, "atcworklist:objectSet");
/// ```
#[macro_export]
macro_rules! define_container {
    ($(#[$meta:meta])* $vis:vis $name:ident => $element:expr, $item:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name(::std::vec::Vec<$item>);

        impl $crate::XmlContainer for $name {
            type Item = $item;

            const ELEMENT: &'static str = $element;

            fn items(&self) -> &[$item] {
                &self.0
            }

            fn push(&mut self, item: $item) {
                self.0.push(item);
            }
        }

        impl $name {
            /// Create an empty container.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Iterate over the items in document order.
            pub fn iter(&self) -> ::std::slice::Iter<'_, $item> {
                self.0.iter()
            }

            /// Number of items.
            #[must_use]
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Whether the container holds no item.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = [$item];

            fn deref(&self) -> &[$item] {
                &self.0
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut [$item] {
                &mut self.0
            }
        }

        impl<'a> ::std::iter::IntoIterator for &'a $name {
            type Item = &'a $item;
            type IntoIter = ::std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl ::std::iter::FromIterator<$item> for $name {
            fn from_iter<I: ::std::iter::IntoIterator<Item = $item>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl ::std::iter::Extend<$item> for $name {
            fn extend<I: ::std::iter::IntoIterator<Item = $item>>(&mut self, iter: I) {
                self.0.extend(iter);
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml_object;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Check {
        id: Option<String>,
    }

    xml_object! {
        Check {
            attribute id => "chk:id",
        }
    }

    #[derive(Debug, Default)]
    struct Other {
        id: Option<String>,
    }

    xml_object! {
        Other {
            attribute id => "chk:id",
        }
    }

    define_container! {
        CheckList => "chk:check", Check
    }

    #[test]
    fn test_should_append_items_of_declared_kind() {
        let mut checks = CheckList::new();
        let item = Check {
            id: Some("A".to_owned()),
        };

        append_node(&mut checks, Box::new(item.clone())).expect("same kind");

        assert_eq!(checks.items(), [item]);
    }

    #[test]
    fn test_should_reject_items_of_other_kind() {
        let mut checks = CheckList::new();

        let err = append_node(&mut checks, Box::new(Other::default())).expect_err("wrong kind");

        assert!(matches!(
            err,
            XmlError::KindMismatch { expected, found }
                if expected.ends_with("Check") && found.ends_with("Other")
        ));
        assert!(checks.is_empty());
    }

    #[test]
    fn test_should_iterate_in_insertion_order() {
        let checks: CheckList = ["1", "2", "3"]
            .into_iter()
            .map(|id| Check {
                id: Some(id.to_owned()),
            })
            .collect();

        let ids: Vec<_> = checks.iter().filter_map(|check| check.id.as_deref()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(checks.len(), 3);
    }
}
