//! Binding descriptors: how the fields of an object kind map to XML.
//!
//! Each bindable field of a kind is described by one [`BindingSpec`] plus a
//! typed accessor pair. Bindings are declared once per kind through
//! [`BindingsBuilder`] (usually via the [`xml_object!`](crate::xml_object)
//! macro). Every declaration receives the next ordinal and [`Bindings`] keeps
//! its entries sorted by that ordinal, so the sequence returned by
//! [`Bindings::specs`] is the declaration order. That order is the emission
//! order of child elements: reordering bindings changes the wire format.

use std::fmt;

use crate::container::{XmlContainer, append_node};
use crate::error::XmlError;
use crate::object::{Node, XmlObject, downcast};
use crate::scalar::XmlScalar;

/// The four ways a field can be bound to XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// An attribute of the element being written.
    Attribute,
    /// A child element holding only character data.
    TextNode,
    /// A single nested object written as a child element.
    Element,
    /// A homogeneous, ordered list of nested objects sharing one element name.
    ElementContainer,
}

/// Whether the items of a container sit inside a wrapper element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerStyle {
    /// `<wrapper><item/><item/></wrapper>`: the binding name names the wrapper.
    Wrapped,
    /// `<item/><item/>` directly under the owning element.
    Unwrapped,
}

/// Static description of one bound field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSpec {
    ordinal: usize,
    field: &'static str,
    name: &'static str,
    kind: BindingKind,
    item_name: Option<&'static str>,
    style: Option<ContainerStyle>,
}

impl BindingSpec {
    /// Declaration position within the owning kind.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Name of the Rust field holding the value.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Qualified XML name: the attribute, the child element, the wrapper of a
    /// wrapped container, or the repeated item of an unwrapped container.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Binding kind.
    #[must_use]
    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    /// Repeated element name of a container binding.
    #[must_use]
    pub fn item_name(&self) -> Option<&'static str> {
        self.item_name
    }

    /// Container style of a container binding.
    #[must_use]
    pub fn container_style(&self) -> Option<ContainerStyle> {
        self.style
    }

    /// Name of the child element that opens this binding inside its owner,
    /// or `None` for attributes.
    pub(crate) fn child_name(&self) -> Option<&'static str> {
        match (self.kind, self.style) {
            (BindingKind::Attribute, _) => None,
            (BindingKind::ElementContainer, Some(ContainerStyle::Unwrapped)) => self.item_name,
            _ => Some(self.name),
        }
    }
}

/// Accessors of a scalar (attribute or text node) binding.
pub(crate) trait ScalarSlot<T>: Send + Sync {
    fn read(&self, object: &T) -> Option<String>;
    fn write(&self, object: &mut T, text: &str) -> Result<(), XmlError>;
}

/// Accessors of a nested (element or container) binding.
pub(crate) trait NestedSlot<T>: Send + Sync {
    fn items<'a>(&self, object: &'a T) -> Vec<&'a dyn Node>;
    fn create(&self) -> Box<dyn Node>;
    fn commit(&self, object: &mut T, child: Box<dyn Node>) -> Result<(), XmlError>;
}

pub(crate) enum Slot<T> {
    Scalar(Box<dyn ScalarSlot<T>>),
    Nested(Box<dyn NestedSlot<T>>),
}

struct ScalarField<T, S> {
    get: fn(&T) -> &Option<S>,
    get_mut: fn(&mut T) -> &mut Option<S>,
}

impl<T, S: XmlScalar> ScalarSlot<T> for ScalarField<T, S> {
    fn read(&self, object: &T) -> Option<String> {
        (self.get)(object).as_ref().map(XmlScalar::to_xml_text)
    }

    fn write(&self, object: &mut T, text: &str) -> Result<(), XmlError> {
        *(self.get_mut)(object) = Some(S::from_xml_text(text)?);
        Ok(())
    }
}

struct ElementField<T, N> {
    get: fn(&T) -> &Option<N>,
    get_mut: fn(&mut T) -> &mut Option<N>,
    factory: fn() -> N,
}

impl<T, N: XmlObject> NestedSlot<T> for ElementField<T, N> {
    fn items<'a>(&self, object: &'a T) -> Vec<&'a dyn Node> {
        (self.get)(object)
            .iter()
            .map(|nested| nested as &dyn Node)
            .collect()
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new((self.factory)())
    }

    fn commit(&self, object: &mut T, child: Box<dyn Node>) -> Result<(), XmlError> {
        *(self.get_mut)(object) = Some(downcast::<N>(child)?);
        Ok(())
    }
}

struct ContainerField<T, C: XmlContainer> {
    get: fn(&T) -> &C,
    get_mut: fn(&mut T) -> &mut C,
    factory: fn() -> C::Item,
}

impl<T, C: XmlContainer> NestedSlot<T> for ContainerField<T, C> {
    fn items<'a>(&self, object: &'a T) -> Vec<&'a dyn Node> {
        (self.get)(object)
            .items()
            .iter()
            .map(|item| item as &dyn Node)
            .collect()
    }

    fn create(&self) -> Box<dyn Node> {
        Box::new((self.factory)())
    }

    fn commit(&self, object: &mut T, child: Box<dyn Node>) -> Result<(), XmlError> {
        append_node((self.get_mut)(object), child)
    }
}

/// The ordered binding table of one object kind.
pub struct Bindings<T: 'static> {
    specs: Vec<BindingSpec>,
    slots: Vec<Slot<T>>,
}

impl<T: 'static> Bindings<T> {
    /// Start declaring bindings.
    #[must_use]
    pub fn builder() -> BindingsBuilder<T> {
        BindingsBuilder {
            entries: Vec::new(),
        }
    }

    /// All bindings, in declaration order.
    #[must_use]
    pub fn specs(&self) -> &[BindingSpec] {
        &self.specs
    }

    /// Look up the binding of a Rust field.
    #[must_use]
    pub fn find(&self, field: &str) -> Option<&BindingSpec> {
        self.specs.iter().find(|spec| spec.field == field)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the kind binds no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&Slot<T>> {
        self.slots.get(index)
    }
}

impl<T: 'static> fmt::Debug for Bindings<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("kind", &std::any::type_name::<T>())
            .field("specs", &self.specs)
            .finish()
    }
}

/// Declares the bindings of one object kind, in order.
///
/// Every method takes the XML name, the Rust field name, and a getter pair
/// for the field.
pub struct BindingsBuilder<T: 'static> {
    entries: Vec<(BindingSpec, Slot<T>)>,
}

impl<T: 'static> BindingsBuilder<T> {
    fn push(
        mut self,
        name: &'static str,
        field: &'static str,
        kind: BindingKind,
        container: Option<(&'static str, ContainerStyle)>,
        slot: Slot<T>,
    ) -> Self {
        let spec = BindingSpec {
            ordinal: self.entries.len(),
            field,
            name,
            kind,
            item_name: container.map(|(item, _)| item),
            style: container.map(|(_, style)| style),
        };
        self.entries.push((spec, slot));
        self
    }

    /// Bind an optional scalar field to an attribute.
    #[must_use]
    pub fn attribute<S: XmlScalar>(
        self,
        name: &'static str,
        field: &'static str,
        get: fn(&T) -> &Option<S>,
        get_mut: fn(&mut T) -> &mut Option<S>,
    ) -> Self {
        let slot = Slot::Scalar(Box::new(ScalarField { get, get_mut }));
        self.push(name, field, BindingKind::Attribute, None, slot)
    }

    /// Bind an optional scalar field to a text-only child element.
    #[must_use]
    pub fn text<S: XmlScalar>(
        self,
        name: &'static str,
        field: &'static str,
        get: fn(&T) -> &Option<S>,
        get_mut: fn(&mut T) -> &mut Option<S>,
    ) -> Self {
        let slot = Slot::Scalar(Box::new(ScalarField { get, get_mut }));
        self.push(name, field, BindingKind::TextNode, None, slot)
    }

    /// Bind an optional nested object to a child element.
    ///
    /// Parsed instances are created with `N::default`.
    #[must_use]
    pub fn element<N: XmlObject + Default>(
        self,
        name: &'static str,
        field: &'static str,
        get: fn(&T) -> &Option<N>,
        get_mut: fn(&mut T) -> &mut Option<N>,
    ) -> Self {
        let slot = Slot::Nested(Box::new(ElementField {
            get,
            get_mut,
            factory: N::default,
        }));
        self.push(name, field, BindingKind::Element, None, slot)
    }

    /// Bind a container whose items sit inside the `name` wrapper element.
    #[must_use]
    pub fn wrapped_container<C: XmlContainer>(
        self,
        name: &'static str,
        field: &'static str,
        get: fn(&T) -> &C,
        get_mut: fn(&mut T) -> &mut C,
    ) -> Self {
        let slot = Slot::Nested(Box::new(ContainerField {
            get,
            get_mut,
            factory: C::Item::default,
        }));
        self.push(
            name,
            field,
            BindingKind::ElementContainer,
            Some((C::ELEMENT, ContainerStyle::Wrapped)),
            slot,
        )
    }

    /// Bind a container whose items are direct children of the owner.
    #[must_use]
    pub fn container<C: XmlContainer>(
        self,
        field: &'static str,
        get: fn(&T) -> &C,
        get_mut: fn(&mut T) -> &mut C,
    ) -> Self {
        let slot = Slot::Nested(Box::new(ContainerField {
            get,
            get_mut,
            factory: C::Item::default,
        }));
        self.push(
            C::ELEMENT,
            field,
            BindingKind::ElementContainer,
            Some((C::ELEMENT, ContainerStyle::Unwrapped)),
            slot,
        )
    }

    /// Finish the declaration.
    #[must_use]
    pub fn build(self) -> Bindings<T> {
        let mut entries = self.entries;
        entries.sort_by_key(|(spec, _)| spec.ordinal);
        let (specs, slots) = entries.into_iter().unzip();
        Bindings { specs, slots }
    }
}

impl<T: 'static> fmt::Debug for BindingsBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingsBuilder")
            .field("declared", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{define_container, xml_object};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Item {
        value: Option<String>,
    }

    xml_object! {
        Item {
            attribute value => "t:value",
        }
    }

    define_container! {
        Items => "t:item", Item
    }

    #[derive(Debug, Default)]
    struct Owner {
        label: Option<String>,
        wrapped: Items,
        loose: Items,
        count: Option<u32>,
    }

    xml_object! {
        Owner {
            attribute label => "t:label",
            wrapped_container wrapped => "t:items",
            container loose,
            text count => "t:count",
        }
    }

    #[test]
    fn test_should_number_bindings_in_declaration_order() {
        let bindings = Owner::bindings();
        let ordinals: Vec<_> = bindings.specs().iter().map(BindingSpec::ordinal).collect();

        assert_eq!(ordinals, [0, 1, 2, 3]);
        assert_eq!(bindings.len(), 4);
    }

    #[test]
    fn test_should_describe_container_styles() {
        let bindings = Owner::bindings();

        let wrapped = bindings.find("wrapped").expect("wrapped binding");
        assert_eq!(wrapped.kind(), BindingKind::ElementContainer);
        assert_eq!(wrapped.name(), "t:items");
        assert_eq!(wrapped.item_name(), Some("t:item"));
        assert_eq!(wrapped.container_style(), Some(ContainerStyle::Wrapped));
        assert_eq!(wrapped.child_name(), Some("t:items"));

        let loose = bindings.find("loose").expect("loose binding");
        assert_eq!(loose.container_style(), Some(ContainerStyle::Unwrapped));
        assert_eq!(loose.child_name(), Some("t:item"));

        let label = bindings.find("label").expect("label binding");
        assert_eq!(label.child_name(), None);
        assert_eq!(label.container_style(), None);
    }
}
