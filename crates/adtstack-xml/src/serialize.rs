//! Object to XML: walks the ordered bindings of an instance and emits elements.
//!
//! Attribute bindings become attributes of the element being written; all
//! other bindings become child elements in declaration order. Namespace
//! prefixes are declared on the outermost element that uses them.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::binding::{BindingKind, BindingSpec, ContainerStyle};
use crate::error::XmlError;
use crate::namespace::{NamespaceRegistry, split_qname};
use crate::object::Node;

/// Serialize `node` as a complete document rooted at its object type.
pub(crate) fn write_document(
    registry: &NamespaceRegistry,
    node: &dyn Node,
) -> Result<String, XmlError> {
    let object_type = node
        .node_type()
        .ok_or_else(|| XmlError::MissingObjectType(node.kind_name().to_owned()))?;

    let mut buf = Vec::with_capacity(512);
    let mut emitter = Emitter {
        writer: Writer::new(&mut buf),
        registry: registry.clone(),
        in_scope: Vec::new(),
    };

    emitter
        .writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emitter.write_object(&object_type.qualified_name(), node)?;

    String::from_utf8(buf).map_err(|e| XmlError::ParseError(e.to_string()))
}

struct Emitter<W: Write> {
    writer: Writer<W>,
    registry: NamespaceRegistry,
    in_scope: Vec<String>,
}

impl<W: Write> Emitter<W> {
    /// Write `node` as element `name`, including its attributes and children.
    fn write_object(&mut self, name: &str, node: &dyn Node) -> Result<(), XmlError> {
        let specs = node.binding_specs();

        let mut prefixes = Vec::new();
        if let Some(object_type) = node.node_type() {
            self.registry.register(object_type.namespace())?;
            prefixes.push(object_type.namespace().prefix());
        }

        let mut attributes = Vec::new();
        for (index, spec) in specs.iter().enumerate() {
            if spec.kind() != BindingKind::Attribute {
                continue;
            }
            if let Some(value) = node.read_scalar(index) {
                attributes.push((spec.name(), value));
            }
        }

        let has_children = specs.iter().enumerate().any(|(index, spec)| {
            match (spec.kind(), spec.container_style()) {
                (BindingKind::Attribute, _) => false,
                (BindingKind::TextNode, _) => node.read_scalar(index).is_some(),
                (BindingKind::ElementContainer, Some(ContainerStyle::Wrapped)) => true,
                _ => !node.nested(index).is_empty(),
            }
        });

        let (start, declared) = self.start_tag(name, &prefixes, &attributes)?;

        if has_children {
            self.writer.write_event(Event::Start(start))?;
            for (index, spec) in specs.iter().enumerate() {
                self.write_binding(node, index, spec)?;
            }
            self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        } else {
            self.writer.write_event(Event::Empty(start))?;
        }

        self.leave_scope(declared);
        Ok(())
    }

    fn write_binding(
        &mut self,
        node: &dyn Node,
        index: usize,
        spec: &BindingSpec,
    ) -> Result<(), XmlError> {
        match spec.kind() {
            BindingKind::Attribute => {}
            BindingKind::TextNode => {
                if let Some(text) = node.read_scalar(index) {
                    self.write_text_element(spec.name(), &text)?;
                }
            }
            BindingKind::Element => {
                for nested in node.nested(index) {
                    self.write_object(spec.name(), nested)?;
                }
            }
            BindingKind::ElementContainer => {
                let item_name = spec.item_name().unwrap_or(spec.name());
                let items = node.nested(index);
                match spec.container_style() {
                    Some(ContainerStyle::Wrapped) => {
                        self.write_wrapper(spec.name(), item_name, &items)?;
                    }
                    _ => {
                        for item in items {
                            self.write_object(item_name, item)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn write_wrapper(
        &mut self,
        name: &str,
        item_name: &str,
        items: &[&dyn Node],
    ) -> Result<(), XmlError> {
        let (start, declared) = self.start_tag(name, &[], &[])?;
        if items.is_empty() {
            self.writer.write_event(Event::Empty(start))?;
        } else {
            self.writer.write_event(Event::Start(start))?;
            for item in items {
                self.write_object(item_name, *item)?;
            }
            self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        self.leave_scope(declared);
        Ok(())
    }

    /// Write a simple `<tag>text</tag>` element.
    fn write_text_element(&mut self, name: &str, text: &str) -> Result<(), XmlError> {
        let (start, declared) = self.start_tag(name, &[], &[])?;
        self.writer.write_event(Event::Start(start))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        self.leave_scope(declared);
        Ok(())
    }

    /// Build a start tag, declaring every prefix it needs that is not yet in
    /// scope. Returns the tag and the number of prefixes it declared.
    fn start_tag(
        &mut self,
        name: &str,
        extra_prefixes: &[&str],
        attributes: &[(&str, String)],
    ) -> Result<(BytesStart<'static>, usize), XmlError> {
        let mut start = BytesStart::new(name.to_owned());

        let mut needed: Vec<&str> = extra_prefixes.to_vec();
        needed.extend(split_qname(name).0);
        needed.extend(
            attributes
                .iter()
                .filter_map(|(attribute, _)| split_qname(attribute).0),
        );

        let mut declared = 0;
        for prefix in needed {
            if self.in_scope.iter().any(|p| p == prefix) {
                continue;
            }
            let uri = self
                .registry
                .uri(prefix)
                .ok_or_else(|| XmlError::UnknownPrefix(prefix.to_owned()))?;
            start.push_attribute((format!("xmlns:{prefix}").as_str(), uri));
            self.in_scope.push(prefix.to_owned());
            declared += 1;
        }

        for (attribute, value) in attributes {
            start.push_attribute((*attribute, value.as_str()));
        }

        Ok((start, declared))
    }

    fn leave_scope(&mut self, declared: usize) {
        let keep = self.in_scope.len() - declared;
        self.in_scope.truncate(keep);
    }
}
