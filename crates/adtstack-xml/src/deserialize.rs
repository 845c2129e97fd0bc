//! XML to object: an explicit frame-stack interpreter over parser events.
//!
//! Every open element owns one [`Frame`]. A start tag is matched against the
//! bindings of the nearest object frame; elements without a binding open a
//! skip frame, so unknown structure is ignored together with its subtree.
//! Closing a frame commits its result (text, nested object, container item)
//! into the object that owns it.

use std::borrow::Cow;

use quick_xml::NsReader;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::name::{LocalName, QName, ResolveResult};
use tracing::debug;

use crate::binding::{BindingKind, ContainerStyle};
use crate::error::XmlError;
use crate::namespace::{NamespaceRegistry, split_qname};
use crate::object::Node;

/// Populate `target` from `xml`.
pub(crate) fn read_document(
    registry: &NamespaceRegistry,
    xml: &str,
    target: &mut dyn Node,
) -> Result<(), XmlError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().expand_empty_elements = true;

    let mut interpreter = Interpreter {
        registry,
        root: Some(target),
        stack: Vec::new(),
    };

    loop {
        match reader.read_event()? {
            Event::Start(element) => interpreter.start(&reader, &element)?,
            Event::End(_) => {
                if interpreter.end()? {
                    return read_epilogue(&mut reader);
                }
            }
            Event::Text(text) => {
                let decoded = text
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                let unescaped = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                interpreter.characters(&unescaped);
            }
            Event::CData(data) => {
                let text =
                    std::str::from_utf8(&data).map_err(|err| XmlError::ParseError(err.to_string()))?;
                interpreter.characters(text);
            }
            Event::GeneralRef(reference) => {
                interpreter.characters(&resolve_reference(&reference)?);
            }
            Event::Eof => {
                return Err(if interpreter.root.is_some() {
                    XmlError::MissingElement("root element".to_owned())
                } else {
                    XmlError::ParseError("unexpected end of document".to_owned())
                });
            }
            // Declaration, comments, processing instructions, doctype.
            _ => {}
        }
    }
}

/// Consume what follows the root element. Only whitespace, comments and
/// processing instructions may appear there.
fn read_epilogue(reader: &mut NsReader<&[u8]>) -> Result<(), XmlError> {
    loop {
        match reader.read_event()? {
            Event::Eof => return Ok(()),
            Event::Text(text) if text.iter().all(u8::is_ascii_whitespace) => {}
            Event::Comment(_) | Event::PI(_) => {}
            event => {
                return Err(XmlError::ParseError(format!(
                    "unexpected content after the root element: {event:?}"
                )));
            }
        }
    }
}

/// Resolve `&name;` and `&#NN;` references split out of text runs.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<Cow<'static, str>, XmlError> {
    let parse_error = |err: &dyn std::fmt::Display| XmlError::ParseError(err.to_string());
    if let Some(ch) = reference.resolve_char_ref().map_err(|err| parse_error(&err))? {
        return Ok(Cow::Owned(ch.to_string()));
    }
    let name = reference.decode().map_err(|err| parse_error(&err))?;
    quick_xml::escape::resolve_predefined_entity(&name)
        .map(Cow::Borrowed)
        .ok_or_else(|| XmlError::ParseError(format!("unknown entity reference: &{name};")))
}

fn utf8(bytes: &[u8]) -> Result<&str, XmlError> {
    std::str::from_utf8(bytes).map_err(|err| XmlError::ParseError(err.to_string()))
}

/// An element or attribute name as found in the document.
#[derive(Debug)]
struct ResolvedName {
    prefix: Option<String>,
    local: String,
    uri: Option<String>,
}

impl ResolvedName {
    fn new(
        result: ResolveResult<'_>,
        qname: QName<'_>,
        local: LocalName<'_>,
    ) -> Result<Self, XmlError> {
        let uri = match result {
            ResolveResult::Bound(namespace) => Some(utf8(namespace.as_ref())?.to_owned()),
            ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
        };
        let prefix = match qname.prefix() {
            Some(prefix) => Some(utf8(prefix.as_ref())?.to_owned()),
            None => None,
        };
        Ok(Self {
            prefix,
            local: utf8(local.as_ref())?.to_owned(),
            uri,
        })
    }
}

enum Target<'t> {
    Root(&'t mut dyn Node),
    Nested { index: usize, node: Box<dyn Node> },
}

impl Target<'_> {
    fn node(&self) -> &dyn Node {
        match self {
            Target::Root(node) => &**node,
            Target::Nested { node, .. } => node.as_ref(),
        }
    }

    fn node_mut(&mut self) -> &mut dyn Node {
        match self {
            Target::Root(node) => &mut **node,
            Target::Nested { node, .. } => node.as_mut(),
        }
    }
}

enum Frame<'t> {
    /// An element bound to an object instance, with the text bindings
    /// already captured for it.
    Object { target: Target<'t>, captured: Vec<usize> },
    /// The wrapper element of a wrapped container binding.
    Wrapper {
        index: usize,
        item_name: &'static str,
    },
    /// A text-node binding collecting character data.
    Text { index: usize, buffer: String },
    /// An element without a binding, ignored with all its content.
    Skip,
}

struct Interpreter<'r, 't> {
    registry: &'r NamespaceRegistry,
    root: Option<&'t mut dyn Node>,
    stack: Vec<Frame<'t>>,
}

impl<'t> Frame<'t> {
    fn object(target: Target<'t>) -> Self {
        Frame::Object {
            target,
            captured: Vec::new(),
        }
    }
}

impl<'t> Interpreter<'_, 't> {
    fn start(
        &mut self,
        reader: &NsReader<&[u8]>,
        element: &BytesStart<'_>,
    ) -> Result<(), XmlError> {
        let (result, local) = reader.resolve_element(element.name());
        let name = ResolvedName::new(result, element.name(), local)?;

        if let Some(root) = self.root.take() {
            if let Some(object_type) = root.node_type() {
                if object_type.element() != name.local {
                    debug!(
                        expected = object_type.element(),
                        found = %name.local,
                        "document root does not match the target kind"
                    );
                }
            }
            self.apply_attributes(reader, element, root)?;
            self.stack.push(Frame::object(Target::Root(root)));
            return Ok(());
        }

        let mut next = match self.stack.last() {
            Some(Frame::Object { target, captured }) => {
                self.open_child(target.node(), captured, &name)
            }
            Some(Frame::Wrapper { index, item_name }) => {
                match self.owner_below_top() {
                    Some(owner) if self.matches(item_name, &name) => owner
                        .create_nested(*index)
                        .map_or(Frame::Skip, |node| {
                            Frame::object(Target::Nested {
                                index: *index,
                                node,
                            })
                        }),
                    _ => Frame::Skip,
                }
            }
            Some(Frame::Text { .. } | Frame::Skip) | None => Frame::Skip,
        };

        if let Frame::Object {
            target: Target::Nested { node, .. },
            ..
        } = &mut next
        {
            self.apply_attributes(reader, element, node.as_mut())?;
        }
        self.stack.push(next);
        Ok(())
    }

    /// Close the innermost frame. Returns `true` once the root element closed.
    fn end(&mut self) -> Result<bool, XmlError> {
        let Some(frame) = self.stack.pop() else {
            return Ok(true);
        };

        match frame {
            Frame::Object {
                target: Target::Root(_),
                ..
            } => return Ok(true),
            Frame::Object {
                target: Target::Nested { index, node },
                ..
            } => {
                if let Some((owner, _)) = self.nearest_object_mut() {
                    owner.commit_nested(index, node)?;
                }
            }
            Frame::Text { index, buffer } => {
                if let Some((owner, captured)) = self.nearest_object_mut() {
                    owner.write_scalar(index, &buffer)?;
                    captured.push(index);
                }
            }
            Frame::Wrapper { .. } | Frame::Skip => {}
        }

        Ok(false)
    }

    fn characters(&mut self, text: &str) {
        if let Some(Frame::Text { buffer, .. }) = self.stack.last_mut() {
            buffer.push_str(text);
        }
    }

    /// Pick the frame for a child element of `owner`. Only the first element
    /// matching a text binding is captured.
    fn open_child(&self, owner: &dyn Node, captured: &[usize], name: &ResolvedName) -> Frame<'t> {
        for (index, spec) in owner.binding_specs().iter().enumerate() {
            let Some(child_name) = spec.child_name() else {
                continue;
            };
            if !self.matches(child_name, name) {
                continue;
            }
            return match (spec.kind(), spec.container_style()) {
                (BindingKind::TextNode, _) if captured.contains(&index) => Frame::Skip,
                (BindingKind::TextNode, _) => Frame::Text {
                    index,
                    buffer: String::new(),
                },
                (BindingKind::ElementContainer, Some(ContainerStyle::Wrapped)) => Frame::Wrapper {
                    index,
                    item_name: spec.item_name().unwrap_or(spec.name()),
                },
                _ => owner
                    .create_nested(index)
                    .map_or(Frame::Skip, |node| Frame::object(Target::Nested { index, node })),
            };
        }
        Frame::Skip
    }

    fn apply_attributes(
        &self,
        reader: &NsReader<&[u8]>,
        element: &BytesStart<'_>,
        node: &mut dyn Node,
    ) -> Result<(), XmlError> {
        let specs = node.binding_specs();
        for attribute in element.attributes() {
            let attribute = attribute?;
            if attribute.key.as_namespace_binding().is_some() {
                continue;
            }

            let (result, local) = reader.resolve_attribute(attribute.key);
            let name = ResolvedName::new(result, attribute.key, local)?;
            let Some(index) = specs.iter().position(|spec| {
                spec.kind() == BindingKind::Attribute && self.matches(spec.name(), &name)
            }) else {
                continue;
            };

            let value = attribute
                .unescape_value()
                .map_err(|err| XmlError::ParseError(err.to_string()))?;
            node.write_scalar(index, &value)?;
        }
        Ok(())
    }

    /// Whether a bound qualified name denotes the element or attribute found.
    ///
    /// Prefixed names compare by namespace URI when the prefix is registered
    /// and the document binds one, by literal prefix otherwise.
    fn matches(&self, qname: &str, actual: &ResolvedName) -> bool {
        let (prefix, local) = split_qname(qname);
        if local != actual.local {
            return false;
        }
        match (prefix, actual.uri.as_deref()) {
            (None, _) => actual.prefix.is_none(),
            (Some(prefix), Some(uri)) => match self.registry.uri(prefix) {
                Some(expected) => expected == uri,
                None => actual.prefix.as_deref() == Some(prefix),
            },
            (Some(prefix), None) => actual.prefix.as_deref() == Some(prefix),
        }
    }

    fn owner_below_top(&self) -> Option<&dyn Node> {
        self.stack.iter().rev().skip(1).find_map(|frame| match frame {
            Frame::Object { target, .. } => Some(target.node()),
            _ => None,
        })
    }

    fn nearest_object_mut(&mut self) -> Option<(&mut dyn Node, &mut Vec<usize>)> {
        self.stack.iter_mut().rev().find_map(|frame| match frame {
            Frame::Object { target, captured } => Some((target.node_mut(), captured)),
            _ => None,
        })
    }
}
