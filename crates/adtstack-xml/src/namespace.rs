//! XML namespaces and the prefix registry.
//!
//! Every bound name in this crate is written as `prefix:local` (or just
//! `local` for unqualified names). The [`NamespaceRegistry`] maps prefixes to
//! URIs so that the marshaller can declare them in serialized documents and
//! compare them against the namespaces found in parsed documents.

use std::collections::BTreeMap;

use crate::error::XmlError;

/// A namespace prefix bound to its URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XmlNamespace {
    prefix: &'static str,
    uri: &'static str,
}

impl XmlNamespace {
    /// Bind `prefix` to `uri`.
    #[must_use]
    pub const fn new(prefix: &'static str, uri: &'static str) -> Self {
        Self { prefix, uri }
    }

    /// The short prefix, e.g. `atc`.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// The namespace URI.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        self.uri
    }
}

/// Split a qualified name into its optional prefix and its local part.
///
/// ```
/// use adtstack_xml::split_qname;
///
/// assert_eq!(split_qname("atcworklist:worklistId"), (Some("atcworklist"), "worklistId"));
/// assert_eq!(split_qname("maximumVerdicts"), (None, "maximumVerdicts"));
/// ```
#[must_use]
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Maps namespace prefixes to URIs.
///
/// Registration is add-only. Registering the same binding twice is a no-op,
/// registering a known prefix with a different URI fails.
///
/// # Examples
///
/// ```
/// use adtstack_xml::{NamespaceRegistry, XmlNamespace};
///
/// const ATC: XmlNamespace = XmlNamespace::new("atc", "http://www.sap.com/adt/atc");
///
/// let registry = NamespaceRegistry::with_namespaces([ATC]).unwrap();
/// assert_eq!(
///     registry.resolve("atc:run").unwrap(),
///     (Some("http://www.sap.com/adt/atc"), "run")
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceRegistry {
    uris: BTreeMap<&'static str, &'static str>,
}

impl NamespaceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding all given namespaces.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::NamespaceConflict`] if two namespaces share a
    /// prefix but differ in URI.
    pub fn with_namespaces(
        namespaces: impl IntoIterator<Item = XmlNamespace>,
    ) -> Result<Self, XmlError> {
        let mut registry = Self::new();
        for namespace in namespaces {
            registry.register(namespace)?;
        }
        Ok(registry)
    }

    /// Register a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::NamespaceConflict`] if the prefix is already bound
    /// to another URI.
    pub fn register(&mut self, namespace: XmlNamespace) -> Result<(), XmlError> {
        match self.uris.get(namespace.prefix) {
            Some(existing) if *existing == namespace.uri => Ok(()),
            Some(existing) => Err(XmlError::NamespaceConflict {
                prefix: namespace.prefix.to_owned(),
                existing: (*existing).to_owned(),
                requested: namespace.uri.to_owned(),
            }),
            None => {
                self.uris.insert(namespace.prefix, namespace.uri);
                Ok(())
            }
        }
    }

    /// URI registered for `prefix`.
    #[must_use]
    pub fn uri(&self, prefix: &str) -> Option<&'static str> {
        self.uris.get(prefix).copied()
    }

    /// Resolve a qualified name to `(uri, local)`.
    ///
    /// Unqualified names resolve to `(None, name)`.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::UnknownPrefix`] if the prefix is not registered.
    pub fn resolve<'n>(&self, qname: &'n str) -> Result<(Option<&'static str>, &'n str), XmlError> {
        match split_qname(qname) {
            (Some(prefix), local) => self
                .uri(prefix)
                .map(|uri| (Some(uri), local))
                .ok_or_else(|| XmlError::UnknownPrefix(prefix.to_owned())),
            (None, local) => Ok((None, local)),
        }
    }

    /// Iterate over all registered namespaces, ordered by prefix.
    pub fn iter(&self) -> impl Iterator<Item = XmlNamespace> + '_ {
        self.uris
            .iter()
            .map(|(prefix, uri)| XmlNamespace::new(*prefix, *uri))
    }

    /// Number of registered prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    /// Whether no prefix is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE: XmlNamespace = XmlNamespace::new("adtcore", "http://www.sap.com/adt/core");

    #[test]
    fn test_should_register_same_binding_twice() {
        let mut registry = NamespaceRegistry::new();
        registry.register(CORE).expect("first registration");
        registry.register(CORE).expect("identical registration");

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.uri("adtcore"), Some("http://www.sap.com/adt/core"));
    }

    #[test]
    fn test_should_reject_conflicting_prefix() {
        let err = NamespaceRegistry::with_namespaces([
            CORE,
            XmlNamespace::new("adtcore", "http://example.com/other"),
        ])
        .expect_err("conflicting prefix");

        assert!(matches!(
            err,
            XmlError::NamespaceConflict { ref prefix, .. } if prefix == "adtcore"
        ));
    }

    #[test]
    fn test_should_resolve_qualified_and_plain_names() {
        let registry = NamespaceRegistry::with_namespaces([CORE]).expect("registry");

        assert_eq!(
            registry.resolve("adtcore:uri").expect("known prefix"),
            (Some("http://www.sap.com/adt/core"), "uri")
        );
        assert_eq!(registry.resolve("kind").expect("plain"), (None, "kind"));
        assert!(matches!(
            registry.resolve("atc:run"),
            Err(XmlError::UnknownPrefix(p)) if p == "atc"
        ));
    }
}
