//! The marshalling entry point.

use tracing::debug;

use crate::deserialize::read_document;
use crate::error::XmlError;
use crate::namespace::NamespaceRegistry;
use crate::object::XmlObject;
use crate::serialize::write_document;

/// Converts bound objects to XML documents and back.
///
/// The registry supplies the namespaces that qualified names may use.
/// The namespace of every object type met on the way is added to a
/// per-call copy of the registry, so kinds with a root descriptor work
/// even against an empty registry.
#[derive(Debug, Clone, Default)]
pub struct Marshal {
    registry: NamespaceRegistry,
}

impl Marshal {
    /// Create a marshaller over `registry`.
    #[must_use]
    pub fn new(registry: NamespaceRegistry) -> Self {
        Self { registry }
    }

    /// The namespaces known to this marshaller.
    #[must_use]
    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// Serialize `object` as a complete document rooted at its object type.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::MissingObjectType`] if the kind has no root
    /// descriptor, [`XmlError::UnknownPrefix`] if a bound name uses an
    /// unregistered prefix, and [`XmlError::NamespaceConflict`] if an object
    /// type rebinds a registered prefix.
    pub fn serialize<T: XmlObject>(&self, object: &T) -> Result<String, XmlError> {
        let xml = write_document(&self.registry, object)?;
        debug!(kind = std::any::type_name::<T>(), bytes = xml.len(), "serialized document");
        Ok(xml)
    }

    /// Populate `target` from `xml`.
    ///
    /// Fields without a counterpart in the document keep their value;
    /// elements and attributes without a binding are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::QuickXml`] or [`XmlError::ParseError`] for
    /// malformed documents and values that do not parse as the bound scalar
    /// type, and [`XmlError::MissingElement`] if the document has no root.
    pub fn deserialize<T: XmlObject>(&self, xml: &str, target: &mut T) -> Result<(), XmlError> {
        let mut registry = self.registry.clone();
        if let Some(object_type) = T::object_type() {
            registry.register(object_type.namespace())?;
        }
        read_document(&registry, xml, target)?;
        debug!(kind = std::any::type_name::<T>(), bytes = xml.len(), "deserialized document");
        Ok(())
    }

    /// Parse `xml` into a fresh `T::default()`.
    ///
    /// # Errors
    ///
    /// Same as [`Marshal::deserialize`].
    pub fn parse<T: XmlObject + Default>(&self, xml: &str) -> Result<T, XmlError> {
        let mut target = T::default();
        self.deserialize(xml, &mut target)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectType, XmlNamespace, define_container, ordered_bindings, xml_object};

    const RPT: XmlNamespace = XmlNamespace::new("rpt", "http://example.com/report");

    static REPORT: ObjectType = ObjectType::new(RPT, "application/xml", "report");

    static STAMP: ObjectType = ObjectType::new(
        XmlNamespace::new("stp", "http://example.com/stamp"),
        "application/xml",
        "stamp",
    );

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Entry {
        name: Option<String>,
        count: Option<u32>,
    }

    xml_object! {
        Entry {
            attribute name => "rpt:name",
            attribute count => "rpt:count",
        }
    }

    define_container! {
        EntryList => "rpt:entry", Entry
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Note {
        body: Option<String>,
        entries: EntryList,
    }

    xml_object! {
        Note {
            attribute body => "rpt:body",
            wrapped_container entries => "rpt:entries",
        }
    }

    define_container! {
        NoteList => "rpt:note", Note
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Summary {
        text: Option<String>,
    }

    xml_object! {
        Summary {
            text text => "rpt:text",
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Stamp {
        by: Option<String>,
    }

    xml_object! {
        Stamp as STAMP {
            attribute by => "stp:by",
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Report {
        id: Option<String>,
        title: Option<String>,
        summary: Option<Summary>,
        entries: EntryList,
        notes: NoteList,
        done: Option<bool>,
        stamp: Option<Stamp>,
    }

    xml_object! {
        Report as REPORT {
            attribute id => "rpt:id",
            text title => "rpt:title",
            element summary => "rpt:summary",
            wrapped_container entries => "rpt:entries",
            container notes,
            text done => "rpt:done",
            element stamp => "stp:stamp",
        }
    }

    fn entry(name: &str, count: Option<u32>) -> Entry {
        Entry {
            name: Some(name.to_owned()),
            count,
        }
    }

    fn sample_report() -> Report {
        Report {
            id: Some("R1".to_owned()),
            title: Some("Weekly".to_owned()),
            summary: Some(Summary {
                text: Some("all good".to_owned()),
            }),
            entries: [entry("a", Some(1)), entry("b", None)].into_iter().collect(),
            notes: [Note {
                body: Some("first".to_owned()),
                entries: [entry("c", Some(3))].into_iter().collect(),
            }]
            .into_iter()
            .collect(),
            done: Some(true),
            stamp: Some(Stamp {
                by: Some("ci".to_owned()),
            }),
        }
    }

    fn position(xml: &str, needle: &str) -> usize {
        xml.find(needle)
            .unwrap_or_else(|| panic!("{needle} not found in {xml}"))
    }

    #[test]
    fn test_should_serialize_small_document_exactly() {
        let report = Report {
            id: Some("R1".to_owned()),
            entries: [entry("a", Some(1))].into_iter().collect(),
            ..Report::default()
        };

        let xml = Marshal::default().serialize(&report).expect("serialize");

        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <rpt:report xmlns:rpt=\"http://example.com/report\" rpt:id=\"R1\">\
             <rpt:entries><rpt:entry rpt:name=\"a\" rpt:count=\"1\"/></rpt:entries>\
             </rpt:report>"
        );
    }

    #[test]
    fn test_should_round_trip_nested_objects_and_containers() {
        let marshal = Marshal::default();
        let report = sample_report();

        let xml = marshal.serialize(&report).expect("serialize");
        let parsed: Report = marshal.parse(&xml).expect("parse");

        assert_eq!(parsed, report);
    }

    #[test]
    fn test_should_round_trip_empty_containers_and_absent_attributes() {
        let marshal = Marshal::default();
        let report = Report {
            title: Some("empty".to_owned()),
            notes: [Note::default()].into_iter().collect(),
            ..Report::default()
        };

        let xml = marshal.serialize(&report).expect("serialize");
        assert!(!xml.contains("rpt:id="));
        assert!(xml.contains("<rpt:entries/>"));

        let parsed: Report = marshal.parse(&xml).expect("parse");
        assert_eq!(parsed, report);
        assert!(parsed.entries.is_empty());
        assert!(parsed.notes[0].entries.is_empty());
    }

    #[test]
    fn test_should_emit_children_in_declaration_order() {
        let mut report = Report::default();
        report.stamp = sample_report().stamp;
        report.done = Some(false);
        report.notes = sample_report().notes;
        report.entries = sample_report().entries;
        report.summary = sample_report().summary;
        report.title = Some("late".to_owned());

        let xml = Marshal::default().serialize(&report).expect("serialize");

        let order = [
            position(&xml, "<rpt:title>"),
            position(&xml, "<rpt:summary>"),
            position(&xml, "<rpt:entries>"),
            position(&xml, "<rpt:note "),
            position(&xml, "<rpt:done>"),
            position(&xml, "<stp:stamp"),
        ];
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{xml}");

        let fields: Vec<_> = ordered_bindings::<Report>()
            .iter()
            .map(crate::BindingSpec::field)
            .collect();
        assert_eq!(
            fields,
            ["id", "title", "summary", "entries", "notes", "done", "stamp"]
        );
    }

    #[test]
    fn test_should_declare_nested_kind_namespace_where_used() {
        let xml = Marshal::default()
            .serialize(&sample_report())
            .expect("serialize");

        assert!(xml.contains(
            "<stp:stamp xmlns:stp=\"http://example.com/stamp\" stp:by=\"ci\"/>"
        ));
        assert_eq!(xml.matches("xmlns:rpt=").count(), 1);
    }

    #[test]
    fn test_should_skip_unknown_elements_and_attributes() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <rpt:report xmlns:rpt="http://example.com/report" rpt:id="R9" rpt:color="red" other="x">
                <rpt:title>Kept</rpt:title>
                <rpt:extra rpt:id="nested">
                    <rpt:title>Ignored</rpt:title>
                    <rpt:summary><rpt:text>Ignored</rpt:text></rpt:summary>
                </rpt:extra>
                <rpt:summary><rpt:text>Also kept</rpt:text></rpt:summary>
            </rpt:report>"#;

        let report: Report = Marshal::default().parse(xml).expect("parse");

        assert_eq!(report.id.as_deref(), Some("R9"));
        assert_eq!(report.title.as_deref(), Some("Kept"));
        assert_eq!(
            report.summary.and_then(|summary| summary.text).as_deref(),
            Some("Also kept")
        );
    }

    #[test]
    fn test_should_keep_first_text_child() {
        let xml = r#"<rpt:report xmlns:rpt="http://example.com/report">
                <rpt:title>first</rpt:title><rpt:title>second</rpt:title>
            </rpt:report>"#;

        let report: Report = Marshal::default().parse(xml).expect("parse");

        assert_eq!(report.title.as_deref(), Some("first"));
    }

    #[test]
    fn test_should_match_names_by_namespace_uri() {
        let marshal = Marshal::new(
            crate::NamespaceRegistry::with_namespaces([RPT]).expect("registry"),
        );
        let xml = r#"<r:report xmlns:r="http://example.com/report" r:id="X">
                <r:title>Other prefix</r:title>
                <rpt:title xmlns:rpt="http://example.com/elsewhere">Wrong namespace</rpt:title>
            </r:report>"#;

        let report: Report = marshal.parse(xml).expect("parse");

        assert_eq!(report.id.as_deref(), Some("X"));
        assert_eq!(report.title.as_deref(), Some("Other prefix"));
    }

    #[test]
    fn test_should_join_split_text_runs() {
        let xml = r#"<rpt:report xmlns:rpt="http://example.com/report">
                <rpt:title>Fish &amp; Chips &#x41;<![CDATA[ <raw> ]]>end</rpt:title>
            </rpt:report>"#;

        let report: Report = Marshal::default().parse(xml).expect("parse");

        assert_eq!(report.title.as_deref(), Some("Fish & Chips A <raw> end"));
    }

    #[test]
    fn test_should_escape_text_and_attributes() {
        let marshal = Marshal::default();
        let report = Report {
            id: Some("a\"b<c".to_owned()),
            title: Some("x & y < z".to_owned()),
            ..Report::default()
        };

        let xml = marshal.serialize(&report).expect("serialize");
        assert!(xml.contains("&amp;"));

        let parsed: Report = marshal.parse(&xml).expect("parse");
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_should_append_to_populated_target() {
        let marshal = Marshal::default();
        let mut report = Report {
            entries: [entry("existing", None)].into_iter().collect(),
            ..Report::default()
        };
        let xml = r#"<rpt:report xmlns:rpt="http://example.com/report">
                <rpt:entries><rpt:entry rpt:name="new"/></rpt:entries>
            </rpt:report>"#;

        marshal.deserialize(xml, &mut report).expect("deserialize");

        let names: Vec<_> = report
            .entries
            .iter()
            .filter_map(|entry| entry.name.as_deref())
            .collect();
        assert_eq!(names, ["existing", "new"]);
    }

    #[test]
    fn test_should_fail_serializing_kind_without_object_type() {
        let err = Marshal::default()
            .serialize(&entry("a", None))
            .expect_err("no root descriptor");

        assert!(matches!(err, XmlError::MissingObjectType(kind) if kind.ends_with("Entry")));
    }

    #[test]
    fn test_should_fail_on_unregistered_prefix() {
        static LOOSE: ObjectType = ObjectType::new(RPT, "application/xml", "loose");

        #[derive(Debug, Default)]
        struct Loose {
            value: Option<String>,
        }

        xml_object! {
            Loose as LOOSE {
                text value => "zz:value",
            }
        }

        let err = Marshal::default()
            .serialize(&Loose {
                value: Some("v".to_owned()),
            })
            .expect_err("zz is not registered");

        assert!(matches!(err, XmlError::UnknownPrefix(prefix) if prefix == "zz"));
    }

    #[test]
    fn test_should_fail_on_malformed_documents() {
        let marshal = Marshal::default();

        let mismatched = r#"<rpt:report xmlns:rpt="http://example.com/report"><rpt:title>x</rpt:report>"#;
        assert!(marshal.parse::<Report>(mismatched).is_err());

        let truncated = r#"<rpt:report xmlns:rpt="http://example.com/report"><rpt:title>x</rpt:title>"#;
        assert!(marshal.parse::<Report>(truncated).is_err());

        let err = marshal.parse::<Report>("").expect_err("no root");
        assert!(matches!(err, XmlError::MissingElement(_)));
    }

    #[test]
    fn test_should_fail_on_content_after_root_element() {
        let marshal = Marshal::default();
        let root = r#"<rpt:report xmlns:rpt="http://example.com/report"><rpt:title>x</rpt:title></rpt:report>"#;

        for trailer in ["<rpt:report>", "</oops>", "junk < & >", "<![CDATA[x]]>", "&amp;"] {
            let xml = format!("{root}{trailer}");
            assert!(marshal.parse::<Report>(&xml).is_err(), "accepted {xml}");
        }
    }

    #[test]
    fn test_should_allow_comments_and_whitespace_after_root_element() {
        let xml = r#"<rpt:report xmlns:rpt="http://example.com/report"><rpt:title>x</rpt:title></rpt:report>
            <!-- generated --><?trace id="1"?>
        "#;

        let report = Marshal::default().parse::<Report>(xml).expect("parse");

        assert_eq!(report.title.as_deref(), Some("x"));
    }

    #[test]
    fn test_should_fail_on_invalid_scalar_value() {
        let xml = r#"<rpt:report xmlns:rpt="http://example.com/report">
                <rpt:entries><rpt:entry rpt:count="many"/></rpt:entries>
            </rpt:report>"#;

        let err = Marshal::default()
            .parse::<Report>(xml)
            .expect_err("count is numeric");

        assert!(matches!(err, XmlError::ParseError(_)));
    }
}
