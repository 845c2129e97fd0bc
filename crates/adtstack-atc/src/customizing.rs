//! ATC customizing of the connected system.

use adtstack_core::{AdtRequest, Transport};
use adtstack_xml::XmlError;
use http::Method;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::error::AtcError;

/// Versioned MIME type of the customizing document.
pub const CUSTOMIZING_MIME_TYPE_V1: &str = "application/vnd.sap.atc.customizing-v1+xml";

/// Customizing values the client cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customizing {
    /// Check variant configured as the system default.
    pub system_check_variant: Option<String>,
}

/// Fetch the ATC customizing of the connected system.
pub fn fetch_customizing<T: Transport>(transport: &T) -> Result<Customizing, AtcError> {
    let request = AdtRequest::new(Method::GET, "atc/customizing")
        .accept("application/xml")
        .accept(CUSTOMIZING_MIME_TYPE_V1);
    let response = transport.execute(&request)?;

    debug!(body = %response.text, "ATC customizing response");

    Ok(parse_customizing(&response.text)?)
}

/// Scan a customizing document for the properties of [`Customizing`].
fn parse_customizing(xml: &str) -> Result<Customizing, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut customizing = Customizing::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if e.name().as_ref() != b"property" {
                    continue;
                }
                if attribute(&e, b"name")?.as_deref() == Some("systemCheckVariant") {
                    customizing.system_check_variant = attribute(&e, b"value")?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(customizing)
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, XmlError> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|err| XmlError::ParseError(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;

    const CUSTOMIZING_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<customizing>
  <properties>
    <property name="systemCheckVariant" value="STANDARD"/>
    <property name="longTextInSapGui" value="false"/>
  </properties>
  <exemption>
    <reasons>
      <reason id="FPOS" title="False Positive" justificationMandatory="true"/>
    </reasons>
  </exemption>
</customizing>"#;

    #[test]
    fn test_should_fetch_system_check_variant() {
        let transport = RecordingTransport::new([CUSTOMIZING_XML]);

        let customizing = fetch_customizing(&transport).expect("fetch");

        assert_eq!(customizing.system_check_variant.as_deref(), Some("STANDARD"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method(), &Method::GET);
        assert_eq!(requests[0].path(), "atc/customizing");
        assert_eq!(
            requests[0].accept_header().as_deref(),
            Some("application/xml, application/vnd.sap.atc.customizing-v1+xml")
        );
    }

    #[test]
    fn test_should_leave_variant_unset_when_absent() {
        let customizing =
            parse_customizing("<customizing><properties/></customizing>").expect("parse");

        assert_eq!(customizing, Customizing::default());
    }

    #[test]
    fn test_should_fail_on_malformed_customizing() {
        let transport = RecordingTransport::new(["<customizing><property></customizing>"]);

        let err = fetch_customizing(&transport).expect_err("malformed");

        assert!(matches!(err, AtcError::Xml(_)));
    }
}
