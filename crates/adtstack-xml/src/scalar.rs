//! Scalar values carried by attribute and text-node bindings.

use crate::error::XmlError;

/// A value that round-trips through XML text.
///
/// Formatting and parsing are locale independent: numbers use plain decimal
/// notation and booleans use lowercase `true`/`false`.
pub trait XmlScalar: Sized + Send + Sync + 'static {
    /// Render the value as XML text (unescaped).
    fn to_xml_text(&self) -> String;

    /// Parse the value from XML text (already unescaped).
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::ParseError`] if the text is not a valid value.
    fn from_xml_text(text: &str) -> Result<Self, XmlError>;
}

impl XmlScalar for String {
    fn to_xml_text(&self) -> String {
        self.clone()
    }

    fn from_xml_text(text: &str) -> Result<Self, XmlError> {
        Ok(text.to_owned())
    }
}

impl XmlScalar for bool {
    fn to_xml_text(&self) -> String {
        String::from(if *self { "true" } else { "false" })
    }

    fn from_xml_text(text: &str) -> Result<Self, XmlError> {
        match text.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(XmlError::ParseError(format!("invalid boolean: {other}"))),
        }
    }
}

macro_rules! impl_decimal_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl XmlScalar for $ty {
                fn to_xml_text(&self) -> String {
                    self.to_string()
                }

                fn from_xml_text(text: &str) -> Result<Self, XmlError> {
                    let trimmed = text.trim();
                    trimmed.parse::<$ty>().map_err(|e| {
                        XmlError::ParseError(format!(
                            "invalid {} '{trimmed}': {e}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )+
    };
}

impl_decimal_scalar!(i32, i64, u16, u32, u64, usize);
