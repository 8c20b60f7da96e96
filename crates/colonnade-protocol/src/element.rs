//! The wire element: a tag plus a flat map of string attributes.
//!
//! Every message travels as exactly one element. Elements have no
//! children and no typed values; a variant turns its fields into strings
//! on the way out and parses them on the way in.
//!
//! The serde representation is a single-entry map from tag to attributes,
//! so in JSON a close instruction reads:
//!
//! ```text
//! {"close":{"panel":"negotiationDialog"}}
//! ```

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ProtocolError;

/// A tagged node with string-valued attributes.
///
/// Attributes are kept in a `BTreeMap`: names are unique, and two elements
/// with the same attributes compare equal regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
}

impl Element {
    /// Creates an element with no attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Returns the element's tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns all attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Returns an attribute value, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns a mandatory attribute or a `MalformedMessage` error.
    pub fn require(&self, name: &str) -> Result<&str, ProtocolError> {
        self.attribute(name)
            .ok_or_else(|| ProtocolError::missing_attribute(&self.tag, name))
    }

    /// Reads an optional boolean attribute. Absent means `false`.
    ///
    /// Only the literals `"true"` and `"false"` are accepted.
    pub fn flag(&self, name: &str) -> Result<bool, ProtocolError> {
        match self.attribute(name) {
            None | Some("false") => Ok(false),
            Some("true") => Ok(true),
            Some(other) => Err(ProtocolError::MalformedMessage(format!(
                "<{}> attribute {name:?} is not a boolean: {other:?}",
                self.tag
            ))),
        }
    }

    /// Fails with `MalformedMessage` unless this element carries `tag`.
    pub fn expect_tag(&self, tag: &str) -> Result<(), ProtocolError> {
        if self.tag == tag {
            Ok(())
        } else {
            Err(ProtocolError::tag_mismatch(tag, &self.tag))
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(f, " {name}={value:?}")?;
        }
        write!(f, "/>")
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.tag, &self.attributes)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ElementVisitor)
    }
}

struct ElementVisitor;

impl<'de> Visitor<'de> for ElementVisitor {
    type Value = Element;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a single-entry map from tag to string attributes")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Element, A::Error> {
        let (tag, Attributes(attributes)): (String, Attributes) = map
            .next_entry()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        if tag.is_empty() {
            return Err(de::Error::custom("element tag is empty"));
        }
        // Drain the rest so the error names the real problem.
        if map.next_key::<IgnoredAny>()?.is_some() {
            let _: IgnoredAny = map.next_value()?;
            return Err(de::Error::custom("element carries more than one tag"));
        }
        Ok(Element { tag, attributes })
    }
}

/// Attribute map that refuses a name given twice.
struct Attributes(BTreeMap<String, String>);

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttributesVisitor)
    }
}

struct AttributesVisitor;

impl<'de> Visitor<'de> for AttributesVisitor {
    type Value = Attributes;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of uniquely named string attributes")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Attributes, A::Error> {
        let mut attributes = BTreeMap::new();
        while let Some((name, value)) = map.next_entry::<String, String>()? {
            match attributes.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(slot) => {
                    return Err(de::Error::custom(format!(
                        "duplicate attribute {:?}",
                        slot.key()
                    )));
                }
            }
        }
        Ok(Attributes(attributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close() -> Element {
        Element::new("close").with_attribute("panel", "negotiationDialog")
    }

    #[test]
    fn test_require_present_and_missing() {
        let el = close();
        assert_eq!(el.require("panel").unwrap(), "negotiationDialog");

        let err = el.require("owner").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMessage(_)));
    }

    #[test]
    fn test_flag_parsing() {
        let el = Element::new("chat")
            .with_attribute("private", "true")
            .with_attribute("loud", "yes");
        assert!(el.flag("private").unwrap());
        assert!(!el.flag("absent").unwrap());
        assert!(el.flag("loud").is_err());
    }

    #[test]
    fn test_expect_tag() {
        assert!(close().expect_tag("close").is_ok());
        let err = close().expect_tag("chat").unwrap_err();
        assert!(err.to_string().contains("expected <chat>, found <close>"));
    }

    #[test]
    fn test_attribute_order_does_not_matter() {
        let a = Element::new("chat")
            .with_attribute("sender", "alice")
            .with_attribute("message", "hi");
        let b = Element::new("chat")
            .with_attribute("message", "hi")
            .with_attribute("sender", "alice");
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_shape_is_single_entry_map() {
        let json = serde_json::to_string(&close()).unwrap();
        assert_eq!(json, r#"{"close":{"panel":"negotiationDialog"}}"#);
    }

    #[test]
    fn test_json_element_without_attributes() {
        let el: Element = serde_json::from_str(r#"{"endTurn":{}}"#).unwrap();
        assert_eq!(el.tag(), "endTurn");
        assert!(el.attributes().is_empty());
    }

    #[test]
    fn test_json_rejects_two_tags() {
        let result: Result<Element, _> =
            serde_json::from_str(r#"{"close":{},"chat":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_rejects_empty_object_and_empty_tag() {
        assert!(serde_json::from_str::<Element>("{}").is_err());
        assert!(serde_json::from_str::<Element>(r#"{"":{}}"#).is_err());
    }

    #[test]
    fn test_json_rejects_non_string_attribute() {
        let result: Result<Element, _> =
            serde_json::from_str(r#"{"close":{"panel":7}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_rejects_duplicate_attribute() {
        let err = serde_json::from_str::<Element>(
            r#"{"close":{"panel":"a","panel":"b"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains(r#"duplicate attribute "panel""#));
    }

    #[test]
    fn test_display_reads_like_markup() {
        assert_eq!(close().to_string(), r#"<close panel="negotiationDialog"/>"#);
    }
}
