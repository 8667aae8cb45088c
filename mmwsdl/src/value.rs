//! Conversion between XML elements and the untyped value tree records are
//! bound from.
//!
//! The mapping follows the usual XML/JSON conventions:
//! - child elements become object keys, repeated siblings become arrays
//! - attributes become `@name` keys
//! - mixed text content becomes the `$text` key
//! - a leaf element becomes a string, an empty leaf becomes `null`
//!
//! Responses are decoded from the raw document with [`decode_document`],
//! which sees attribute prefixes: XML Schema instance attributes never reach
//! the tree and other qualified attributes keep their `prefix:name` key.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};
use xmltree::{Element, XMLNode};

/// Key prefix marking an attribute
pub const ATTRIBUTE_PREFIX: char = '@';

/// Key holding the text content of an element with attributes or children
pub const TEXT_KEY: &str = "$text";

/// Namespace of `xsi:type`, `xsi:nil` and the other schema instance attributes
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Decodes an element into a value tree.
///
/// `xmltree` keeps only the local name of attributes, so this is meant for
/// unqualified trees such as the ones [`value_to_element`] builds.
pub fn element_to_value(element: &Element) -> Value {
    let mut attributes: Vec<(&String, &String)> = element
        .attributes
        .iter()
        .filter(|(name, _)| !name.starts_with("xmlns"))
        .collect();
    attributes.sort();

    if attributes
        .iter()
        .any(|(name, value)| name.as_str() == "nil" && is_true(value))
    {
        return Value::Null;
    }

    let text: String = element
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Text(text) | XMLNode::CData(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();

    let mut map = Map::new();

    for (name, value) in attributes {
        map.insert(format!("{ATTRIBUTE_PREFIX}{name}"), Value::String(value.clone()));
    }

    for child in element.children.iter().filter_map(|node| node.as_element()) {
        insert_child(&mut map, child.name.clone(), element_to_value(child));
    }

    finish_value(map, &text)
}

/// Decodes a whole document, returning the local name of its root element
/// and its value tree. `None` when the document holds no element.
///
/// Element names are local names. Namespace declarations and attributes of
/// the XML Schema instance namespace are dropped, `xsi:nil="true"` turns the
/// element into `null`. Other prefixed attributes are kept under their
/// qualified name. DTDs are skipped and only predefined and character
/// entities are expanded.
pub fn decode_document(xml: &[u8]) -> Result<Option<(String, Value)>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let frame = open_frame(&reader, &e, &stack)?;
                stack.push(frame);
            }
            Event::Empty(e) => {
                let frame = open_frame(&reader, &e, &stack)?;
                if let Some(root) = close_frame(frame, &mut stack) {
                    return Ok(Some(root));
                }
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    if let Some(root) = close_frame(frame, &mut stack) {
                        return Ok(Some(root));
                    }
                }
            }
            Event::Text(e) => {
                if let Some(frame) = stack.last_mut() {
                    let text = e.decode().map_err(quick_xml::Error::Encoding)?;
                    frame.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(frame) = stack.last_mut() {
                    if let Some(ch) = e.resolve_char_ref()? {
                        frame.text.push(ch);
                    } else {
                        let name = e.decode().map_err(quick_xml::Error::Encoding)?;
                        match resolve_predefined_entity(&name) {
                            Some(resolved) => frame.text.push_str(resolved),
                            None => {
                                frame.text.push('&');
                                frame.text.push_str(&name);
                                frame.text.push(';');
                            }
                        }
                    }
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

/// Element being decoded
struct Frame {
    name: String,
    namespaces: Vec<(String, String)>,
    map: Map<String, Value>,
    text: String,
    nil: bool,
}

impl Frame {
    fn namespace_of(&self, prefix: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .rev()
            .find(|(declared, _)| declared == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

fn open_frame<R>(
    reader: &Reader<R>,
    start: &BytesStart,
    stack: &[Frame],
) -> Result<Frame, quick_xml::Error> {
    let mut frame = Frame {
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        namespaces: Vec::new(),
        map: Map::new(),
        text: String::new(),
        nil: false,
    };

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .decode_and_unescape_value(reader.decoder())?
            .into_owned();

        if key == "xmlns" {
            frame.namespaces.push((String::new(), value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            frame.namespaces.push((prefix.to_string(), value));
        } else {
            attributes.push((key, value));
        }
    }

    for (key, value) in attributes {
        let schema_instance = key.split_once(':').and_then(|(prefix, local)| {
            let namespace = std::iter::once(&frame)
                .chain(stack.iter().rev())
                .find_map(|scope| scope.namespace_of(prefix));
            let bound = match namespace {
                Some(uri) => uri == XSI_NAMESPACE,
                None => prefix == "xsi",
            };
            bound.then_some(local)
        });

        match schema_instance {
            Some("nil") => frame.nil = is_true(&value),
            Some(_) => {}
            None => {
                frame
                    .map
                    .insert(format!("{ATTRIBUTE_PREFIX}{key}"), Value::String(value));
            }
        }
    }

    Ok(frame)
}

/// Hands a finished element to its parent, or returns it when it is the root.
fn close_frame(frame: Frame, stack: &mut [Frame]) -> Option<(String, Value)> {
    let Frame {
        name,
        map,
        text,
        nil,
        ..
    } = frame;
    let value = if nil { Value::Null } else { finish_value(map, &text) };

    match stack.last_mut() {
        Some(parent) => {
            insert_child(&mut parent.map, name, value);
            None
        }
        None => Some((name, value)),
    }
}

fn insert_child(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}

fn finish_value(mut map: Map<String, Value>, text: &str) -> Value {
    let text = text.trim();

    if map.is_empty() {
        return if text.is_empty() {
            Value::Null
        } else {
            Value::String(text.to_string())
        };
    }

    if !text.is_empty() {
        map.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
    }

    Value::Object(map)
}

fn is_true(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

/// Builds an element named `name` holding `value`.
pub fn value_to_element(name: &str, value: &Value) -> Element {
    let mut elem = Element::new(name);
    fill_element(&mut elem, value);
    elem
}

/// Writes `value` into `element`: attributes, text and child elements.
///
/// `null` entries are omitted, array entries are emitted as repeated
/// elements named after their key.
pub fn fill_element(element: &mut Element, value: &Value) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, value) in map {
                if value.is_null() {
                    continue;
                }

                if let Some(attribute) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                    element
                        .attributes
                        .insert(attribute.to_string(), scalar_text(value));
                } else if key == TEXT_KEY {
                    element.children.push(XMLNode::Text(scalar_text(value)));
                } else if let Value::Array(items) = value {
                    for item in items.iter().filter(|item| !item.is_null()) {
                        element
                            .children
                            .push(XMLNode::Element(value_to_element(key, item)));
                    }
                } else {
                    element
                        .children
                        .push(XMLNode::Element(value_to_element(key, value)));
                }
            }
        }
        Value::Array(items) => {
            // Liste nue : chaque entrée devient un <item>
            for item in items.iter().filter(|item| !item.is_null()) {
                element
                    .children
                    .push(XMLNode::Element(value_to_element("item", item)));
            }
        }
        scalar => element.children.push(XMLNode::Text(scalar_text(scalar))),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn leaf_elements_become_strings() {
        let value = element_to_value(&parse("<origin> 61400000000 </origin>"));
        assert_eq!(value, json!("61400000000"));

        assert_eq!(element_to_value(&parse("<origin/>")), Value::Null);
    }

    #[test]
    fn attributes_and_text_are_kept() {
        let value = element_to_value(&parse(r#"<recipient uid="7">61400000001</recipient>"#));
        assert_eq!(value, json!({ "@uid": "7", "$text": "61400000001" }));
    }

    #[test]
    fn repeated_siblings_become_arrays() {
        let value = element_to_value(&parse(
            "<recipients><recipient>1</recipient><recipient>2</recipient><recipient>3</recipient></recipients>",
        ));
        assert_eq!(value, json!({ "recipient": ["1", "2", "3"] }));
    }

    #[test]
    fn single_sibling_stays_scalar() {
        let value = element_to_value(&parse("<recipients><recipient>1</recipient></recipients>"));
        assert_eq!(value, json!({ "recipient": "1" }));
    }

    #[test]
    fn nil_elements_are_null() {
        let value = element_to_value(&parse(
            r#"<scheduled xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true"/>"#,
        ));
        assert_eq!(value, Value::Null);
    }

    fn decode(xml: &str) -> Value {
        decode_document(xml.as_bytes()).unwrap().unwrap().1
    }

    #[test]
    fn schema_type_never_shadows_a_plain_attribute() {
        let expected = json!({ "@type": "daily", "@creditLimit": "500" });

        let plain_first = decode(
            r#"<accountDetails xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                type="daily" xsi:type="AccountDetailsType" creditLimit="500"/>"#,
        );
        assert_eq!(plain_first, expected);

        let schema_first = decode(
            r#"<accountDetails xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                xsi:type="AccountDetailsType" type="daily" creditLimit="500"/>"#,
        );
        assert_eq!(schema_first, expected);
    }

    #[test]
    fn schema_prefix_is_resolved_through_its_declaration() {
        let value = decode(
            r#"<result xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
                <accountDetails i:type="AccountDetailsType" type="daily"/>
                <scheduled i:nil="true"/>
            </result>"#,
        );
        assert_eq!(
            value,
            json!({ "accountDetails": { "@type": "daily" }, "scheduled": null })
        );
    }

    #[test]
    fn other_qualified_attributes_keep_their_prefix() {
        let value = decode(r#"<recipient xmlns:m="urn:m" m:uid="9" uid="7">614</recipient>"#);
        assert_eq!(value, json!({ "@m:uid": "9", "@uid": "7", "$text": "614" }));
    }

    #[test]
    fn plain_nil_attribute_is_an_ordinary_attribute() {
        let value = decode(r#"<origin nil="true">Shop</origin>"#);
        assert_eq!(value, json!({ "@nil": "true", "$text": "Shop" }));
    }

    #[test]
    fn decoded_documents_follow_the_tree_conventions() {
        let (root, value) = decode_document(
            br#"<?xml version="1.0"?>
<result found="2">
  <recipients>
    <recipient uid="1">61400000001</recipient>
    <recipient>61400000002</recipient>
  </recipients>
  <content>a &amp; b &#x41;<![CDATA[<c>]]></content>
  <origin/>
</result>"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(root, "result");
        assert_eq!(
            value,
            json!({
                "@found": "2",
                "recipients": { "recipient": [{ "@uid": "1", "$text": "61400000001" }, "61400000002"] },
                "content": "a & b A<c>",
                "origin": null
            })
        );
    }

    #[test]
    fn document_without_element_decodes_to_none() {
        assert_eq!(decode_document(b"").unwrap(), None);
        assert!(decode_document(b"<a><b></a>").is_err());
    }

    #[test]
    fn values_are_written_back_as_xml() {
        let elem = value_to_element(
            "message",
            &json!({
                "@sequenceNumber": 1,
                "origin": null,
                "recipients": { "recipient": [{ "@uid": 1, "$text": "614" }, { "$text": "615" }] },
                "content": "hello",
                "deliveryReport": false,
            }),
        );

        assert_eq!(elem.attributes.get("sequenceNumber"), Some(&"1".to_string()));
        assert!(elem.get_child("origin").is_none());
        assert_eq!(
            elem.get_child("content").and_then(|c| c.get_text()).as_deref(),
            Some("hello")
        );
        assert_eq!(
            elem.get_child("deliveryReport")
                .and_then(|c| c.get_text())
                .as_deref(),
            Some("false")
        );

        let recipients = elem.get_child("recipients").unwrap();
        let items: Vec<&Element> = recipients
            .children
            .iter()
            .filter_map(|n| n.as_element())
            .collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].attributes.get("uid"), Some(&"1".to_string()));
        assert_eq!(items[1].get_text().as_deref(), Some("615"));
    }

    #[test]
    fn encode_then_decode_keeps_the_shape() {
        let original = json!({ "@found": "2", "recipients": { "recipient": ["1", "2"] } });
        let elem = value_to_element("result", &original);
        assert_eq!(element_to_value(&elem), original);
    }
}
