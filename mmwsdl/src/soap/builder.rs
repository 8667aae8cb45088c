//! Construction des requêtes SOAP

use serde_json::Value;
use xmltree::{Element, XMLNode};

use super::{ENVELOPE_PREFIX, SoapHeader, SoapVersion};
use crate::value::fill_element;

fn build_soap_envelope(
    version: SoapVersion,
    headers: Vec<Element>,
    body_child: Element,
) -> Result<String, xmltree::Error> {
    // Body
    let mut body = Element::new(&format!("{ENVELOPE_PREFIX}:Body"));
    body.children.push(XMLNode::Element(body_child));

    // Envelope
    let mut envelope = Element::new(&format!("{ENVELOPE_PREFIX}:Envelope"));
    envelope.attributes.insert(
        format!("xmlns:{ENVELOPE_PREFIX}"),
        version.envelope_namespace().to_string(),
    );

    // Header, seulement s'il y a des en-têtes
    if !headers.is_empty() {
        let mut header = Element::new(&format!("{ENVELOPE_PREFIX}:Header"));
        header
            .children
            .extend(headers.into_iter().map(XMLNode::Element));
        envelope.children.push(XMLNode::Element(header));
    }

    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Construit une requête SOAP
///
/// # Arguments
///
/// * `version` - Version du protocole
/// * `namespace` - Namespace cible du service (ex: "http://xml.m4u.com.au/2009")
/// * `operation` - Nom de l'opération (ex: "checkUser")
/// * `payload` - Champs de l'enregistrement de requête
/// * `headers` - En-têtes SOAP à placer dans `<SOAP-ENV:Header>`
///
/// # Returns
///
/// XML SOAP formaté en String
pub fn build_soap_request(
    version: SoapVersion,
    namespace: &str,
    operation: &str,
    payload: &Value,
    headers: &[SoapHeader],
) -> Result<String, xmltree::Error> {
    // L'élément d'opération porte le namespace par défaut : les champs
    // de l'enregistrement en héritent.
    let mut request_elem = Element::new(operation);
    request_elem
        .attributes
        .insert("xmlns".to_string(), namespace.to_string());
    fill_element(&mut request_elem, payload);

    let header_elems = headers
        .iter()
        .map(|header| header.to_element(version))
        .collect();

    build_soap_envelope(version, header_elems, request_elem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_request() {
        let xml = build_soap_request(
            SoapVersion::V1_1,
            "http://xml.m4u.com.au/2009",
            "checkUser",
            &json!({ "authentication": { "userId": "alice", "password": "secret" } }),
            &[],
        )
        .unwrap();

        assert!(xml.contains("<checkUser xmlns=\"http://xml.m4u.com.au/2009\">"));
        assert!(xml.contains("<userId>alice</userId>"));
        assert!(xml.contains("<password>secret</password>"));
        assert!(xml.contains(
            "xmlns:SOAP-ENV=\"http://schemas.xmlsoap.org/soap/envelope/\""
        ));
        assert!(!xml.contains("SOAP-ENV:Header"));
    }

    #[test]
    fn test_build_request_with_headers_in_1_2() {
        let headers = vec![SoapHeader::new("urn:trace", "TraceId", json!("42"), true)];

        let xml = build_soap_request(
            SoapVersion::V1_2,
            "http://xml.m4u.com.au/2009",
            "getBlockedNumbers",
            &json!({}),
            &headers,
        )
        .unwrap();

        assert!(xml.contains("<SOAP-ENV:Header>"));
        assert!(xml.contains("TraceId"));
        assert!(xml.contains("http://www.w3.org/2003/05/soap-envelope"));
    }
}
