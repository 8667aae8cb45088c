//! Parser des réponses SOAP

use super::{SoapEnvelope, SoapVersion};
use crate::value::{ATTRIBUTE_PREFIX, TEXT_KEY, decode_document};
use serde_json::Value;
use std::io::BufReader;
use xmltree::Element;

/// Erreur de parsing SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,
}

/// Parse une enveloppe SOAP complète
///
/// Les entités externes ne sont jamais résolues et aucune DTD n'est validée.
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let reader = BufReader::new(xml);
    let root = Element::parse(reader)?;

    // Vérifier que c'est bien une Envelope
    if root.name != "Envelope" {
        return Err(SoapParseError::MissingEnvelope);
    }

    let version = root
        .namespace
        .as_deref()
        .and_then(SoapVersion::from_namespace)
        .unwrap_or_default();

    // Extraire Header (optionnel)
    let header = root
        .children
        .iter()
        .find_map(|n| n.as_element().filter(|e| e.name == "Header"))
        .cloned();

    // Extraire Body (obligatoire)
    let body = root
        .children
        .iter()
        .find_map(|n| n.as_element().filter(|e| e.name == "Body"))
        .cloned()
        .ok_or(SoapParseError::MissingBody)?;

    Ok(SoapEnvelope {
        version,
        header,
        body,
    })
}

/// Décode le premier élément du Body en arbre de valeurs
///
/// Passe par [`decode_document`] pour garder les préfixes des attributs.
/// `None` quand le document n'est pas une enveloppe ou que le Body est vide.
pub fn decode_soap_payload(xml: &[u8]) -> Result<Option<Value>, quick_xml::Error> {
    let Some((root, envelope)) = decode_document(xml)? else {
        return Ok(None);
    };
    if root != "Envelope" {
        return Ok(None);
    }

    let payload = match envelope.get("Body") {
        Some(Value::Object(body)) => body
            .iter()
            .find(|(key, _)| !key.starts_with(ATTRIBUTE_PREFIX) && key.as_str() != TEXT_KEY)
            .map(|(_, payload)| payload),
        _ => None,
    };

    // Éléments répétés : seul le premier compte
    Ok(payload.map(|payload| match payload {
        Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
        other => other.clone(),
    }))
}
