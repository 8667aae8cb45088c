//! Structures de l'enveloppe SOAP

use serde_json::Value;
use xmltree::Element;

use super::{ENVELOPE_PREFIX, SoapFault, SoapVersion};
use crate::value::fill_element;

/// Enveloppe SOAP reçue
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    /// Version déduite du namespace de l'enveloppe
    pub version: SoapVersion,

    /// En-tête SOAP optionnel
    pub header: Option<Element>,

    /// Corps SOAP contenant la réponse ou le fault
    pub body: Element,
}

impl SoapEnvelope {
    /// Premier élément du corps : la réponse de l'opération ou le `Fault`
    pub fn payload(&self) -> Option<&Element> {
        self.body.children.iter().find_map(|node| node.as_element())
    }

    /// Extrait le SOAP Fault si le corps en contient un
    pub fn fault(&self) -> Option<SoapFault> {
        self.payload()
            .filter(|elem| elem.name == "Fault")
            .map(SoapFault::from_element)
    }
}

/// En-tête SOAP sortant
///
/// Un en-tête sans `actor` correspond à la variante à quatre arguments :
/// aucun attribut `actor` (ou `role` en SOAP 1.2) n'est émis.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapHeader {
    /// Namespace de l'élément d'en-tête
    pub namespace: String,

    /// Nom de l'élément, clé de remplacement
    pub name: String,

    /// Contenu, sérialisé comme un enregistrement
    pub data: Value,

    pub must_understand: bool,

    pub actor: Option<String>,
}

impl SoapHeader {
    pub fn new(namespace: &str, name: &str, data: Value, must_understand: bool) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            data,
            must_understand,
            actor: None,
        }
    }

    pub fn with_actor(
        namespace: &str,
        name: &str,
        data: Value,
        must_understand: bool,
        actor: &str,
    ) -> Self {
        Self {
            actor: Some(actor.to_string()),
            ..Self::new(namespace, name, data, must_understand)
        }
    }

    /// Construit l'élément XML placé dans `<SOAP-ENV:Header>`
    pub fn to_element(&self, version: SoapVersion) -> Element {
        let mut elem = Element::new(&self.name);
        elem.attributes
            .insert("xmlns".to_string(), self.namespace.clone());

        if self.must_understand {
            elem.attributes.insert(
                format!("{ENVELOPE_PREFIX}:mustUnderstand"),
                version.must_understand_value().to_string(),
            );
        }

        if let Some(actor) = &self.actor {
            elem.attributes.insert(
                format!("{ENVELOPE_PREFIX}:{}", version.actor_attribute()),
                actor.clone(),
            );
        }

        fill_element(&mut elem, &self.data);
        elem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_without_actor() {
        let header = SoapHeader::new("urn:auth", "Token", json!("abc"), false);
        let elem = header.to_element(SoapVersion::V1_1);

        assert_eq!(elem.name, "Token");
        assert_eq!(elem.attributes.get("xmlns"), Some(&"urn:auth".to_string()));
        assert!(!elem.attributes.contains_key("SOAP-ENV:actor"));
        assert!(!elem.attributes.contains_key("SOAP-ENV:mustUnderstand"));
        assert_eq!(elem.get_text().as_deref(), Some("abc"));
    }

    #[test]
    fn test_header_with_actor_uses_role_in_1_2() {
        let header = SoapHeader::with_actor(
            "urn:auth",
            "Token",
            json!({ "user": "alice" }),
            true,
            "urn:next",
        );

        let elem = header.to_element(SoapVersion::V1_2);
        assert_eq!(
            elem.attributes.get("SOAP-ENV:role"),
            Some(&"urn:next".to_string())
        );
        assert_eq!(
            elem.attributes.get("SOAP-ENV:mustUnderstand"),
            Some(&"true".to_string())
        );
        assert!(elem.get_child("user").is_some());
    }
}
