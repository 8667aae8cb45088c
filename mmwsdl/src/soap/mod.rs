//! # Module SOAP - Simple Object Access Protocol
//!
//! Ce module implémente le côté client du protocole SOAP : construction des
//! requêtes, lecture des réponses et des SOAP Faults.
//!
//! ## Fonctionnalités
//!
//! - ✅ Construction d'enveloppes SOAP 1.1 et 1.2
//! - ✅ En-têtes SOAP (`mustUnderstand`, `actor` / `role`)
//! - ✅ Parsing d'enveloppes de réponse
//! - ✅ Décodage du contenu du Body en arbre de valeurs
//! - ✅ Extraction des SOAP Faults (1.1 et 1.2)
//!
//! ## Architecture
//!
//! - [`SoapEnvelope`] : Enveloppe SOAP reçue
//! - [`SoapHeader`] : En-tête SOAP sortant
//! - [`SoapFault`] : Erreur SOAP
//! - [`SoapVersion`] : Version du protocole
//!
//! ## Example
//!
//! ```
//! use mmwsdl::soap::{SoapVersion, build_soap_request, parse_soap_envelope};
//! use serde_json::json;
//!
//! let xml = build_soap_request(
//!     SoapVersion::V1_1,
//!     "http://xml.m4u.com.au/2009",
//!     "checkUser",
//!     &json!({ "authentication": { "userId": "alice", "password": "secret" } }),
//!     &[],
//! )
//! .unwrap();
//!
//! let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
//! assert_eq!(envelope.payload().unwrap().name, "checkUser");
//! ```

mod builder;
mod envelope;
mod fault;
mod parser;

pub use builder::build_soap_request;
pub use envelope::{SoapEnvelope, SoapHeader};
pub use fault::SoapFault;
pub use parser::{SoapParseError, decode_soap_payload, parse_soap_envelope};

use mmconfig::keys;

/// Préfixe utilisé pour le namespace de l'enveloppe
pub const ENVELOPE_PREFIX: &str = "SOAP-ENV";

/// Namespace de l'enveloppe SOAP 1.1
pub const SOAP_1_1_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Namespace de l'enveloppe SOAP 1.2
pub const SOAP_1_2_ENVELOPE_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Version du protocole SOAP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoapVersion {
    #[default]
    V1_1,
    V1_2,
}

impl SoapVersion {
    /// Convertit la valeur de l'option `wsdl_soap_version`
    pub fn from_option(value: i64) -> Option<Self> {
        match value {
            keys::SOAP_1_1 => Some(SoapVersion::V1_1),
            keys::SOAP_1_2 => Some(SoapVersion::V1_2),
            _ => None,
        }
    }

    /// Retrouve la version à partir du namespace de l'enveloppe
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            SOAP_1_1_ENVELOPE_NS => Some(SoapVersion::V1_1),
            SOAP_1_2_ENVELOPE_NS => Some(SoapVersion::V1_2),
            _ => None,
        }
    }

    pub fn envelope_namespace(self) -> &'static str {
        match self {
            SoapVersion::V1_1 => SOAP_1_1_ENVELOPE_NS,
            SoapVersion::V1_2 => SOAP_1_2_ENVELOPE_NS,
        }
    }

    /// Valeur de l'en-tête HTTP `Content-Type`.
    ///
    /// En SOAP 1.2 l'action voyage dans le `Content-Type`, en SOAP 1.1 dans
    /// l'en-tête `SOAPAction` (voir [`soap_action_header`](Self::soap_action_header)).
    pub fn content_type(self, charset: &str, action: &str) -> String {
        match self {
            SoapVersion::V1_1 => format!("text/xml; charset={charset}"),
            SoapVersion::V1_2 => {
                format!(r#"application/soap+xml; charset={charset}; action="{action}""#)
            }
        }
    }

    /// Valeur de l'en-tête `SOAPAction`, uniquement en SOAP 1.1
    pub fn soap_action_header(self, action: &str) -> Option<String> {
        match self {
            SoapVersion::V1_1 => Some(format!(r#""{action}""#)),
            SoapVersion::V1_2 => None,
        }
    }

    /// Nom de l'attribut désignant le destinataire d'un en-tête
    pub(crate) fn actor_attribute(self) -> &'static str {
        match self {
            SoapVersion::V1_1 => "actor",
            SoapVersion::V1_2 => "role",
        }
    }

    /// Valeur de l'attribut `mustUnderstand`
    pub(crate) fn must_understand_value(self) -> &'static str {
        match self {
            SoapVersion::V1_1 => "1",
            SoapVersion::V1_2 => "true",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_option() {
        assert_eq!(SoapVersion::from_option(1), Some(SoapVersion::V1_1));
        assert_eq!(SoapVersion::from_option(2), Some(SoapVersion::V1_2));
        assert_eq!(SoapVersion::from_option(3), None);
    }

    #[test]
    fn test_content_type_carries_action_only_in_1_2() {
        let action = "http://xml.m4u.com.au/2009/checkUser";

        assert_eq!(
            SoapVersion::V1_1.content_type("utf-8", action),
            "text/xml; charset=utf-8"
        );
        assert_eq!(
            SoapVersion::V1_1.soap_action_header(action).as_deref(),
            Some(r#""http://xml.m4u.com.au/2009/checkUser""#)
        );
        assert!(SoapVersion::V1_2.content_type("utf-8", action).contains(action));
        assert_eq!(SoapVersion::V1_2.soap_action_header(action), None);
    }
}
