//! SOAP Faults

use serde_json::Value;
use xmltree::Element;

use crate::value::element_to_value;

/// Code utilisé pour les échecs de transport (connexion, statut HTTP)
pub const TRANSPORT_FAULT_CODE: &str = "HTTP";

/// Code utilisé pour les réponses illisibles côté client
pub const CLIENT_FAULT_CODE: &str = "Client";

/// Erreur SOAP (Fault)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("SOAP fault {code}: {message}")]
pub struct SoapFault {
    /// Code d'erreur (ex: "SOAP-ENV:Client", "HTTP")
    pub code: String,

    /// Description de l'erreur
    pub message: String,

    /// Acteur (1.1) ou rôle (1.2) à l'origine du fault
    pub actor: Option<String>,

    /// Contenu de `detail` / `Detail`
    pub detail: Option<Value>,
}

impl SoapFault {
    /// Crée un fault SOAP simple
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            actor: None,
            detail: None,
        }
    }

    /// Fault d'un échec de transport
    pub fn transport(message: &str) -> Self {
        Self::new(TRANSPORT_FAULT_CODE, message)
    }

    /// Fault d'une réponse que le client ne sait pas lire
    pub fn client(message: &str) -> Self {
        Self::new(CLIENT_FAULT_CODE, message)
    }

    pub fn is_transport(&self) -> bool {
        self.code == TRANSPORT_FAULT_CODE
    }

    /// Lit un élément `Fault` en SOAP 1.1 ou 1.2
    ///
    /// SOAP 1.1 : `faultcode`, `faultstring`, `faultactor`, `detail`.
    /// SOAP 1.2 : `Code/Value`, `Reason/Text`, `Role`, `Detail`.
    pub fn from_element(fault: &Element) -> Self {
        let code = child_text(fault, "faultcode")
            .or_else(|| {
                fault
                    .get_child("Code")
                    .and_then(|code| child_text(code, "Value"))
            })
            .unwrap_or_default();

        let message = child_text(fault, "faultstring")
            .or_else(|| {
                fault
                    .get_child("Reason")
                    .and_then(|reason| child_text(reason, "Text"))
            })
            .unwrap_or_default();

        let actor = child_text(fault, "faultactor").or_else(|| child_text(fault, "Role"));

        let detail = fault
            .get_child("detail")
            .or_else(|| fault.get_child("Detail"))
            .map(element_to_value)
            .filter(|value| !value.is_null());

        Self {
            code,
            message,
            actor,
            detail,
        }
    }
}

fn child_text(parent: &Element, name: &str) -> Option<String> {
    parent
        .get_child(name)
        .and_then(|child| child.get_text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
