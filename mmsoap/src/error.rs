//! Gestion des erreurs du client MMSoap

use mmwsdl::{SessionError, SoapFault};
use thiserror::Error;

/// Type Result personnalisé pour mmsoap
pub type Result<T> = std::result::Result<T, MMSoapError>;

/// Erreurs possibles lors de l'utilisation du client MMSoap
#[derive(Error, Debug)]
pub enum MMSoapError {
    /// Erreur de la session de transport (fault SOAP, configuration, encodage)
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Envoi demandé sans destinataire
    #[error("No recipient given")]
    NoRecipients,

    /// Réponse valide mais sans élément `result`
    #[error("Response of {0} carries no result")]
    MissingResult(&'static str),
}

impl MMSoapError {
    /// Fault SOAP à l'origine de l'erreur, s'il y en a un
    pub fn fault(&self) -> Option<&SoapFault> {
        match self {
            Self::Session(error) => error.fault(),
            _ => None,
        }
    }
}
