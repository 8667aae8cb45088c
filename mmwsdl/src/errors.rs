use thiserror::Error;

use crate::soap::SoapFault;

#[derive(Error, Debug)]
pub enum SessionError {
    // Accès au client avant le premier `configure`
    #[error("Transport session is not configured")]
    NotConfigured,
    #[error(transparent)]
    Fault(#[from] SoapFault),
    #[error("Invalid value for option {option}: {reason}")]
    InvalidOption { option: &'static str, reason: String },
    #[error("Cannot encode SOAP request: {0}")]
    Encode(#[from] xmltree::Error),
    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

impl SessionError {
    pub fn invalid_option(option: &'static str, reason: impl ToString) -> Self {
        SessionError::InvalidOption {
            option,
            reason: reason.to_string(),
        }
    }

    /// The protocol fault carried by this error, if any.
    pub fn fault(&self) -> Option<&SoapFault> {
        match self {
            SessionError::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}
