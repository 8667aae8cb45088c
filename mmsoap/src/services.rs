//! Services SOAP : une structure par famille d'opérations
//!
//! Chaque service appelle son opération au travers de la
//! [`TransportSession`] qu'on lui passe et garde la dernière réponse reçue.
//! Les faults restent consultables par nom d'opération via
//! [`TransportSession::last_fault`].

use mmwsdl::{SoapFault, TransportSession};
use tracing::debug;

use crate::error::Result;
use crate::records::{
    CheckUserRequestType, CheckUserResponseType, GetBlockedNumbersRequestType,
    GetBlockedNumbersResponseType, SendMessagesRequestType, SendMessagesResponseType,
};

/// Nom de l'opération de vérification du compte
pub const CHECK_USER: &str = "checkUser";

/// Nom de l'opération d'envoi
pub const SEND_MESSAGES: &str = "sendMessages";

/// Nom de l'opération de lecture des numéros bloqués
pub const GET_BLOCKED_NUMBERS: &str = "getBlockedNumbers";

/// Service `checkUser`
#[derive(Debug, Default)]
pub struct ServiceCheck {
    result: Option<CheckUserResponseType>,
}

impl ServiceCheck {
    pub fn check_user(
        &mut self,
        session: &mut TransportSession,
        request: &CheckUserRequestType,
    ) -> Result<CheckUserResponseType> {
        debug!(operation = CHECK_USER, "Calling service");
        let response: CheckUserResponseType = session.call(CHECK_USER, request)?;
        self.result = Some(response.clone());
        Ok(response)
    }

    /// Dernière réponse reçue
    pub fn result(&self) -> Option<&CheckUserResponseType> {
        self.result.as_ref()
    }

    pub fn last_error<'a>(&self, session: &'a TransportSession) -> Option<&'a SoapFault> {
        session.last_fault(CHECK_USER)
    }
}

/// Service `sendMessages`
#[derive(Debug, Default)]
pub struct ServiceSend {
    result: Option<SendMessagesResponseType>,
}

impl ServiceSend {
    pub fn send_messages(
        &mut self,
        session: &mut TransportSession,
        request: &SendMessagesRequestType,
    ) -> Result<SendMessagesResponseType> {
        debug!(operation = SEND_MESSAGES, "Calling service");
        let response: SendMessagesResponseType = session.call(SEND_MESSAGES, request)?;
        self.result = Some(response.clone());
        Ok(response)
    }

    pub fn result(&self) -> Option<&SendMessagesResponseType> {
        self.result.as_ref()
    }

    pub fn last_error<'a>(&self, session: &'a TransportSession) -> Option<&'a SoapFault> {
        session.last_fault(SEND_MESSAGES)
    }
}

/// Service `getBlockedNumbers`
#[derive(Debug, Default)]
pub struct ServiceGet {
    result: Option<GetBlockedNumbersResponseType>,
}

impl ServiceGet {
    pub fn get_blocked_numbers(
        &mut self,
        session: &mut TransportSession,
        request: &GetBlockedNumbersRequestType,
    ) -> Result<GetBlockedNumbersResponseType> {
        debug!(operation = GET_BLOCKED_NUMBERS, "Calling service");
        let response: GetBlockedNumbersResponseType =
            session.call(GET_BLOCKED_NUMBERS, request)?;
        self.result = Some(response.clone());
        Ok(response)
    }

    pub fn result(&self) -> Option<&GetBlockedNumbersResponseType> {
        self.result.as_ref()
    }

    pub fn last_error<'a>(&self, session: &'a TransportSession) -> Option<&'a SoapFault> {
        session.last_fault(GET_BLOCKED_NUMBERS)
    }
}
