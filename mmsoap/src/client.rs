//! Client MMSoap : façade des trois opérations du service

use chrono::{DateTime, Utc};
use mmconfig::ClientConfiguration;
use mmwsdl::TransportSession;
use serde_yaml::Mapping;
use tracing::info;

use crate::error::{MMSoapError, Result};
use crate::records::{
    AuthenticationType, CheckUserRequestType, CheckUserResultType, GetBlockedNumbersBodyType,
    GetBlockedNumbersRequestType, GetBlockedNumbersResultType, MessageListType, MessageType,
    RecipientType, RecipientsType, SendMessagesBodyType, SendMessagesRequestType,
    SendMessagesResultType,
};
use crate::services::{
    CHECK_USER, GET_BLOCKED_NUMBERS, SEND_MESSAGES, ServiceCheck, ServiceGet, ServiceSend,
};

/// Nombre maximal de numéros bloqués demandés par [`MMSoap::get_blocked_numbers`]
pub const BLOCKED_NUMBERS_LIMIT: u32 = 5;

/// Options d'un envoi
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendOptions {
    /// Date d'envoi différé
    pub scheduled: Option<DateTime<Utc>>,
    /// Expéditeur affiché
    pub origin: Option<String>,
    pub delivery_report: bool,
    pub sequence_number: u32,
    /// Identifiants (`uid`) des destinataires, dans leur ordre
    pub message_ids: Vec<u32>,
}

/// Client MMSoap
///
/// Possède la session de transport partagée par ses trois services.
pub struct MMSoap {
    session: TransportSession,
    authentication: AuthenticationType,
    service_check: ServiceCheck,
    service_get: ServiceGet,
    service_send: ServiceSend,
}

impl MMSoap {
    /// Crée un client dont la session fusionne `overrides` avec les options
    /// par défaut
    pub fn new(user_id: &str, password: &str, overrides: &Mapping) -> Result<Self> {
        let session = TransportSession::with_overrides(overrides)?;
        Ok(Self::with_session(user_id, password, session))
    }

    /// Crée un client à partir d'une configuration déjà résolue
    pub fn from_configuration(
        user_id: &str,
        password: &str,
        configuration: ClientConfiguration,
    ) -> Result<Self> {
        let mut session = TransportSession::new();
        session.configure_with(configuration)?;
        Ok(Self::with_session(user_id, password, session))
    }

    /// Crée un client depuis le fichier de configuration et l'environnement
    pub fn from_config(user_id: &str, password: &str) -> Result<Self> {
        let configuration = ClientConfiguration::load()?;
        Self::from_configuration(user_id, password, configuration)
    }

    fn with_session(user_id: &str, password: &str, session: TransportSession) -> Self {
        if let Some(location) = session.location() {
            info!(user_id, location = %location, "MMSoap client ready");
        }

        Self {
            session,
            authentication: AuthenticationType::new(user_id, password),
            service_check: ServiceCheck::default(),
            service_get: ServiceGet::default(),
            service_send: ServiceSend::default(),
        }
    }

    /// Détails du compte : type et crédit restant
    pub fn get_user_info(&mut self) -> Result<CheckUserResultType> {
        let request = CheckUserRequestType {
            authentication: Some(self.authentication.clone()),
        };

        self.service_check
            .check_user(&mut self.session, &request)?
            .result
            .ok_or(MMSoapError::MissingResult(CHECK_USER))
    }

    /// Envoie `content` à un seul destinataire
    pub fn send_message(
        &mut self,
        to: &str,
        content: &str,
        options: &SendOptions,
    ) -> Result<SendMessagesResultType> {
        self.send_messages(&[to], content, options)
    }

    /// Envoie un même message à plusieurs destinataires
    pub fn send_messages<S: AsRef<str>>(
        &mut self,
        recipients: &[S],
        content: &str,
        options: &SendOptions,
    ) -> Result<SendMessagesResultType> {
        if recipients.is_empty() {
            return Err(MMSoapError::NoRecipients);
        }

        let request = self.send_request(recipients, content, options);
        info!(recipients = recipients.len(), "Sending message");

        self.service_send
            .send_messages(&mut self.session, &request)?
            .result
            .ok_or(MMSoapError::MissingResult(SEND_MESSAGES))
    }

    fn send_request<S: AsRef<str>>(
        &self,
        recipients: &[S],
        content: &str,
        options: &SendOptions,
    ) -> SendMessagesRequestType {
        let recipients = RecipientsType::from_items(
            recipients
                .iter()
                .enumerate()
                .map(|(i, number)| {
                    RecipientType::new(number.as_ref(), options.message_ids.get(i).copied())
                })
                .collect(),
        );

        let message = MessageType {
            sequence_number: Some(options.sequence_number),
            origin: options.origin.clone(),
            recipients: Some(recipients),
            delivery_report: Some(options.delivery_report),
            scheduled: options.scheduled,
            content: Some(content.to_string()),
            ..Default::default()
        };

        SendMessagesRequestType {
            authentication: Some(self.authentication.clone()),
            request_body: Some(SendMessagesBodyType {
                messages: Some(MessageListType::from_items(vec![message])),
            }),
        }
    }

    /// Numéros ayant refusé les messages (au plus [`BLOCKED_NUMBERS_LIMIT`])
    pub fn get_blocked_numbers(&mut self) -> Result<GetBlockedNumbersResultType> {
        let request = GetBlockedNumbersRequestType {
            authentication: Some(self.authentication.clone()),
            request_body: Some(GetBlockedNumbersBodyType {
                maximum_recipients: Some(BLOCKED_NUMBERS_LIMIT),
            }),
        };

        self.service_get
            .get_blocked_numbers(&mut self.session, &request)?
            .result
            .ok_or(MMSoapError::MissingResult(GET_BLOCKED_NUMBERS))
    }

    pub fn session(&self) -> &TransportSession {
        &self.session
    }

    /// Accès à la session pour les en-têtes et le changement d'adresse
    pub fn session_mut(&mut self) -> &mut TransportSession {
        &mut self.session
    }

    pub fn service_check(&self) -> &ServiceCheck {
        &self.service_check
    }

    pub fn service_send(&self) -> &ServiceSend {
        &self.service_send
    }

    pub fn service_get(&self) -> &ServiceGet {
        &self.service_get
    }
}
