//! Structures de données du service MessageMedia (namespace
//! `http://xml.m4u.com.au/2009`)

use chrono::{DateTime, Utc};
use mmwsdl::wsdl_record;

wsdl_record! {
    /// Identifiants du compte
    pub struct AuthenticationType = "AuthenticationType" {
        elem "userId" => user_id: Option<String>,
        elem "password" => password: Option<String>,
    }
}

impl AuthenticationType {
    pub fn new(user_id: &str, password: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            password: Some(password.to_string()),
        }
    }
}

// ============= checkUser =============

wsdl_record! {
    pub struct CheckUserRequestType = "CheckUserRequestType" {
        elem "authentication" => authentication: Option<AuthenticationType>,
    }
}

wsdl_record! {
    /// Crédit du compte
    pub struct AccountDetailsType = "AccountDetailsType" {
        attr "type" => kind: Option<String>,
        attr "creditLimit" => credit_limit: Option<i64>,
        attr "creditRemaining" => credit_remaining: Option<i64>,
    }
}

wsdl_record! {
    pub struct CheckUserResultType = "CheckUserResultType" {
        elem "accountDetails" => account_details: Option<AccountDetailsType>,
    }
}

wsdl_record! {
    pub struct CheckUserResponseType = "CheckUserResponseType" {
        elem "result" => result: Option<CheckUserResultType>,
    }
}

// ============= sendMessages =============

wsdl_record! {
    /// Destinataire : numéro au format international, `uid` facultatif
    pub struct RecipientType = "RecipientType" {
        attr "uid" => uid: Option<u32>,
        text "number" => number: String,
    }
}

impl RecipientType {
    pub fn new(number: &str, uid: Option<u32>) -> Self {
        Self {
            uid,
            number: number.to_string(),
        }
    }
}

wsdl_record! {
    pub struct RecipientsType = "RecipientsType" {
        array "recipient" => recipients: RecipientType,
    }
}

wsdl_record! {
    /// Message à envoyer
    pub struct MessageType = "MessageType" {
        attr "format" => format: Option<String>,
        attr "sequenceNumber" => sequence_number: Option<u32>,
        elem "origin" => origin: Option<String>,
        elem "recipients" => recipients: Option<RecipientsType>,
        elem "deliveryReport" => delivery_report: Option<bool>,
        elem "validityPeriod" => validity_period: Option<u32>,
        elem "scheduled" => scheduled: Option<DateTime<Utc>>,
        elem "content" => content: Option<String>,
    }
}

wsdl_record! {
    pub struct MessageListType = "MessageListType" {
        array "message" => messages: MessageType,
        attr "sendMode" => send_mode: Option<String>,
    }
}

wsdl_record! {
    pub struct SendMessagesBodyType = "SendMessagesBodyType" {
        elem "messages" => messages: Option<MessageListType>,
    }
}

wsdl_record! {
    pub struct SendMessagesRequestType = "SendMessagesRequestType" {
        elem "authentication" => authentication: Option<AuthenticationType>,
        elem "requestBody" => request_body: Option<SendMessagesBodyType>,
    }
}

wsdl_record! {
    /// Bilan d'un envoi
    pub struct SendMessagesResultType = "SendMessagesResultType" {
        attr "sent" => sent: Option<u32>,
        attr "scheduled" => scheduled: Option<u32>,
        attr "failed" => failed: Option<u32>,
        elem "accountDetails" => account_details: Option<AccountDetailsType>,
    }
}

wsdl_record! {
    pub struct SendMessagesResponseType = "SendMessagesResponseType" {
        elem "result" => result: Option<SendMessagesResultType>,
    }
}

// ============= getBlockedNumbers =============

wsdl_record! {
    pub struct GetBlockedNumbersBodyType = "GetBlockedNumbersBodyType" {
        elem "maximumRecipients" => maximum_recipients: Option<u32>,
    }
}

wsdl_record! {
    pub struct GetBlockedNumbersRequestType = "GetBlockedNumbersRequestType" {
        elem "authentication" => authentication: Option<AuthenticationType>,
        elem "requestBody" => request_body: Option<GetBlockedNumbersBodyType>,
    }
}

wsdl_record! {
    /// Numéros bloqués : `found` au total, `returned` dans cette réponse
    pub struct GetBlockedNumbersResultType = "GetBlockedNumbersResultType" {
        attr "found" => found: Option<u32>,
        attr "returned" => returned: Option<u32>,
        elem "recipients" => recipients: Option<RecipientsType>,
    }
}

wsdl_record! {
    pub struct GetBlockedNumbersResponseType = "GetBlockedNumbersResponseType" {
        elem "result" => result: Option<GetBlockedNumbersResultType>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mmwsdl::{Record, SequenceAdapter, binder};
    use serde_json::json;

    #[test]
    fn message_serializes_in_schema_order() {
        let message = MessageType {
            sequence_number: Some(1),
            origin: Some("MyCompany".into()),
            recipients: Some(RecipientsType::from_items(vec![
                RecipientType::new("61400000001", Some(7)),
                RecipientType::new("61400000002", None),
            ])),
            delivery_report: Some(false),
            scheduled: Some(Utc.with_ymd_and_hms(2014, 5, 1, 10, 30, 0).unwrap()),
            content: Some("hello".into()),
            ..Default::default()
        };

        let value = message.to_value();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec![
                "@sequenceNumber",
                "origin",
                "recipients",
                "deliveryReport",
                "scheduled",
                "content"
            ]
        );
        assert_eq!(
            value["recipients"],
            json!({ "recipient": [
                { "@uid": 7, "$text": "61400000001" },
                { "$text": "61400000002" }
            ] })
        );
        assert_eq!(value["scheduled"], json!("2014-05-01T10:30:00Z"));
    }

    #[test]
    fn request_builds_from_an_option_bag() {
        let bag = json!({
            "authentication": { "userId": "alice", "password": "secret" },
            "RequestBody": { "maximumRecipients": 5 },
            "unknown": true
        });
        let mut request = GetBlockedNumbersRequestType::default();
        let bound = binder::bind(&mut request, bag.as_object().unwrap());

        assert_eq!(bound, 2);
        assert_eq!(
            request.authentication,
            Some(AuthenticationType::new("alice", "secret"))
        );
        assert_eq!(
            request.request_body.and_then(|body| body.maximum_recipients),
            Some(5)
        );
    }

    #[test]
    fn three_recipients_are_sent_in_order() {
        let mut recipients = RecipientsType::default();
        for number in ["61400000001", "61400000002", "61400000003"] {
            assert!(recipients.add(RecipientType::new(number, None)));
        }

        let sent: Vec<&str> = recipients
            .to_send()
            .unwrap()
            .iter()
            .map(|recipient| recipient.number.as_str())
            .collect();
        assert_eq!(sent, vec!["61400000001", "61400000002", "61400000003"]);
    }

    #[test]
    fn send_result_decodes_attributes() {
        let result = SendMessagesResultType::from_value(&json!({
            "@sent": "2",
            "@scheduled": "0",
            "@failed": "1",
            "accountDetails": { "@type": "daily", "@creditLimit": "500", "@creditRemaining": "448" }
        }))
        .unwrap();

        assert_eq!(result.sent, Some(2));
        assert_eq!(result.failed, Some(1));
        assert_eq!(
            result.account_details.and_then(|details| details.credit_remaining),
            Some(448)
        );
    }
}
