//! Transport session: one configured client, its headers and the diagnostic
//! state of its last exchange.
//!
//! A session starts unconfigured. [`TransportSession::configure`] builds a new
//! client from the merged options and drops everything the previous one held
//! (custom headers, captured payloads, recorded faults).
//!
//! Every fault is reported twice: returned from [`TransportSession::call`] as
//! an error, and kept under the operation name for
//! [`TransportSession::last_fault`].

use indexmap::IndexMap;
use mmconfig::ClientConfiguration;
use serde_json::Value;
use serde_yaml::Mapping;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use url::Url;
use xmltree::Element;

use crate::diagnostics::{format_xml, headers_to_map, parse_xml};
use crate::errors::SessionError;
use crate::record::Record;
use crate::soap::{
    SoapFault, SoapHeader, build_soap_request, decode_soap_payload, parse_soap_envelope,
};
use crate::transport::{HttpTransport, InboundResponse, OutboundRequest, TransportOptions};

/// Owner of the configured client of a facade.
#[derive(Default)]
pub struct TransportSession {
    client: Option<SessionClient>,
}

struct SessionClient {
    configuration: ClientConfiguration,
    options: TransportOptions,
    transport: HttpTransport,
    http_headers: Vec<String>,
    soap_headers: Vec<SoapHeader>,
    last_request: Option<String>,
    last_request_headers: Option<String>,
    last_response: Option<String>,
    last_response_headers: Option<String>,
    faults: HashMap<String, SoapFault>,
}

impl TransportSession {
    /// Creates an unconfigured session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session configured with `overrides`.
    pub fn with_overrides(overrides: &Mapping) -> Result<Self, SessionError> {
        let mut session = Self::new();
        session.configure(overrides)?;
        Ok(session)
    }

    /// Merges `overrides` onto the built-in defaults and installs a new
    /// client. On error the current client, if any, is kept.
    pub fn configure(&mut self, overrides: &Mapping) -> Result<(), SessionError> {
        let configuration = ClientConfiguration::with_overrides(overrides)?;
        self.configure_with(configuration)
    }

    /// Installs a new client built from an already resolved configuration.
    pub fn configure_with(&mut self, configuration: ClientConfiguration) -> Result<(), SessionError> {
        let options = TransportOptions::from_configuration(&configuration)?;
        let transport = HttpTransport::new(&options)?;

        info!(
            location = %options.location,
            soap_version = ?options.soap_version,
            trace = options.trace,
            "Configured SOAP transport session"
        );

        if self.client.is_some() {
            debug!("Discarding previous session state");
        }

        self.client = Some(SessionClient {
            http_headers: options.header_lines.clone(),
            configuration,
            options,
            transport,
            soap_headers: Vec::new(),
            last_request: None,
            last_request_headers: None,
            last_response: None,
            last_response_headers: None,
            faults: HashMap::new(),
        });

        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Effective configuration of the current client
    pub fn configuration(&self) -> Option<&ClientConfiguration> {
        self.client.as_ref().map(|client| &client.configuration)
    }

    pub fn options(&self) -> Option<&TransportOptions> {
        self.client.as_ref().map(|client| &client.options)
    }

    /// URL the envelopes are posted to
    pub fn location(&self) -> Option<&Url> {
        self.client.as_ref().map(|client| &client.options.location)
    }

    /// Points the current client at another location and returns the previous
    /// one.
    pub fn set_location(&mut self, location: &str) -> Result<Url, SessionError> {
        let client = self.client.as_mut().ok_or(SessionError::NotConfigured)?;
        let location = Url::parse(location)
            .map_err(|e| SessionError::invalid_option(mmconfig::keys::WSDL_URL, e))?;

        info!(location = %location, "Changing service location");
        Ok(std::mem::replace(&mut client.options.location, location))
    }

    /// Last request envelope, pretty-printed when it parses.
    pub fn last_request(&self) -> Option<String> {
        self.last_request_raw().map(format_xml)
    }

    /// Last request envelope, as sent
    pub fn last_request_raw(&self) -> Option<&str> {
        self.client.as_ref()?.last_request.as_deref()
    }

    pub fn last_request_document(&self) -> Option<Element> {
        self.last_request_raw().and_then(parse_xml)
    }

    pub fn last_request_headers(&self) -> Option<&str> {
        self.client.as_ref()?.last_request_headers.as_deref()
    }

    pub fn last_request_header_map(&self) -> Option<IndexMap<String, String>> {
        self.last_request_headers().map(headers_to_map)
    }

    /// Last response body, pretty-printed when it parses.
    pub fn last_response(&self) -> Option<String> {
        self.last_response_raw().map(format_xml)
    }

    pub fn last_response_raw(&self) -> Option<&str> {
        self.client.as_ref()?.last_response.as_deref()
    }

    pub fn last_response_document(&self) -> Option<Element> {
        self.last_response_raw().and_then(parse_xml)
    }

    pub fn last_response_headers(&self) -> Option<&str> {
        self.client.as_ref()?.last_response_headers.as_deref()
    }

    pub fn last_response_header_map(&self) -> Option<IndexMap<String, String>> {
        self.last_response_headers().map(headers_to_map)
    }

    /// Sets a custom HTTP header, replacing any line with the same name.
    ///
    /// Returns `false` when the session is unconfigured or `name` is empty.
    pub fn set_header(&mut self, name: &str, value: &str) -> bool {
        let name = name.trim();
        let Some(client) = self.client.as_mut() else {
            return false;
        };
        if name.is_empty() {
            return false;
        }

        client.http_headers.retain(|line| {
            line.split_once(':')
                .is_none_or(|(existing, _)| !existing.trim().eq_ignore_ascii_case(name))
        });
        client.http_headers.push(format!("{name}: {value}"));

        debug!(header = name, "Custom HTTP header set");
        true
    }

    /// Custom HTTP header lines sent with every call
    pub fn http_headers(&self) -> &[String] {
        self.client
            .as_ref()
            .map(|client| client.http_headers.as_slice())
            .unwrap_or_default()
    }

    /// Installs a SOAP header, replacing the one with the same `name`.
    ///
    /// Without `actor` (or with an empty one) no actor attribute is emitted.
    pub fn set_soap_header(
        &mut self,
        namespace: &str,
        name: &str,
        data: Value,
        must_understand: bool,
        actor: Option<&str>,
    ) -> bool {
        let Some(client) = self.client.as_mut() else {
            return false;
        };

        if let Some(index) = client
            .soap_headers
            .iter()
            .position(|header| header.name == name)
        {
            client.soap_headers.remove(index);
        }

        let header = match actor.filter(|actor| !actor.is_empty()) {
            Some(actor) => SoapHeader::with_actor(namespace, name, data, must_understand, actor),
            None => SoapHeader::new(namespace, name, data, must_understand),
        };
        client.soap_headers.push(header);

        debug!(header = name, namespace, "SOAP header set");
        true
    }

    pub fn soap_headers(&self) -> &[SoapHeader] {
        self.client
            .as_ref()
            .map(|client| client.soap_headers.as_slice())
            .unwrap_or_default()
    }

    /// Calls `operation` with a typed request and binds the response.
    pub fn call<Req, Resp>(&mut self, operation: &str, request: &Req) -> Result<Resp, SessionError>
    where
        Req: Record,
        Resp: Record,
    {
        let value = self.call_value(operation, &request.to_value())?;

        match Resp::from_value(&value) {
            Some(response) => Ok(response),
            None => {
                let fault = SoapFault::client(&format!(
                    "Unable to bind the {operation} response to {}",
                    Resp::TYPE_NAME
                ));
                Err(self.record_fault(operation, fault))
            }
        }
    }

    /// Calls `operation` with an untyped payload and returns the decoded
    /// response element.
    pub fn call_value(&mut self, operation: &str, payload: &Value) -> Result<Value, SessionError> {
        let client = self.client.as_mut().ok_or(SessionError::NotConfigured)?;
        let request = client.prepare(operation, payload)?;

        match client.exchange(operation, &request) {
            Ok(value) => Ok(value),
            Err(fault) => Err(self.record_fault(operation, fault)),
        }
    }

    /// Most recent fault of `operation`
    pub fn last_fault(&self, operation: &str) -> Option<&SoapFault> {
        self.client.as_ref()?.faults.get(operation)
    }

    /// Every recorded fault, by operation name
    pub fn last_faults(&self) -> Option<&HashMap<String, SoapFault>> {
        self.client.as_ref().map(|client| &client.faults)
    }

    fn record_fault(&mut self, operation: &str, fault: SoapFault) -> SessionError {
        warn!(
            operation,
            code = %fault.code,
            message = %fault.message,
            "SOAP call failed"
        );

        if let Some(client) = self.client.as_mut() {
            client.faults.insert(operation.to_string(), fault.clone());
        }

        SessionError::Fault(fault)
    }
}

impl SessionClient {
    fn prepare(&mut self, operation: &str, payload: &Value) -> Result<OutboundRequest, SessionError> {
        let body = build_soap_request(
            self.options.soap_version,
            &self.options.target_namespace,
            operation,
            payload,
            &self.soap_headers,
        )?;

        let request = OutboundRequest {
            location: self.options.location.clone(),
            headers: self.options.request_headers(operation, &self.http_headers),
            body,
        };

        if self.options.trace {
            self.last_request = Some(request.body.clone());
            self.last_request_headers = Some(request.header_block());
            self.last_response = None;
            self.last_response_headers = None;
        }

        Ok(request)
    }

    fn exchange(&mut self, operation: &str, request: &OutboundRequest) -> Result<Value, SoapFault> {
        debug!(operation, location = %request.location, "Sending SOAP request");

        let response = self
            .transport
            .send(request)
            .map_err(|e| SoapFault::transport(&e.to_string()))?;

        debug!(operation, status = response.status, "SOAP response received");

        if self.options.trace {
            self.last_response = Some(response.body.clone());
            self.last_response_headers = Some(response.header_block());
        }

        decode_response(&response)
    }
}

fn decode_response(response: &InboundResponse) -> Result<Value, SoapFault> {
    let envelope = match parse_soap_envelope(response.body.as_bytes()) {
        Ok(envelope) => envelope,
        Err(_) if !response.is_success() => {
            return Err(SoapFault::transport(&status_message(response)));
        }
        Err(e) => {
            return Err(SoapFault::client(&format!(
                "Looks like we got no SOAP document: {e}"
            )));
        }
    };

    if let Some(fault) = envelope.fault() {
        return Err(fault);
    }

    if !response.is_success() {
        return Err(SoapFault::transport(&status_message(response)));
    }

    decode_soap_payload(response.body.as_bytes())
        .map_err(|e| SoapFault::client(&format!("Unable to decode the SOAP body: {e}")))?
        .ok_or_else(|| SoapFault::client("Empty SOAP body"))
}

fn status_message(response: &InboundResponse) -> String {
    if response.reason.is_empty() {
        format!("HTTP status {}", response.status)
    } else {
        response.reason.clone()
    }
}
