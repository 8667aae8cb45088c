//! HTTP side of a transport session.
//!
//! [`TransportOptions`] is the typed view of a resolved
//! [`ClientConfiguration`]; [`HttpTransport`] posts envelopes with a blocking
//! `ureq` agent that never turns HTTP error statuses into errors, so the body
//! of a `500` carrying a SOAP Fault can still be read.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mmconfig::{ClientConfiguration, keys};
use serde_yaml::Value as YamlValue;
use std::time::Duration;
use tracing::{debug, warn};
use ureq::{Agent, Proxy};
use url::Url;

use crate::errors::SessionError;
use crate::soap::SoapVersion;

const DEFAULT_ENCODING: &str = "utf-8";

fn is_utf8_label(encoding: &str) -> bool {
    encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8")
}

/// Flags of the `wsdl_features` bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Features {
    pub single_element_arrays: bool,
    pub wait_one_way_calls: bool,
    pub xsi_array_type: bool,
}

impl Features {
    pub fn from_bits(bits: i64) -> Self {
        Self {
            single_element_arrays: bits & keys::SOAP_SINGLE_ELEMENT_ARRAYS != 0,
            wait_one_way_calls: bits & keys::SOAP_WAIT_ONE_WAY_CALLS != 0,
            xsi_array_type: bits & keys::SOAP_USE_XSI_ARRAY_TYPE != 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Basic,
    Digest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub port: Option<u16>,
    pub login: Option<String>,
    pub password: Option<String>,
}

impl ProxySettings {
    /// Proxy URL in the form `http://[login:password@]host[:port]`
    pub fn to_url(&self) -> String {
        let credentials = match (&self.login, &self.password) {
            (Some(login), Some(password)) => format!("{login}:{password}@"),
            (Some(login), None) => format!("{login}@"),
            _ => String::new(),
        };

        match self.port {
            Some(port) => format!("http://{credentials}{}:{port}", self.host),
            None => format!("http://{credentials}{}", self.host),
        }
    }
}

/// Typed transport options of one session.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Service URL as configured (may end with `?wsdl`)
    pub endpoint: Url,
    /// URL the envelopes are posted to
    pub location: Url,
    pub target_namespace: String,
    pub login: Option<String>,
    pub password: Option<String>,
    pub authentication: AuthMode,
    pub trace: bool,
    pub exceptions: bool,
    pub soap_version: SoapVersion,
    pub encoding: String,
    pub connection_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub features: Features,
    pub keep_alive: bool,
    pub proxy: Option<ProxySettings>,
    /// Extra `Name: value` lines from the stream context
    pub header_lines: Vec<String>,
    pub cache_wsdl: Option<i64>,
    pub compression: Option<i64>,
    pub local_cert: Option<String>,
    pub ssl_method: Option<i64>,
}

impl TransportOptions {
    pub fn from_configuration(config: &ClientConfiguration) -> Result<Self, SessionError> {
        let raw_url = config
            .url()
            .ok_or_else(|| SessionError::invalid_option(keys::WSDL_URL, "no endpoint URL"))?;
        let endpoint =
            Url::parse(&raw_url).map_err(|e| SessionError::invalid_option(keys::WSDL_URL, e))?;
        let location = service_location(&endpoint);

        let soap_version = match config.soap_version() {
            Some(value) => SoapVersion::from_option(value).ok_or_else(|| {
                SessionError::invalid_option(keys::WSDL_SOAP_VERSION, format!("{value}"))
            })?,
            None => SoapVersion::default(),
        };

        let connection_timeout = match config.connection_timeout() {
            Some(seconds) if seconds > 0 => Some(Duration::from_secs(seconds as u64)),
            Some(0) | None => None,
            Some(seconds) => {
                return Err(SessionError::invalid_option(
                    keys::WSDL_CONNECTION_TIMEOUT,
                    format!("negative timeout {seconds}"),
                ));
            }
        };

        let authentication = match config.authentication() {
            Some(keys::SOAP_AUTHENTICATION_DIGEST) => {
                warn!("Digest authentication is not supported, using basic authentication");
                AuthMode::Digest
            }
            _ => AuthMode::Basic,
        };

        let proxy = match config.proxy_host() {
            Some(host) => {
                let port = config
                    .proxy_port()
                    .map(|port| {
                        u16::try_from(port)
                            .map_err(|e| SessionError::invalid_option(keys::WSDL_PROXY_PORT, e))
                    })
                    .transpose()?;
                Some(ProxySettings {
                    host,
                    port,
                    login: config.proxy_login(),
                    password: config.proxy_password(),
                })
            }
            None => None,
        };

        // Les enveloppes sont toujours écrites en UTF-8
        let encoding = config
            .encoding()
            .unwrap_or_else(|| DEFAULT_ENCODING.to_string());
        if !is_utf8_label(&encoding) {
            return Err(SessionError::invalid_option(
                keys::WSDL_ENCODING,
                format!("unsupported encoding {encoding}, payloads are UTF-8"),
            ));
        }

        let header_lines = config
            .stream_context()
            .map(stream_context_headers)
            .unwrap_or_default();

        let options = Self {
            endpoint,
            location,
            target_namespace: config.target_namespace().unwrap_or_default(),
            login: config.login(),
            password: config.password(),
            authentication,
            trace: config.trace().unwrap_or(true),
            exceptions: config.exceptions().unwrap_or(true),
            soap_version,
            encoding,
            connection_timeout,
            user_agent: config.user_agent(),
            features: Features::from_bits(config.features().unwrap_or(0)),
            keep_alive: config.keep_alive().unwrap_or(true),
            proxy,
            header_lines,
            cache_wsdl: config.cache_wsdl(),
            compression: config.compression(),
            local_cert: config.local_cert(),
            ssl_method: config.ssl_method(),
        };

        options.log_uninterpreted(config);
        Ok(options)
    }

    fn log_uninterpreted(&self, config: &ClientConfiguration) {
        if let Some(compression) = self.compression {
            debug!(compression, "compression option carried, payloads are sent uncompressed");
        }
        if config.typemap().is_some() {
            debug!("typemap option carried, records define their own conversions");
        }
        if self.local_cert.is_some() || config.passphrase().is_some() {
            warn!("client certificate options are carried but not used by the HTTP agent");
        }
        if let Some(ssl_method) = self.ssl_method {
            debug!(ssl_method, "ssl_method option carried, TLS version is negotiated");
        }
    }

    /// SOAP action URI of `operation`
    pub fn soap_action(&self, operation: &str) -> String {
        format!("{}/{operation}", self.target_namespace.trim_end_matches('/'))
    }

    /// Headers of a call to `operation`, custom `lines` last.
    ///
    /// `lines` are `Name: value` strings; lines without a name are skipped.
    pub fn request_headers(&self, operation: &str, lines: &[String]) -> Vec<(String, String)> {
        let action = self.soap_action(operation);
        let mut headers = vec![(
            "Content-Type".to_string(),
            self.soap_version.content_type(&self.encoding, &action),
        )];

        if let Some(soap_action) = self.soap_version.soap_action_header(&action) {
            headers.push(("SOAPAction".to_string(), soap_action));
        }

        if let Some(user_agent) = &self.user_agent {
            headers.push(("User-Agent".to_string(), user_agent.clone()));
        }

        if let Some(login) = &self.login {
            let password = self.password.as_deref().unwrap_or_default();
            let token = STANDARD.encode(format!("{login}:{password}"));
            headers.push(("Authorization".to_string(), format!("Basic {token}")));
        }

        if !self.keep_alive {
            headers.push(("Connection".to_string(), "close".to_string()));
        }

        for line in lines {
            match line.split_once(':') {
                Some((name, value)) if !name.trim().is_empty() => {
                    headers.push((name.trim().to_string(), value.trim().to_string()));
                }
                _ => debug!(line = %line, "skipping malformed header line"),
            }
        }

        headers
    }
}

/// Drops the `?wsdl` query of a service description URL.
fn service_location(endpoint: &Url) -> Url {
    let mut location = endpoint.clone();
    if location
        .query()
        .is_some_and(|query| query.eq_ignore_ascii_case("wsdl"))
    {
        location.set_query(None);
    }
    location
}

fn stream_context_headers(context: &serde_yaml::Mapping) -> Vec<String> {
    let header = context
        .get("http")
        .and_then(YamlValue::as_mapping)
        .and_then(|http| http.get("header"));

    match header {
        Some(YamlValue::String(block)) => block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Some(YamlValue::Sequence(lines)) => lines
            .iter()
            .filter_map(YamlValue::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Request as sent on the wire.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub location: Url,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl OutboundRequest {
    /// Raw header block, request line first.
    pub fn header_block(&self) -> String {
        let mut target = self.location.path().to_string();
        if let Some(query) = self.location.query() {
            target.push('?');
            target.push_str(query);
        }

        let host = match (self.location.host_str(), self.location.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            _ => String::new(),
        };

        let mut block = format!("POST {target} HTTP/1.1\r\nHost: {host}\r\n");
        for (name, value) in &self.headers {
            block.push_str(&format!("{name}: {value}\r\n"));
        }
        block.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        block
    }
}

/// Response as received, whatever its status.
#[derive(Debug, Clone)]
pub struct InboundResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl InboundResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Raw header block, status line first.
    pub fn header_block(&self) -> String {
        let mut block = format!("HTTP/1.1 {} {}\r\n", self.status, self.reason);
        for (name, value) in &self.headers {
            block.push_str(&format!("{name}: {value}\r\n"));
        }
        block
    }
}

/// Blocking HTTP client of a session.
#[derive(Clone)]
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    pub fn new(options: &TransportOptions) -> Result<Self, SessionError> {
        // Statuts 4xx/5xx lus comme des réponses : un Fault arrive en 500
        let mut builder = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(options.connection_timeout);

        if let Some(proxy) = &options.proxy {
            let proxy = Proxy::new(&proxy.to_url())
                .map_err(|e| SessionError::invalid_option(keys::WSDL_PROXY_HOST, e))?;
            builder = builder.proxy(Some(proxy));
        }

        let agent: Agent = builder.build().into();
        Ok(Self { agent })
    }

    pub fn send(&self, request: &OutboundRequest) -> Result<InboundResponse, ureq::Error> {
        let mut http_request = self.agent.post(request.location.as_str());
        for (name, value) in &request.headers {
            http_request = http_request.header(name.as_str(), value.as_str());
        }

        let mut response = http_request.send(request.body.as_str())?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response.body_mut().read_to_string()?;

        Ok(InboundResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
