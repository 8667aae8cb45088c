//! Option keys understood by the MMSoap transport session, and the numeric
//! values some of them take.

pub const WSDL_URL: &str = "wsdl_url";
pub const WSDL_TARGET_NAMESPACE: &str = "wsdl_target_namespace";
pub const WSDL_LOGIN: &str = "wsdl_login";
pub const WSDL_PASSWORD: &str = "wsdl_password";
pub const WSDL_TRACE: &str = "wsdl_trace";
pub const WSDL_EXCEPTIONS: &str = "wsdl_exceptions";
pub const WSDL_CACHE_WSDL: &str = "wsdl_cache_wsdl";
pub const WSDL_STREAM_CONTEXT: &str = "wsdl_stream_context";
pub const WSDL_SOAP_VERSION: &str = "wsdl_soap_version";
pub const WSDL_COMPRESSION: &str = "wsdl_compression";
pub const WSDL_ENCODING: &str = "wsdl_encoding";
pub const WSDL_CONNECTION_TIMEOUT: &str = "wsdl_connection_timeout";
pub const WSDL_TYPEMAP: &str = "wsdl_typemap";
pub const WSDL_USER_AGENT: &str = "wsdl_user_agent";
pub const WSDL_FEATURES: &str = "wsdl_features";
pub const WSDL_KEEP_ALIVE: &str = "wsdl_keep_alive";
pub const WSDL_PROXY_HOST: &str = "wsdl_proxy_host";
pub const WSDL_PROXY_PORT: &str = "wsdl_proxy_port";
pub const WSDL_PROXY_LOGIN: &str = "wsdl_proxy_login";
pub const WSDL_PROXY_PASSWORD: &str = "wsdl_proxy_password";
pub const WSDL_LOCAL_CERT: &str = "wsdl_local_cert";
pub const WSDL_PASSPHRASE: &str = "wsdl_passphrase";
pub const WSDL_AUTHENTICATION: &str = "wsdl_authentication";
pub const WSDL_SSL_METHOD: &str = "wsdl_ssl_method";

/// Every recognised key, in the order of the embedded defaults.
pub const ALL: &[&str] = &[
    WSDL_URL,
    WSDL_TARGET_NAMESPACE,
    WSDL_LOGIN,
    WSDL_PASSWORD,
    WSDL_TRACE,
    WSDL_EXCEPTIONS,
    WSDL_CACHE_WSDL,
    WSDL_STREAM_CONTEXT,
    WSDL_SOAP_VERSION,
    WSDL_COMPRESSION,
    WSDL_ENCODING,
    WSDL_CONNECTION_TIMEOUT,
    WSDL_TYPEMAP,
    WSDL_USER_AGENT,
    WSDL_FEATURES,
    WSDL_KEEP_ALIVE,
    WSDL_PROXY_HOST,
    WSDL_PROXY_PORT,
    WSDL_PROXY_LOGIN,
    WSDL_PROXY_PASSWORD,
    WSDL_LOCAL_CERT,
    WSDL_PASSPHRASE,
    WSDL_AUTHENTICATION,
    WSDL_SSL_METHOD,
];

/// Prefix shared by all option keys.
pub const KEY_PREFIX: &str = "wsdl_";

// wsdl_soap_version
pub const SOAP_1_1: i64 = 1;
pub const SOAP_1_2: i64 = 2;

// wsdl_cache_wsdl
pub const WSDL_CACHE_NONE: i64 = 0;
pub const WSDL_CACHE_DISK: i64 = 1;
pub const WSDL_CACHE_MEMORY: i64 = 2;
pub const WSDL_CACHE_BOTH: i64 = 3;

// wsdl_features (bitmask)
pub const SOAP_SINGLE_ELEMENT_ARRAYS: i64 = 1;
pub const SOAP_WAIT_ONE_WAY_CALLS: i64 = 2;
pub const SOAP_USE_XSI_ARRAY_TYPE: i64 = 4;

// wsdl_authentication
pub const SOAP_AUTHENTICATION_BASIC: i64 = 0;
pub const SOAP_AUTHENTICATION_DIGEST: i64 = 1;

// wsdl_compression (bitmask)
pub const SOAP_COMPRESSION_GZIP: i64 = 0x00;
pub const SOAP_COMPRESSION_DEFLATE: i64 = 0x10;
pub const SOAP_COMPRESSION_ACCEPT: i64 = 0x20;

/// Returns the canonical key for `name`: lower-cased, with the `wsdl_`
/// prefix added when the caller used the short form (`url`, `trace`, ...).
pub fn canonical(name: &str) -> Option<&'static str> {
    let lowered = name.trim().to_lowercase();
    ALL.iter().copied().find(|key| {
        *key == lowered || key.strip_prefix(KEY_PREFIX) == Some(lowered.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_accepts_short_and_long_forms() {
        assert_eq!(canonical("wsdl_trace"), Some(WSDL_TRACE));
        assert_eq!(canonical("trace"), Some(WSDL_TRACE));
        assert_eq!(canonical("WSDL_URL"), Some(WSDL_URL));
        assert_eq!(canonical("proxy_port"), Some(WSDL_PROXY_PORT));
        assert_eq!(canonical("tracing"), None);
    }
}
