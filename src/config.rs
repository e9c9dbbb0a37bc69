use std::env;

use anyhow::{Context, Result, anyhow};

use crate::model::normalize_host;
use crate::transport::{Credentials, TransferMode, TrustPolicy};

pub const DEFAULT_PORT: u16 = 21;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Credentials,
    pub mode: TransferMode,
}

impl SessionConfig {
    pub fn new(host: &str) -> Self {
        Self {
            host: normalize_host(host),
            port: DEFAULT_PORT,
            credentials: Credentials::anonymous(),
            mode: TransferMode::default(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.mode.secure = secure;
        self
    }

    pub fn passive(mut self, passive: bool) -> Self {
        self.mode.passive = passive;
        self
    }

    pub fn binary(mut self, binary: bool) -> Self {
        self.mode.binary = binary;
        self
    }

    pub fn trust(mut self, trust: TrustPolicy) -> Self {
        self.mode.trust = trust;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("FTPDIR_HOST")
            .filter(|host| !host.trim().is_empty())
            .ok_or_else(|| anyhow!("FTPDIR_HOST is not set"))?;
        let mut config = Self::new(host.as_str());

        if let Some(port) = lookup("FTPDIR_PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("FTPDIR_PORT is not a valid port: {port:?}"))?;
        }

        let username = lookup("FTPDIR_USER");
        let password = lookup("FTPDIR_PASSWORD");
        if username.is_some() || password.is_some() {
            config.credentials = Credentials::new(
                username.unwrap_or_else(|| "anonymous".to_string()),
                password.unwrap_or_default(),
            );
        }

        if let Some(secure) = lookup_flag(&lookup, "FTPDIR_SECURE")? {
            config.mode.secure = secure;
        }
        if let Some(passive) = lookup_flag(&lookup, "FTPDIR_PASSIVE")? {
            config.mode.passive = passive;
        }
        if let Some(binary) = lookup_flag(&lookup, "FTPDIR_BINARY")? {
            config.mode.binary = binary;
        }
        if let Some(true) = lookup_flag(&lookup, "FTPDIR_ACCEPT_INVALID_CERTS")? {
            config.mode.trust = TrustPolicy::AcceptInvalidCertificates;
        }

        Ok(config)
    }
}

fn lookup_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(anyhow!("{key} is not a boolean: {value:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::SessionConfig;
    use crate::transport::{Credentials, TrustPolicy};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_are_anonymous_passive_binary_strict() {
        let config = SessionConfig::new("ftp://ftp.example.com");
        assert_eq!(config.host, "ftp.example.com/");
        assert_eq!(config.port, 21);
        assert_eq!(config.credentials, Credentials::anonymous());
        assert!(!config.mode.secure);
        assert!(config.mode.passive);
        assert!(config.mode.binary);
        assert_eq!(config.mode.trust, TrustPolicy::Strict);
    }

    #[test]
    fn env_overrides_every_setting() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("FTPDIR_HOST", "files.example.org"),
            ("FTPDIR_PORT", "2121"),
            ("FTPDIR_USER", "deploy"),
            ("FTPDIR_PASSWORD", "s3cret"),
            ("FTPDIR_SECURE", "yes"),
            ("FTPDIR_PASSIVE", "off"),
            ("FTPDIR_BINARY", "0"),
            ("FTPDIR_ACCEPT_INVALID_CERTS", "TRUE"),
        ]))
        .expect("valid config");

        assert_eq!(config.host, "files.example.org/");
        assert_eq!(config.port, 2121);
        assert_eq!(config.credentials, Credentials::new("deploy", "s3cret"));
        assert!(config.mode.secure);
        assert!(!config.mode.passive);
        assert!(!config.mode.binary);
        assert_eq!(config.mode.trust, TrustPolicy::AcceptInvalidCertificates);
    }

    #[test]
    fn missing_host_is_an_error() {
        let err = SessionConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("FTPDIR_HOST"), "unexpected err: {err}");
    }

    #[test]
    fn malformed_flag_names_the_variable() {
        let err = SessionConfig::from_lookup(lookup_from(&[
            ("FTPDIR_HOST", "h"),
            ("FTPDIR_SECURE", "maybe"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("FTPDIR_SECURE"), "unexpected err: {err}");
    }

    #[test]
    fn malformed_port_is_an_error() {
        let err = SessionConfig::from_lookup(lookup_from(&[
            ("FTPDIR_HOST", "h"),
            ("FTPDIR_PORT", "ftp"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("FTPDIR_PORT"), "unexpected err: {err}");
    }
}
