use std::fmt;

use crate::errors::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb<'a> {
    ListDirectoryDetails,
    ChangeDirectory,
    GetFileSize,
    GetDateTimestamp,
    DownloadFile,
    UploadFile(&'a [u8]),
    DeleteFile,
    Rename { to: &'a str },
    MakeDirectory,
    RemoveDirectory,
}

impl Verb<'_> {
    pub fn command(&self) -> &'static str {
        match self {
            Self::ListDirectoryDetails => "LIST",
            Self::ChangeDirectory => "CWD",
            Self::GetFileSize => "SIZE",
            Self::GetDateTimestamp => "MDTM",
            Self::DownloadFile => "RETR",
            Self::UploadFile(_) => "STOR",
            Self::DeleteFile => "DELE",
            Self::Rename { .. } => "RNFR",
            Self::MakeDirectory => "MKD",
            Self::RemoveDirectory => "RMD",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new("anonymous", "")
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrustPolicy {
    #[default]
    Strict,
    AcceptInvalidCertificates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferMode {
    pub secure: bool,
    pub passive: bool,
    pub binary: bool,
    pub trust: TrustPolicy,
}

impl Default for TransferMode {
    fn default() -> Self {
        Self {
            secure: false,
            passive: true,
            binary: true,
            trust: TrustPolicy::Strict,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub verb: Verb<'a>,
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
    pub credentials: &'a Credentials,
    pub mode: TransferMode,
}

impl Request<'_> {
    pub fn url(&self) -> String {
        format!("ftp://{}{}", self.host, self.path)
    }

    pub fn host_name(&self) -> &str {
        self.host.trim_end_matches('/')
    }

    pub fn server_path(&self) -> String {
        format!("/{}", self.path)
    }
}

pub trait Response: Send {
    fn reply(&self) -> &str;
    fn lines(&mut self) -> Result<Vec<String>, TransportError>;
    fn bytes(&mut self) -> Result<Vec<u8>, TransportError>;
}

pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;
    fn open(&self, request: &Request<'_>) -> Result<Box<dyn Response>, TransportError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedResponse {
    reply: String,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new(reply: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            reply: reply.into(),
            body,
        }
    }

    pub fn reply_only(reply: impl Into<String>) -> Self {
        Self::new(reply, Vec::new())
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut body = String::new();
        for line in lines {
            body.push_str(line.as_ref());
            body.push_str("\r\n");
        }
        Self::new(String::new(), body.into_bytes())
    }
}

impl Response for BufferedResponse {
    fn reply(&self) -> &str {
        &self.reply
    }

    fn lines(&mut self) -> Result<Vec<String>, TransportError> {
        let text = String::from_utf8_lossy(&self.body);
        Ok(text
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect())
    }

    fn bytes(&mut self) -> Result<Vec<u8>, TransportError> {
        Ok(std::mem::take(&mut self.body))
    }
}

#[cfg(test)]
mod tests {
    use super::{BufferedResponse, Credentials, Request, Response, TransferMode, Verb};

    #[test]
    fn request_formats_fully_qualified_url() {
        let credentials = Credentials::anonymous();
        let request = Request {
            verb: Verb::ListDirectoryDetails,
            host: "ftp.example.com/",
            port: 21,
            path: "pub/incoming/",
            credentials: &credentials,
            mode: TransferMode::default(),
        };
        assert_eq!(request.url(), "ftp://ftp.example.com/pub/incoming/");
        assert_eq!(request.host_name(), "ftp.example.com");
        assert_eq!(request.server_path(), "/pub/incoming/");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("bob", "hunter2"));
        assert!(rendered.contains("bob"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn buffered_lines_round_trip() {
        let mut response = BufferedResponse::from_lines(["first line", "second"]);
        assert_eq!(
            response.lines().expect("lines"),
            vec!["first line".to_string(), "second".to_string()]
        );
    }
}
