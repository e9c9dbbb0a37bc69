use std::io::Cursor;
use std::net::{SocketAddr, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use native_tls::TlsConnector;
use suppaftp::types::FileType;
use suppaftp::{FtpError, Mode, NativeTlsConnector, NativeTlsFtpStream};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::errors::{TransportError, TransportErrorKind};
use crate::session::Session;
use crate::transport::{
    BufferedResponse, Request, Response, TransferMode, Transport, TrustPolicy, Verb,
};

const FTP_CONNECT_ATTEMPTS: usize = 3;
const FTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct SuppaFtpTransport;

impl Session<SuppaFtpTransport> {
    pub fn ftp(config: SessionConfig) -> Self {
        Session::new(config, SuppaFtpTransport)
    }
}

impl Transport for SuppaFtpTransport {
    fn name(&self) -> &'static str {
        "ftp"
    }

    fn open(&self, request: &Request<'_>) -> Result<Box<dyn Response>, TransportError> {
        let mut conn = self.connect(request)?;
        let response = conn.perform(request).map_err(classify_ftp_error)?;
        drop(conn);
        Ok(Box::new(response))
    }
}

impl SuppaFtpTransport {
    fn connect(&self, request: &Request<'_>) -> Result<ControlConnection, TransportError> {
        let mut last_error: Option<TransportError> = None;
        for attempt in 1..=FTP_CONNECT_ATTEMPTS {
            match connect_once(request) {
                Ok(conn) => return Ok(conn),
                Err(err) if err.kind == TransportErrorKind::NetworkFailure => {
                    warn!(
                        "ftp connect to {} failed (attempt {attempt}/{FTP_CONNECT_ATTEMPTS}): {err}",
                        request.host_name()
                    );
                    last_error = Some(err);
                    if attempt < FTP_CONNECT_ATTEMPTS {
                        thread::sleep(Duration::from_millis((attempt as u64) * 120));
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| TransportError::network("unknown ftp connect error")))
    }
}

fn connect_once(request: &Request<'_>) -> Result<ControlConnection, TransportError> {
    let stream = connect_any(&resolve(request.host_name(), request.port)?)?;
    let stream = if request.mode.secure {
        let connector = tls_connector(request.mode)?;
        stream
            .into_secure(connector, request.host_name())
            .map_err(classify_ftp_error)?
    } else {
        stream
    };

    // Owned from here on, so QUIT is sent on every later failure.
    let mut conn = ControlConnection { stream };
    conn.stream
        .login(
            request.credentials.username.as_str(),
            request.credentials.password.as_str(),
        )
        .map_err(classify_ftp_error)?;
    if needs_binary_type(request) {
        conn.stream
            .transfer_type(FileType::Binary)
            .map_err(classify_ftp_error)?;
    }
    conn.stream.set_mode(if request.mode.passive {
        Mode::Passive
    } else {
        Mode::Active
    });
    Ok(conn)
}

// Servers may refuse SIZE in ASCII mode with a 550, which reads as "missing".
fn needs_binary_type(request: &Request<'_>) -> bool {
    request.mode.binary || matches!(request.verb, Verb::GetFileSize)
}

fn resolve(host: &str, port: u16) -> Result<Vec<SocketAddr>, TransportError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|err| TransportError::network(format!("cannot resolve {host}:{port}: {err}")))?
        .collect();
    if addrs.is_empty() {
        return Err(TransportError::network(format!("no address for {host}:{port}")));
    }
    Ok(addrs)
}

fn connect_any(addrs: &[SocketAddr]) -> Result<NativeTlsFtpStream, TransportError> {
    let mut last_error: Option<TransportError> = None;
    for addr in addrs {
        match NativeTlsFtpStream::connect_timeout(*addr, FTP_CONNECT_TIMEOUT) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                debug!("ftp connect to {addr} failed: {err}");
                last_error = Some(classify_ftp_error(err));
            }
        }
    }
    Err(last_error.unwrap_or_else(|| TransportError::network("no address to connect to")))
}

fn tls_connector(mode: TransferMode) -> Result<NativeTlsConnector, TransportError> {
    let mut builder = TlsConnector::builder();
    if mode.trust == TrustPolicy::AcceptInvalidCertificates {
        warn!("ftps certificate validation disabled for this session");
        builder.danger_accept_invalid_certs(true);
        builder.danger_accept_invalid_hostnames(true);
    }
    let connector = builder
        .build()
        .map_err(|err| TransportError::protocol(format!("tls setup failed: {err}")))?;
    Ok(NativeTlsConnector::from(connector))
}

struct ControlConnection {
    stream: NativeTlsFtpStream,
}

impl ControlConnection {
    fn perform(&mut self, request: &Request<'_>) -> Result<BufferedResponse, FtpError> {
        let path = request.server_path();
        let stream = &mut self.stream;
        let response = match request.verb {
            Verb::ListDirectoryDetails => {
                BufferedResponse::from_lines(stream.list(Some(path.as_str()))?)
            }
            Verb::ChangeDirectory => {
                stream.cwd(path.as_str())?;
                BufferedResponse::default()
            }
            Verb::GetFileSize => {
                BufferedResponse::reply_only(stream.size(path.as_str())?.to_string())
            }
            Verb::GetDateTimestamp => BufferedResponse::reply_only(
                stream
                    .mdtm(path.as_str())?
                    .format("%Y%m%d%H%M%S")
                    .to_string(),
            ),
            Verb::DownloadFile => {
                let buffer = stream.retr_as_buffer(path.as_str())?;
                BufferedResponse::new(String::new(), buffer.into_inner())
            }
            Verb::UploadFile(bytes) => {
                let written = stream.put_file(path.as_str(), &mut Cursor::new(bytes))?;
                BufferedResponse::reply_only(written.to_string())
            }
            Verb::DeleteFile => {
                stream.rm(path.as_str())?;
                BufferedResponse::default()
            }
            Verb::Rename { to } => {
                stream.rename(path.as_str(), format!("/{to}").as_str())?;
                BufferedResponse::default()
            }
            Verb::MakeDirectory => {
                stream.mkdir(path.as_str())?;
                BufferedResponse::default()
            }
            Verb::RemoveDirectory => {
                stream.rmdir(path.as_str())?;
                BufferedResponse::default()
            }
        };
        Ok(response)
    }
}

impl Drop for ControlConnection {
    fn drop(&mut self) {
        if let Err(err) = self.stream.quit() {
            debug!("ftp quit failed: {err}");
        }
    }
}

fn classify_ftp_error(err: FtpError) -> TransportError {
    let message = err.to_string();
    match &err {
        FtpError::ConnectionError(_) => TransportError::network(message),
        FtpError::UnexpectedResponse(response) => {
            classify_reply_code(response.status.code(), message)
        }
        _ => TransportError::protocol(message),
    }
}

fn classify_reply_code(code: u32, message: String) -> TransportError {
    match code {
        450 | 550 | 553 => TransportError::not_found(message),
        331 | 332 | 430 | 530 | 532 => TransportError::auth(message),
        421 | 425 | 426 | 434 => TransportError::network(message),
        _ => TransportError::protocol(message),
    }
}
