use std::fmt;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Http(reqwest::Error),
    Config(String),
    LoginRejected(StatusCode, String),
    /// A request came back unauthorized after it had already been replayed
    /// once with a renewed credential. Terminal.
    AlreadyRetried(StatusCode),
    /// The renewal exchange itself failed. Every caller parked on that
    /// exchange receives the same reason.
    RenewalFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Json(err) => write!(f, "json error: {err}"),
            Error::Http(err) => write!(f, "http error: {err}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::LoginRejected(status, body) => {
                write!(f, "login rejected: status={status} body='{body}'")
            }
            Error::AlreadyRetried(status) => {
                write!(f, "unauthorized after renewal retry: status={status}")
            }
            Error::RenewalFailed(reason) => write!(f, "credential renewal failed: {reason}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}
