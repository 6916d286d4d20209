//! RFC 3986 URIs
//!
//! Protocol extensions built on top of JSON-RPC often reference documents or
//! endpoints by URI. This module provides a small parser that splits a URI
//! into its generic components without resolving or normalizing it:
//!
//! ```text
//!   foo://user@example.com:8042/over/there?name=ferret#nose
//!   \_/   \__________________/\_________/ \_________/ \__/
//!    |             |              |            |        |
//! scheme       authority         path        query  fragment
//! ```
//!
//! Schemes are case-insensitive and stored in lower case. An empty port
//! (`http://host:/`) is dropped. Apart from those two normalizations,
//! printing a parsed URI gives back the input, so a `Uri` can travel through
//! JSON with [`UriAdapter`].
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::uri::{Uri, UriScheme};
//!
//! let uri: Uri = "https://user@[::1]:8080/index.html?q=1#top".parse().unwrap();
//! assert_eq!(uri.scheme, UriScheme::HTTPS);
//!
//! let authority = uri.authority.as_ref().unwrap();
//! assert_eq!(authority.userinfo.as_deref(), Some("user"));
//! assert_eq!(authority.host, "::1");
//! assert_eq!(authority.port, Some(8080));
//!
//! assert_eq!(uri.path, "/index.html");
//! assert_eq!(uri.query.as_deref(), Some("q=1"));
//! assert_eq!(uri.fragment.as_deref(), Some("top"));
//! assert_eq!(uri.to_string(), "https://user@[::1]:8080/index.html?q=1#top");
//! ```

use crate::adapter::JsonAdapter;
use crate::enumeration::{Enumeration, EnumerationDomain};
use crate::error::DeserializationError;
use crate::kind::KindType;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// URI parsing failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("URI has no scheme")]
    MissingScheme,

    #[error("Invalid URI scheme: {0}")]
    InvalidScheme(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Unterminated IP literal in authority")]
    UnterminatedIpLiteral,

    #[error("Invalid character {0:?} in URI")]
    InvalidCharacter(char),
}

/// Domain of URI schemes
pub struct UriSchemes;

static SCHEMES: [(&str, Cow<'static, str>); 9] = [
    ("Data", Cow::Borrowed("data")),
    ("File", Cow::Borrowed("file")),
    ("Ftp", Cow::Borrowed("ftp")),
    ("Http", Cow::Borrowed("http")),
    ("Https", Cow::Borrowed("https")),
    ("Mailto", Cow::Borrowed("mailto")),
    ("Urn", Cow::Borrowed("urn")),
    ("Ws", Cow::Borrowed("ws")),
    ("Wss", Cow::Borrowed("wss")),
];

impl EnumerationDomain for UriSchemes {
    type Primitive = Cow<'static, str>;
    type Adapter = SchemeAdapter;
    const NAME: &'static str = "UriScheme";

    fn entries() -> &'static [(&'static str, Cow<'static, str>)] {
        &SCHEMES
    }
}

/// URI scheme; any syntactically valid scheme is accepted
pub type UriScheme = Enumeration<UriSchemes>;

impl UriScheme {
    pub const DATA: UriScheme = UriScheme::new(Cow::Borrowed("data"));
    pub const FILE: UriScheme = UriScheme::new(Cow::Borrowed("file"));
    pub const FTP: UriScheme = UriScheme::new(Cow::Borrowed("ftp"));
    pub const HTTP: UriScheme = UriScheme::new(Cow::Borrowed("http"));
    pub const HTTPS: UriScheme = UriScheme::new(Cow::Borrowed("https"));
    pub const MAILTO: UriScheme = UriScheme::new(Cow::Borrowed("mailto"));
    pub const URN: UriScheme = UriScheme::new(Cow::Borrowed("urn"));
    pub const WS: UriScheme = UriScheme::new(Cow::Borrowed("ws"));
    pub const WSS: UriScheme = UriScheme::new(Cow::Borrowed("wss"));

    pub fn as_str(&self) -> &str {
        self.value()
    }
}

impl From<&str> for UriScheme {
    /// Lower-cases the scheme
    fn from(scheme: &str) -> Self {
        UriScheme::new(Cow::Owned(scheme.to_ascii_lowercase()))
    }
}

/// Adapter for the string primitive behind [`UriScheme`]
pub struct SchemeAdapter;

impl JsonAdapter for SchemeAdapter {
    type Target = Cow<'static, str>;

    fn serialize(value: &Self::Target) -> Value {
        Value::String(value.to_string())
    }

    fn deserialize(json: &Value) -> Result<Self::Target, DeserializationError> {
        json.as_str()
            .map(|s| Cow::Owned(s.to_string()))
            .ok_or_else(|| DeserializationError::unsupported_kind(json))
    }
}

/// Authority component: `[userinfo@]host[:port]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Authority {
    pub userinfo: Option<String>,
    /// Host name or address; IPv6 literals are stored without brackets
    pub host: String,
    pub port: Option<u16>,
}

impl Authority {
    fn parse(text: &str) -> Result<Self, UriError> {
        let (userinfo, hostport) = match text.rfind('@') {
            Some(at) => (Some(text[..at].to_string()), &text[at + 1..]),
            None => (None, text),
        };

        let (host, port) = if let Some(literal) = hostport.strip_prefix('[') {
            let close = literal.find(']').ok_or(UriError::UnterminatedIpLiteral)?;
            let rest = &literal[close + 1..];
            let port = match rest.strip_prefix(':') {
                Some(port) => Some(port),
                None if rest.is_empty() => None,
                None => return Err(UriError::InvalidPort(rest.to_string())),
            };
            (&literal[..close], port)
        } else {
            match hostport.rfind(':') {
                Some(colon) => (&hostport[..colon], Some(&hostport[colon + 1..])),
                None => (hostport, None),
            }
        };

        let port = match port {
            None | Some("") => None,
            Some(port) => Some(
                port.parse::<u16>()
                    .map_err(|_| UriError::InvalidPort(port.to_string()))?,
            ),
        };

        Ok(Self {
            userinfo,
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(userinfo) = &self.userinfo {
            write!(f, "{}@", userinfo)?;
        }
        if self.host.contains(':') {
            write!(f, "[{}]", self.host)?;
        } else {
            f.write_str(&self.host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        Ok(())
    }
}

/// A parsed URI reference with a scheme
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    pub scheme: UriScheme,
    pub authority: Option<Authority>,
    /// Path, possibly empty; kept percent-encoded
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl Uri {
    /// Parse a URI
    ///
    /// ```rust
    /// use jrpc_core::uri::{Uri, UriError, UriScheme};
    ///
    /// let uri = Uri::parse("file:///tmp/notes.txt").unwrap();
    /// assert_eq!(uri.scheme, UriScheme::FILE);
    /// assert_eq!(uri.authority.unwrap().host, "");
    /// assert_eq!(uri.path, "/tmp/notes.txt");
    ///
    /// assert_eq!(Uri::parse("/relative/path"), Err(UriError::MissingScheme));
    /// ```
    pub fn parse(text: &str) -> Result<Self, UriError> {
        if let Some(c) = text.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(UriError::InvalidCharacter(c));
        }

        let colon = text
            .find(|c| matches!(c, ':' | '/' | '?' | '#'))
            .filter(|&i| text[i..].starts_with(':'))
            .ok_or(UriError::MissingScheme)?;
        let scheme = &text[..colon];
        validate_scheme(scheme)?;

        let mut rest = &text[colon + 1..];

        let fragment = match rest.find('#') {
            Some(hash) => {
                let fragment = rest[hash + 1..].to_string();
                rest = &rest[..hash];
                Some(fragment)
            }
            None => None,
        };

        let query = match rest.find('?') {
            Some(mark) => {
                let query = rest[mark + 1..].to_string();
                rest = &rest[..mark];
                Some(query)
            }
            None => None,
        };

        let authority = match rest.strip_prefix("//") {
            Some(hier) => {
                let end = hier.find('/').unwrap_or(hier.len());
                let authority = Authority::parse(&hier[..end])?;
                rest = &hier[end..];
                Some(authority)
            }
            None => None,
        };

        Ok(Self {
            scheme: UriScheme::from(scheme),
            authority,
            path: rest.to_string(),
            query,
            fragment,
        })
    }

    pub fn host(&self) -> Option<&str> {
        self.authority.as_ref().map(|a| a.host.as_str())
    }

    pub fn port(&self) -> Option<u16> {
        self.authority.as_ref().and_then(|a| a.port)
    }
}

fn validate_scheme(scheme: &str) -> Result<(), UriError> {
    let mut chars = scheme.chars();
    match chars.next() {
        None => return Err(UriError::MissingScheme),
        Some(first) if !first.is_ascii_alphabetic() => {
            return Err(UriError::InvalidScheme(scheme.to_string()))
        }
        Some(_) => {}
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Ok(())
    } else {
        Err(UriError::InvalidScheme(scheme.to_string()))
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if let Some(authority) = &self.authority {
            write!(f, "//{}", authority)?;
        }
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

/// [`Uri`] <-> JSON string
pub struct UriAdapter;

impl JsonAdapter for UriAdapter {
    type Target = Uri;

    fn serialize(value: &Uri) -> Value {
        Value::String(value.to_string())
    }

    fn deserialize(json: &Value) -> Result<Uri, DeserializationError> {
        let text = json
            .as_str()
            .ok_or_else(|| DeserializationError::unsupported_kind(json))?;
        Uri::parse(text).map_err(|_| DeserializationError::UnsupportedKindValue {
            kind: KindType::String,
            value: text.to_string(),
        })
    }
}
