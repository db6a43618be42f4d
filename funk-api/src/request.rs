#[cfg(feature = "json")]
use serde::Serialize;

use crate::fields::FieldMap;

pub const PROVIDER_PREFIX: &str = "/providers/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(m) => m.as_str(),
        }
    }
}

#[cfg(feature = "json")]
impl Serialize for Method {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Coarse routing category, decided from the path shape alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum Target {
    Site,
    Provider,
    File,
}

impl Target {
    /// The provider prefix is checked before any extension rule.
    /// Extensions match case-sensitively: `/INDEX.HTML` is a file route, even
    /// though static lookups later lower-case the path.
    pub fn from_path(path: &str) -> Self {
        if path.starts_with(PROVIDER_PREFIX) {
            Target::Provider
        } else if path == "/"
            || path.ends_with(".html")
            || path.ends_with(".htm")
            || path.ends_with(".cgi")
        {
            Target::Site
        } else {
            Target::File
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum Provider {
    #[default]
    None,
    Shoutcast,
    Sendeplan,
    User,
}

impl Provider {
    /// Only meaningful for paths already classified as [`Target::Provider`].
    pub fn from_path(path: &str) -> Self {
        if path.ends_with("/shoutcast/") {
            Provider::Shoutcast
        } else if path.ends_with("/sendeplan/") {
            Provider::Sendeplan
        } else if path.ends_with("/users/") {
            Provider::User
        } else {
            Provider::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum Action {
    #[default]
    None,
    Add,
    Edit,
    Remove,
    Login,
}

impl Action {
    /// Value of the `Action` header. Unknown values (`show` included) map to `None`.
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(v) = value else { return Action::None };
        match v.trim().to_ascii_lowercase().as_str() {
            "add" => Action::Add,
            "edit" => Action::Edit,
            "del" => Action::Remove,
            "login" => Action::Login,
            _ => Action::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum RequestMode {
    #[default]
    Sync,
    Async,
}

impl RequestMode {
    /// Value of the `Request-Type` header; anything but `async` is `Sync`.
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("async") => RequestMode::Async,
            _ => RequestMode::Sync,
        }
    }
}

/// Fully classified and decoded request, handed to a request handler.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize))]
pub struct RequestDescriptor {
    pub method: Method,
    /// Request path with the query component removed.
    pub path: String,
    pub target: Target,
    pub provider: Provider,
    pub action: Action,
    pub mode: RequestMode,
    pub user_agent: String,
    pub fields: FieldMap,
}
