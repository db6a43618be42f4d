use funk_api::{Action, Provider, RequestMode, Target};

pub const ACTION_HEADER: &str = "action";
pub const REQUEST_TYPE_HEADER: &str = "request-type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub target: Target,
    pub provider: Provider,
    pub action: Action,
    pub mode: RequestMode,
}

/// Classify a query-stripped path plus headers. Total: every input lands on
/// a default arm rather than an error.
pub fn classify(path: &str, headers: &[(String, String)]) -> Classification {
    let target = Target::from_path(path);
    let provider = match target {
        Target::Provider => Provider::from_path(path),
        _ => Provider::None,
    };
    Classification {
        target,
        provider,
        action: Action::from_header(get_header(headers, ACTION_HEADER)),
        mode: RequestMode::from_header(get_header(headers, REQUEST_TYPE_HEADER)),
    }
}

pub fn get_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
