use url::Url;

pub const CUSTOM_SCHEME_PREFIX: &str = "microsoft-edge:";

const WEB_PREFIXES: [&str; 2] = ["https://", "http://"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriKind {
    CustomScheme,
    Web,
    Other,
}

pub fn classify(input: &str) -> UriKind {
    if is_custom_scheme_uri(input) {
        UriKind::CustomScheme
    } else if is_web_uri(input) {
        UriKind::Web
    } else {
        UriKind::Other
    }
}

/// Returns true when `input` parses as an absolute URI. Parse failures are
/// reported as `false`, never as errors.
pub fn is_uri(input: &str) -> bool {
    if input.is_empty() {
        return false;
    }
    Url::parse(input).is_ok()
}

pub fn is_web_uri(input: &str) -> bool {
    WEB_PREFIXES
        .iter()
        .any(|prefix| starts_with_ignore_ascii_case(input, prefix))
}

pub fn is_custom_scheme_uri(input: &str) -> bool {
    starts_with_ignore_ascii_case(input, CUSTOM_SCHEME_PREFIX)
        && !input.chars().any(char::is_whitespace)
}

fn starts_with_ignore_ascii_case(input: &str, prefix: &str) -> bool {
    input
        .as_bytes()
        .get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
        .unwrap_or(false)
}
