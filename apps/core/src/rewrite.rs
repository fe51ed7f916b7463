use std::sync::OnceLock;

use regex::Regex;

use crate::classify::is_web_uri;
use crate::config::Config;
use crate::search_engine::{replace_search_engine, SearchEngine};

const NON_AUTHORITATIVE_MARKER: &str = "microsoft-edge:?";
const EMBEDDED_URL_MARKER: &str = "&url=";
const EMBEDDED_URL_KEY: &str = "url";
const FALLBACK_SCHEME: &str = "http://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteRoute {
    /// The scheme wrapped a web URI directly.
    Direct,
    /// The web URI was carried in the `url` query parameter.
    Embedded,
    /// Nothing web-shaped was found; `http://` was prepended to the stripped text.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub uri: String,
    pub route: RewriteRoute,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rewriter {
    engine: Option<SearchEngine>,
}

impl Rewriter {
    pub fn new(engine: Option<SearchEngine>) -> Self {
        Self { engine }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.search_engine)
    }

    pub fn engine(&self) -> Option<SearchEngine> {
        self.engine
    }

    /// Turns a custom-scheme argument into a web URI. Callers are expected to
    /// have checked `is_custom_scheme_uri` first.
    pub fn rewrite(&self, input: &str) -> Rewritten {
        let stripped = strip_custom_scheme(input);
        if is_web_uri(stripped) {
            return self.finish(stripped, RewriteRoute::Direct);
        }

        if is_non_authoritative_link(input) {
            if let Some(destination) = embedded_destination(input) {
                if is_web_uri(&destination) {
                    return self.finish(&destination, RewriteRoute::Embedded);
                }
            }
        }

        Rewritten {
            uri: format!(
                "{FALLBACK_SCHEME}{}",
                replace_search_engine(stripped, self.engine)
            ),
            route: RewriteRoute::Fallback,
        }
    }

    fn finish(&self, uri: &str, route: RewriteRoute) -> Rewritten {
        Rewritten {
            uri: replace_search_engine(uri, self.engine),
            route,
        }
    }
}

/// Removes a leading `microsoft-edge:` and any slashes after it. The match is
/// case-sensitive.
pub fn strip_custom_scheme(input: &str) -> &str {
    match custom_scheme_pattern().find(input) {
        Some(prefix) => &input[prefix.end()..],
        None => input,
    }
}

pub fn is_non_authoritative_link(input: &str) -> bool {
    input.contains(NON_AUTHORITATIVE_MARKER) && input.contains(EMBEDDED_URL_MARKER)
}

/// Decoded `url` parameter, reading the whole input as a form-encoded query
/// string. A repeated key yields all its values joined with `,`.
pub fn embedded_destination(input: &str) -> Option<String> {
    let values: Vec<String> = url::form_urlencoded::parse(input.as_bytes())
        .filter(|(key, _)| key.eq_ignore_ascii_case(EMBEDDED_URL_KEY))
        .map(|(_, value)| value.into_owned())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join(","))
    }
}

fn custom_scheme_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^microsoft-edge:/*").expect("custom scheme pattern is valid"))
}
