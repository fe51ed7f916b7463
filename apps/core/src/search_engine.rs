pub const BING_SEARCH_FRAGMENT: &str = "bing.com/search?q=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Google,
    DuckDuckGo,
    Reddit,
}

impl SearchEngine {
    /// Parses the configured engine name. Matching is exact and
    /// case-sensitive; anything else means "keep Bing".
    pub fn from_setting(value: &str) -> Option<Self> {
        match value {
            "Google" => Some(Self::Google),
            "DuckDuckGo" => Some(Self::DuckDuckGo),
            "Reddit" => Some(Self::Reddit),
            _ => None,
        }
    }

    pub fn setting_name(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Reddit => "Reddit",
        }
    }

    pub fn search_fragment(self) -> &'static str {
        match self {
            Self::Google => "google.com/search?q=",
            Self::DuckDuckGo => "duckduckgo.com/?q=",
            Self::Reddit => "reddit.com/search?q=",
        }
    }
}

/// Drops everything from the first `&` onward, then swaps the Bing search
/// fragment for the chosen engine's. The swap is a literal substring
/// replacement, so non-Bing URIs only lose their trailing parameters.
pub fn replace_search_engine(uri: &str, engine: Option<SearchEngine>) -> String {
    let primary = truncate_extra_parameters(uri);
    match engine {
        Some(engine) => primary.replace(BING_SEARCH_FRAGMENT, engine.search_fragment()),
        None => primary.to_string(),
    }
}

// A leading '&' is kept; only an ampersand after the first character truncates.
fn truncate_extra_parameters(uri: &str) -> &str {
    match uri.find('&') {
        Some(index) if index > 0 => &uri[..index],
        _ => uri,
    }
}
