use thiserror::Error;

use crate::classify::{classify, UriKind};
use crate::config::{Config, ConfigProvider};
use crate::launcher::{open_uri, GateOutcome, LaunchError, Launcher};
use crate::rewrite::Rewriter;
use crate::search_engine::SearchEngine;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("launch error: {0}")]
    Launch(#[from] LaunchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Deflect(String),
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The arguments did not carry a single custom-scheme URI.
    Ignored,
    Launched,
    /// The rewritten URI failed web-URI validation.
    Rejected,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Ignored | Self::Launched => 0,
            Self::Rejected => 1,
        }
    }
}

/// Anything other than exactly one custom-scheme argument is ignored.
pub fn parse_cli_args(args: &[String]) -> Invocation {
    match args {
        [single] if classify(single) == UriKind::CustomScheme => Invocation::Deflect(single.clone()),
        _ => Invocation::Ignore,
    }
}

pub fn run_with(
    invocation: Invocation,
    provider: &dyn ConfigProvider,
    launcher: &dyn Launcher,
) -> Result<Outcome, RuntimeError> {
    let Invocation::Deflect(input) = invocation else {
        tracing::debug!("no custom-scheme argument; nothing to do");
        return Ok(Outcome::Ignored);
    };

    let config = Config::load(provider);
    let rewriter = Rewriter::from_config(&config);
    let rewritten = rewriter.rewrite(&input);
    tracing::info!(
        input = %input,
        uri = %rewritten.uri,
        route = ?rewritten.route,
        engine = rewriter.engine().map_or("bing", SearchEngine::setting_name),
        "rewrote custom-scheme uri"
    );

    match open_uri(&rewritten.uri, launcher)? {
        GateOutcome::Launched => Ok(Outcome::Launched),
        GateOutcome::Rejected => Ok(Outcome::Rejected),
    }
}
