pub mod classify;
pub mod config;
pub mod launcher;
pub mod logging;
pub mod rewrite;
pub mod runtime;
pub mod search_engine;
