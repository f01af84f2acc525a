//! Tracing subscriber setup
//!
//! `RUST_LOG` sets the base filter (default `info`). The `adk` example also
//! pins per-component levels: the agent adapter is verbose, the endpoint only
//! reports errors.

use crate::config::Example;
use crate::error::{Result, ServerError};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Component-level directives applied on top of the base filter
pub fn component_directives(example: Example) -> &'static [&'static str] {
    match example {
        Example::Adk => &[
            "dojo_server::adapter=debug",
            "dojo_server::translator=info",
            "dojo_agent::session=warn",
            "dojo_server::routes=error",
        ],
        Example::Langgraph | Example::Deepagents => &[],
    }
}

/// Build the filter for `example` from a base directive string
pub fn build_filter(base: &str, example: Example) -> Result<EnvFilter> {
    let mut filter = EnvFilter::try_new(base)
        .map_err(|e| ServerError::Logging(format!("invalid filter '{}': {}", base, e)))?;
    for directive in component_directives(example) {
        let directive = directive
            .parse::<Directive>()
            .map_err(|e| ServerError::Logging(format!("invalid directive '{}': {}", directive, e)))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

/// Install the global subscriber
pub fn init_tracing(example: Example) -> Result<()> {
    let base = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let filter = build_filter(&base, example)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| ServerError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adk_directives() {
        let filter = build_filter("info", Example::Adk).unwrap().to_string();
        assert!(filter.contains("dojo_server::adapter=debug"));
        assert!(filter.contains("dojo_agent::session=warn"));
        assert!(component_directives(Example::Langgraph).is_empty());
    }

    #[test]
    fn test_bad_base_filter() {
        assert!(matches!(
            build_filter("dojo=notalevel", Example::Langgraph),
            Err(ServerError::Logging(_))
        ));
    }
}
