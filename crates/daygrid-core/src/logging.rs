use std::io::IsTerminal;

use anyhow::anyhow;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter for a host that exported `RUST_LOG`, else the configured directive.
pub fn resolve_filter(settings: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.filter)
        .map_err(|e| anyhow!("invalid log filter {:?}: {e}", settings.filter))
}

pub fn is_valid_directive(directive: &str) -> bool {
    EnvFilter::try_new(directive).is_ok()
}

/// Installs a stderr `fmt` subscriber from the `[logging]` section. A host
/// that already set a global subscriber keeps it.
pub fn init_tracing(settings: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = resolve_filter(settings)?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(settings.show_target)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(settings.ansi && std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
