//! Diagnostics go to stderr so stdout only ever carries the curve table.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global tracing subscriber. Subsequent calls are no-ops.
pub fn init() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let subscriber = Registry::default().with(build_env_filter()).with(stderr_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INITIALIZED.set(());

    tracing::debug!("logging initialized");
    Ok(())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        assert!(init().is_ok());
        assert!(init().is_ok());
    }
}
