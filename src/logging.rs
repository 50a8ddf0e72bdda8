use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

/// Logs go to stderr so stdout stays parseable. Without `verbose` only
/// errors are shown; prefill fallbacks log at warn and stay hidden.
pub fn init(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::ERROR };
    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(verbose)
        .with_level(true)
        .without_time()
        .try_init();
    Ok(())
}
