use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "SCOUT_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "issue_scout=debug,tower_http=debug"
    } else {
        "issue_scout=info"
    }
}

/// Build the filter: `SCOUT_LOG` wins, otherwise the verbosity default.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays clean. Calling this twice is a no-op.
pub fn init_tracing(verbose: bool, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        builder
            .json()
            .with_file(true)
            .with_line_number(true)
            .try_init()
    } else {
        builder.try_init()
    };

    if result.is_ok() {
        tracing::debug!(json, verbose, "logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "issue_scout=info");
        assert!(default_directive(true).contains("issue_scout=debug"));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing(false, false);
        init_tracing(true, true);
    }
}
