use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Maps `-q` / `-v` counts onto a default filter; `RUST_LOG` wins when set.
pub fn default_filter(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "ltlf_filter=error";
    }

    match verbosity {
        0 => "ltlf_filter=warn",
        1 => "ltlf_filter=info",
        2 => "ltlf_filter=debug",
        _ => "ltlf_filter=trace",
    }
}

/// Diagnostics go to stderr so stdout keeps only the per-record transcript.
pub fn init_cli_logger(verbosity: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity, quiet)));

    // A subscriber may already be installed (e.g. by an embedding application).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
