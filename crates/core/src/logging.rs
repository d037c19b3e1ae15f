//! Tracing targets and subscriber bootstrap.
//!
//! Controller events go to [`CONGESTION_TARGET`]. Time-series records
//! produced by [`Statistic::emit`](crate::recovery::Statistic::emit) go to
//! [`STATISTICS_TARGET`] so they can be filtered or split off on their own:
//!
//! ```text
//! RUST_LOG=pinq::statistics=debug
//! ```

/// Congestion controller and loss recovery events.
pub const CONGESTION_TARGET: &str = "pinq::congestion";

/// Spin-bit measurement events.
pub const MEASUREMENT_TARGET: &str = "pinq::measurement";

/// Statistic time-series records.
pub const STATISTICS_TARGET: &str = "pinq::statistics";

#[cfg(feature = "trace")]
pub use tracer::init_tracing;

#[cfg(feature = "trace")]
mod tracer {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{Layer, Registry};

    /// Install a global fmt subscriber.
    ///
    /// `RUST_LOG` refines the filter; `level` (or DEBUG in debug builds, INFO
    /// otherwise) is the default directive. `PINQ_LOG_FORMAT=json` switches
    /// to JSON lines, `PINQ_LOG_TO_STDERR` redirects output and
    /// `PINQ_DISABLE_LOGS` makes this a no-op.
    pub fn init_tracing(level: Option<LevelFilter>) -> anyhow::Result<()> {
        if std::env::var("PINQ_DISABLE_LOGS").is_ok() {
            return Ok(());
        }

        let default_filter = if cfg!(any(test, debug_assertions)) {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        let filter_layer = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(level.unwrap_or(default_filter).into())
            .from_env_lossy();

        let use_json = std::env::var("PINQ_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let to_stderr = std::env::var("PINQ_LOG_TO_STDERR").is_ok();
        let with_location = cfg!(any(test, debug_assertions));

        let fmt_layer = match (use_json, to_stderr) {
            (true, true) => tracing_subscriber::fmt::layer()
                .json()
                .with_file(with_location)
                .with_line_number(with_location)
                .with_writer(std::io::stderr)
                .boxed(),
            (true, false) => tracing_subscriber::fmt::layer()
                .json()
                .with_file(with_location)
                .with_line_number(with_location)
                .boxed(),
            (false, true) => tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(with_location)
                .with_line_number(with_location)
                .with_writer(std::io::stderr)
                .boxed(),
            (false, false) => tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(with_location)
                .with_line_number(with_location)
                .boxed(),
        };

        Registry::default()
            .with(fmt_layer.with_filter(filter_layer))
            .try_init()?;
        Ok(())
    }
}
