//! Telemetry helpers for hosts embedding `querychart-rs`.
//!
//! Tracing setup stays explicit and opt-in. Hosts either call one of the
//! initializers below or wire their own `tracing` subscriber.

/// Initializes a default `tracing` subscriber when the `telemetry` feature is enabled.
///
/// The filter comes from `RUST_LOG`, falling back to `info`.
/// Returns `false` when the feature is disabled or a global subscriber was
/// already installed by the host.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        return install(filter);
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

/// Like [`init_default_tracing`] with an explicit filter such as
/// `"querychart_rs=debug"`. An unparsable directive yields `false`.
#[must_use]
pub fn init_tracing_with_filter(directive: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        return match tracing_subscriber::EnvFilter::try_new(directive) {
            Ok(filter) => install(filter),
            Err(_) => false,
        };
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directive;
        false
    }
}

#[cfg(feature = "telemetry")]
fn install(filter: tracing_subscriber::EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
