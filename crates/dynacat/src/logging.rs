use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Third-party targets that are only interesting when something breaks
const NOISY_TARGETS: &[(&str, &str)] = &[
    ("aws_config", "warn"),
    ("aws_smithy_runtime", "warn"),
    ("aws_smithy_runtime_api", "warn"),
    ("hyper", "warn"),
    ("hyper_util", "warn"),
    ("rustls", "warn"),
    ("sqlx", "warn"),
];

/// Build the filter from `RUST_LOG` if set, else from `level` plus overrides
pub fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => filter_from_level(level),
    }
}

fn filter_from_level(level: &str) -> anyhow::Result<EnvFilter> {
    let mut directives = vec![level.to_string()];
    for (target, lvl) in NOISY_TARGETS {
        directives.push(format!("{}={}", target, lvl));
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", filter_str, e))
}

/// Install the global subscriber; logs go to stderr so stdout stays parseable
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_env_filter(level)?)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
