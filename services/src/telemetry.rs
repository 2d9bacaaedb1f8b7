//! Tracing setup.
//!
//! Local and test runs log human-readable lines to stdout. Production emits Stackdriver
//! JSON with Cloud Trace correlation and accepts W3C `traceparent` headers.

use crate::config::{Config, Env};
use anyhow::Context;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use std::env;
use tracing_stackdriver::CloudTraceConfiguration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,cabinet_services=debug,cabinet_business=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    match config.environment() {
        Env::Local | Env::Test => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_subscriber::fmt::layer().compact())
                .try_init()
                .context("tracing subscriber already installed")?;
        }
        Env::Prod => {
            let project_id = env::var("GOOGLE_CLOUD_PROJECT")
                .context("GOOGLE_CLOUD_PROJECT environment variable is required in production")?;

            opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

            let stackdriver_layer = tracing_stackdriver::layer()
                .with_cloud_trace(CloudTraceConfiguration { project_id });

            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_opentelemetry::layer())
                .with(stackdriver_layer)
                .try_init()
                .context("tracing subscriber already installed")?;
        }
    }

    Ok(())
}
