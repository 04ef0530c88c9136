mod alert_webhook;
mod config;
mod layer;
mod notifier;

use anyhow::Result;
use config::ObservabilityConfig;
use layer::ErrorNotifyLayer;
use notifier::Notifier;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt,
};

use alert_webhook::AlertWebhookProvider;

/// Installs the global tracing subscriber: an fmt layer plus an optional
/// webhook error-notify layer, both behind `RUST_LOG` filtering.
pub fn init_observability(component: &str) -> Result<()> {
    let config = ObservabilityConfig::from_env(component);

    let notify_layer = config.alerts.as_ref().map(|alerts| {
        let notifier = Notifier::new(vec![Arc::new(AlertWebhookProvider::new(
            alerts.webhook_url.clone(),
        ))]);

        ErrorNotifyLayer::new(notifier, config.service_context.clone(), alerts.min_level)
            .with_filter(tracing_subscriber::filter::LevelFilter::from_level(
                alerts.min_level,
            ))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // RFC3339 in the host timezone, so TZ controls what operators read.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(notify_layer)
        .with(env_filter)
        .try_init()?;

    for warning in &config.warnings {
        warn!(
            service = %config.service_context.service_name,
            environment = %config.service_context.environment,
            component = %config.service_context.component,
            warning = %warning,
            "Observability config warning"
        );
    }

    if config.alerts.is_some() {
        info!(
            service = %config.service_context.service_name,
            component = %config.service_context.component,
            "Webhook error alerts enabled"
        );
    } else {
        info!(
            service = %config.service_context.service_name,
            component = %config.service_context.component,
            "Webhook error alerts disabled"
        );
    }

    Ok(())
}
