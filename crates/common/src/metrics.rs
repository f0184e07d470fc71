//! Process-wide prometheus counters.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static IMAGE_UPLOADS: Lazy<IntCounter> = Lazy::new(|| {
    register(IntCounter::new("salon_image_uploads_total", "Images accepted for upload"))
});

pub static IMAGE_PROCESSING_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register(IntCounter::new("salon_image_processing_failures_total", "Uploads whose derived images could not be produced"))
});

pub static QUOTE_ROTATIONS: Lazy<IntCounter> = Lazy::new(|| {
    register(IntCounter::new("salon_quote_rotations_total", "Daily quotes assigned"))
});

pub static LOGIN_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register(IntCounterVec::new(Opts::new("salon_login_attempts_total", "Login attempts by outcome"), &["outcome"]))
});

fn register<C>(metric: prometheus::Result<C>) -> C
where
    C: prometheus::core::Collector + Clone + 'static,
{
    let metric = metric.expect("valid metric definition");
    let _ = REGISTRY.register(Box::new(metric.clone()));
    metric
}

/// Render all registered metrics in the prometheus text format.
pub fn render() -> String {
    Lazy::force(&IMAGE_UPLOADS);
    Lazy::force(&IMAGE_PROCESSING_FAILURES);
    Lazy::force(&QUOTE_ROTATIONS);
    Lazy::force(&LOGIN_ATTEMPTS);
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&REGISTRY.gather(), &mut buf).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_counters() {
        IMAGE_UPLOADS.inc();
        LOGIN_ATTEMPTS.with_label_values(&["success"]).inc();
        let text = render();
        assert!(text.contains("salon_image_uploads_total"));
        assert!(text.contains("salon_login_attempts_total"));
    }
}
