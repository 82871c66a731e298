use std::time::Duration;

use cheatsheets::{format_duration, format_size};

/// One served request, as it appears in the request log.
#[derive(Debug)]
pub struct RequestRecord<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub status: u16,
    pub size: u64,
    pub duration: Duration,
    /// Referer pointing at another host.
    pub external_referer: Option<&'a str>,
}

/// Request log filter built once from the site config.
#[derive(Clone, Debug, Default)]
pub struct RequestLog {
    skip_prefixes: Vec<String>,
}

impl RequestLog {
    pub fn new(skip_prefixes: Vec<String>) -> Self {
        Self { skip_prefixes }
    }

    pub fn should_log(&self, path: &str) -> bool {
        !self
            .skip_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn record(&self, req: &RequestRecord<'_>) {
        if !self.should_log(req.path) {
            return;
        }
        let size = format_size(req.size);
        let took = format_duration(req.duration);
        let referer = req.external_referer.unwrap_or("");
        if req.status >= 400 {
            tracing::warn!(
                method = req.method,
                status = req.status,
                path = req.path,
                size = %size,
                took = %took,
                referer,
                "request failed"
            );
        } else {
            tracing::info!(
                method = req.method,
                status = req.status,
                path = req.path,
                size = %size,
                took = %took,
                referer,
                "request"
            );
        }
    }
}

/// Returns `referer` when it names a host other than `host`.
pub fn external_referer<'a>(referer: Option<&'a str>, host: Option<&str>) -> Option<&'a str> {
    let referer = referer?;
    let without_scheme = referer.split_once("://").map_or(referer, |(_, rest)| rest);
    let referer_host = without_scheme.split('/').next().unwrap_or("");
    match host {
        Some(host) if referer_host.eq_ignore_ascii_case(host) => None,
        _ if referer.is_empty() => None,
        _ => Some(referer),
    }
}
