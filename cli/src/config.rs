use shared::ClientConfig;
use shared::config::{ConfigError, MIB};
use std::str::FromStr;

/// Loads `.env`, then overlays `LEAFSCAN_*` variables on the defaults.
pub fn load() -> Result<ClientConfig, ConfigError> {
    dotenv::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();

    if let Some(base_url) = lookup("LEAFSCAN_BASE_URL") {
        config.submission.base_url = base_url;
    }
    if let Some(path) = lookup("LEAFSCAN_PREDICT_PATH") {
        config.submission.predict_path = path;
    }
    if let Some(secs) = parse::<u64>(&lookup, "LEAFSCAN_TIMEOUT_SECS")? {
        config.submission.timeout_ms = secs.saturating_mul(1000);
    }
    if let Some(mb) = parse::<u64>(&lookup, "LEAFSCAN_MAX_UPLOAD_MB")? {
        config.upload.max_bytes = mb.saturating_mul(MIB);
    }

    config.validate()?;
    Ok(config)
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}
