use crate::config::types::{
    BrowserConfig, ConcurrencyConfig, Config, CreditsConfig, HttpConfig, JobsConfig,
    OutputConfig, TimeoutsConfig,
};
use crate::ConfigError;
use scraper::Selector;

const MAX_ASSET_DOWNLOADS: usize = 32;
const MAX_SUBPAGE_RENDERS: usize = 8;
const MIN_RETENTION_SECS: u64 = 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_output_config(&config.output)?;
    validate_timeouts_config(&config.timeouts)?;
    validate_concurrency_config(&config.concurrency)?;
    validate_http_config(&config.http)?;
    validate_browser_config(&config.browser)?;
    validate_credits_config(&config.credits)?;
    validate_jobs_config(&config.jobs)?;
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    let prefix = &config.public_prefix;
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        return Err(ConfigError::InvalidUrl(format!(
            "public-prefix must look like '/segment' without a trailing slash, got '{}'",
            prefix
        )));
    }

    if prefix.contains(|c: char| c.is_whitespace() || c == '?' || c == '#') {
        return Err(ConfigError::InvalidUrl(format!(
            "public-prefix must be a plain path, got '{}'",
            prefix
        )));
    }

    Ok(())
}

/// Validates timeouts; a zero timeout would fail every request
fn validate_timeouts_config(config: &TimeoutsConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("home-page-secs", config.home_page_secs),
        ("subpage-secs", config.subpage_secs),
        ("asset-secs", config.asset_secs),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates worker pool sizes
fn validate_concurrency_config(config: &ConcurrencyConfig) -> Result<(), ConfigError> {
    if config.asset_downloads < 1 || config.asset_downloads > MAX_ASSET_DOWNLOADS {
        return Err(ConfigError::Validation(format!(
            "asset-downloads must be between 1 and {}, got {}",
            MAX_ASSET_DOWNLOADS, config.asset_downloads
        )));
    }

    if config.subpage_renders < 1 || config.subpage_renders > MAX_SUBPAGE_RENDERS {
        return Err(ConfigError::Validation(format!(
            "subpage-renders must be between 1 and {}, got {}",
            MAX_SUBPAGE_RENDERS, config.subpage_renders
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.chrome_path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "chrome-path cannot be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validates the credit removal policy
///
/// Selectors are parsed here so a typo surfaces at startup rather than as a
/// failed job.
fn validate_credits_config(config: &CreditsConfig) -> Result<(), ConfigError> {
    if config.max_text_length < 1 {
        return Err(ConfigError::Validation(format!(
            "max-text-length must be >= 1, got {}",
            config.max_text_length
        )));
    }

    if let Some(phrase) = config.phrases.iter().find(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "credit phrases cannot be blank, got '{}'",
            phrase
        )));
    }

    for selector in &config.selectors {
        Selector::parse(selector).map_err(|e| {
            ConfigError::Validation(format!("Invalid credit selector '{}': {:?}", selector, e))
        })?;
    }

    Ok(())
}

fn validate_jobs_config(config: &JobsConfig) -> Result<(), ConfigError> {
    if config.retention_secs < MIN_RETENTION_SECS {
        return Err(ConfigError::Validation(format!(
            "retention-secs must be >= {}, got {}",
            MIN_RETENTION_SECS, config.retention_secs
        )));
    }
    Ok(())
}
