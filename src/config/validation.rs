use crate::config::types::{Config, CrawlerConfig, OutputConfig, StorageConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_output_config(&config.output)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.politeness_delay_ms < 50 {
        return Err(ConfigError::Validation(format!(
            "politeness_delay_ms must be >= 50ms, got {}ms",
            config.politeness_delay_ms
        )));
    }

    if config.fetch_timeout_secs < 1 || config.fetch_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be between 1 and 300, got {}",
            config.fetch_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    // Validate contact email (basic validation)
    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates persistence paths
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.frontier_path.is_empty() {
        return Err(ConfigError::Validation(
            "frontier_path cannot be empty".to_string(),
        ));
    }

    if config.analytics_path.is_empty() {
        return Err(ConfigError::Validation(
            "analytics_path cannot be empty".to_string(),
        ));
    }

    if config.frontier_path == config.analytics_path {
        return Err(ConfigError::Validation(
            "frontier_path and analytics_path must be different files".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    if config.top_words < 1 {
        return Err(ConfigError::Validation(
            "top_words must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the seed URL list
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use an HTTP(S) scheme",
                seed
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' has no host",
                seed
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_seeds() {
        assert!(validate_seeds(&["https://example.com/".to_string()]).is_ok());
        assert!(validate_seeds(&[
            "https://a.example.com/".to_string(),
            "http://b.example.com/start".to_string(),
        ])
        .is_ok());

        assert!(validate_seeds(&[]).is_err());
        assert!(validate_seeds(&["ftp://example.com/".to_string()]).is_err());
        assert!(validate_seeds(&["not a url".to_string()]).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }

    #[test]
    fn test_validate_storage_paths_must_differ() {
        let config = StorageConfig {
            frontier_path: "./same.db".to_string(),
            analytics_path: "./same.db".to_string(),
        };
        assert!(validate_storage_config(&config).is_err());
    }

    #[test]
    fn test_validate_crawler_bounds() {
        let mut config = CrawlerConfig {
            workers: 4,
            max_depth: 28,
            max_retries: 3,
            politeness_delay_ms: 500,
            fetch_timeout_secs: 30,
        };
        assert!(validate_crawler_config(&config).is_ok());

        config.workers = 0;
        assert!(validate_crawler_config(&config).is_err());

        config.workers = 4;
        config.politeness_delay_ms = 10;
        assert!(validate_crawler_config(&config).is_err());

        config.politeness_delay_ms = 500;
        config.fetch_timeout_secs = 0;
        assert!(validate_crawler_config(&config).is_err());
    }
}
