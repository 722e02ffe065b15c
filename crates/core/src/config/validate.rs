use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Download concurrency is at least 1
/// - Retention window is not negative
/// - Command templates carry both placeholders when set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.downloads.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "downloads.concurrency must be at least 1".to_string(),
        ));
    }

    if config.catalog.max_age_days < 0 {
        return Err(ConfigError::ValidationError(
            "catalog.max_age_days cannot be negative".to_string(),
        ));
    }

    for (name, template) in [
        ("downloads.command", &config.downloads.command),
        ("downloads.playlist_command", &config.downloads.playlist_command),
    ] {
        if !template.is_empty() && (!template.contains("{url}") || !template.contains("{dest}")) {
            return Err(ConfigError::ValidationError(format!(
                "{name} must contain both {{url}} and {{dest}} placeholders"
            )));
        }
    }

    Ok(())
}
