use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Tool paths are not empty
/// - At least one file can be processed at a time
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.encoder.flac_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "encoder.flac_path cannot be empty".to_string(),
        ));
    }
    if config.encoder.lame_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "encoder.lame_path cannot be empty".to_string(),
        ));
    }

    if config.batch.max_parallel == 0 {
        return Err(ConfigError::ValidationError(
            "batch.max_parallel cannot be 0".to_string(),
        ));
    }

    Ok(())
}
