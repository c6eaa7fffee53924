use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable overriding the contact e-mail in the User-Agent
pub const EMAIL_VAR: &str = "EMAIL";

/// Environment variable overriding the politeness interval, in (fractional) seconds
pub const REQUEST_INTERVAL_VAR: &str = "REQUEST_INTERVAL_SECONDS";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitemap_walker::config::load_config;
///
/// let config = load_config(Path::new("walker.toml")).unwrap();
/// println!("Timeout: {}s", config.fetcher.timeout_secs);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Builds the effective configuration
///
/// Starts from the file at `path` (or the defaults when there is none), then
/// applies the `EMAIL` and `REQUEST_INTERVAL_SECONDS` environment overrides and
/// validates the result.
pub fn resolve_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;

    Ok(config)
}

/// Applies environment overrides using `lookup` to read variables
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(email) = lookup(EMAIL_VAR) {
        config.user_agent.contact_email = email;
    }

    if let Some(raw) = lookup(REQUEST_INTERVAL_VAR) {
        let seconds: f64 = raw.trim().parse().map_err(|_| {
            ConfigError::Validation(format!(
                "{} must be a number of seconds, got '{}'",
                REQUEST_INTERVAL_VAR, raw
            ))
        })?;

        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 0, got {}",
                REQUEST_INTERVAL_VAR, seconds
            )));
        }

        config.fetcher.request_interval_ms = (seconds * 1000.0).round() as u64;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[fetcher]
timeout-secs = 10
request-interval-ms = 500

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[checkpoint]
every = 5
remove-on-completion = true
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.fetcher.timeout_secs, 10);
        assert_eq!(config.fetcher.request_interval_ms, 500);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(config.checkpoint.every, 5);
        assert!(config.checkpoint.remove_on_completion);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let file = create_temp_config("[fetcher]\ntimeout-secs = 5\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.fetcher.timeout_secs, 5);
        assert_eq!(config.fetcher.request_interval_ms, 2000);
        assert_eq!(config.user_agent.crawler_name, "SitemapWalker");
        assert_eq!(config.checkpoint.every, 1);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/walker.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[fetcher]\ntimeout-secs = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("EMAIL", "webmaster@example.org"),
                ("REQUEST_INTERVAL_SECONDS", "2.5"),
            ]),
        )
        .unwrap();

        assert_eq!(config.user_agent.contact_email, "webmaster@example.org");
        assert_eq!(config.fetcher.request_interval_ms, 2500);
    }

    #[test]
    fn test_env_interval_must_be_numeric() {
        let mut config = Config::default();
        let result = apply_env_overrides(&mut config, env(&[("REQUEST_INTERVAL_SECONDS", "soon")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));

        let result = apply_env_overrides(&mut config, env(&[("REQUEST_INTERVAL_SECONDS", "-1")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_no_env_leaves_config_untouched() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[])).unwrap();

        assert_eq!(config.user_agent.contact_email, "contact@example.com");
        assert_eq!(config.fetcher.request_interval_ms, 2000);
    }
}
