//! Logging helpers
//!
//! Builds `tracing-subscriber` filter directives from [`LoggingConfig`],
//! including per-component overrides.
//!
//! [`LoggingConfig`]: crate::config::LoggingConfig

/// Build filter directives string from LoggingConfig
///
/// Returns the base level followed by one `guardian::<component>=<level>`
/// directive per configured component override.
///
/// # Examples
///
/// ```
/// use guardian::config::logging::{LogFormat, LoggingConfig};
/// use guardian::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("scheduler".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,guardian::scheduler=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",guardian::{}={}", component, level));
        }
    }

    filter_str
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use std::collections::HashMap;

    #[test]
    fn test_filter_without_components() {
        let config = LoggingConfig::default();
        assert_eq!(build_filter_directives(&config), "info");
    }

    #[test]
    fn test_filter_components_sorted() {
        let mut levels = HashMap::new();
        levels.insert("scheduler".to_string(), "trace".to_string());
        levels.insert("api".to_string(), "warn".to_string());
        let config = LoggingConfig {
            level: "debug".to_string(),
            component_levels: Some(levels),
            ..Default::default()
        };
        assert_eq!(
            build_filter_directives(&config),
            "debug,guardian::api=warn,guardian::scheduler=trace"
        );
    }
}
