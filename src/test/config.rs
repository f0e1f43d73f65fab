#[cfg(test)]
mod tests {
    use crate::env::{AppConfig, ConfigError};
    use serial_test::serial;

    const KEYS: [&str; 5] = [
        "DATABASE_URL",
        "SESSION_TTL_HOURS",
        "SESSION_CLEANUP_INTERVAL_SECS",
        "BOOTSTRAP_ADMIN_EMAIL",
        "BOOTSTRAP_ADMIN_PASSWORD",
    ];

    fn with_config_env<F: FnOnce()>(values: &[(&str, &str)], f: F) {
        let vars: Vec<(&str, Option<&str>)> = KEYS
            .iter()
            .map(|key| {
                let value = values.iter().find(|(k, _)| k == key).map(|(_, v)| *v);
                (*key, value)
            })
            .collect();
        temp_env::with_vars(vars, f);
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        with_config_env(&[], || {
            let config = AppConfig::from_env().expect("defaults should load");
            assert_eq!(config.database_url, "sqlite://craving-companion.db?mode=rwc");
            assert_eq!(config.session_ttl_hours, 24);
            assert_eq!(config.session_cleanup_interval_secs, 3600);
            assert!(config.bootstrap_admin.is_none());
        });
    }

    #[test]
    #[serial]
    fn test_values_from_environment() {
        with_config_env(
            &[
                ("DATABASE_URL", "sqlite::memory:"),
                ("SESSION_TTL_HOURS", " 12 "),
                ("SESSION_CLEANUP_INTERVAL_SECS", "60"),
                ("BOOTSTRAP_ADMIN_EMAIL", "root@example.com"),
                ("BOOTSTRAP_ADMIN_PASSWORD", "changeme123"),
            ],
            || {
                let config = AppConfig::from_env().expect("config should load");
                assert_eq!(config.database_url, "sqlite::memory:");
                assert_eq!(config.session_ttl_hours, 12);
                assert_eq!(config.session_cleanup_interval_secs, 60);

                let admin = config.bootstrap_admin.expect("admin should be configured");
                assert_eq!(admin.email, "root@example.com");
            },
        );
    }

    #[test]
    #[serial]
    fn test_invalid_numbers_are_errors() {
        with_config_env(&[("SESSION_TTL_HOURS", "a day")], || {
            assert!(matches!(
                AppConfig::from_env(),
                Err(ConfigError::InvalidValue {
                    key: "SESSION_TTL_HOURS",
                    ..
                })
            ));
        });

        with_config_env(&[("SESSION_TTL_HOURS", "0")], || {
            assert!(AppConfig::from_env().is_err());
        });

        with_config_env(&[("SESSION_CLEANUP_INTERVAL_SECS", "-5")], || {
            assert!(AppConfig::from_env().is_err());
        });

        with_config_env(&[("SESSION_CLEANUP_INTERVAL_SECS", "0")], || {
            assert!(AppConfig::from_env().is_err());
        });
    }

    #[test]
    #[serial]
    fn test_bootstrap_admin_needs_both_values() {
        with_config_env(&[("BOOTSTRAP_ADMIN_EMAIL", "root@example.com")], || {
            assert!(matches!(
                AppConfig::from_env(),
                Err(ConfigError::Incomplete("BOOTSTRAP_ADMIN_EMAIL", _))
            ));
        });
    }
}
