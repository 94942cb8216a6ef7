use std::path::Path;

use crate::error::ConfigError;

use super::types::Settings;

/// Settings file looked up in the current directory.
pub const SETTINGS_FILE: &str = "cmdplan.toml";

/// Value of `DEBUG` that forces serial parallel batches.
pub const DEBUG_SERIAL: &str = "serial";

/// Load `./cmdplan.toml` when present, then apply environment overrides.
pub fn load_default() -> Result<Settings, ConfigError> {
    let local = Path::new(SETTINGS_FILE);

    let mut settings = if local.exists() {
        load_from(local)?
    } else {
        Settings::default()
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

pub fn load_from(path: &Path) -> Result<Settings, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<Settings>(&s).map_err(|source| ConfigError::Settings {
        path: path.to_path_buf(),
        source,
    })
}

/// Environment overrides, highest priority below command-line flags.
///
/// `DEBUG=serial` turns serial mode on; any other value leaves the settings
/// alone. `CMDPLAN_MAX_PARALLEL` and `CMDPLAN_SHELL` replace their fields
/// when non-empty.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if lookup("DEBUG").is_some_and(|v| is_debug_serial(&v)) {
        settings.runner.serial = true;
    }

    if let Some(v) = lookup("CMDPLAN_MAX_PARALLEL") {
        if !v.trim().is_empty() {
            settings.runner.max_parallel = v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "CMDPLAN_MAX_PARALLEL",
                value: v.clone(),
            })?;
        }
    }

    if let Some(v) = lookup("CMDPLAN_SHELL") {
        if !v.trim().is_empty() {
            settings.runner.shell = v.trim().to_string();
        }
    }

    Ok(())
}

pub fn is_debug_serial(value: &str) -> bool {
    value.trim() == DEBUG_SERIAL
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::DEFAULT_MAX_PARALLEL;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_debug_serial_exact_match() {
        assert!(is_debug_serial("serial"));
        assert!(is_debug_serial("  serial\n"));
        assert!(!is_debug_serial("Serial"));
        assert!(!is_debug_serial("serial2"));
        assert!(!is_debug_serial(""));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        apply_env_overrides(
            &mut settings,
            env(&[
                ("DEBUG", "serial"),
                ("CMDPLAN_MAX_PARALLEL", "8"),
                ("CMDPLAN_SHELL", "/bin/bash"),
            ]),
        )
        .unwrap();

        assert!(settings.runner.serial);
        assert_eq!(settings.runner.max_parallel, 8);
        assert_eq!(settings.runner.shell, "/bin/bash");
        assert_eq!(settings.runner.effective_max_parallel(), 1);
    }

    #[test]
    fn test_other_debug_values_are_ignored() {
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, env(&[("DEBUG", "1")])).unwrap();

        assert!(!settings.runner.serial);
        assert_eq!(settings.runner.effective_max_parallel(), DEFAULT_MAX_PARALLEL);
    }

    #[test]
    fn test_bad_max_parallel_env() {
        let mut settings = Settings::default();
        let err = apply_env_overrides(&mut settings, env(&[("CMDPLAN_MAX_PARALLEL", "many")]))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                var: "CMDPLAN_MAX_PARALLEL",
                ..
            }
        ));
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(
            &path,
            "[runner]\nmax_parallel = 4\n\n[logging]\nlevel = \"debug\"\nfile = \"logs/cmdplan.log\"\n",
        )
        .unwrap();

        let settings = load_from(&path).unwrap();
        assert_eq!(settings.runner.max_parallel, 4);
        assert_eq!(settings.runner.shell, "/bin/sh");
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.logging.console);
        assert_eq!(
            settings.logging.file,
            Some(std::path::PathBuf::from("logs/cmdplan.log"))
        );
    }

    #[test]
    fn test_logging_silent_when_off_or_sinkless() {
        let mut settings = Settings::default();
        assert!(!settings.logging.is_silent());

        settings.logging.level = "off".to_string();
        assert!(settings.logging.is_silent());

        settings.logging.level = "info".to_string();
        settings.logging.console = false;
        assert!(settings.logging.is_silent());
    }
}
