use crate::batch::WriteStrategy;
use anyhow::{Context, Result};
use rolegate_policy::ProfileClassifier;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

// Profile admin configuration sourced from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// Display name of the untagged super-admin profile.
    pub super_admin_name: String,
    /// Display name of the untagged default-limited profile.
    pub default_limited_name: String,
    pub write_strategy: WriteStrategy,
    /// Seed file for the in-memory store; the bundled seed when unset.
    pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct AdminConfigOverride {
    super_admin_name: Option<String>,
    default_limited_name: Option<String>,
    write_strategy: Option<String>,
    seed_path: Option<PathBuf>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            super_admin_name: "ADMINISTRADOR".to_string(),
            default_limited_name: "USUARIO".to_string(),
            write_strategy: WriteStrategy::default(),
            seed_path: None,
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let super_admin_name = std::env::var("ROLEGATE_SUPER_ADMIN_NAME")
            .unwrap_or(defaults.super_admin_name);
        let default_limited_name = std::env::var("ROLEGATE_DEFAULT_LIMITED_NAME")
            .unwrap_or(defaults.default_limited_name);
        let write_strategy = match std::env::var("ROLEGATE_WRITE_STRATEGY") {
            Ok(value) => parse_strategy(&value).with_context(|| "parse ROLEGATE_WRITE_STRATEGY")?,
            Err(_) => defaults.write_strategy,
        };
        let seed_path = std::env::var("ROLEGATE_SEED").ok().map(PathBuf::from);
        Ok(Self {
            super_admin_name,
            default_limited_name,
            write_strategy,
            seed_path,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("ROLEGATE_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read ROLEGATE_CONFIG: {path}"))?;
            let override_cfg: AdminConfigOverride = serde_yaml::from_str(&contents)
                .with_context(|| "parse profile admin config yaml")?;
            if let Some(value) = override_cfg.super_admin_name {
                config.super_admin_name = value;
            }
            if let Some(value) = override_cfg.default_limited_name {
                config.default_limited_name = value;
            }
            if let Some(value) = override_cfg.write_strategy {
                config.write_strategy =
                    parse_strategy(&value).with_context(|| "parse write_strategy")?;
            }
            if let Some(value) = override_cfg.seed_path {
                config.seed_path = Some(value);
            }
        }
        Ok(config)
    }

    pub fn classifier(&self) -> ProfileClassifier {
        ProfileClassifier::new(&self.super_admin_name, &self.default_limited_name)
    }
}

fn parse_strategy(value: &str) -> Result<WriteStrategy> {
    value.parse::<WriteStrategy>().map_err(anyhow::Error::msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_policy::{Profile, ProfileId, ProfileKind};
    use serial_test::serial;
    use std::io::Write;

    struct EnvGuard {
        key: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::set_var(key, value);
            }
            Self { key, prev }
        }

        fn unset(key: &'static str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::remove_var(key);
            }
            Self { key, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.prev {
                Some(value) => unsafe {
                    std::env::set_var(self.key, value);
                },
                None => unsafe {
                    std::env::remove_var(self.key);
                },
            }
        }
    }

    fn clear_all() -> Vec<EnvGuard> {
        vec![
            EnvGuard::unset("ROLEGATE_SUPER_ADMIN_NAME"),
            EnvGuard::unset("ROLEGATE_DEFAULT_LIMITED_NAME"),
            EnvGuard::unset("ROLEGATE_WRITE_STRATEGY"),
            EnvGuard::unset("ROLEGATE_SEED"),
            EnvGuard::unset("ROLEGATE_CONFIG"),
        ]
    }

    #[test]
    #[serial]
    fn defaults_without_env() {
        let _guards = clear_all();
        let config = AdminConfig::from_env_or_yaml().expect("config");
        assert_eq!(config, AdminConfig::default());
    }

    #[test]
    #[serial]
    fn env_overrides_defaults() {
        let _guards = clear_all();
        let _g1 = EnvGuard::set("ROLEGATE_SUPER_ADMIN_NAME", "ROOT");
        let _g2 = EnvGuard::set("ROLEGATE_WRITE_STRATEGY", "compensating");
        let _g3 = EnvGuard::set("ROLEGATE_SEED", "/tmp/seed.yaml");

        let config = AdminConfig::from_env().expect("config");
        assert_eq!(config.super_admin_name, "ROOT");
        assert_eq!(config.default_limited_name, "USUARIO");
        assert_eq!(config.write_strategy, WriteStrategy::Compensating);
        assert_eq!(config.seed_path, Some(PathBuf::from("/tmp/seed.yaml")));
    }

    #[test]
    #[serial]
    fn invalid_strategy_is_an_error() {
        let _guards = clear_all();
        let _g = EnvGuard::set("ROLEGATE_WRITE_STRATEGY", "eventually");
        let err = AdminConfig::from_env().expect_err("invalid");
        assert!(format!("{err:#}").contains("ROLEGATE_WRITE_STRATEGY"));
    }

    #[test]
    #[serial]
    fn yaml_overrides_env() {
        let _guards = clear_all();
        let _g1 = EnvGuard::set("ROLEGATE_DEFAULT_LIMITED_NAME", "BASIC");
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            "default_limited_name: LIMITED\nwrite_strategy: compensating"
        )
        .expect("write");
        let path = file.path().to_string_lossy().to_string();
        let _g2 = EnvGuard::set("ROLEGATE_CONFIG", &path);

        let config = AdminConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.default_limited_name, "LIMITED");
        assert_eq!(config.write_strategy, WriteStrategy::Compensating);
        assert_eq!(config.super_admin_name, "ADMINISTRADOR");
    }

    #[test]
    #[serial]
    fn missing_yaml_file_is_an_error() {
        let _guards = clear_all();
        let _g = EnvGuard::set("ROLEGATE_CONFIG", "/nonexistent/rolegate.yaml");
        assert!(AdminConfig::from_env_or_yaml().is_err());
    }

    #[test]
    fn classifier_uses_configured_names() {
        let config = AdminConfig {
            super_admin_name: "ROOT".to_string(),
            ..AdminConfig::default()
        };
        let profile = Profile {
            id: ProfileId::new(1),
            name: "ROOT".to_string(),
            description: "d".to_string(),
            active: true,
            is_system_profile: true,
            kind: None,
        };
        assert_eq!(
            config.classifier().classify(&profile).0,
            ProfileKind::SuperAdmin
        );
    }
}
