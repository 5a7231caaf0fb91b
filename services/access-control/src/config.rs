use anyhow::{Context, Result};
use catalog_acl::{Acl, Group};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;

// Access-control configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct AccessControlConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub search_limit: usize,
    pub seed: SeedData,
}

/// Records loaded into the store at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub providers: Vec<String>,
    /// Provider id to entry titles.
    pub collections: BTreeMap<String, Vec<String>>,
    /// Token to user id.
    pub tokens: BTreeMap<String, String>,
    /// Created in order, before ACLs, so ACLs can reference `AG<n>` ids.
    pub groups: Vec<Group>,
    pub acls: Vec<Acl>,
}

#[derive(Debug, Deserialize)]
struct AccessControlConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    search_limit: Option<usize>,
    #[serde(default)]
    seed: Option<SeedData>,
}

impl AccessControlConfig {
    pub fn from_env() -> Result<Self> {
        let metrics_bind = std::env::var("ACCESS_CONTROL_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9011".to_string())
            .parse()
            .with_context(|| "parse ACCESS_CONTROL_METRICS_BIND")?;
        let bind_addr = std::env::var("ACCESS_CONTROL_BIND")
            .unwrap_or_else(|_| "0.0.0.0:3011".to_string())
            .parse()
            .with_context(|| "parse ACCESS_CONTROL_BIND")?;
        let search_limit = match std::env::var("ACCESS_CONTROL_SEARCH_LIMIT") {
            Ok(value) => value
                .parse()
                .with_context(|| "parse ACCESS_CONTROL_SEARCH_LIMIT")?,
            Err(_) => DEFAULT_SEARCH_LIMIT,
        };
        Ok(Self {
            bind_addr,
            metrics_bind,
            search_limit,
            seed: SeedData::default(),
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("ACCESS_CONTROL_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read ACCESS_CONTROL_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: AccessControlConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse access control config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.search_limit {
            self.search_limit = value;
        }
        if let Some(seed) = override_cfg.seed {
            self.seed = seed;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_acl::IdentityType;
    use serial_test::serial;

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

    #[test]
    #[serial]
    fn defaults_without_env() {
        let _g1 = EnvGuard::unset("ACCESS_CONTROL_BIND");
        let _g2 = EnvGuard::unset("ACCESS_CONTROL_METRICS_BIND");
        let _g3 = EnvGuard::unset("ACCESS_CONTROL_SEARCH_LIMIT");
        let _g4 = EnvGuard::unset("ACCESS_CONTROL_CONFIG");

        let config = AccessControlConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.bind_addr.port(), 3011);
        assert_eq!(config.metrics_bind.port(), 9011);
        assert_eq!(config.search_limit, DEFAULT_SEARCH_LIMIT);
        assert!(config.seed.providers.is_empty());
    }

    #[test]
    #[serial]
    fn env_values_are_parsed() {
        let _g1 = EnvGuard::set("ACCESS_CONTROL_BIND", "127.0.0.1:4000");
        let _g2 = EnvGuard::set("ACCESS_CONTROL_SEARCH_LIMIT", "5");
        let _g3 = EnvGuard::unset("ACCESS_CONTROL_CONFIG");

        let config = AccessControlConfig::from_env().expect("config");
        assert_eq!(config.bind_addr, "127.0.0.1:4000".parse().expect("addr"));
        assert_eq!(config.search_limit, 5);
    }

    #[test]
    #[serial]
    fn invalid_env_names_the_variable() {
        let _g1 = EnvGuard::set("ACCESS_CONTROL_SEARCH_LIMIT", "many");
        let err = AccessControlConfig::from_env().expect_err("invalid limit");
        assert!(err.to_string().contains("ACCESS_CONTROL_SEARCH_LIMIT"));
    }

    #[test]
    #[serial]
    fn missing_config_file_names_the_path() {
        let _g1 = EnvGuard::set("ACCESS_CONTROL_CONFIG", "/nonexistent/access-control.yaml");
        let err = AccessControlConfig::from_env_or_yaml().expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/access-control.yaml"));
    }

    #[test]
    #[serial]
    fn yaml_overrides_and_seeds() {
        let _g1 = EnvGuard::unset("ACCESS_CONTROL_SEARCH_LIMIT");
        let mut config = AccessControlConfig::from_env().expect("config");
        config
            .apply_yaml(
                r#"
bind_addr: "127.0.0.1:5000"
search_limit: 50
seed:
  providers: [PROV1]
  collections:
    PROV1: ["dataset one"]
  tokens:
    admin-token: admin
  groups:
    - name: Administrators
      description: System administrators
      members: [admin]
  acls:
    - system_identity:
        target: ANY_ACL
      group_permissions:
        - group_id: AG1-CMR
          permissions: [create, read, update, delete]
"#,
            )
            .expect("yaml");

        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.search_limit, 50);
        assert_eq!(config.seed.providers, vec!["PROV1"]);
        assert_eq!(config.seed.collections["PROV1"], vec!["dataset one"]);
        assert_eq!(config.seed.tokens["admin-token"], "admin");
        assert_eq!(config.seed.groups[0].members, vec!["admin"]);
        assert_eq!(config.seed.acls[0].identity_type(), IdentityType::System);
    }

    #[test]
    fn yaml_with_invalid_acl_is_rejected() {
        let mut config = AccessControlConfig {
            bind_addr: "127.0.0.1:0".parse().expect("bind"),
            metrics_bind: "127.0.0.1:0".parse().expect("metrics"),
            search_limit: DEFAULT_SEARCH_LIMIT,
            seed: SeedData::default(),
        };
        let err = config
            .apply_yaml("seed:\n  acls:\n    - group_permissions: []\n")
            .expect_err("acl without identity");
        assert!(err.to_string().contains("parse access control config yaml"));
    }
}
