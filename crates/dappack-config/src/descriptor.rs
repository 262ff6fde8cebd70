//! Dapp descriptor parsing
//!
//! A descriptor is the `nixpacks.toml` document stored in the registry under
//! `<uid>/nixpacks.toml`: the nixpacks build phases plus a `[dapp]` block
//! identifying the application, where its source lives, and which ports it
//! serves on. The same document is written back into the build workspace so
//! the build tool plans from exactly what the registry served.

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Maximum accepted uid length
const MAX_UID_LEN: usize = 64;

/// Complete dapp descriptor: nixpacks build document plus `[dapp]` block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DappDescriptor {
    /// Nixpacks providers to plan with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,

    /// Build phases
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phases: Option<Phases>,

    /// Start phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<StartPhase>,

    /// Application metadata
    pub dapp: DappSection,
}

/// Setup, install, and build phases
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Phases {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<SetupPhase>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<CommandPhase>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<CommandPhase>,
}

/// Packages installed before the build
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SetupPhase {
    #[serde(rename = "nixPkgs", skip_serializing_if = "Option::is_none")]
    pub nix_pkgs: Option<Vec<String>>,

    #[serde(rename = "aptPkgs", skip_serializing_if = "Option::is_none")]
    pub apt_pkgs: Option<Vec<String>>,
}

/// A phase that runs a list of commands
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommandPhase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmds: Option<Vec<String>>,
}

/// How the built image starts the application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StartPhase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
}

/// The `[dapp]` block: identity, source location, serving ports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DappSection {
    /// Unique identifier; every derived resource name comes from this
    pub uid: String,

    /// Source repository URL
    pub repository: String,

    /// Optional revision (tag or branch) to check out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Port the application serves HTTP on inside its container
    pub http_port: u16,

    /// `host:container` port mappings published when running the container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<PortMapping>>,
}

/// A `host:container` port mapping, serialized as a `"3000:3000"` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

impl std::fmt::Display for PortMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.container)
    }
}

impl FromStr for PortMapping {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (host, container) = s
            .split_once(':')
            .ok_or_else(|| format!("Port mapping must be host:container, got '{}'", s))?;
        let host = host
            .parse()
            .map_err(|_| format!("Invalid host port in '{}'", s))?;
        let container = container
            .parse()
            .map_err(|_| format!("Invalid container port in '{}'", s))?;
        Ok(Self { host, container })
    }
}

impl Serialize for PortMapping {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PortMapping {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Validate a dapp uid for safe use in derived resource names and paths.
///
/// The uid is interpolated into image names, container names, and registry
/// paths, so only lowercase alphanumerics and `.`, `_`, `-` are accepted,
/// starting with an alphanumeric.
pub fn validate_uid(uid: &str) -> Result<()> {
    if uid.is_empty() {
        return Err(ConfigError::Invalid("uid must not be empty".to_string()));
    }
    if uid.len() > MAX_UID_LEN {
        return Err(ConfigError::Invalid(format!(
            "uid '{}' exceeds {} characters",
            uid, MAX_UID_LEN
        )));
    }
    let first_ok = uid
        .chars()
        .next()
        .map(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .unwrap_or(false);
    if !first_ok {
        return Err(ConfigError::Invalid(format!(
            "uid '{}' must start with a lowercase letter or digit",
            uid
        )));
    }
    if let Some(bad) = uid
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')))
    {
        return Err(ConfigError::Invalid(format!(
            "uid '{}' contains invalid character '{}'",
            uid, bad
        )));
    }
    Ok(())
}

impl DappDescriptor {
    /// Load and validate a descriptor from a `nixpacks.toml` path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let descriptor: Self =
            toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Serialize back to the `nixpacks.toml` wire format
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Check the boundary invariants: uid charset, usable ports
    pub fn validate(&self) -> Result<()> {
        validate_uid(&self.dapp.uid)?;
        if self.dapp.http_port == 0 {
            return Err(ConfigError::Invalid(format!(
                "dapp '{}' declares httpPort 0",
                self.dapp.uid
            )));
        }
        if self.dapp.repository.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "dapp '{}' has an empty repository",
                self.dapp.uid
            )));
        }
        Ok(())
    }

    /// Port mappings to publish when running the container
    pub fn exposed_ports(&self) -> &[PortMapping] {
        self.dapp.ports.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_DESCRIPTOR: &str = r#"
providers = ["node"]

[phases.setup]
nixPkgs = ["nodejs"]
aptPkgs = ["curl"]

[phases.install]
cmds = ["yarn install"]

[phases.build]
cmds = ["yarn build"]

[start]
cmd = "yarn start"

[dapp]
uid = "uniswap-interface"
repository = "https://github.com/Uniswap/interface.git"
tag = "v4.266.2"
httpPort = 3000
ports = ["3000:3000", "8545:8545"]
"#;

    #[test]
    fn test_parse_full_descriptor() {
        let descriptor: DappDescriptor = toml::from_str(FULL_DESCRIPTOR).unwrap();
        descriptor.validate().unwrap();
        assert_eq!(descriptor.dapp.uid, "uniswap-interface");
        assert_eq!(descriptor.dapp.http_port, 3000);
        assert_eq!(descriptor.dapp.tag.as_deref(), Some("v4.266.2"));
        assert_eq!(
            descriptor.exposed_ports(),
            &[
                PortMapping { host: 3000, container: 3000 },
                PortMapping { host: 8545, container: 8545 },
            ]
        );
        let setup = descriptor.phases.unwrap().setup.unwrap();
        assert_eq!(setup.nix_pkgs, Some(vec!["nodejs".to_string()]));
    }

    #[test]
    fn test_minimal_descriptor() {
        let raw = r#"
[dapp]
uid = "hello"
repository = "https://example.com/hello.git"
httpPort = 8080
"#;
        let descriptor: DappDescriptor = toml::from_str(raw).unwrap();
        descriptor.validate().unwrap();
        assert!(descriptor.phases.is_none());
        assert!(descriptor.exposed_ports().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_wire_format() {
        let descriptor: DappDescriptor = toml::from_str(FULL_DESCRIPTOR).unwrap();
        let rendered = descriptor.to_toml().unwrap();
        assert!(rendered.contains("httpPort = 3000"));
        assert!(rendered.contains("nixPkgs"));
        assert!(rendered.contains("\"3000:3000\""));

        let reparsed: DappDescriptor = toml::from_str(&rendered).unwrap();
        assert_eq!(reparsed.dapp.uid, descriptor.dapp.uid);
        assert_eq!(reparsed.dapp.ports, descriptor.dapp.ports);
        assert_eq!(
            reparsed.start.unwrap().cmd.as_deref(),
            Some("yarn start")
        );
    }

    #[test]
    fn test_bad_port_mapping_rejected() {
        let raw = r#"
[dapp]
uid = "hello"
repository = "https://example.com/hello.git"
httpPort = 8080
ports = ["3000-3000"]
"#;
        assert!(toml::from_str::<DappDescriptor>(raw).is_err());

        let raw = r#"
[dapp]
uid = "hello"
repository = "https://example.com/hello.git"
httpPort = 8080
ports = ["99999:3000"]
"#;
        assert!(toml::from_str::<DappDescriptor>(raw).is_err());
    }

    #[test]
    fn test_port_mapping_parse_and_display() {
        let mapping: PortMapping = "8080:80".parse().unwrap();
        assert_eq!(mapping, PortMapping { host: 8080, container: 80 });
        assert_eq!(mapping.to_string(), "8080:80");
        assert!("80".parse::<PortMapping>().is_err());
        assert!(":80".parse::<PortMapping>().is_err());
    }

    #[test]
    fn test_uid_validation() {
        validate_uid("uniswap-interface").unwrap();
        validate_uid("abc").unwrap();
        validate_uid("abc_").unwrap();
        validate_uid("a.b-c_9").unwrap();

        assert!(validate_uid("").is_err());
        assert!(validate_uid("-abc").is_err());
        assert!(validate_uid("Abc").is_err());
        assert!(validate_uid("a b").is_err());
        assert!(validate_uid("a;rm -rf /").is_err());
        assert!(validate_uid("../escape").is_err());
        assert!(validate_uid(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let raw = r#"
[dapp]
uid = "hello"
repository = "https://example.com/hello.git"
httpPort = 0
"#;
        let descriptor: DappDescriptor = toml::from_str(raw).unwrap();
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let result = DappDescriptor::load_from(&tmp.path().join("nixpacks.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nixpacks.toml");
        std::fs::write(&path, FULL_DESCRIPTOR).unwrap();
        let descriptor = DappDescriptor::load_from(&path).unwrap();
        assert_eq!(descriptor.dapp.uid, "uniswap-interface");
    }
}
