/*!
`startup.rs`

Process preconditions and configuration, resolved once before any component
is constructed.

Order:
  1. `.env` in the working directory (or a parent) is loaded, if present.
  2. `ANTHROPIC_API_KEY` must be set and non-empty (fatal otherwise).
  3. Settings are resolved: CLI flag > FIGMA_MCP_ENDPOINT env > config file > default.

Config file (JSON or YAML, chosen by extension; every key optional):
  endpoint: "http://localhost:3030/sse"
  client_name: "mcp-client-cli"
  client_version: "1.0.0"
  node_id: true     # extract node-id from URLs
  depth: true       # extract trailing -<n> depth from URLs
*/

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ClientError;
use crate::figma::FieldSet;
use crate::mcp::{ClientIdentity, Endpoint};
use crate::utils::mask_secret;
use crate::{log_debug, log_info};

pub const CREDENTIAL_VAR: &str = "ANTHROPIC_API_KEY";
pub const ENDPOINT_ENV: &str = "FIGMA_MCP_ENDPOINT";

/// Language-model API key. Held for the lifetime of the process, never printed.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn masked(&self) -> String {
        mask_secret(&self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.masked())
    }
}

/// Load `.env` if one exists. Returns the path that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            log_debug!("loaded environment from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            log_info!("ignoring unreadable .env: {}", e);
            None
        }
    }
}

/// The startup gate: the credential must be present before anything else runs.
pub fn validate_environment() -> Result<Credential, ClientError> {
    credential_from(std::env::var(CREDENTIAL_VAR).ok())
}

fn credential_from(value: Option<String>) -> Result<Credential, ClientError> {
    match value {
        Some(v) if !v.trim().is_empty() => {
            let credential = Credential(v);
            log_debug!("{} present: {}", CREDENTIAL_VAR, credential.masked());
            Ok(credential)
        }
        _ => Err(ClientError::MissingCredential {
            var: CREDENTIAL_VAR,
        }),
    }
}

/// On-disk configuration. Unknown keys are rejected to catch typos.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub client_name: Option<String>,
    pub client_version: Option<String>,
    pub node_id: Option<bool>,
    pub depth: Option<bool>,
}

pub fn load_config_file(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let lower = path.to_string_lossy().to_ascii_lowercase();
    if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        serde_yaml::from_str(&raw).context("failed to parse YAML config file")
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON config file")
    }
}

/// Everything the connector and the loop need, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: Endpoint,
    pub identity: ClientIdentity,
    pub fields: FieldSet,
}

/// Command-line overrides fed into `resolve_settings`.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub config: Option<PathBuf>,
    pub no_node_id: bool,
    pub no_depth: bool,
}

pub fn resolve_settings(overrides: &Overrides) -> Result<Settings> {
    let env_endpoint = std::env::var(ENDPOINT_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty());
    let file = match &overrides.config {
        Some(p) => load_config_file(p)?,
        None => FileConfig::default(),
    };
    merge_settings(overrides, env_endpoint, file)
}

fn merge_settings(
    overrides: &Overrides,
    env_endpoint: Option<String>,
    file: FileConfig,
) -> Result<Settings> {
    let endpoint = match overrides
        .endpoint
        .clone()
        .or(env_endpoint)
        .or(file.endpoint)
    {
        Some(raw) => Endpoint::parse(&raw)?,
        None => Endpoint::default(),
    };

    let defaults = ClientIdentity::default();
    let identity = ClientIdentity {
        name: file.client_name.unwrap_or(defaults.name),
        version: file.client_version.unwrap_or(defaults.version),
    };

    let fields = FieldSet {
        node_id: !overrides.no_node_id && file.node_id.unwrap_or(true),
        depth: !overrides.no_depth && file.depth.unwrap_or(true),
    };

    Ok(Settings {
        endpoint,
        identity,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_missing_or_blank_is_fatal() {
        for v in [None, Some(String::new()), Some("   ".to_string())] {
            let err = credential_from(v).unwrap_err();
            assert_eq!(err.kind(), "MissingCredential");
        }
    }

    #[test]
    fn credential_debug_is_masked() {
        let c = credential_from(Some("sk-ant-abcdefgh".into())).unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("abcdefgh"));
        assert!(dbg.starts_with("Credential(sk"));
    }

    #[test]
    fn defaults_when_nothing_given() {
        let s = merge_settings(&Overrides::default(), None, FileConfig::default()).unwrap();
        assert_eq!(s.endpoint, Endpoint::default());
        assert_eq!(s.identity, ClientIdentity::default());
        assert_eq!(s.fields, FieldSet::default());
    }

    #[test]
    fn precedence_cli_env_file() {
        let file = FileConfig {
            endpoint: Some("http://file:1/sse".into()),
            ..Default::default()
        };
        let s = merge_settings(&Overrides::default(), None, file).unwrap();
        assert_eq!(s.endpoint.as_str(), "http://file:1/sse");

        let file = FileConfig {
            endpoint: Some("http://file:1/sse".into()),
            ..Default::default()
        };
        let s = merge_settings(&Overrides::default(), Some("http://env:2/sse".into()), file)
            .unwrap();
        assert_eq!(s.endpoint.as_str(), "http://env:2/sse");

        let o = Overrides {
            endpoint: Some("https://cli:3/sse".into()),
            ..Default::default()
        };
        let s = merge_settings(&o, Some("http://env:2/sse".into()), FileConfig::default())
            .unwrap();
        assert_eq!(s.endpoint.as_str(), "https://cli:3/sse");
    }

    #[test]
    fn bad_endpoint_scheme_is_rejected() {
        let o = Overrides {
            endpoint: Some("ftp://nope/sse".into()),
            ..Default::default()
        };
        assert!(merge_settings(&o, None, FileConfig::default()).is_err());
    }

    #[test]
    fn field_flags_combine_file_and_cli() {
        let file = FileConfig {
            depth: Some(false),
            ..Default::default()
        };
        let s = merge_settings(&Overrides::default(), None, file).unwrap();
        assert!(s.fields.node_id);
        assert!(!s.fields.depth);

        let o = Overrides {
            no_node_id: true,
            ..Default::default()
        };
        let s = merge_settings(&o, None, FileConfig::default()).unwrap();
        assert!(!s.fields.node_id);
        assert!(s.fields.depth);
    }

    #[test]
    fn config_file_yaml_and_json() {
        let dir = std::env::temp_dir();
        let yaml = dir.join("figma_mcp_client_cfg_test.yaml");
        std::fs::write(
            &yaml,
            "endpoint: http://localhost:4000/sse\nclient_name: probe\ndepth: false\n",
        )
        .unwrap();
        let cfg = load_config_file(&yaml).unwrap();
        assert_eq!(cfg.endpoint.as_deref(), Some("http://localhost:4000/sse"));
        assert_eq!(cfg.client_name.as_deref(), Some("probe"));
        assert_eq!(cfg.depth, Some(false));

        let json = dir.join("figma_mcp_client_cfg_test.json");
        std::fs::write(&json, r#"{ "client_version": "2.0.0", "node_id": false }"#).unwrap();
        let cfg = load_config_file(&json).unwrap();
        assert_eq!(cfg.client_version.as_deref(), Some("2.0.0"));
        assert_eq!(cfg.node_id, Some(false));
    }

    #[test]
    fn config_file_unknown_key_rejected() {
        let path = std::env::temp_dir().join("figma_mcp_client_cfg_bad.json");
        std::fs::write(&path, r#"{ "endpoitn": "typo" }"#).unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("JSON"));
    }
}
