use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::{debug, warn};
use wftrace_common::constants::{DEFAULT_AUTHOR_EMAIL, DEFAULT_DESCRIPTION, DEFAULT_WMS_URL};
use wftrace_common::types::trace::{Author, TraceHeader};

const CONFIG_DIR: &str = "wftrace";
const CONFIG_FILE: &str = "wftrace.toml";
const ENV_PREFIX: &str = "WFTRACE";

/// Provenance defaults. Layered as built-in defaults, then the TOML file,
/// then `WFTRACE_*` environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub author_name: String,
    pub author_email: Option<String>,
    pub description: Option<String>,
    pub wms_url: String,
}

/// Values given on the command line; they win over [`Settings`].
#[derive(Clone, Debug, Default)]
pub struct HeaderOverrides {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub description: Option<String>,
}

impl Settings {
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let mut builder = Config::builder()
            .set_default("author_name", whoami::username())?
            .set_default("wms_url", DEFAULT_WMS_URL)?;

        match path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(path) = Self::default_config_path() {
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        builder
            .build()?
            .try_deserialize()
            .context("failed to parse config file")
    }

    pub fn header(&self, overrides: HeaderOverrides) -> TraceHeader {
        let email = overrides
            .author_email
            .or_else(|| self.author_email.clone())
            .unwrap_or_else(|| {
                warn!("Please, update the email address, or use the \"-e\" option.");
                DEFAULT_AUTHOR_EMAIL.to_string()
            });
        let description = overrides
            .description
            .or_else(|| self.description.clone())
            .unwrap_or_else(|| {
                warn!("No trace description given, use the \"-n\" option to set one.");
                DEFAULT_DESCRIPTION.to_string()
            });

        TraceHeader {
            description,
            author: Author {
                name: overrides
                    .author_name
                    .unwrap_or_else(|| self.author_name.clone()),
                email,
            },
            wms_url: self.wms_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wftrace.toml");
        fs::write(
            &path,
            "author_name = \"Ada\"\nauthor_email = \"ada@example.org\"\nwms_url = \"http://localhost\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.author_name, "Ada");
        assert_eq!(settings.author_email.as_deref(), Some("ada@example.org"));
        assert_eq!(settings.wms_url, "http://localhost");
        assert_eq!(settings.description, None);
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn command_line_wins_and_defaults_fill_gaps() {
        let settings = Settings {
            author_name: "Ada".into(),
            author_email: Some("ada@example.org".into()),
            description: None,
            wms_url: DEFAULT_WMS_URL.into(),
        };

        let header = settings.header(HeaderOverrides {
            author_name: Some("Grace".into()),
            ..Default::default()
        });
        assert_eq!(header.author.name, "Grace");
        assert_eq!(header.author.email, "ada@example.org");
        assert_eq!(header.description, DEFAULT_DESCRIPTION);

        let header = Settings {
            author_email: None,
            ..settings
        }
        .header(HeaderOverrides::default());
        assert_eq!(header.author.email, DEFAULT_AUTHOR_EMAIL);
    }
}
