//! Settings files.

use super::ConfigSource;
use crate::error::{Result, TlsReloadError};
use config::{File, FileFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Settings keys holding credential paths.
const CREDENTIAL_KEYS: [&str; 4] = ["cert_file", "key_file", "ticket_seed_file", "client_ca_file"];

/// Formats compiled into this build, for error messages.
const ENABLED_FORMATS: &[&str] = &[
    #[cfg(feature = "yaml")]
    "yaml",
    #[cfg(feature = "toml")]
    "toml",
    #[cfg(feature = "json")]
    "json",
];

/// Reads TLS settings from a YAML, TOML or JSON file.
///
/// The format follows the extension and is only available with the matching
/// crate feature (`yaml`, `toml`, `json`). Relative credential paths in the
/// file are resolved against the file's own directory, so a settings file can
/// name the certificate next to it as just `server.crt`.
///
/// # Examples
///
/// ```rust,no_run
/// use tls_hotswap::sources::FileSource;
///
/// let source = FileSource::new("/etc/myserver/tls.yaml");
/// ```
pub struct FileSource {
    path: PathBuf,
    priority: i32,
}

impl FileSource {
    /// Create a source for `path` with the default file priority.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            priority: 100,
        }
    }

    /// Override the merge priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn resolve_credential_paths(&self, values: &mut HashMap<String, config::Value>) {
        let Some(dir) = self.path.parent() else {
            return;
        };

        for key in CREDENTIAL_KEYS {
            let Some(raw) = values.get(key).and_then(|v| v.clone().into_string().ok()) else {
                continue;
            };
            if raw.is_empty() || Path::new(&raw).is_absolute() {
                continue;
            }
            let resolved = dir.join(&raw).to_string_lossy().into_owned();
            values.insert(key.to_string(), config::Value::from(resolved));
        }
    }
}

fn format_for(path: &Path) -> Result<FileFormat> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();

    match extension {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        #[cfg(feature = "toml")]
        "toml" => Ok(FileFormat::Toml),
        #[cfg(feature = "json")]
        "json" => Ok(FileFormat::Json),
        _ => Err(TlsReloadError::LoadError(format!(
            "Settings file {} has no enabled format (enabled: [{}]); \
             enable the crate feature matching its extension",
            path.display(),
            ENABLED_FORMATS.join(", ")
        ))),
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<HashMap<String, config::Value>> {
        let format = format_for(&self.path)?;

        let mut values = config::Config::builder()
            .add_source(File::from(self.path.as_path()).format(format).required(true))
            .build()
            .map_err(|e| TlsReloadError::LoadError(format!("Failed to read settings file: {}", e)))?
            .try_deserialize::<HashMap<String, config::Value>>()
            .map_err(|e| {
                TlsReloadError::DeserializationError(format!("Failed to parse settings file: {}", e))
            })?;

        self.resolve_credential_paths(&mut values);
        Ok(values)
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension_rejected() {
        for name in ["tls.ini", "tls", "tls.pem"] {
            let err = format_for(Path::new(name)).unwrap_err();
            assert!(matches!(err, TlsReloadError::LoadError(_)), "{}", name);
        }
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_yaml_extensions() {
        assert!(matches!(format_for(Path::new("tls.yaml")), Ok(FileFormat::Yaml)));
        assert!(matches!(format_for(Path::new("tls.yml")), Ok(FileFormat::Yaml)));
    }

    #[cfg(not(feature = "toml"))]
    #[test]
    fn test_toml_needs_feature() {
        let err = FileSource::new("/etc/tls/tls.toml").load().unwrap_err();
        assert!(err.to_string().contains("no enabled format"));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_missing_file() {
        let err = FileSource::new("/nonexistent/tls.yaml").load().unwrap_err();
        assert!(matches!(err, TlsReloadError::LoadError(_)));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_relative_credential_paths_follow_settings_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let settings = temp_dir.path().join("tls.yaml");
        std::fs::write(
            &settings,
            "cert_file: certs/server.crt\nkey_file: /etc/tls/server.key\npolling_file_interval_ms: 500\n",
        )
        .unwrap();

        let values = FileSource::new(&settings).load().unwrap();

        let cert = values["cert_file"].clone().into_string().unwrap();
        assert_eq!(PathBuf::from(cert), temp_dir.path().join("certs/server.crt"));
        let key = values["key_file"].clone().into_string().unwrap();
        assert_eq!(key, "/etc/tls/server.key");
        assert_eq!(values["polling_file_interval_ms"].clone().into_int().unwrap(), 500);
    }

    #[test]
    fn test_name_and_priority() {
        let source = FileSource::new("tls.toml").with_priority(150);
        assert_eq!(source.priority(), 150);
        assert_eq!(source.name(), "file:tls.toml");
    }
}
