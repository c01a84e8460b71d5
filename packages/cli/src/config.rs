use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use xmlens_lens::Modification;

pub const DEFAULT_MANIFEST_NAME: &str = "xmlens.json";

/// Manifest file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub modifications: Vec<ModificationEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationEntry {
    /// Label used in output; defaults to the file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Absolute path of the XML file to modify
    pub file: PathBuf,

    /// A single statement or a list of them
    #[serde(default, with = "one_or_many")]
    pub changes: Vec<String>,

    #[serde(default, with = "one_or_many")]
    pub onlyif: Vec<String>,
}

impl ModificationEntry {
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.file.display().to_string())
    }
}

impl From<&ModificationEntry> for Modification {
    fn from(entry: &ModificationEntry) -> Self {
        Modification {
            file: entry.file.clone(),
            changes: entry.changes.clone(),
            onlyif: entry.onlyif.clone(),
        }
    }
}

impl Manifest {
    /// Load a manifest from `path`
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest = serde_json::from_str(&content)
            .with_context(|| format!("Invalid manifest {}", path.display()))?;
        Ok(manifest)
    }

    /// Manifest path to use when none is given on the command line
    pub fn default_path(cwd: &Path) -> PathBuf {
        cwd.join(DEFAULT_MANIFEST_NAME)
    }
}

mod one_or_many {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    pub fn serialize<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        values.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let json = r#"{
            "modifications": [
                {
                    "name": "tomcat port",
                    "file": "/etc/tomcat/server.xml",
                    "changes": ["set /Server/Service/Connector#attribute/port \"8081\""],
                    "onlyif": ["match /Server/Service/Connector size == 1"]
                },
                {
                    "file": "/etc/app.xml",
                    "changes": "rm /config/debug"
                }
            ]
        }"#;

        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.modifications.len(), 2);

        let first = &manifest.modifications[0];
        assert_eq!(first.label(), "tomcat port");
        assert_eq!(first.onlyif.len(), 1);

        let second = &manifest.modifications[1];
        assert_eq!(second.label(), "/etc/app.xml");
        assert_eq!(second.changes, vec!["rm /config/debug"]);
        assert!(second.onlyif.is_empty());
    }

    #[test]
    fn test_default_manifest() {
        let manifest: Manifest = serde_json::from_str("{}").unwrap();
        assert!(manifest.modifications.is_empty());
        assert_eq!(
            Manifest::default_path(Path::new("/work")),
            PathBuf::from("/work/xmlens.json")
        );
    }

    #[test]
    fn test_entry_into_modification() {
        let entry = ModificationEntry {
            name: None,
            file: PathBuf::from("/a.xml"),
            changes: vec!["clear /a".to_string()],
            onlyif: vec![],
        };
        let modification = Modification::from(&entry);
        assert_eq!(modification.file, PathBuf::from("/a.xml"));
        assert_eq!(modification.changes, vec!["clear /a"]);
    }

    #[test]
    fn test_load_missing_manifest() {
        let err = Manifest::load(Path::new("/nonexistent/xmlens.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest"));
    }
}
