//! `.weave.yaml` deployment manifest model and database field resolution.
//!
//! Only the parts of the manifest needed to build a lease command are
//! modelled: `deploy.<env>.databases` and `defaults[].env`. Everything
//! else in the document is ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};

use crate::domain::error::DomainError;

/// Well-known default key for the database host.
pub const CLOUDSQL_HOST: &str = "CLOUDSQL_HOST";
/// Well-known default key for the database name.
pub const CLOUDSQL_DATABASE: &str = "CLOUDSQL_DATABASE";
/// Well-known default key for the database schema.
pub const CLOUDSQL_SCHEMA: &str = "CLOUDSQL_SCHEMA";

/// One of the three fields a lease command needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseField {
    Host,
    Database,
    Schema,
}

impl DatabaseField {
    pub const ALL: [DatabaseField; 3] = [Self::Host, Self::Database, Self::Schema];

    /// Key of the database entry in the manifest.
    pub fn entry_key(self) -> &'static str {
        match self {
            Self::Host => "hostname",
            Self::Database => "name",
            Self::Schema => "schema",
        }
    }

    /// Name looked up in the defaults block when the entry omits the field.
    pub fn default_key(self) -> &'static str {
        match self {
            Self::Host => CLOUDSQL_HOST,
            Self::Database => CLOUDSQL_DATABASE,
            Self::Schema => CLOUDSQL_SCHEMA,
        }
    }
}

impl std::fmt::Display for DatabaseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.entry_key())
    }
}

/// Database entry under `deploy.<env>.databases`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseEntry {
    #[serde(deserialize_with = "scalar_text")]
    pub hostname: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub schema: Option<String>,
}

impl DatabaseEntry {
    pub fn field(&self, field: DatabaseField) -> Option<&str> {
        let value = match field {
            DatabaseField::Host => &self.hostname,
            DatabaseField::Database => &self.name,
            DatabaseField::Schema => &self.schema,
        };
        non_empty(value.as_deref())
    }
}

/// Body of `deploy.<env>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeployTarget {
    #[serde(deserialize_with = "sequence_or_empty")]
    pub databases: Vec<DatabaseEntry>,
}

/// `{name, value}` pair in a defaults block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnvVar {
    #[serde(deserialize_with = "scalar_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub value: Option<String>,
}

/// Entry of the top-level `defaults` sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DefaultsBlock {
    #[serde(deserialize_with = "sequence_or_empty")]
    pub env: Vec<EnvVar>,
}

/// Named deployment environment, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: String,
    pub target: DeployTarget,
}

/// Fully resolved connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseParams {
    pub host: String,
    pub name: String,
    pub schema: String,
}

/// Why an environment could not be turned into [`DatabaseParams`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    UnknownEnvironment(String),
    Unresolved {
        environment: String,
        missing: Vec<DatabaseField>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawManifest {
    #[serde(deserialize_with = "mapping_or_empty")]
    deploy: Mapping,
    #[serde(deserialize_with = "sequence_or_empty")]
    defaults: Vec<DefaultsBlock>,
}

/// Parsed deployment manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    environments: Vec<Environment>,
    defaults: Vec<DefaultsBlock>,
}

impl Manifest {
    /// Parse manifest YAML.
    ///
    /// Merge keys (`<<: *anchor`) are expanded before anything is read.
    /// An empty document yields a manifest without environments. Values of
    /// the wrong shape (a scalar where a mapping or sequence belongs) count
    /// as absent, so resolution falls back to the defaults block.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut value: Value = serde_yaml::from_str(text).map_err(invalid)?;
        value.apply_merge().map_err(invalid)?;
        let raw: RawManifest = match value {
            Value::Mapping(_) => serde_yaml::from_value(value).map_err(invalid)?,
            _ => RawManifest::default(),
        };

        let mut environments = Vec::new();
        for (key, body) in raw.deploy {
            let name = scalar_to_text(&key).ok_or_else(|| DomainError::InvalidManifest {
                message: format!("deploy key is not a scalar: {key:?}"),
            })?;
            let target = serde_yaml::from_value(body).unwrap_or_default();
            environments.push(Environment { name, target });
        }

        Ok(Self {
            environments,
            defaults: raw.defaults,
        })
    }

    /// Environment names in document order.
    pub fn environment_names(&self) -> Vec<&str> {
        self.environments.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// First database entry of an environment; later entries are ignored.
    pub fn database(&self, environment: &str) -> Option<&DatabaseEntry> {
        self.environment(environment)?.target.databases.first()
    }

    /// Value of the first `defaults[0].env` pair named `key`.
    pub fn default_value(&self, key: &str) -> Option<&str> {
        let block = self.defaults.first()?;
        let var = block
            .env
            .iter()
            .find(|v| v.name.as_deref() == Some(key))?;
        non_empty(var.value.as_deref())
    }

    /// Resolve one field: database entry first, defaults block second.
    pub fn resolve_field(&self, environment: &str, field: DatabaseField) -> Option<&str> {
        self.database(environment)
            .and_then(|db| db.field(field))
            .or_else(|| self.default_value(field.default_key()))
    }

    /// Resolve host, name and schema for an environment.
    ///
    /// Fails unless all three resolve to non-empty text.
    pub fn resolve(&self, environment: &str) -> Result<DatabaseParams, ResolveError> {
        if self.environment(environment).is_none() {
            return Err(ResolveError::UnknownEnvironment(environment.to_string()));
        }

        let host = self.resolve_field(environment, DatabaseField::Host);
        let name = self.resolve_field(environment, DatabaseField::Database);
        let schema = self.resolve_field(environment, DatabaseField::Schema);

        match (host, name, schema) {
            (Some(host), Some(name), Some(schema)) => Ok(DatabaseParams {
                host: host.to_string(),
                name: name.to_string(),
                schema: schema.to_string(),
            }),
            _ => Err(ResolveError::Unresolved {
                environment: environment.to_string(),
                missing: DatabaseField::ALL
                    .into_iter()
                    .filter(|f| self.resolve_field(environment, *f).is_none())
                    .collect(),
            }),
        }
    }
}

fn invalid(e: serde_yaml::Error) -> DomainError {
    DomainError::InvalidManifest {
        message: e.to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn scalar_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept any YAML scalar as text; mappings, sequences and null become `None`.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_text(&value))
}

/// Items of a sequence; anything else is empty. Items of the wrong shape
/// become `T::default()` so positions are kept.
fn sequence_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Sequence(items) => Ok(items
            .into_iter()
            .map(|item| serde_yaml::from_value(item).unwrap_or_default())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

fn mapping_or_empty<'de, D>(deserializer: D) -> Result<Mapping, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Ok(Mapping::new()),
    }
}
