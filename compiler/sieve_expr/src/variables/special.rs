//! Built-in variable namespaces.

use chrono::Local;
use rustc_hash::FxHashMap;

use super::{Site, SpecialVariables};
use crate::value::Value;

/// `__line__`, `__file__`, `__filename__`, `__filefolder__`, `__rootfile__`.
#[derive(Debug, Default)]
pub struct FileNamespace;

impl SpecialVariables for FileNamespace {
    fn namespace(&self) -> &'static str {
        "file"
    }

    fn owns(&self, name: &str) -> bool {
        matches!(
            name,
            "__line__" | "__file__" | "__filename__" | "__filefolder__" | "__rootfile__"
        )
    }

    #[expect(
        clippy::cast_possible_wrap,
        reason = "line numbers never approach i64::MAX"
    )]
    fn get(&self, name: &str, site: &Site<'_>) -> Option<Value> {
        let file = site.file;
        let value = match name {
            "__line__" => Value::Int(site.line as i64),
            "__file__" => Value::string(file?.display().to_string()),
            "__filename__" => Value::string(file?.file_name()?.to_string_lossy()),
            "__filefolder__" => Value::string(file?.parent()?.display().to_string()),
            "__rootfile__" => Value::string(site.root.or(file)?.display().to_string()),
            _ => return None,
        };
        Some(value)
    }
}

/// `__version__`, `__date__`, `__time__`, `__timestamp__`, read from the
/// local clock at lookup time.
#[derive(Debug)]
pub struct EngineNamespace {
    version: String,
}

impl Default for EngineNamespace {
    fn default() -> Self {
        EngineNamespace {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl EngineNamespace {
    pub fn with_version(version: impl Into<String>) -> Self {
        EngineNamespace {
            version: version.into(),
        }
    }
}

impl SpecialVariables for EngineNamespace {
    fn namespace(&self) -> &'static str {
        "engine"
    }

    fn owns(&self, name: &str) -> bool {
        matches!(
            name,
            "__version__" | "__date__" | "__time__" | "__timestamp__"
        )
    }

    fn get(&self, name: &str, _site: &Site<'_>) -> Option<Value> {
        let format = match name {
            "__version__" => return Some(Value::string(self.version.as_str())),
            "__date__" => "%b %d %Y",
            "__time__" => "%H:%M:%S",
            "__timestamp__" => "%a %b %d %H:%M:%S %Y",
            _ => return None,
        };
        Some(Value::string(Local::now().format(format).to_string()))
    }
}

/// `env.<name>`: process environment variables, names case-insensitive.
#[derive(Debug, Default)]
pub struct EnvNamespace;

const ENV_PREFIX: &str = "env.";

impl SpecialVariables for EnvNamespace {
    fn namespace(&self) -> &'static str {
        "env"
    }

    fn owns(&self, name: &str) -> bool {
        name.starts_with(ENV_PREFIX)
    }

    fn get(&self, name: &str, _site: &Site<'_>) -> Option<Value> {
        let wanted = name.strip_prefix(ENV_PREFIX)?;
        std::env::vars_os()
            .find(|(key, _)| key.to_string_lossy().eq_ignore_ascii_case(wanted))
            .map(|(_, value)| Value::string(value.to_string_lossy()))
    }
}

/// `prop.<name>`: read-only properties handed over by an embedding tool.
#[derive(Debug, Default)]
pub struct PropertyNamespace {
    properties: FxHashMap<String, String>,
}

const PROP_PREFIX: &str = "prop.";

impl PropertyNamespace {
    pub fn new<K, V>(properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        PropertyNamespace {
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_lowercase(), v.into()))
                .collect(),
        }
    }
}

impl SpecialVariables for PropertyNamespace {
    fn namespace(&self) -> &'static str {
        "prop"
    }

    fn owns(&self, name: &str) -> bool {
        name.starts_with(PROP_PREFIX)
    }

    fn get(&self, name: &str, _site: &Site<'_>) -> Option<Value> {
        let key = name.strip_prefix(PROP_PREFIX)?;
        self.properties.get(key).map(|v| Value::string(v.as_str()))
    }
}
