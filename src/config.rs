use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://www.themealdb.com/api/json/v1/1";
const DEFAULT_DB_PATH: &str = "recipe-fetch.db";
const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    InMemory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub storage: StorageLocation,
    pub api_base: String,
}

impl Config {
    /// Reads the configuration from the process environment (after `.env` is loaded).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());

        let storage = match non_empty("FAVORITES_DB") {
            Some(path) if path == IN_MEMORY => StorageLocation::InMemory,
            Some(path) => StorageLocation::File(PathBuf::from(path)),
            None => StorageLocation::File(PathBuf::from(DEFAULT_DB_PATH)),
        };
        let api_base = non_empty("MEALDB_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Config { storage, api_base }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(
            config.storage,
            StorageLocation::File(PathBuf::from("recipe-fetch.db"))
        );
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn memory_marker_selects_in_memory_store() {
        let config = config_from(&[("FAVORITES_DB", ":memory:")]);
        assert_eq!(config.storage, StorageLocation::InMemory);
    }

    #[test]
    fn api_base_override_drops_trailing_slash() {
        let config = config_from(&[
            ("FAVORITES_DB", "/var/lib/recipes/favs.db"),
            ("MEALDB_API_BASE", "http://localhost:8080/api/"),
        ]);
        assert_eq!(config.api_base, "http://localhost:8080/api");
        assert_eq!(
            config.storage,
            StorageLocation::File(PathBuf::from("/var/lib/recipes/favs.db"))
        );
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("FAVORITES_DB", "  "), ("MEALDB_API_BASE", "")]);
        assert_eq!(config, config_from(&[]));
    }
}
