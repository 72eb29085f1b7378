use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::Result;

/// Opaque string entries that survive restarts.
///
/// Each key has exactly one writing owner; other components only read.
pub trait ClientStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Decode a JSON entry. Absent, unreadable, or malformed entries yield the default.
pub fn read_json<T>(store: &dyn ClientStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!("[ClientStore] could not read '{}': {}", key, e);
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("[ClientStore] ignoring malformed '{}': {}", key, e);
            T::default()
        }
    }
}

pub fn write_json<T: Serialize>(store: &dyn ClientStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set_item(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryClientStore;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        dark_mode: bool,
        count: u32,
    }

    #[test]
    fn test_read_json_defaults() {
        let store = MemoryClientStore::new();
        assert_eq!(read_json::<Sample>(&store, "missing"), Sample::default());

        store.set_item("broken", "{not json").unwrap();
        assert_eq!(read_json::<Sample>(&store, "broken"), Sample::default());
    }

    #[test]
    fn test_write_then_read_json() {
        let store = MemoryClientStore::new();
        let value = Sample {
            dark_mode: true,
            count: 3,
        };
        write_json(&store, "sample", &value).unwrap();
        assert_eq!(
            store.get_item("sample").unwrap().as_deref(),
            Some(r#"{"darkMode":true,"count":3}"#)
        );
        assert_eq!(read_json::<Sample>(&store, "sample"), value);
    }
}
