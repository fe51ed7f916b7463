use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::search_engine::SearchEngine;

pub const APP_DIR_NAME: &str = "EdgeDeflector";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "EDGE_DEFLECTOR_CONFIG";
pub const REGISTRY_SUBKEY: &str = r"SOFTWARE\Clients\EdgeUriDeflector";
pub const SEARCH_ENGINE_KEY: &str = "SearchEngine";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{action} failed with code {status}")]
    Registry { action: String, status: u32 },
}

/// Read-only source of named string settings.
pub trait ConfigProvider {
    fn get_string(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub search_engine: Option<SearchEngine>,
}

impl Config {
    /// Reads every setting once. Absent or unrecognized values fall back to
    /// the no-substitution default.
    pub fn load(provider: &dyn ConfigProvider) -> Self {
        let raw_engine = provider.get_string(SEARCH_ENGINE_KEY);
        let search_engine = raw_engine.as_deref().and_then(SearchEngine::from_setting);
        if let (Some(raw), None) = (raw_engine.as_deref(), search_engine) {
            tracing::debug!(value = raw, "unrecognized search engine; keeping bing");
        }
        Self { search_engine }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    values: BTreeMap<String, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl ConfigProvider for MemoryProvider {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Flat TOML table on disk, e.g. `SearchEngine = "DuckDuckGo"`.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_table(&self) -> Result<Option<BTreeMap<String, toml::Value>>, ConfigError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        toml::from_str(&raw)
            .map(Some)
            .map_err(|source| ConfigError::Toml {
                path: self.path.clone(),
                source,
            })
    }
}

impl ConfigProvider for FileProvider {
    fn get_string(&self, key: &str) -> Option<String> {
        match self.read_table() {
            Ok(table) => table?
                .get(key)
                .and_then(toml::Value::as_str)
                .map(str::to_string),
            Err(error) => {
                tracing::warn!(%error, "ignoring unreadable config file");
                None
            }
        }
    }
}

/// Values under `HKEY_LOCAL_MACHINE\<subkey>`. The native registry view is
/// consulted first, then the 32-bit view.
#[derive(Debug, Clone)]
pub struct RegistryProvider {
    subkey: String,
}

impl Default for RegistryProvider {
    fn default() -> Self {
        Self::new(REGISTRY_SUBKEY)
    }
}

impl RegistryProvider {
    pub fn new(subkey: &str) -> Self {
        Self {
            subkey: subkey.to_string(),
        }
    }

    pub fn subkey(&self) -> &str {
        &self.subkey
    }
}

impl ConfigProvider for RegistryProvider {
    #[cfg(target_os = "windows")]
    fn get_string(&self, key: &str) -> Option<String> {
        use windows_sys::Win32::System::Registry::KEY_WOW64_32KEY;

        for view_flags in [0, KEY_WOW64_32KEY] {
            match registry::read_local_machine_string(&self.subkey, key, view_flags) {
                Ok(Some(value)) => return Some(value),
                Ok(None) => continue,
                Err(error) => {
                    tracing::warn!(%error, subkey = %self.subkey, "registry read failed");
                    return None;
                }
            }
        }
        None
    }

    #[cfg(not(target_os = "windows"))]
    fn get_string(&self, _key: &str) -> Option<String> {
        None
    }
}

/// The OS-level store for this platform: the registry on Windows, a TOML
/// file everywhere else.
pub fn default_provider() -> Box<dyn ConfigProvider> {
    #[cfg(target_os = "windows")]
    {
        Box::new(RegistryProvider::default())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(FileProvider::new(config_path()))
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

#[cfg(target_os = "windows")]
mod registry {
    use super::ConfigError;

    pub(super) fn read_local_machine_string(
        subkey: &str,
        value_name: &str,
        view_flags: u32,
    ) -> Result<Option<String>, ConfigError> {
        use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
        use windows_sys::Win32::System::Registry::{
            RegCloseKey, RegOpenKeyExW, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE,
        };

        let subkey_wide = to_wide(subkey);
        let mut key = std::ptr::null_mut();
        let status = unsafe {
            RegOpenKeyExW(
                HKEY_LOCAL_MACHINE,
                subkey_wide.as_ptr(),
                0,
                KEY_QUERY_VALUE | view_flags,
                &mut key,
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status != ERROR_SUCCESS {
            return Err(registry_error("open search engine key", status));
        }

        let value = read_string_value(key, value_name);
        unsafe {
            RegCloseKey(key);
        }
        value
    }

    fn read_string_value(
        key: windows_sys::Win32::System::Registry::HKEY,
        value_name: &str,
    ) -> Result<Option<String>, ConfigError> {
        use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
        use windows_sys::Win32::System::Registry::{RegQueryValueExW, REG_EXPAND_SZ, REG_SZ};

        let value_name_wide = to_wide(value_name);
        let mut value_type = 0_u32;
        let mut size = 0_u32;
        let status = unsafe {
            RegQueryValueExW(
                key,
                value_name_wide.as_ptr(),
                std::ptr::null(),
                &mut value_type,
                std::ptr::null_mut(),
                &mut size,
            )
        };
        if status == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        if status != ERROR_SUCCESS {
            return Err(registry_error("query search engine value", status));
        }
        if size == 0 || (value_type != REG_SZ && value_type != REG_EXPAND_SZ) {
            return Ok(None);
        }

        let mut buffer = vec![0_u8; size as usize];
        let status = unsafe {
            RegQueryValueExW(
                key,
                value_name_wide.as_ptr(),
                std::ptr::null(),
                &mut value_type,
                buffer.as_mut_ptr(),
                &mut size,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(registry_error("read search engine value", status));
        }
        buffer.truncate(size as usize);

        let mut wide: Vec<u16> = buffer
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect();
        while wide.last().copied() == Some(0) {
            wide.pop();
        }
        Ok(Some(String::from_utf16_lossy(&wide)))
    }

    fn to_wide(value: &str) -> Vec<u16> {
        value.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn registry_error(action: &str, status: u32) -> ConfigError {
        ConfigError::Registry {
            action: action.to_string(),
            status,
        }
    }
}
