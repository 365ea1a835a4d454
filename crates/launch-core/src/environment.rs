//! Operator-supplied environment

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;

/// Compression scheme selector
pub const COMM_HOOK_TYPE: &str = "COMM_HOOK_TYPE";

/// Opaque arguments for the distributed launcher
pub const DISTRIBUTED_ARGS: &str = "DISTRIBUTED_ARGS";

/// Dataset directory
pub const WIKITEXT_DATA_PATH: &str = "WIKITEXT_DATA_PATH";

/// Snapshot of environment variables handed to [`crate::resolve`]
///
/// Resolution only ever sees this value, never the live process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,

    /// Keys present with a value that is not valid UTF-8
    non_utf8: BTreeSet<String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Build from raw OS pairs, remembering values that are not UTF-8
    pub fn from_os_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut env = Self::new();
        for (key, value) in vars {
            // No launch variable has a non-UTF-8 name
            let Ok(key) = key.into_string() else {
                continue;
            };
            match value.into_string() {
                Ok(value) => {
                    env.vars.insert(key, value);
                }
                Err(_) => {
                    env.non_utf8.insert(key);
                }
            }
        }
        env
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.non_utf8.remove(&key);
        self.vars.insert(key, value.into());
        self
    }

    /// Whether `key` is set to a value that is not valid UTF-8
    pub fn is_non_utf8(&self, key: &str) -> bool {
        self.non_utf8.contains(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn comm_hook_type(&self) -> Option<&str> {
        self.get(COMM_HOOK_TYPE)
    }

    pub fn distributed_args(&self) -> Option<&str> {
        self.get(DISTRIBUTED_ARGS)
    }

    pub fn data_path(&self) -> Option<&str> {
        self.get(WIKITEXT_DATA_PATH)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            non_utf8: BTreeSet::new(),
        }
    }
}
