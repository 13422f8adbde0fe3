//! # Invocation Arguments
//!
//! The invocation surface is a mapping from string argument names to
//! opaque byte blobs; there are no named function parameters. Each
//! handler pulls its arguments out of the map and owns their parsing.
//!
//! An argument that is absent or empty is treated as missing. Numbers
//! travel as decimal ASCII.

use std::collections::BTreeMap;

use sentra_common::error::ContractError;

/// Mapping from argument name to opaque bytes, as handed over by the host.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArgMap {
    entries: BTreeMap<String, Vec<u8>>,
}

impl ArgMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Builder-style insert for test and client ergonomics.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(|v| v.as_slice())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ArgMap {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let mut args = ArgMap::new();
        for (name, value) in pairs {
            args.insert(name, value.as_bytes());
        }
        args
    }
}

/// Required raw bytes; absent or empty is a missing argument.
pub fn required_bytes<'a>(args: &'a ArgMap, name: &str) -> Result<&'a [u8], ContractError> {
    match args.get(name) {
        Some(bytes) if !bytes.is_empty() => Ok(bytes),
        _ => Err(ContractError::MissingArgument {
            name: name.to_string(),
        }),
    }
}

/// Required UTF-8 string; absent or empty is a missing argument.
pub fn required_str<'a>(args: &'a ArgMap, name: &str) -> Result<&'a str, ContractError> {
    let bytes = required_bytes(args, name)?;
    std::str::from_utf8(bytes).map_err(|_| ContractError::InvalidArgument {
        name: name.to_string(),
        detail: "not valid utf-8".to_string(),
    })
}

/// Optional UTF-8 string; absent or empty yields `None`, malformed bytes
/// still reject.
pub fn optional_str<'a>(args: &'a ArgMap, name: &str) -> Result<Option<&'a str>, ContractError> {
    match args.get(name) {
        None => Ok(None),
        Some(bytes) if bytes.is_empty() => Ok(None),
        Some(bytes) => std::str::from_utf8(bytes)
            .map(Some)
            .map_err(|_| ContractError::InvalidArgument {
                name: name.to_string(),
                detail: "not valid utf-8".to_string(),
            }),
    }
}

/// Required non-negative integer from decimal ASCII.
pub fn required_u64(args: &ArgMap, name: &str) -> Result<u64, ContractError> {
    let s = required_str(args, name)?;
    s.parse::<u64>().map_err(|e| ContractError::InvalidArgument {
        name: name.to_string(),
        detail: e.to_string(),
    })
}

/// Required signed integer from decimal ASCII.
pub fn required_i64(args: &ArgMap, name: &str) -> Result<i64, ContractError> {
    let s = required_str(args, name)?;
    s.parse::<i64>().map_err(|e| ContractError::InvalidArgument {
        name: name.to_string(),
        detail: e.to_string(),
    })
}

/// Required 8-bit integer from decimal ASCII.
pub fn required_u8(args: &ArgMap, name: &str) -> Result<u8, ContractError> {
    let s = required_str(args, name)?;
    s.parse::<u8>().map_err(|e| ContractError::InvalidArgument {
        name: name.to_string(),
        detail: e.to_string(),
    })
}
