// SPDX-FileCopyrightText: © 2026 Edge Mesh SDK Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! A registration map of string → decoder function, consulted by the
//! envelope codec instead of dynamic plugin discovery.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// The well-known field the codec inspects to pick a formatter.
pub const FORMATTER_FIELD: &str = "EE_FORMATTER";

/// The formatter used when `FORMATTER_FIELD` is absent: passes the merged
/// mapping through unchanged.
pub const RAW_DICT_FORMATTER: &str = "RAW_DICT_FORMATTER";

type DecodeFn = dyn Fn(&Map<String, Value>) -> Option<Map<String, Value>> + Send + Sync;

pub struct FormatterRegistry {
    formatters: HashMap<String, Box<DecodeFn>>,
}

impl FormatterRegistry {
    /// A registry with just the built-in raw-dict passthrough formatter
    /// registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self { formatters: HashMap::new() };
        registry.register(RAW_DICT_FORMATTER, |body| Some(body.clone()));
        registry
    }

    pub fn register<F>(&mut self, name: &str, decode: F)
    where
        F: Fn(&Map<String, Value>) -> Option<Map<String, Value>> + Send + Sync + 'static,
    {
        self.formatters.insert(name.to_string(), Box::new(decode));
    }

    /// Selects a formatter by `FORMATTER_FIELD` (defaulting to the raw-dict
    /// passthrough) and decodes `body` through it.
    #[must_use]
    pub fn decode(&self, body: &Map<String, Value>) -> Option<Map<String, Value>> {
        let key = body
            .get(FORMATTER_FIELD)
            .and_then(Value::as_str)
            .unwrap_or(RAW_DICT_FORMATTER);
        self.formatters.get(key).and_then(|f| f(body))
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
