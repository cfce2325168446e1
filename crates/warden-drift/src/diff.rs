// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dotted-path comparison of JSON trees.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// A leaf whose value differs from the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangedValue {
    pub path: String,
    pub expected: Value,
    pub actual: Value,
}

/// Differences between a live snapshot and the baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriftReport {
    /// Baseline leaves absent from the live snapshot.
    pub missing: Vec<String>,
    pub changed: Vec<ChangedValue>,
    /// Live leaves the baseline does not know.
    pub unexpected: Vec<String>,
    pub drift_detected: bool,
}

impl DriftReport {
    pub fn between(baseline: &Value, live: &Value) -> Self {
        let expected = flatten(baseline);
        let actual = flatten(live);

        let mut report = DriftReport::default();
        for (path, want) in &expected {
            match actual.get(path) {
                None => report.missing.push(path.clone()),
                Some(got) if got != want => report.changed.push(ChangedValue {
                    path: path.clone(),
                    expected: want.clone(),
                    actual: got.clone(),
                }),
                Some(_) => {}
            }
        }
        report.unexpected = actual
            .keys()
            .filter(|path| !expected.contains_key(*path))
            .cloned()
            .collect();

        report.drift_detected =
            !(report.missing.is_empty() && report.changed.is_empty() && report.unexpected.is_empty());
        report
    }
}

/// Flatten a JSON tree into `dotted.path -> leaf` pairs.
///
/// Arrays, scalars, null and empty objects are leaves.
pub fn flatten(value: &Value) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    flatten_into(value, String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, prefix: String, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, path, out);
            }
        }
        leaf => {
            if !prefix.is_empty() {
                out.insert(prefix, leaf.clone());
            }
        }
    }
}

/// Look up a dotted path.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |node, key| node.get(key))
}
