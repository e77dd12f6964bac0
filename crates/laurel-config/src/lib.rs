//! laurel-config
//!
//! Layered YAML configuration for the bot: documents merge in order (later
//! docs override earlier ones), the merged value is canonicalized and
//! hashed for run provenance, and secret-looking literal leaf values are
//! rejected outright — platform credentials belong in the environment,
//! never in config files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

/// Known secret-like prefixes. If any leaf string value in the effective
/// config starts with one of these, loading aborts.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",        // generic API secret key
    "AKIA",       // AWS access key ID
    "-----BEGIN", // PEM private keys
    "ghp_",       // GitHub PAT
    "xoxb-",      // Slack bot token
    "xoxp-",      // Slack user token
];

// ---------------------------------------------------------------------------
// Layered loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// SHA-256 of the canonical JSON, for provenance logging.
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    // Merge YAML docs in order: earlier docs are base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // Compact serialization; merge order is deterministic given the input
    // document order, so the hash is stable across runs.
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Secret-literal guard
// ---------------------------------------------------------------------------

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(val) = v.pointer(&ptr) {
            if let Some(s) = val.as_str() {
                if looks_like_secret(s) {
                    bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
                }
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

// ---------------------------------------------------------------------------
// Typed view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// The bot's own account name. The password/token is NOT configured
    /// here; the platform layer reads it from the environment.
    pub username: String,
}

fn default_scan_window_capacity() -> usize {
    10
}

/// The effective bot configuration, deserialized from the merged layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub account: AccountConfig,
    /// The watched community.
    pub community: String,
    /// Award token strings the scanner looks for.
    pub tokens: Vec<String>,
    /// Base minimum body length; the classifier adds the longest token
    /// length on top.
    pub minimum_comment_length: usize,
    /// Rescan window in days for `TooShort` re-evaluation.
    pub days_to_rescan: i64,
    /// Ledger database path.
    pub database: String,
    /// Outer-loop pacing hint, consumed by the polling driver.
    pub sleep_seconds: u64,
    #[serde(default = "default_scan_window_capacity")]
    pub scan_window_capacity: usize,
}

impl BotConfig {
    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Self> {
        serde_json::from_value(loaded.config_json.clone())
            .context("config does not match the expected shape")
    }
}
