//! Canonical byte encoding of a [`LicensePayload`].
//!
//! Signer and validator both sign/verify exactly these bytes, so the
//! encoding must never depend on platform, locale, process, or map
//! insertion order. Layout (UTF-8, `\n` line endings):
//!
//! ```text
//! keysmith-license/canonical/v1
//! formatVersion=1
//! licenseId="4f0c..."
//! issuer="Acme Corp"
//! licensedTo="customer-42"
//! productId="X"
//! tier="standard"
//! features=["export","sso"]
//! validFrom="2024-01-01T00:00:00.000Z"
//! validTo="2025-01-01T00:00:00.000Z"
//! metadata={"region":"eu"}
//! ```
//!
//! Field order is fixed; values are JSON literals; features and metadata
//! keys are emitted in sorted order.

use crate::payload::{timestamp, LicensePayload};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// First line of every canonical encoding.
pub const CANONICAL_HEADER: &str = "keysmith-license/canonical/v1";

/// Returns the canonical encoding of `payload`.
#[must_use]
pub fn canonicalize(payload: &LicensePayload) -> Vec<u8> {
    let metadata: Map<String, Value> = payload
        .metadata
        .iter()
        .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
        .collect();

    let fields: [(&str, Value); 10] = [
        ("formatVersion", Value::from(payload.format_version)),
        ("licenseId", Value::from(payload.license_id.to_string())),
        ("issuer", Value::from(payload.issuer.as_str())),
        ("licensedTo", Value::from(payload.licensed_to.as_str())),
        ("productId", Value::from(payload.product_id.as_str())),
        ("tier", Value::from(payload.tier.as_str())),
        (
            "features",
            Value::Array(payload.features.iter().map(|f| Value::from(f.as_str())).collect()),
        ),
        ("validFrom", Value::from(timestamp::format(&payload.valid_from))),
        ("validTo", Value::from(timestamp::format(&payload.valid_to))),
        ("metadata", Value::Object(metadata)),
    ];

    let mut out = String::from(CANONICAL_HEADER);
    out.push('\n');
    for (name, value) in fields {
        out.push_str(name);
        out.push('=');
        out.push_str(&value.to_string());
        out.push('\n');
    }
    out.into_bytes()
}

/// Returns the lowercase hex SHA-256 of the canonical encoding.
#[must_use]
pub fn payload_digest(payload: &LicensePayload) -> String {
    hex::encode(Sha256::digest(canonicalize(payload)))
}
