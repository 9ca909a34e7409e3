//! The signable license content.
//!
//! A [`LicensePayload`] is everything covered by the signature. Business
//! status (suspended, revoked, ...) is never part of it.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Datelike, SubsecRound, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Payload format version produced and accepted by this engine.
pub const PAYLOAD_FORMAT_VERSION: u32 = 1;

/// Commercial tier of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LicenseTier {
    /// Limited-time evaluation.
    Trial,
    Standard,
    Professional,
    Enterprise,
}

impl LicenseTier {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Standard => "standard",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for LicenseTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseTier {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(Self::Trial),
            "standard" => Ok(Self::Standard),
            "professional" => Ok(Self::Professional),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(LicenseError::MalformedInput(format!(
                "unknown license tier {other:?}"
            ))),
        }
    }
}

impl TryFrom<String> for LicenseTier {
    type Error = LicenseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LicenseTier> for String {
    fn from(tier: LicenseTier) -> Self {
        tier.as_str().to_string()
    }
}

/// The signed content of a license.
///
/// Timestamps carry millisecond precision; the JSON form and the canonical
/// encoding both render exactly three fractional digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LicensePayload {
    /// Payload format version.
    pub format_version: u32,
    /// Unique license id, the key external status stores use.
    pub license_id: Uuid,
    /// Issuing organisation.
    pub issuer: String,
    /// Licensee (customer, tenant, or user identity).
    pub licensed_to: String,
    /// Product identifier.
    pub product_id: String,
    /// Enabled feature names.
    #[serde(default)]
    pub features: BTreeSet<String>,
    pub tier: LicenseTier,
    /// Start of the validity window (inclusive).
    #[serde(with = "timestamp")]
    pub valid_from: DateTime<Utc>,
    /// End of the validity window (inclusive).
    #[serde(with = "timestamp")]
    pub valid_to: DateTime<Utc>,
    /// Free-form issuer metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl LicensePayload {
    /// Starts building a payload for the given identities.
    pub fn builder(
        issuer: impl Into<String>,
        licensed_to: impl Into<String>,
        product_id: impl Into<String>,
    ) -> LicensePayloadBuilder {
        LicensePayloadBuilder {
            license_id: None,
            issuer: issuer.into(),
            licensed_to: licensed_to.into(),
            product_id: product_id.into(),
            features: BTreeSet::new(),
            tier: LicenseTier::Standard,
            validity: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Checks the structural invariants required before signing.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidPayload`] naming the first violation.
    pub fn check_structure(&self) -> LicenseResult<()> {
        let invalid = |msg: String| Err(LicenseError::InvalidPayload(msg));

        if self.format_version != PAYLOAD_FORMAT_VERSION {
            return invalid(format!(
                "unsupported format version {} (expected {PAYLOAD_FORMAT_VERSION})",
                self.format_version
            ));
        }
        for (name, value) in [
            ("issuer", &self.issuer),
            ("licensedTo", &self.licensed_to),
            ("productId", &self.product_id),
        ] {
            if value.trim().is_empty() {
                return invalid(format!("{name} must not be empty"));
            }
        }
        if self.features.iter().any(|f| f.trim().is_empty()) {
            return invalid("feature names must not be empty".to_string());
        }
        if self.metadata.keys().any(|k| k.trim().is_empty()) {
            return invalid("metadata keys must not be empty".to_string());
        }
        if self.valid_from > self.valid_to {
            return invalid(format!(
                "validFrom {} is after validTo {}",
                timestamp::format(&self.valid_from),
                timestamp::format(&self.valid_to)
            ));
        }
        if !timestamp::is_millisecond_precision(&self.valid_from)
            || !timestamp::is_millisecond_precision(&self.valid_to)
        {
            return invalid("validity timestamps must have millisecond precision".to_string());
        }
        for (name, value) in [("validFrom", &self.valid_from), ("validTo", &self.valid_to)] {
            if !timestamp::is_encodable(value) {
                return invalid(format!(
                    "{name} year {} is outside {}..={}",
                    value.year(),
                    timestamp::MIN_YEAR,
                    timestamp::MAX_YEAR
                ));
            }
        }
        Ok(())
    }

    /// Returns true if `feature` is enabled.
    #[must_use]
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }
}

/// Builder for [`LicensePayload`].
#[derive(Debug, Clone)]
pub struct LicensePayloadBuilder {
    license_id: Option<Uuid>,
    issuer: String,
    licensed_to: String,
    product_id: String,
    features: BTreeSet<String>,
    tier: LicenseTier,
    validity: Option<(DateTime<Utc>, DateTime<Utc>)>,
    metadata: BTreeMap<String, String>,
}

impl LicensePayloadBuilder {
    /// Uses a fixed license id instead of a fresh random one.
    #[must_use]
    pub fn license_id(mut self, id: Uuid) -> Self {
        self.license_id = Some(id);
        self
    }

    #[must_use]
    pub fn tier(mut self, tier: LicenseTier) -> Self {
        self.tier = tier;
        self
    }

    #[must_use]
    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    #[must_use]
    pub fn features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features.extend(features.into_iter().map(Into::into));
        self
    }

    /// Sets the validity window. Sub-millisecond precision is truncated.
    #[must_use]
    pub fn validity(mut self, valid_from: DateTime<Utc>, valid_to: DateTime<Utc>) -> Self {
        self.validity = Some((valid_from.trunc_subsecs(3), valid_to.trunc_subsecs(3)));
        self
    }

    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Finishes the payload and checks its structure.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidPayload`] if no validity window was set
    /// or any structural check fails.
    pub fn build(self) -> LicenseResult<LicensePayload> {
        let (valid_from, valid_to) = self.validity.ok_or_else(|| {
            LicenseError::InvalidPayload("validity window not set".to_string())
        })?;

        let payload = LicensePayload {
            format_version: PAYLOAD_FORMAT_VERSION,
            license_id: self.license_id.unwrap_or_else(Uuid::new_v4),
            issuer: self.issuer,
            licensed_to: self.licensed_to,
            product_id: self.product_id,
            features: self.features,
            tier: self.tier,
            valid_from,
            valid_to,
            metadata: self.metadata,
        };
        payload.check_structure()?;
        Ok(payload)
    }
}

/// Fixed-precision UTC timestamps (`YYYY-MM-DDTHH:MM:SS.mmmZ`).
///
/// Used as a serde `with` module and by the canonical encoder. Parsing
/// rejects values finer than a millisecond, since those digits would not
/// be covered by a signature.
pub(crate) mod timestamp {
    use super::*;
    use serde::{de, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    /// Years with a four-digit `%Y` rendering that RFC 3339 parsing accepts.
    pub(crate) const MIN_YEAR: i32 = 0;
    pub(crate) const MAX_YEAR: i32 = 9999;

    pub(crate) fn format(value: &DateTime<Utc>) -> String {
        value.format(FORMAT).to_string()
    }

    pub(crate) fn is_millisecond_precision(value: &DateTime<Utc>) -> bool {
        value.nanosecond() % 1_000_000 == 0
    }

    pub(crate) fn is_encodable(value: &DateTime<Utc>) -> bool {
        (MIN_YEAR..=MAX_YEAR).contains(&value.year())
    }

    pub(crate) fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    pub(crate) fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let parsed = DateTime::parse_from_rfc3339(&raw)
            .map_err(|e| de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))?
            .with_timezone(&Utc);
        if !is_millisecond_precision(&parsed) {
            return Err(de::Error::custom(format!(
                "timestamp {raw:?} is finer than millisecond precision"
            )));
        }
        Ok(parsed)
    }
}
