//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use keysmith_license::{generate_key_pair_with_rng, KdfParams, KeyPair, LicensePayload, LicenseTier};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::OnceLock;
use uuid::Uuid;

/// Deterministic 2048-bit signing identity, generated once per test binary.
pub fn test_keypair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| seeded_keypair(0x6b65_7973))
}

/// A second, unrelated identity for wrong-key tests.
pub fn other_keypair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| seeded_keypair(0x6f74_6865))
}

fn seeded_keypair(seed: u64) -> KeyPair {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_key_pair_with_rng(&mut rng, 2048).expect("seeded key generation")
}

/// Cheap Argon2 costs so key wrapping tests stay fast.
pub fn fast_kdf() -> KdfParams {
    KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

pub fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// Payload for product "X" valid through 2024.
pub fn sample_payload() -> LicensePayload {
    LicensePayload::builder("Acme Corp", "customer-42", "X")
        .license_id(Uuid::parse_str("6f1c1d5e-8a3b-4c2d-9e7f-0a1b2c3d4e5f").unwrap())
        .tier(LicenseTier::Professional)
        .features(["export", "sso"])
        .metadata("region", "eu")
        .metadata("seats", "25")
        .validity(utc(2024, 1, 1), utc(2025, 1, 1))
        .build()
        .unwrap()
}

/// Payload whose window is `[from, to]`.
pub fn payload_between(from: DateTime<Utc>, to: DateTime<Utc>) -> LicensePayload {
    LicensePayload::builder("Acme Corp", "customer-42", "X")
        .validity(from, to)
        .build()
        .unwrap()
}
