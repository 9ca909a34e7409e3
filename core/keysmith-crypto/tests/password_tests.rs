use base64::{engine::general_purpose::STANDARD, Engine};
use keysmith_crypto::{
    generate_secure_token, generate_temporary_password, hash_password, verify_password,
    PASSWORD_SALT_SIZE, TEMPORARY_PASSWORD_LENGTH, TOKEN_SIZE,
};
use std::collections::HashSet;

// ── hash_password / verify_password ──────────────────────────────

#[test]
fn hash_then_verify() {
    let stored = hash_password("s3cret!");
    assert!(verify_password("s3cret!", &stored.hash, &stored.salt));
}

#[test]
fn wrong_password_does_not_verify() {
    let stored = hash_password("s3cret!");
    assert!(!verify_password("s3cret?", &stored.hash, &stored.salt));
    assert!(!verify_password("", &stored.hash, &stored.salt));
}

#[test]
fn salt_is_32_random_bytes() {
    let a = hash_password("same");
    let b = hash_password("same");
    assert_eq!(STANDARD.decode(&a.salt).unwrap().len(), PASSWORD_SALT_SIZE);
    assert_eq!(STANDARD.decode(&a.hash).unwrap().len(), 32);
    assert_ne!(a.salt, b.salt);
    assert_ne!(a.hash, b.hash);
}

#[test]
fn hash_is_sha256_of_password_then_salt() {
    use sha2::{Digest, Sha256};
    let stored = hash_password("pw");
    let salt = STANDARD.decode(&stored.salt).unwrap();
    let mut hasher = Sha256::new();
    hasher.update(b"pw");
    hasher.update(&salt);
    assert_eq!(STANDARD.encode(hasher.finalize()), stored.hash);
}

#[test]
fn undecodable_inputs_do_not_verify() {
    let stored = hash_password("pw");
    assert!(!verify_password("pw", "not base64!", &stored.salt));
    assert!(!verify_password("pw", &stored.hash, "not base64!"));
    assert!(!verify_password("pw", "", &stored.salt));
}

#[test]
fn swapped_salt_does_not_verify() {
    let a = hash_password("pw");
    let b = hash_password("pw");
    assert!(!verify_password("pw", &a.hash, &b.salt));
}

// ── generate_secure_token ────────────────────────────────────────

#[test]
fn token_is_32_bytes_base64() {
    let token = generate_secure_token();
    assert_eq!(STANDARD.decode(&token).unwrap().len(), TOKEN_SIZE);
}

#[test]
fn tokens_are_unique() {
    let tokens: HashSet<String> = (0..100).map(|_| generate_secure_token()).collect();
    assert_eq!(tokens.len(), 100);
}

// ── generate_temporary_password ──────────────────────────────────

#[test]
fn temporary_password_has_every_class() {
    for _ in 0..200 {
        let pw = generate_temporary_password();
        assert_eq!(pw.chars().count(), TEMPORARY_PASSWORD_LENGTH);
        assert!(pw.chars().any(|c| c.is_ascii_uppercase()), "{pw}");
        assert!(pw.chars().any(|c| c.is_ascii_lowercase()), "{pw}");
        assert!(pw.chars().any(|c| c.is_ascii_digit()), "{pw}");
        assert!(pw.chars().any(|c| c.is_ascii_punctuation()), "{pw}");
    }
}

#[test]
fn temporary_passwords_differ() {
    let passwords: HashSet<String> = (0..50).map(|_| generate_temporary_password()).collect();
    assert_eq!(passwords.len(), 50);
}
