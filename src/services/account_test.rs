use super::*;

// --- normalize_email ---

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  Alice@Example.COM "), Some("alice@example.com".into()));
}

#[test]
fn normalize_email_rejects_empty() {
    assert_eq!(normalize_email(""), None);
    assert_eq!(normalize_email("   "), None);
}

#[test]
fn normalize_email_requires_one_at_sign() {
    assert_eq!(normalize_email("no-at-sign"), None);
    assert_eq!(normalize_email("two@@signs"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

#[test]
fn normalize_email_rejects_empty_parts() {
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("alice@"), None);
}

// --- hash_password ---

#[test]
fn hash_password_is_stable() {
    assert_eq!(hash_password("secret123", "salt"), hash_password("secret123", "salt"));
}

#[test]
fn hash_password_differs_per_salt() {
    assert_ne!(hash_password("secret123", "salt-a"), hash_password("secret123", "salt-b"));
}

#[test]
fn hash_password_differs_per_password() {
    assert_ne!(hash_password("secret123", "salt"), hash_password("secret124", "salt"));
}

#[test]
fn hash_password_is_hex_sha256() {
    let hash = hash_password("secret123", "salt");
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}
