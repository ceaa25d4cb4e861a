/// Integration tests: end-to-end encryption round-trips through the public API.
///
/// Tests cover:
///   1. Direct message: sender encrypts to recipient, recipient decrypts
///   2. Wrong key: another user's private key is rejected with an error
///   3. Group message: every member recovers the same plaintext
///   4. JSON transport: envelopes survive serialization as plain strings
///   5. Compact keys: keys stored in compact form still work after expansion
///
/// Key pairs are generated once per test binary; RSA generation is the slow step.
use std::sync::OnceLock;

use alumni_crypt::crypto::{
    compact_to_pem, generate_key_pair, pem_to_compact, HybridCipher, KeyKind, KeyPair,
};
use alumni_crypt::{CryptoError, EncryptedEnvelope, GroupEncryptedEnvelope, GroupRecipient};

fn user_a() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| generate_key_pair().expect("keygen for user A should succeed"))
}

fn user_b() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| generate_key_pair().expect("keygen for user B should succeed"))
}

fn user_c() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| generate_key_pair().expect("keygen for user C should succeed"))
}

// ── Test 1: Direct message scenario ────────────────────────────────────────

#[test]
fn test_direct_message_scenario() {
    let cipher = HybridCipher::new();
    let message = "Hello! This is a secret message from User 1 to User 2.";

    let envelope = cipher
        .encrypt(message, &user_b().public_key)
        .expect("encrypt should produce an envelope");

    let decrypted = cipher
        .decrypt(&envelope, &user_b().private_key)
        .expect("recipient should decrypt");
    assert_eq!(decrypted, message, "decrypted text must match byte-for-byte");

    let wrong = cipher.decrypt(&envelope, &user_a().private_key);
    assert!(wrong.is_err(), "sender's own private key must not decrypt");
}

// ── Test 2: Wrong key is always an error ───────────────────────────────────

#[test]
fn test_wrong_key_never_returns_plaintext() {
    let cipher = HybridCipher::new();
    for message in ["a", "short", "a somewhat longer message with more blocks in it"] {
        let envelope = cipher.encrypt(message, &user_a().public_key).unwrap();
        match cipher.decrypt(&envelope, &user_b().private_key) {
            Err(CryptoError::DecryptionFailed { .. }) => {}
            other => panic!("expected DecryptionFailed, got {:?}", other),
        }
    }
}

#[test]
fn test_round_trip_various_lengths() {
    let cipher = HybridCipher::new();
    for len in [1usize, 15, 16, 17, 255, 4096] {
        let message: String = "x".repeat(len);
        let envelope = cipher.encrypt(&message, &user_a().public_key).unwrap();
        assert_eq!(
            cipher.decrypt(&envelope, &user_a().private_key).unwrap(),
            message,
            "round trip failed for length {}",
            len
        );
    }
}

// ── Test 3: Group consistency ──────────────────────────────────────────────

#[test]
fn test_group_every_member_recovers_message() {
    let cipher = HybridCipher::new();
    let message = "Reunion planning: Saturday 7pm";
    let members = [
        ("r1", user_a()),
        ("r2", user_b()),
        ("r3", user_c()),
    ];
    let recipients: Vec<GroupRecipient> = members
        .iter()
        .map(|(id, pair)| GroupRecipient::new(*id, pair.public_key.clone()))
        .collect();

    let envelope = cipher
        .encrypt_for_group(message, &recipients)
        .expect("group encrypt should succeed");
    assert_eq!(envelope.encrypted_keys_map.len(), 3);

    for (id, pair) in members {
        let decrypted = cipher
            .decrypt_group(&envelope, id, &pair.private_key)
            .expect("each member should decrypt");
        assert_eq!(decrypted, message, "member {} got different plaintext", id);
    }

    // Each wrapped copy is distinct even though the underlying key is shared.
    let wrapped: Vec<&String> = envelope.encrypted_keys_map.values().collect();
    assert_ne!(wrapped[0], wrapped[1]);
    assert_ne!(wrapped[1], wrapped[2]);
}

#[test]
fn test_group_entry_unwrapped_as_single_envelope() {
    // A member's entry plus the shared body is an ordinary single-recipient envelope.
    let cipher = HybridCipher::new();
    let recipients = [GroupRecipient::new("r2", user_b().public_key.clone())];
    let group = cipher.encrypt_for_group("shared body", &recipients).unwrap();

    let single = EncryptedEnvelope {
        encrypted_message: group.encrypted_message.clone(),
        encrypted_aes_key: group.encrypted_keys_map["r2"].clone(),
        iv: group.iv.clone(),
        version: group.version.clone(),
    };
    assert_eq!(
        cipher.decrypt(&single, &user_b().private_key).unwrap(),
        "shared body"
    );
}

// ── Test 4: JSON transport ─────────────────────────────────────────────────

#[test]
fn test_envelope_survives_json_transport() {
    let sender = HybridCipher::new();
    let receiver = HybridCipher::new();

    let envelope = sender.encrypt("over the wire", &user_c().public_key).unwrap();
    let json = envelope.to_json().unwrap();
    let received = EncryptedEnvelope::from_json(&json).unwrap();

    assert_eq!(received, envelope);
    assert_eq!(
        receiver.decrypt(&received, &user_c().private_key).unwrap(),
        "over the wire"
    );
}

#[test]
fn test_group_envelope_survives_json_transport() {
    let cipher = HybridCipher::new();
    let recipients = [
        GroupRecipient::new("a", user_a().public_key.clone()),
        GroupRecipient::new("c", user_c().public_key.clone()),
    ];
    let json = cipher
        .encrypt_for_group("group over the wire", &recipients)
        .unwrap()
        .to_json()
        .unwrap();
    let received = GroupEncryptedEnvelope::from_json(&json).unwrap();
    assert_eq!(
        cipher.decrypt_group(&received, "c", &user_c().private_key).unwrap(),
        "group over the wire"
    );
}

#[test]
fn test_empty_json_object_is_missing_data() {
    let cipher = HybridCipher::new();
    let envelope = EncryptedEnvelope::from_json("{}").unwrap();
    assert!(matches!(
        cipher.decrypt(&envelope, &user_a().private_key),
        Err(CryptoError::MissingData { .. })
    ));
}

// ── Test 5: Compact key storage ────────────────────────────────────────────

#[test]
fn test_compact_stored_keys_still_work() {
    let cipher = HybridCipher::new();
    let public = compact_to_pem(&pem_to_compact(&user_a().public_key), KeyKind::Public);
    let private = compact_to_pem(&pem_to_compact(&user_a().private_key), KeyKind::Private);

    let envelope = cipher.encrypt("compact", &public).expect("expanded public key should work");
    assert_eq!(cipher.decrypt(&envelope, &private).unwrap(), "compact");
}

#[test]
fn test_shared_cipher_across_threads() {
    let cipher = std::sync::Arc::new(HybridCipher::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cipher = std::sync::Arc::clone(&cipher);
            std::thread::spawn(move || {
                let message = format!("thread {}", i);
                let envelope = cipher.encrypt(&message, &user_b().public_key).unwrap();
                assert_eq!(cipher.decrypt(&envelope, &user_b().private_key).unwrap(), message);
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread should not panic");
    }
    assert_eq!(cipher.cache().len(), 1);
}
