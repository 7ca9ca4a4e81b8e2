mod common;

use presscrypt::{CryptoError, FileMeta, SymmetricAlgorithm};

#[tokio::test]
async fn test_hello_world_file_roundtrip() {
    let engine = common::engine();
    let meta = FileMeta::new("hello.txt", "text/plain");

    // 1. Encrypt with the contributor's password.
    let sealed = engine
        .encrypt_file(b"hello world", &meta, "Sup3rSecret!")
        .await
        .unwrap();

    // 2. Same password recovers content and metadata.
    let opened = engine.decrypt_file(&sealed, "Sup3rSecret!").await.unwrap();
    assert_eq!(opened.content.as_slice(), b"hello world");
    assert_eq!(opened.metadata.original_name, "hello.txt");
    assert_eq!(opened.metadata.media_type, "text/plain");
    assert_eq!(opened.metadata.size, 11);
    assert_eq!(opened.metadata.algorithm, SymmetricAlgorithm::Aes256Gcm);

    // 3. The fingerprint was taken over the plaintext.
    assert!(engine.verify_integrity(&opened.content, &sealed.fingerprint).await.unwrap());
    assert_eq!(sealed.fingerprint, engine.fingerprint(b"hello world").await.unwrap());

    // 4. Wrong password fails without detail.
    let err = engine.decrypt_file(&sealed, "wrong").await.unwrap_err();
    assert_eq!(err, CryptoError::DecryptionFailure);
}

#[tokio::test]
async fn test_bundle_survives_json_transport() {
    // The collaborator stores bundles as JSON; nothing may be lost on the way.
    let engine = common::engine();
    let meta = FileMeta::new("interview.wav", "audio/wav");
    let audio = vec![0x11u8; 4096];

    let sealed = engine.encrypt_file(&audio, &meta, "pass phrase").await.unwrap();
    let json = serde_json::to_string(&sealed).unwrap();
    assert!(json.contains("\"encryptedContent\""));
    assert!(json.contains("\"encryptedMetadata\""));
    assert!(!json.contains("interview.wav"), "file name leaked in clear");

    let restored = serde_json::from_str(&json).unwrap();
    let opened = engine.decrypt_file_verified(&restored, "pass phrase").await.unwrap();
    assert_eq!(opened.content.as_slice(), audio.as_slice());
}

#[tokio::test]
async fn test_tampered_metadata_fails_whole_decryption() {
    let engine = common::engine();
    let meta = FileMeta::new("a.txt", "text/plain");
    let mut sealed = engine.encrypt_file(b"content", &meta, "pw").await.unwrap();

    sealed.encrypted_metadata.ciphertext[0] ^= 0x80;

    // No partial result: content is not returned even though it is intact.
    let err = engine.decrypt_file(&sealed, "pw").await.unwrap_err();
    assert_eq!(err, CryptoError::DecryptionFailure);
}

#[tokio::test]
async fn test_same_file_twice_gets_fresh_salt() {
    let engine = common::engine();
    let meta = FileMeta::new("a.txt", "text/plain");
    let a = engine.encrypt_file(b"same", &meta, "pw").await.unwrap();
    let b = engine.encrypt_file(b"same", &meta, "pw").await.unwrap();

    assert_ne!(a.salt, b.salt);
    assert_ne!(a.encrypted_content.ciphertext, b.encrypted_content.ciphertext);
    assert_eq!(a.fingerprint, b.fingerprint);
}

#[tokio::test]
async fn test_stored_iteration_count_is_bounded() {
    let engine = common::engine();
    let meta = FileMeta::new("tip.txt", "text/plain");
    let sealed = engine.encrypt_file(b"source", &meta, "pw").await.unwrap();

    for iterations in [0, 20_000_000, u32::MAX] {
        let mut tampered = sealed.clone();
        tampered.iterations = iterations;
        let started = std::time::Instant::now();
        assert_eq!(
            engine.decrypt_file(&tampered, "pw").await.unwrap_err(),
            CryptoError::DecryptionFailure
        );
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }
}

#[tokio::test]
async fn test_fingerprint_without_sha512_still_verifies() {
    let engine = common::engine();
    let meta = FileMeta::new("old.txt", "text/plain");
    let sealed = engine.encrypt_file(b"older client", &meta, "pw").await.unwrap();

    // Fingerprints written as {hash, size, timestamp} carry no SHA-512 digest.
    let mut json = serde_json::to_value(&sealed).unwrap();
    json["fingerprint"].as_object_mut().unwrap().remove("sha512");
    let restored: presscrypt::EncryptedFile = serde_json::from_value(json).unwrap();
    assert!(restored.fingerprint.sha512.is_empty());

    let opened = engine.decrypt_file_verified(&restored, "pw").await.unwrap();
    assert_eq!(opened.content.as_slice(), b"older client");
    assert!(!engine
        .verify_integrity(b"older c1ient", &restored.fingerprint)
        .await
        .unwrap());
}
