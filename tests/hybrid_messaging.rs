mod common;

use presscrypt::{CryptoError, HybridAlgorithm};

#[tokio::test]
async fn test_ping_message_opens_with_private_key() {
    let engine = common::engine();
    let pair = common::alice();

    // 1. Encrypt for the recipient.
    let message = engine.encrypt_message("ping", &pair.public).await.unwrap();
    assert_eq!(message.bundle.algorithm, HybridAlgorithm::RsaOaepAesGcm);

    // 2. The bundle inside is an ordinary hybrid bundle.
    let plain = engine.decrypt_hybrid(&message.bundle, &pair.private).await.unwrap();
    assert_eq!(plain.as_slice(), b"ping");
    assert_eq!(engine.decrypt_message(&message, &pair.private).await.unwrap(), "ping");
}

#[tokio::test]
async fn test_non_matching_private_key_fails() {
    let engine = common::engine();
    let bundle = engine.encrypt_hybrid(b"source list", &common::alice().public).await.unwrap();

    let err = engine.decrypt_hybrid(&bundle, &common::mallory().private).await.unwrap_err();
    assert_eq!(err, CryptoError::DecryptionFailure);
}

#[tokio::test]
async fn test_exported_public_key_is_usable_by_sender() {
    // The recipient publishes a base64 key; the sender only ever sees that string.
    let engine = common::engine();
    let published = engine.export_public_key(common::alice()).unwrap();

    let imported = engine.import_public_key(&published).unwrap();
    let bundle = engine.encrypt_hybrid(b"tip", &imported).await.unwrap();

    let plain = engine.decrypt_hybrid(&bundle, &common::alice().private).await.unwrap();
    assert_eq!(plain.as_slice(), b"tip");
}

#[tokio::test]
async fn test_swapped_wrapped_key_fails() {
    // Threat Model: splice the wrapped key from one bundle onto another payload.
    let engine = common::engine();
    let pair = common::alice();
    let a = engine.encrypt_hybrid(b"first", &pair.public).await.unwrap();
    let mut b = engine.encrypt_hybrid(b"second", &pair.public).await.unwrap();

    b.encrypted_key = a.encrypted_key.clone();
    assert_eq!(
        engine.decrypt_hybrid(&b, &pair.private).await.unwrap_err(),
        CryptoError::DecryptionFailure
    );
}

#[tokio::test]
async fn test_large_payload_goes_through_symmetric_layer() {
    let engine = common::engine();
    let pair = common::alice();
    let manuscript = vec![b'x'; 2 * 1024 * 1024];

    let bundle = engine.encrypt_hybrid(&manuscript, &pair.public).await.unwrap();
    assert_eq!(bundle.encrypted_key.len(), 512);
    let plain = engine.decrypt_hybrid(&bundle, &pair.private).await.unwrap();
    assert!(plain.as_slice() == manuscript.as_slice());
}

#[tokio::test]
async fn test_signed_content_verifies_only_as_signed() {
    let engine = common::engine();
    let alice = common::alice();
    let mallory = common::mallory();
    let article = b"Minister resigns after leak";

    // 1. Alice signs; anyone with her exported public key can check it.
    let signature = engine.sign(article, &alice.private).await.unwrap();
    assert_eq!(signature.len(), 512);
    let published = engine
        .import_public_key(&engine.export_public_key(alice).unwrap())
        .unwrap();
    assert!(engine.verify_signature(article, &signature, &published).await.unwrap());

    // 2. An edited article no longer verifies.
    assert!(!engine
        .verify_signature(b"Minister stays after leak", &signature, &published)
        .await
        .unwrap());

    // 3. Nor does it verify under another key, or as a truncated signature.
    assert!(!engine.verify_signature(article, &signature, &mallory.public).await.unwrap());
    assert!(!engine
        .verify_signature(article, &signature[..256], &published)
        .await
        .unwrap());

    // 4. Roles are enforced.
    assert_eq!(
        engine.sign(article, &alice.public).await.unwrap_err(),
        CryptoError::InvalidKey
    );
    assert_eq!(
        engine.verify_signature(article, &signature, &alice.private).await.unwrap_err(),
        CryptoError::InvalidKey
    );
}
