//! Sharing: invitations, acceptance, and delegation chains.

use bytes::Bytes;
use veilstore::ClientError;
use veilstore_testkit::TestWorld;

#[tokio::test]
async fn test_share_and_accept() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    let bob = world.signup("bob").await;

    alice.store("report", b"draft one").await.unwrap();
    let token = alice.share("report", "bob").await.unwrap();
    bob.accept("alice", token, "alices-report").await.unwrap();

    assert_eq!(bob.load("alices-report").await.unwrap(), b"draft one");
}

#[tokio::test]
async fn test_edits_flow_both_ways() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    let bob = world.signup("bob").await;

    alice.store("doc", b"v1").await.unwrap();
    let token = alice.share("doc", "bob").await.unwrap();
    bob.accept("alice", token, "doc").await.unwrap();

    bob.append("doc", b" +bob").await.unwrap();
    assert_eq!(alice.load("doc").await.unwrap(), b"v1 +bob");

    alice.store("doc", b"v2").await.unwrap();
    assert_eq!(bob.load("doc").await.unwrap(), b"v2");

    bob.store("doc", b"v3").await.unwrap();
    assert_eq!(alice.load("doc").await.unwrap(), b"v3");
}

#[tokio::test]
async fn test_delegate_can_reshare() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    let bob = world.signup("bob").await;
    let charlie = world.signup("charlie").await;

    alice.store("chain", b"origin").await.unwrap();
    let to_bob = alice.share("chain", "bob").await.unwrap();
    bob.accept("alice", to_bob, "from-alice").await.unwrap();

    let to_charlie = bob.share("from-alice", "charlie").await.unwrap();
    charlie.accept("bob", to_charlie, "secondhand").await.unwrap();

    assert_eq!(charlie.load("secondhand").await.unwrap(), b"origin");
    charlie.append("secondhand", b"++").await.unwrap();
    assert_eq!(alice.load("chain").await.unwrap(), b"origin++");
}

#[tokio::test]
async fn test_share_with_unknown_user() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    alice.store("f", b"data").await.unwrap();

    assert!(matches!(
        alice.share("f", "nobody").await,
        Err(ClientError::NoSuchUser(_))
    ));
}

#[tokio::test]
async fn test_share_missing_file() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    world.signup("bob").await;

    assert!(matches!(
        alice.share("ghost", "bob").await,
        Err(ClientError::NotFound)
    ));
}

#[tokio::test]
async fn test_accept_over_existing_filename() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    let bob = world.signup("bob").await;

    alice.store("f", b"shared").await.unwrap();
    bob.store("mine", b"private").await.unwrap();

    let token = alice.share("f", "bob").await.unwrap();
    assert!(matches!(
        bob.accept("alice", token, "mine").await,
        Err(ClientError::AlreadyExists(_))
    ));
    assert_eq!(bob.load("mine").await.unwrap(), b"private");
}

#[tokio::test]
async fn test_accept_claims_wrong_sender() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    let bob = world.signup("bob").await;
    world.signup("mallory").await;

    alice.store("f", b"data").await.unwrap();
    let token = alice.share("f", "bob").await.unwrap();

    // signature verifies against alice's key only
    assert!(matches!(
        bob.accept("mallory", token, "f").await,
        Err(ClientError::Forged)
    ));
}

#[tokio::test]
async fn test_intercepted_token_is_useless_to_others() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    world.signup("bob").await;
    let eve = world.signup("eve").await;

    alice.store("f", b"for bob only").await.unwrap();
    let token = alice.share("f", "bob").await.unwrap();

    assert!(matches!(
        eve.accept("alice", token, "stolen").await,
        Err(ClientError::Integrity)
    ));
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    let bob = world.signup("bob").await;

    alice.store("f", b"data").await.unwrap();
    let token = alice.share("f", "bob").await.unwrap();

    let mut raw = world.store.raw_get(&token).unwrap().to_vec();
    let mid = raw.len() / 2;
    raw[mid] ^= 0xff;
    world.store.raw_put(token, Bytes::from(raw));

    assert!(bob.accept("alice", token, "f").await.is_err());
}

#[tokio::test]
async fn test_token_is_consumed_on_accept() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    let bob = world.signup("bob").await;

    alice.store("f", b"data").await.unwrap();
    let token = alice.share("f", "bob").await.unwrap();
    assert!(world.store.raw_get(&token).is_some());

    bob.accept("alice", token, "f").await.unwrap();
    assert!(world.store.raw_get(&token).is_none());

    // replaying the consumed token fails even under a fresh filename
    assert!(matches!(
        bob.accept("alice", token, "f-again").await,
        Err(ClientError::NotFound)
    ));
    assert_eq!(bob.load("f").await.unwrap(), b"data");
}

#[tokio::test]
async fn test_missing_token_is_not_found() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    let bob = world.signup("bob").await;

    alice.store("f", b"data").await.unwrap();
    let token = alice.share("f", "bob").await.unwrap();
    world.store.raw_delete(&token);

    assert!(matches!(
        bob.accept("alice", token, "f").await,
        Err(ClientError::NotFound)
    ));
}

#[tokio::test]
async fn test_same_file_shared_with_many() {
    let world = TestWorld::new();
    let alice = world.signup("alice").await;
    let others = world.signup_many(4).await;

    alice.store("memo", b"to all").await.unwrap();
    for session in &others {
        let token = alice.share("memo", session.username()).await.unwrap();
        session.accept("alice", token, "memo").await.unwrap();
    }
    for session in &others {
        assert_eq!(session.load("memo").await.unwrap(), b"to all");
    }
}
