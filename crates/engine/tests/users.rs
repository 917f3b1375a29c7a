mod common;

use chrono::Utc;

use common::harness;
use engine::{Effect, EngineError};

#[tokio::test]
async fn register_then_login() {
    let h = harness().await;
    let registered = h
        .engine
        .register("Alice", "alice@example.com", "hunter2")
        .await
        .unwrap();
    assert_eq!(registered.user.name, "Alice");
    assert_eq!(registered.user.email, "alice@example.com");

    let logged_in = h
        .engine
        .login("alice@example.com", "hunter2")
        .await
        .unwrap();
    assert_eq!(logged_in.user, registered.user);

    let session = h.engine.session(&logged_in.token).unwrap();
    assert_eq!(session.user_id, registered.user.id);
    assert!(session.expires_at > Utc::now());

    let user = h.engine.validate_user(&registered.user.id).await.unwrap();
    assert_ne!(user.password_hash, "hunter2");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let h = harness().await;
    h.engine
        .register("Alice", "alice@example.com", "one")
        .await
        .unwrap();
    let err = h
        .engine
        .register("Other Alice", "alice@example.com", "two")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("user".to_string()));
}

#[tokio::test]
async fn register_requires_every_field() {
    let h = harness().await;
    assert!(matches!(
        h.engine.register("", "a@example.com", "pw").await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        h.engine.register("Alice", "  ", "pw").await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        h.engine.register("Alice", "a@example.com", "").await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn login_failures() {
    let h = harness().await;
    h.engine
        .register("Alice", "alice@example.com", "hunter2")
        .await
        .unwrap();

    assert_eq!(
        h.engine.login("bob@example.com", "hunter2").await.unwrap_err(),
        EngineError::KeyNotFound("user".to_string())
    );
    assert_eq!(
        h.engine.login("alice@example.com", "wrong").await.unwrap_err(),
        EngineError::Unauthorized("invalid password".to_string())
    );
}

#[tokio::test]
async fn authorize_allows_issued_credentials_only() {
    let h = harness().await;
    let registered = h
        .engine
        .register("Alice", "alice@example.com", "hunter2")
        .await
        .unwrap();

    let policy = h
        .engine
        .authorize(Some(registered.token.as_str()), "GET /transactions");
    assert_eq!(policy.effect, Effect::Allow);
    assert_eq!(policy.principal_id, registered.user.id);
    let identity = policy.identity.unwrap();
    assert_eq!(identity.email, "alice@example.com");
    assert_eq!(identity.role, "user");

    for credential in [None, Some(""), Some("garbage")] {
        let policy = h.engine.authorize(credential, "GET /transactions");
        assert_eq!(policy.effect, Effect::Deny);
        assert_eq!(policy.principal_id, "unauthorized");
    }

    assert!(matches!(
        h.engine.session("garbage"),
        Err(EngineError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn ensure_owner_refuses_other_users() {
    let h = harness().await;
    let registered = h
        .engine
        .register("Alice", "alice@example.com", "hunter2")
        .await
        .unwrap();
    let identity = h
        .engine
        .authorize(Some(registered.token.as_str()), "GET /budgets")
        .identity
        .unwrap();

    h.engine.ensure_owner(&identity, &registered.user.id).unwrap();
    assert!(matches!(
        h.engine.ensure_owner(&identity, "someone-else"),
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let h = harness().await;
    assert_eq!(
        h.engine.validate_user("ghost").await.unwrap_err(),
        EngineError::KeyNotFound("user".to_string())
    );
}
