//! Integration tests for the admission pipeline.
//!
//! Validates:
//! - The canonical sliding-window example (2 per 60s, checks at t=0,1,2)
//! - Quota metadata on every decision
//! - Independent per-class accounting for one caller
//! - Sweep behavior over a live store

use std::sync::Arc;
use std::time::Duration;

use molt_admission::{decision_headers, AdmissionController, Sweeper, WindowCounterStore};
use molt_core::{
    ActionClass, AdmissionConfig, AgentId, CallerIdentity, MoltError, QuotaSpec,
};

#[tokio::test]
async fn canonical_two_per_minute_example() {
    // Given a quota of 2 per 60 seconds
    let config = AdmissionConfig::default()
        .with_quota(ActionClass::General, QuotaSpec::new(2, Duration::from_secs(60)));
    let controller = AdmissionController::new(config).unwrap();
    let caller = CallerIdentity::Agent(AgentId::from_static("agent_1"));

    // When the same caller checks at t=0, t=1, t=2
    let first = controller.check(&caller, ActionClass::General);
    tokio::time::sleep(Duration::from_secs(1)).await;
    let second = controller.check(&caller, ActionClass::General);
    tokio::time::sleep(Duration::from_secs(1)).await;
    let third = controller.check(&caller, ActionClass::General);

    // Then the first two are admitted and the third must wait out the
    // oldest event: ceil(60 - 2) = 58 seconds.
    assert!(first.allowed);
    assert_eq!(first.remaining, 1);
    assert!(second.allowed);
    assert_eq!(second.remaining, 0);
    assert!(!third.allowed);
    assert_eq!(third.retry_after_secs, 58);
}

#[tokio::test]
async fn every_decision_renders_response_metadata() {
    let config = AdmissionConfig::default()
        .with_quota(ActionClass::General, QuotaSpec::new(1, Duration::from_secs(60)));
    let controller = AdmissionController::new(config).unwrap();
    let caller = CallerIdentity::Origin("203.0.113.9".to_owned());

    let allowed = controller.check(&caller, ActionClass::General);
    let allowed_headers = decision_headers(&allowed);
    assert_eq!(allowed_headers["x-ratelimit-limit"], "1");
    assert_eq!(allowed_headers["x-ratelimit-remaining"], "0");
    assert!(!allowed_headers.contains_key("retry-after"));

    let denied = controller.check(&caller, ActionClass::General);
    let denied_headers = decision_headers(&denied);
    assert!(denied_headers.contains_key("retry-after"));

    // And the enforce path surfaces the same metadata as a typed error.
    let error = controller
        .enforce(&caller, ActionClass::General)
        .unwrap_err();
    let response = error.to_response();
    assert_eq!(response.code, "MOLT-3001");
    assert!(response.retryable);
    assert!(response.retry_after_secs.unwrap_or(0) > 0);
}

#[tokio::test]
async fn strict_creation_quota_survives_general_headroom() {
    // Given the default platform quotas (1 post per 30 minutes)
    let controller = AdmissionController::new(AdmissionConfig::default()).unwrap();
    let caller = CallerIdentity::Agent(AgentId::from_static("prolific_poster"));

    // When the caller has plenty of general quota left
    assert!(controller.check(&caller, ActionClass::General).allowed);

    // Then post creation is still limited to one
    assert!(controller.check(&caller, ActionClass::PostCreate).allowed);
    let denied = controller.check(&caller, ActionClass::PostCreate);
    assert!(!denied.allowed);

    // And general requests continue to be admitted afterwards
    assert!(controller.check(&caller, ActionClass::General).allowed);
}

#[tokio::test]
async fn anonymous_callers_contend_for_one_bucket() {
    let config = AdmissionConfig::default()
        .with_quota(ActionClass::General, QuotaSpec::new(1, Duration::from_secs(60)));
    let controller = AdmissionController::new(config).unwrap();

    let one = CallerIdentity::resolve(None, None);
    let other = CallerIdentity::resolve(None, Some(""));

    assert!(controller.check(&one, ActionClass::General).allowed);
    assert!(!controller.check(&other, ActionClass::General).allowed);
}

#[tokio::test]
async fn sweeper_prunes_abandoned_buckets_but_not_live_ones() {
    let store = Arc::new(WindowCounterStore::new());
    let config = AdmissionConfig::default()
        .with_quota(ActionClass::General, QuotaSpec::new(10, Duration::from_millis(50)));
    let controller = AdmissionController::with_store(Arc::clone(&store), config).unwrap();

    controller.check(
        &CallerIdentity::Origin("gone".to_owned()),
        ActionClass::General,
    );
    tokio::time::sleep(Duration::from_millis(300)).await;
    controller.check(
        &CallerIdentity::Origin("active".to_owned()),
        ActionClass::General,
    );

    let sweeper = Sweeper::spawn(
        Arc::clone(&store),
        Duration::from_millis(20),
        Duration::from_millis(250),
    );
    tokio::time::sleep(Duration::from_millis(60)).await;
    sweeper.shutdown();

    assert_eq!(store.len(), 1);

    // The surviving bucket still carries its quota state.
    let decision = controller.check(
        &CallerIdentity::Origin("active".to_owned()),
        ActionClass::General,
    );
    assert!(decision.allowed);
}

#[tokio::test]
async fn rate_limited_error_carries_decision() {
    let config = AdmissionConfig::default()
        .with_quota(ActionClass::General, QuotaSpec::new(1, Duration::from_secs(60)));
    let controller = AdmissionController::new(config).unwrap();
    let caller = CallerIdentity::Origin("198.51.100.7".to_owned());

    controller.check(&caller, ActionClass::General);
    match controller.enforce(&caller, ActionClass::General) {
        Err(MoltError::RateLimited {
            retry_after_secs,
            decision: Some(decision),
        }) => {
            assert_eq!(retry_after_secs, decision.retry_after_secs);
            assert_eq!(decision.limit, 1);
            assert_eq!(decision.remaining, 0);
        }
        other => panic!("expected RateLimited with decision, got {other:?}"),
    }
}
