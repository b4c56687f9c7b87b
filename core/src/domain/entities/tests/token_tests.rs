//! Unit tests for token entities

use chrono::{Duration, TimeZone, Utc};
use std::time::Duration as StdDuration;

use crate::domain::entities::token::{NewTokenRecord, TokenInfo, TokenKind};

fn t(secs: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

#[test]
fn test_code_expiry_governs_record() {
    let info = TokenInfo::new("client", "user").with_code("C1", t(0), StdDuration::from_secs(10));

    let record = NewTokenRecord::from_info(&info, t(0)).unwrap();
    assert_eq!(record.expires_at, t(10));
    assert_eq!(record.code, "C1");
    assert!(record.access.is_empty());
    assert!(record.refresh.is_empty());
}

#[test]
fn test_code_wins_over_access_and_refresh() {
    let info = TokenInfo::new("client", "user")
        .with_code("C1", t(0), StdDuration::from_secs(60))
        .with_access("A1", t(0), StdDuration::from_secs(3600))
        .with_refresh("R1", t(0), StdDuration::from_secs(86400));

    let record = NewTokenRecord::from_info(&info, t(0)).unwrap();
    assert_eq!(record.expires_at, t(60));
    assert_eq!(record.keys().count(), 3);
}

#[test]
fn test_refresh_expiry_does_not_extend_access_record() {
    let info = TokenInfo::new("client", "user")
        .with_access("A1", t(0), StdDuration::from_secs(3600))
        .with_refresh("R1", t(0), StdDuration::from_secs(86400));

    let record = NewTokenRecord::from_info(&info, t(5)).unwrap();
    assert_eq!(record.expires_at, t(3600));
    assert_eq!(record.created_at, t(5));
}

#[test]
fn test_refresh_alone_is_rejected() {
    let info = TokenInfo::new("client", "user").with_refresh("R1", t(0), StdDuration::from_secs(60));

    let err = NewTokenRecord::from_info(&info, t(0)).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_no_tokens_is_rejected() {
    let err = NewTokenRecord::from_info(&TokenInfo::new("client", "user"), t(0)).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_out_of_range_expiry_is_rejected() {
    let info = TokenInfo::new("client", "user").with_access("A1", t(0), StdDuration::MAX);

    let err = NewTokenRecord::from_info(&info, t(0)).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_payload_round_trips_every_field() {
    let info = TokenInfo::new("client", "user")
        .with_scope("read write")
        .with_redirect_uri("https://app.example.com/cb")
        .with_code("C1", t(0), StdDuration::from_secs(10))
        .with_code_challenge("abc", "S256");

    let record = NewTokenRecord::from_info(&info, t(0)).unwrap().into_record(7);
    assert_eq!(record.id, 7);
    assert_eq!(record.info().unwrap(), info);
}

#[test]
fn test_corrupt_payload_is_a_storage_error() {
    let err = TokenInfo::from_payload("{not json").unwrap_err();
    assert!(err.is_storage());
}

#[test]
fn test_record_liveness() {
    let info = TokenInfo::new("client", "user").with_code("C1", t(0), StdDuration::from_secs(10));
    let mut record = NewTokenRecord::from_info(&info, t(0)).unwrap().into_record(1);

    assert!(!record.is_dead());
    assert!(!record.is_reclaimable_at(t(9)));
    assert!(record.is_reclaimable_at(t(10)));

    record.key_mut(TokenKind::Code).clear();
    assert!(record.is_dead());
    assert!(record.is_reclaimable_at(t(0)));
}

#[test]
fn test_expires_at_per_kind() {
    let info = TokenInfo::new("client", "user")
        .with_access("A1", t(0), StdDuration::from_secs(30))
        .with_refresh("R1", t(0), StdDuration::from_secs(90));

    assert_eq!(info.expires_at(TokenKind::Access).unwrap(), t(0) + Duration::seconds(30));
    assert_eq!(info.expires_at(TokenKind::Refresh).unwrap(), t(90));
    assert_eq!(info.active_kind(), Some(TokenKind::Access));
}
