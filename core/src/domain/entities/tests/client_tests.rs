//! Unit tests for client entities

use crate::domain::entities::client::{parse_domain, ClientInfo};

#[test]
fn test_parse_domain() {
    assert_eq!(parse_domain("www.example.com"), "www.example.com");
    assert_eq!(parse_domain("https://www.example.com"), "www.example.com");
    assert_eq!(parse_domain("https://www.example.com/oauth/cb"), "www.example.com");
    assert_eq!(parse_domain("www.example.com/oauth/cb"), "www.example.com");
    assert_eq!(parse_domain("localhost:8080/cb"), "localhost:8080");
}

#[test]
fn test_validate_requires_id_secret_and_domain() {
    assert!(ClientInfo::new("12_4", "231udna_dfe", "www.example.com")
        .validate()
        .is_ok());

    let err = ClientInfo::new("", "secret", "").validate().unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("id, domain"));
}

#[test]
fn test_payload_round_trip() {
    let client = ClientInfo::new("12_4", "231udna_dfe", "https://www.example.com").with_user_id("u1");
    let decoded = ClientInfo::from_payload(&client.to_payload().unwrap()).unwrap();
    assert_eq!(decoded, client);
    assert_eq!(decoded.host(), "www.example.com");
}
