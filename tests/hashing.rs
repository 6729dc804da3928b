use brain_engine::hashing::{node_identity, pad_type_identifier, table_identifier, unpad_type_identifier, TYPE_IDENTIFIER_WIDTH};

#[test]
fn table_identifier_is_64_hex_chars() {
    let id = table_identifier("orders");
    assert_eq!(id.len(), 64);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn node_identity_is_stable() {
    let a = node_identity("machine-1", "/var/brain");
    let b = node_identity("machine-1", "/var/brain");
    assert_eq!(a, b);
    let c = node_identity("machine-2", "/var/brain");
    assert_ne!(a, c);
}

#[test]
fn pad_and_unpad_round_trip() {
    let id = table_identifier("customers");
    let padded = pad_type_identifier(&id);
    assert_eq!(padded.len(), TYPE_IDENTIFIER_WIDTH);
    assert_eq!(unpad_type_identifier(&padded), id);
}
