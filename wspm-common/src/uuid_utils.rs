//! UUID utilities

use uuid::Uuid;

/// Length of the short opaque ids handed out for transient entries
pub const SHORT_ID_LEN: usize = 9;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a short lowercase hex id for transient, process-local entries
/// (upload slots and similar). Not suitable as a persistent plan id.
pub fn short_id() -> String {
    let mut id = generate().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_length_and_charset() {
        let id = short_id();
        assert_eq!(id.len(), SHORT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_short_ids_differ() {
        assert_ne!(short_id(), short_id());
    }
}
