//! JID string helpers (`node@domain/resource`).
//!
//! Cluster node addresses and stanza addresses are kept as plain strings; these
//! helpers only split them, they never validate.

/// Domain part of a JID.
pub fn domain(jid: &str) -> &str {
    let without_resource = jid.split_once('/').map_or(jid, |(bare, _)| bare);
    without_resource
        .split_once('@')
        .map_or(without_resource, |(_, domain)| domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_parts() {
        assert_eq!(domain("alice@example.com/phone"), "example.com");
        assert_eq!(domain("sess-man@node1.example.com"), "node1.example.com");
        assert_eq!(domain("example.com"), "example.com");
        assert_eq!(domain("example.com/res@x"), "example.com");
    }
}
