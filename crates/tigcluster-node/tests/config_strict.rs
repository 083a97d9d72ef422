#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tigcluster_node::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
node:
  jid: "sess-man@node1.example.com"
cluster:
  peers:
    - jid: "sess-man@node2.example.com"
      hostnamez: ["node2.example.com"] # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
node:
  jid: "sess-man@node1.example.com"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.node.jid, "sess-man@node1.example.com");
    assert!(cfg.cluster.mode);
    assert_eq!(cfg.cluster.policy, "first-unvisited");
    assert_eq!(cfg.cluster.max_hops, 0);
    assert_eq!(cfg.cluster.queue_capacity, 256);
    assert!(cfg.cluster.peers.is_empty());
}

#[test]
fn rejects_wrong_version() {
    let bad = r#"
version: 2
node:
  jid: "sess-man@node1.example.com"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_self_as_peer() {
    let bad = r#"
version: 1
node:
  jid: "a"
cluster:
  peers:
    - jid: "a"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[test]
fn rejects_duplicate_peers() {
    let bad = r#"
version: 1
node:
  jid: "a"
cluster:
  peers:
    - jid: "b"
    - jid: "b"
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn rejects_unknown_policy() {
    let bad = r#"
version: 1
node:
  jid: "a"
cluster:
  policy: "least-loaded"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("cluster.policy"));
}

#[test]
fn rejects_zero_queue_capacity() {
    let bad = r#"
version: 1
node:
  jid: "a"
cluster:
  queue_capacity: 0
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn peer_view_swaps_local_node() {
    let ok = r#"
version: 1
node:
  jid: "a"
  hostnames: ["a.example.com"]
cluster:
  policy: "round-robin"
  peers:
    - jid: "b"
      hostnames: ["b.example.com"]
    - jid: "c"
"#;
    let cfg = config::load_from_str(ok).unwrap();
    let b = cfg.for_peer(&cfg.cluster.peers[0]);

    assert_eq!(b.node.jid, "b");
    assert_eq!(b.node.hostnames, ["b.example.com"]);
    let peers: Vec<&str> = b.cluster.peers.iter().map(|p| p.jid.as_str()).collect();
    assert_eq!(peers, ["a", "c"]);
    assert_eq!(b.cluster.peers[0].hostnames, ["a.example.com"]);
    assert_eq!(b.cluster.policy, "round-robin");
    b.validate().unwrap();
}
