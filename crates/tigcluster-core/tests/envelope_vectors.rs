//! Envelope codec vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tigcluster_core::ClusterEnvelope;

use vector_loader::load;

#[test]
fn envelope_vectors() {
    let files = [
        "envelope_forward.json",
        "envelope_wrong_namespace.json",
        "envelope_no_namespace.json",
        "envelope_bare.json",
        "envelope_membership.json",
        "envelope_missing_first_node.json",
        "envelope_first_node_only.json",
    ];

    for f in files {
        let v = load(f);
        let res = ClusterEnvelope::parse(&v.tree);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let env = res.expect("expected ok envelope");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(env.from(), ex.from.as_deref(), "vector={}", v.description);
        assert_eq!(env.to(), ex.to.as_deref(), "vector={}", v.description);
        assert_eq!(env.kind().map(|k| k.as_str()), ex.kind.as_deref(), "vector={}", v.description);
        assert_eq!(env.packet_from(), ex.packet_from.as_deref(), "vector={}", v.description);
        assert_eq!(env.packets().len(), ex.packets, "vector={}", v.description);
        assert_eq!(env.first_node(), ex.first_node.as_deref(), "vector={}", v.description);

        let visited: Vec<&str> = env.visited_nodes().iter().map(String::as_str).collect();
        assert_eq!(visited, ex.visited, "vector={}", v.description);

        let connected = env.connected_nodes().map(|s| s.into_iter().collect::<Vec<_>>());
        assert_eq!(connected, ex.connected, "vector={}", v.description);
        let disconnected = env.disconnected_nodes().map(|s| s.into_iter().collect::<Vec<_>>());
        assert_eq!(disconnected, ex.disconnected, "vector={}", v.description);

        // Re-serializing a parsed vector is stable.
        let once = env.to_element();
        let twice = ClusterEnvelope::parse(&once).unwrap().to_element();
        assert_eq!(once, twice, "vector={}", v.description);
    }
}

#[test]
fn forward_vector_serializes_to_wire_text() {
    let v = load("envelope_forward.json");
    let env = ClusterEnvelope::parse(&v.tree).unwrap();
    let text = env.to_element().to_string();

    assert!(text.starts_with("<cluster from=\"sess-man@node2.example.com\""));
    assert!(text.contains("<data packet-from=\"alice@example.com/phone\">"));
    assert!(text.contains("<body>Hello world!</body>"));
    assert!(text.contains(
        "<control><first-node>sess-man@node1.example.com</first-node><visited-nodes>\
         <node-id>sess-man@node1.example.com</node-id>\
         <node-id>sess-man@node2.example.com</node-id></visited-nodes></control>"
    ));
    assert!(text.ends_with("</cluster>"));
}
