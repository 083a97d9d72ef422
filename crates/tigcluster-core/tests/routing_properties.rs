//! Property tests for routing metadata rules.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use proptest::prelude::*;
use tigcluster_core::{ClusterEnvelope, Element, Packet, StanzaType};

fn arb_node() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| format!("sess-man@{s}.example.com"))
}

fn arb_envelope() -> impl Strategy<Value = ClusterEnvelope> {
    (
        arb_node(),
        arb_node(),
        prop::collection::vec(arb_node(), 0..6),
        prop::collection::vec(arb_node(), 0..4),
        prop::collection::vec(arb_node(), 0..4),
        any::<bool>(),
    )
        .prop_map(|(from, to, visited, connected, disconnected, with_payload)| {
            let payload = with_payload.then(|| {
                Packet::new(
                    Element::new("message")
                        .with_attr("from", "alice@example.com")
                        .with_child(Element::with_text("body", "hi")),
                )
            });
            let mut env = ClusterEnvelope::build(from, to, StanzaType::Set, payload);
            for node in visited {
                env.mark_visited(node);
            }
            env.add_connected_nodes(connected);
            env.add_disconnected_nodes(disconnected);
            env
        })
}

proptest! {
    /// The first mark fixes the first node for good.
    #[test]
    fn first_node_is_first_mark(nodes in prop::collection::vec(arb_node(), 1..12)) {
        let mut env = ClusterEnvelope::build("a", "b", StanzaType::Set, None);
        for node in &nodes {
            env.mark_visited(node.as_str());
            prop_assert_eq!(env.first_node(), Some(nodes[0].as_str()));
        }
        prop_assert_eq!(env.visited_nodes().first(), Some(&nodes[0]));
    }

    /// Visited nodes stay visited across any chain of hops.
    #[test]
    fn visited_survives_hops(
        nodes in prop::collection::vec(arb_node(), 1..8),
        targets in prop::collection::vec(arb_node(), 1..5),
    ) {
        let mut env = ClusterEnvelope::build("a", "b", StanzaType::Set, None);
        for node in &nodes {
            env.mark_visited(node.as_str());
        }
        for target in targets {
            env = env.next_hop(target);
            for node in &nodes {
                prop_assert!(env.is_visited(node));
            }
        }
    }

    /// Deriving a hop leaves the source envelope as it was.
    #[test]
    fn next_hop_is_pure(env in arb_envelope(), target in arb_node()) {
        let before = env.clone();
        let next = env.next_hop(target.as_str());
        prop_assert_eq!(&env, &before);
        prop_assert_eq!(next.from(), before.to());
        prop_assert_eq!(next.to(), Some(target.as_str()));
        prop_assert_eq!(next.first_node(), before.first_node());
        prop_assert_eq!(next.visited_nodes(), before.visited_nodes());
    }

    /// serialize(parse(serialize(e))) == serialize(e)
    #[test]
    fn wire_round_trip_is_stable(env in arb_envelope()) {
        let once = env.to_element();
        let parsed = ClusterEnvelope::parse(&once).unwrap();
        prop_assert_eq!(parsed.to_element(), once);
        prop_assert_eq!(parsed, env);
    }
}
