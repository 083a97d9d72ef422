//! Envelope build / routing scenarios.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tigcluster_core::protocol::{FIRST_NODE_PATH, VISITED_NODES_PATH, DATA_PATH};
use tigcluster_core::{ClusterEnvelope, Element, Packet, StanzaType};

fn chat(from: Option<&str>) -> Packet {
    let mut el = Element::new("message")
        .with_attr("to", "bob@example.com")
        .with_child(Element::with_text("body", "hi"));
    if let Some(from) = from {
        el.set_attr("from", from);
    }
    Packet::new(el)
}

#[test]
fn build_defaults_client_namespace() {
    let env = ClusterEnvelope::build("A", "B", StanzaType::Set, Some(chat(Some("alice@example.com"))));
    let parsed = ClusterEnvelope::parse(&env.to_element()).unwrap();

    assert_eq!(parsed.packets().len(), 1);
    assert_eq!(parsed.packets()[0].xmlns(), Some("jabber:client"));
    assert_eq!(parsed.packets()[0].attr("to"), Some("bob@example.com"));
    assert_eq!(parsed.packets()[0].cdata_at("/message/body"), Some("hi"));
    assert_eq!(parsed.packet_from(), Some("alice@example.com"));
    assert_eq!(parsed.first_node(), None);
    assert!(parsed.visited_nodes().is_empty());
}

#[test]
fn build_keeps_existing_namespace() {
    let mut packet = chat(Some("alice@example.com"));
    packet.set_xmlns("jabber:server");
    let env = ClusterEnvelope::build("A", "B", StanzaType::Set, Some(packet));
    assert_eq!(env.packets()[0].xmlns(), Some("jabber:server"));
}

#[test]
fn payload_without_sender_has_unknown_origin() {
    let env = ClusterEnvelope::build("A", "B", StanzaType::Set, Some(chat(None)));
    assert_eq!(env.packet_from(), None);
    let tree = env.to_element();
    assert_eq!(tree.attr_at(DATA_PATH, "packet-from"), None);
}

#[test]
fn build_without_payload_has_empty_sections() {
    let env = ClusterEnvelope::build("A", "B", StanzaType::Result, None);
    let tree = env.to_element();

    assert!(tree.find_child(DATA_PATH).is_some());
    assert!(tree.children_at(DATA_PATH).is_empty());
    assert!(tree.find_child(VISITED_NODES_PATH).is_some());
    assert!(tree.children_at(VISITED_NODES_PATH).is_empty());
    assert!(tree.find_child(FIRST_NODE_PATH).is_none());
    assert!(!env.is_membership_announcement());
}

#[test]
fn extra_packets_keep_order() {
    let mut env = ClusterEnvelope::build("A", "B", StanzaType::Set, Some(chat(Some("alice@example.com"))));
    env.add_data_packet(Packet::new(Element::new("presence").with_attr("from", "carol@example.com")));

    let parsed = ClusterEnvelope::parse(&env.to_element()).unwrap();
    let names: Vec<&str> = parsed.packets().iter().map(Element::name).collect();
    assert_eq!(names, ["message", "presence"]);
    assert_eq!(parsed.packets()[1].xmlns(), Some("jabber:client"));
    assert_eq!(parsed.packet_from(), Some("alice@example.com"));
}

#[test]
fn retain_packets_keeps_routing_state() {
    let mut env = ClusterEnvelope::build("A", "A", StanzaType::Set, Some(chat(Some("alice@example.com"))));
    env.add_data_packet(Packet::new(Element::new("presence").with_attr("from", "carol@example.com")));
    env.add_data_packet(Packet::new(Element::new("iq").with_attr("id", "1")));
    env.mark_visited("A");

    let mut seen = Vec::new();
    env.retain_packets(|p| {
        seen.push(p.name().to_string());
        p.name() != "presence"
    });

    assert_eq!(seen, ["message", "presence", "iq"]);
    let names: Vec<&str> = env.packets().iter().map(Element::name).collect();
    assert_eq!(names, ["message", "iq"]);
    assert_eq!(env.first_node(), Some("A"));
    assert_eq!(env.packet_from(), Some("alice@example.com"));
}

#[test]
fn mark_visited_sets_first_node_once() {
    let mut env = ClusterEnvelope::build("A", "B", StanzaType::Set, None);
    env.mark_visited("B");
    env.mark_visited("C");
    env.mark_visited("B");

    assert_eq!(env.first_node(), Some("B"));
    assert!(env.is_visited("B"));
    assert!(env.is_visited("C"));
    assert!(!env.is_visited("A"));
    assert_eq!(env.hop_count(), 2);

    let tree = env.to_element();
    assert_eq!(tree.cdata_at(FIRST_NODE_PATH), Some("B"));
    assert_eq!(tree.children_at(VISITED_NODES_PATH).len(), 2);
}

#[test]
fn fallback_hop_targets_first_node() {
    let mut env = ClusterEnvelope::build("A", "C", StanzaType::Set, Some(chat(Some("alice@example.com"))));
    env.mark_visited("B");
    env.mark_visited("C");

    let first = env.first_node().unwrap().to_string();
    let next = env.next_hop(first);

    assert_eq!(next.to(), Some("B"));
    assert_eq!(next.from(), Some("C"));
    assert_eq!(next.kind(), Some(&StanzaType::Set));
    assert_eq!(next.first_node(), Some("B"));
    assert_eq!(next.visited_nodes(), env.visited_nodes());
    assert_eq!(next.packets(), env.packets());
}

#[test]
fn next_hop_leaves_source_untouched() {
    let mut env = ClusterEnvelope::build("A", "B", StanzaType::Result, None);
    env.mark_visited("A");
    let before = env.clone();

    let mut next = env.next_hop("C");
    next.mark_visited("B");

    assert_eq!(env, before);
    assert_eq!(next.kind(), Some(&StanzaType::Set));
    assert!(!env.is_visited("B"));
}

#[test]
fn membership_announcement_lists() {
    let env = ClusterEnvelope::membership_announcement(
        "X",
        "*",
        StanzaType::Set,
        ["n1", "n2"],
        Vec::<String>::new(),
    );

    let connected: Vec<String> = env.connected_nodes().unwrap().into_iter().collect();
    assert_eq!(connected, ["n1", "n2"]);
    assert!(env.disconnected_nodes().is_none());
    assert!(env.packets().is_empty());
    assert!(env.is_membership_announcement());
    assert!(env.first_node().is_none());
}

#[test]
fn membership_lists_are_append_only() {
    let mut env = ClusterEnvelope::membership_announcement(
        "X",
        "Y",
        StanzaType::Set,
        ["n1"],
        ["n2"],
    );
    env.add_connected_nodes(["n2", "n1"]);
    env.add_disconnected_nodes(vec!["n4".to_string()]);

    let connected: Vec<String> = env.connected_nodes().unwrap().into_iter().collect();
    assert_eq!(connected, ["n1", "n2"]);
    let disconnected: Vec<String> = env.disconnected_nodes().unwrap().into_iter().collect();
    assert_eq!(disconnected, ["n2", "n4"]);

    // Raw entries survive the wire.
    let tree = env.to_element();
    let raw = tree
        .children_at("/cluster/control")
        .iter()
        .filter(|c| c.name() == "connected-node")
        .count();
    assert_eq!(raw, 3);
}

#[test]
fn unknown_type_is_carried_through() {
    let tree = Element::new("cluster")
        .with_xmlns("tigase:cluster")
        .with_attr("type", "heartbeat");
    let env = ClusterEnvelope::parse(&tree).unwrap();
    assert_eq!(env.kind(), Some(&StanzaType::Other("heartbeat".into())));
    assert_eq!(env.to_element().attr("type"), Some("heartbeat"));
}

#[test]
fn xml_text_is_escaped() {
    let packet = Packet::new(
        Element::new("message")
            .with_attr("from", "a&b@example.com")
            .with_child(Element::with_text("body", "1 < 2 \"ok\"")),
    );
    let env = ClusterEnvelope::build("A", "B", StanzaType::Set, Some(packet));
    let text = env.to_element().to_string();
    assert!(text.contains("packet-from=\"a&amp;b@example.com\""));
    assert!(text.contains("<body>1 &lt; 2 \"ok\"</body>"));
}
