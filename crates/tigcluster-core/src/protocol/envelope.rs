//! Cluster envelope value type and its codec.
//!
//! Envelopes are plain values: every hop works on its own copy
//! (see `routing::ClusterEnvelope::next_hop`), nothing is shared and mutated.

use indexmap::IndexSet;

use crate::error::{ClusterError, Result};
use crate::stanza::{Packet, CLIENT_XMLNS};
use crate::xml::Element;

use super::{
    StanzaType, CLUSTER_EL_NAME, CONNECTED_NODE_EL_NAME, CONTROL_EL_NAME, DATA_EL_NAME,
    DISCONNECTED_NODE_EL_NAME, FIRST_NODE_EL_NAME, NODE_ID_EL_NAME, PACKET_FROM_ATTR_NAME,
    VISITED_NODES_EL_NAME, XMLNS,
};

/// Routing metadata (`<control/>`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Control {
    pub(crate) first_node: Option<String>,
    pub(crate) visited: IndexSet<String>,
    // Stored as received; queries collapse duplicates.
    pub(crate) connected: Vec<String>,
    pub(crate) disconnected: Vec<String>,
}

/// One cluster hop: routing header, relayed stanzas and control metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEnvelope {
    pub(crate) from: Option<String>,
    pub(crate) to: Option<String>,
    pub(crate) kind: Option<StanzaType>,
    packet_from: Option<String>,
    packets: Vec<Element>,
    pub(crate) control: Control,
}

impl ClusterEnvelope {
    /// New envelope, optionally wrapping a stanza.
    ///
    /// The stanza's own `from` becomes `packet-from`. A stanza without a
    /// namespace is put in `jabber:client`; nothing else about it is changed.
    pub fn build(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: StanzaType,
        payload: Option<Packet>,
    ) -> Self {
        let mut env = Self {
            from: Some(from.into()),
            to: Some(to.into()),
            kind: Some(kind),
            packet_from: None,
            packets: Vec::new(),
            control: Control::default(),
        };
        if let Some(packet) = payload {
            env.packet_from = packet.from().map(str::to_owned);
            env.add_data_packet(packet);
        }
        env
    }

    /// Payload-less envelope telling peers which nodes joined or left.
    pub fn membership_announcement<C, D, S, T>(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: StanzaType,
        connected: C,
        disconnected: D,
    ) -> Self
    where
        C: IntoIterator<Item = S>,
        D: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut env = Self::build(from, to, kind, None);
        env.add_connected_nodes(connected);
        env.add_disconnected_nodes(disconnected);
        env
    }

    /// Read an envelope from its wire tree.
    ///
    /// Only a foreign root namespace is an error. Missing `data` or `control`
    /// sections read as "no stanzas" and "no routing history".
    pub fn parse(root: &Element) -> Result<Self> {
        if root.xmlns() != Some(XMLNS) {
            return Err(ClusterError::MalformedEnvelope(format!(
                "root <{}> has namespace {:?}, expected {XMLNS}",
                root.name(),
                root.xmlns().unwrap_or_default()
            )));
        }

        let data = root.child(DATA_EL_NAME);
        let packets = data.map(|d| d.children().to_vec()).unwrap_or_default();
        let packet_from = data
            .and_then(|d| d.attr(PACKET_FROM_ATTR_NAME))
            .map(str::to_owned);

        let control = root.child(CONTROL_EL_NAME).map(parse_control).unwrap_or_default();

        Ok(Self {
            from: root.attr("from").map(str::to_owned),
            to: root.attr("to").map(str::to_owned),
            kind: root.attr("type").map(StanzaType::from),
            packet_from,
            packets,
            control,
        })
    }

    /// Serialize to the wire tree; inverse of [`ClusterEnvelope::parse`].
    pub fn to_element(&self) -> Element {
        let mut root = Element::new(CLUSTER_EL_NAME).with_xmlns(XMLNS);
        if let Some(from) = &self.from {
            root.set_attr("from", from.as_str());
        }
        if let Some(to) = &self.to {
            root.set_attr("to", to.as_str());
        }
        if let Some(kind) = &self.kind {
            root.set_attr("type", kind.as_str());
        }

        let mut data = Element::new(DATA_EL_NAME);
        if let Some(packet_from) = &self.packet_from {
            data.set_attr(PACKET_FROM_ATTR_NAME, packet_from.as_str());
        }
        for packet in &self.packets {
            data.add_child(packet.clone());
        }
        root.add_child(data);

        let mut control = Element::new(CONTROL_EL_NAME);
        if let Some(first) = &self.control.first_node {
            control.add_child(Element::with_text(FIRST_NODE_EL_NAME, first.as_str()));
        }
        let mut visited = Element::new(VISITED_NODES_EL_NAME);
        for node in &self.control.visited {
            visited.add_child(Element::with_text(NODE_ID_EL_NAME, node.as_str()));
        }
        control.add_child(visited);
        for node in &self.control.connected {
            control.add_child(Element::with_text(CONNECTED_NODE_EL_NAME, node.as_str()));
        }
        for node in &self.control.disconnected {
            control.add_child(Element::with_text(DISCONNECTED_NODE_EL_NAME, node.as_str()));
        }
        root.add_child(control);

        root
    }

    /// Append another stanza to the data section.
    pub fn add_data_packet(&mut self, mut packet: Packet) {
        if packet.xmlns().is_none() {
            packet.set_xmlns(CLIENT_XMLNS);
        }
        self.packets.push(packet.into_element());
    }

    /// Keep only the stanzas `keep` returns true for. Stanzas are visited
    /// once each, in order.
    pub fn retain_packets<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Element) -> bool,
    {
        self.packets.retain(|packet| keep(packet));
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn kind(&self) -> Option<&StanzaType> {
        self.kind.as_ref()
    }

    /// Address that produced the relayed stanza; `None` when unknown.
    pub fn packet_from(&self) -> Option<&str> {
        self.packet_from.as_deref()
    }

    pub fn packets(&self) -> &[Element] {
        &self.packets
    }

    pub fn control(&self) -> &Control {
        &self.control
    }
}

fn parse_control(ctrl: &Element) -> Control {
    let mut visited: IndexSet<String> = ctrl
        .child(VISITED_NODES_EL_NAME)
        .map(|list| {
            list.children_named(NODE_ID_EL_NAME)
                .filter_map(Element::cdata)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let mut first_node = ctrl
        .child(FIRST_NODE_EL_NAME)
        .and_then(Element::cdata)
        .map(str::to_owned);

    // Keep first-node and visited-nodes consistent with each other.
    if first_node.is_none() {
        first_node = visited.first().cloned();
        if first_node.is_some() {
            tracing::debug!("envelope without first-node, using first visited node");
        }
    } else if let Some(first) = first_node.as_ref().filter(|f| !visited.contains(f.as_str())) {
        tracing::debug!(first_node = %first, "first-node missing from visited-nodes");
        let mut repaired = IndexSet::with_capacity(visited.len() + 1);
        repaired.insert(first.clone());
        repaired.extend(visited);
        visited = repaired;
    }

    let texts = |name: &str| -> Vec<String> {
        ctrl.children_named(name)
            .filter_map(Element::cdata)
            .map(str::to_owned)
            .collect()
    };

    Control {
        first_node,
        visited,
        connected: texts(CONNECTED_NODE_EL_NAME),
        disconnected: texts(DISCONNECTED_NODE_EL_NAME),
    }
}

impl TryFrom<&Element> for ClusterEnvelope {
    type Error = ClusterError;

    fn try_from(root: &Element) -> Result<Self> {
        Self::parse(root)
    }
}

impl From<&ClusterEnvelope> for Element {
    fn from(env: &ClusterEnvelope) -> Self {
        env.to_element()
    }
}
