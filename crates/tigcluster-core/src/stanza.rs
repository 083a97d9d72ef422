//! Application stanza relayed through the cluster.
//!
//! The cluster layer treats stanzas as opaque: it only reads the sender
//! address and the namespace, and assigns the client namespace when a stanza
//! has none.

use crate::xml::Element;

/// Default namespace for client stanzas.
pub const CLIENT_XMLNS: &str = "jabber:client";

/// A stanza (`message`, `presence`, `iq`, ...) as handed to the cluster layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    elem: Element,
}

impl Packet {
    pub fn new(elem: Element) -> Self {
        Self { elem }
    }

    pub fn element(&self) -> &Element {
        &self.elem
    }

    pub fn into_element(self) -> Element {
        self.elem
    }

    /// Stanza element name (`message`, `presence`, `iq`).
    pub fn name(&self) -> &str {
        self.elem.name()
    }

    /// Address the stanza was sent from, if any.
    pub fn from(&self) -> Option<&str> {
        self.elem.attr("from")
    }

    pub fn to(&self) -> Option<&str> {
        self.elem.attr("to")
    }

    pub fn xmlns(&self) -> Option<&str> {
        self.elem.xmlns()
    }

    pub fn set_xmlns(&mut self, xmlns: impl Into<String>) {
        self.elem.set_xmlns(xmlns);
    }
}

impl From<Element> for Packet {
    fn from(elem: Element) -> Self {
        Self::new(elem)
    }
}
