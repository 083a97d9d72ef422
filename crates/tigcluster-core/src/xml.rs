//! Minimal XML tree used to carry cluster envelopes and stanzas.
//!
//! Only what the cluster layer needs: attributes, character data, ordered
//! children and lookup by slash-separated path (`/cluster/control/first-node`,
//! where the first segment names the element the lookup starts from).
//! Parsing XML text is the transport's job; this type is what it hands over.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute carrying the element namespace.
pub const XMLNS_ATTR: &str = "xmlns";

/// One XML element with its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Element {
    name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cdata: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: BTreeMap::new(),
            cdata: None,
            children: Vec::new(),
        }
    }

    /// Element holding only character data (`<node-id>jid</node-id>`).
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_cdata(text)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_xmlns(self, xmlns: impl Into<String>) -> Self {
        self.with_attr(XMLNS_ATTR, xmlns)
    }

    pub fn with_cdata(mut self, text: impl Into<String>) -> Self {
        self.cdata = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn xmlns(&self) -> Option<&str> {
        self.attr(XMLNS_ATTR)
    }

    pub fn set_xmlns(&mut self, xmlns: impl Into<String>) {
        self.set_attr(XMLNS_ATTR, xmlns);
    }

    pub fn cdata(&self) -> Option<&str> {
        self.cdata.as_deref()
    }

    pub fn set_cdata(&mut self, text: impl Into<String>) {
        self.cdata = Some(text.into());
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Append a child, keeping insertion order.
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Resolve a path such as `/cluster/control/visited-nodes`.
    ///
    /// The first segment must match this element's own name; every following
    /// segment selects the first child with that name.
    pub fn find_child(&self, path: &str) -> Option<&Element> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        if segments.next()? != self.name {
            return None;
        }
        segments.try_fold(self, |el, seg| el.child(seg))
    }

    /// Children of the element at `path`, empty when the path does not resolve.
    pub fn children_at(&self, path: &str) -> &[Element] {
        self.find_child(path).map(Element::children).unwrap_or(&[])
    }

    pub fn attr_at(&self, path: &str, key: &str) -> Option<&str> {
        self.find_child(path).and_then(|el| el.attr(key))
    }

    pub fn cdata_at(&self, path: &str) -> Option<&str> {
        self.find_child(path).and_then(Element::cdata)
    }
}

fn escape(s: &str, attr: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            '\'' if attr => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (k, v) in &self.attrs {
            write!(f, " {}=\"{}\"", k, escape(v, true))?;
        }
        if self.cdata.is_none() && self.children.is_empty() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        if let Some(text) = &self.cdata {
            f.write_str(&escape(text, false))?;
        }
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.name)
    }
}
