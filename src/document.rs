//! Access to the host document's icon link.
//!
//! The renderer never touches a global document. It is handed an
//! [`IconDocument`] that can find the page's icon link, and works with the
//! [`IconLink`] handles it returns. [`MemoryDocument`] is an in-process
//! implementation for headless use and tests; the `web` feature provides one
//! backed by the browser DOM.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::FaviconError;

/// Stable identity of an icon link, used to order overlapping renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey(pub u64);

/// A handle to an icon-link element owned by the host document.
pub trait IconLink: Clone {
    /// Returns the identity of the underlying element.
    fn key(&self) -> LinkKey;

    /// Reads an attribute, `None` if it is absent.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Overwrites the element's `href`.
    fn set_href(&self, href: &str) -> Result<(), FaviconError>;

    /// The current `href`, treating an empty value as absent.
    fn source(&self) -> Option<String> {
        self.attribute("href").filter(|href| !href.is_empty())
    }
}

/// A document that can be searched for the page icon.
pub trait IconDocument {
    type Link: IconLink;

    /// Returns the first element whose `rel` is `icon`.
    fn query_icon_link(&self) -> Option<Self::Link>;
}

/// Resolves the link a render should operate on.
///
/// An explicit target is returned as is; otherwise the document is searched.
pub fn locate<D: IconDocument>(explicit: Option<&D::Link>, document: &D) -> Option<D::Link> {
    match explicit {
        Some(link) => Some(link.clone()),
        None => document.query_icon_link(),
    }
}

// ============================================================================
// MemoryDocument
// ============================================================================

#[derive(Debug, Default)]
struct LinkState {
    attributes: HashMap<String, String>,
    href_writes: usize,
}

/// A link element living in a [`MemoryDocument`].
///
/// Clones share the same element.
#[derive(Debug, Clone)]
pub struct MemoryLink {
    key: LinkKey,
    state: Rc<RefCell<LinkState>>,
}

impl MemoryLink {
    /// Sets an attribute on the element.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.state
            .borrow_mut()
            .attributes
            .insert(name.into(), value.into());
    }

    /// Removes an attribute from the element.
    pub fn remove_attribute(&self, name: &str) {
        self.state.borrow_mut().attributes.remove(name);
    }

    /// Number of times [`IconLink::set_href`] has been called.
    /// Snapshot of every attribute, sorted by name.
    pub fn attributes(&self) -> Vec<(String, String)> {
        let mut attributes: Vec<_> = self
            .state
            .borrow()
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        attributes.sort();
        attributes
    }

    pub fn href_writes(&self) -> usize {
        self.state.borrow().href_writes
    }
}

impl IconLink for MemoryLink {
    fn key(&self) -> LinkKey {
        self.key
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.state.borrow().attributes.get(name).cloned()
    }

    fn set_href(&self, href: &str) -> Result<(), FaviconError> {
        let mut state = self.state.borrow_mut();
        state.attributes.insert("href".to_owned(), href.to_owned());
        state.href_writes += 1;
        Ok(())
    }
}

/// An in-process document holding `<link>` elements in insertion order.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    links: RefCell<Vec<MemoryLink>>,
    next_key: Cell<u64>,
}

impl MemoryDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `<link>` with the given attributes and returns a handle to it.
    pub fn add_link<'a>(&self, attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> MemoryLink {
        let key = LinkKey(self.next_key.get() + 1);
        self.next_key.set(key.0);
        let state = LinkState {
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            href_writes: 0,
        };
        let link = MemoryLink {
            key,
            state: Rc::new(RefCell::new(state)),
        };
        self.links.borrow_mut().push(link.clone());
        link
    }

    /// Appends `<link rel="icon" href=...>`, with `sizes` when given.
    pub fn add_icon(&self, href: &str, sizes: Option<&str>) -> MemoryLink {
        let mut attributes = vec![("rel", "icon"), ("href", href)];
        if let Some(sizes) = sizes {
            attributes.push(("sizes", sizes));
        }
        self.add_link(attributes)
    }

    /// Total `href` writes across every link in the document.
    pub fn total_href_writes(&self) -> usize {
        self.links.borrow().iter().map(MemoryLink::href_writes).sum()
    }
}

impl IconDocument for MemoryDocument {
    type Link = MemoryLink;

    fn query_icon_link(&self) -> Option<MemoryLink> {
        self.links
            .borrow()
            .iter()
            .find(|link| link.attribute("rel").as_deref() == Some("icon"))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_finds_first_icon_link() {
        let doc = MemoryDocument::new();
        doc.add_link([("rel", "stylesheet"), ("href", "a.css")]);
        let first = doc.add_icon("first.png", None);
        doc.add_icon("second.png", None);

        let found = doc.query_icon_link().unwrap();
        assert_eq!(found.key(), first.key());
        assert_eq!(found.source().as_deref(), Some("first.png"));
    }

    #[test]
    fn query_requires_exact_icon_rel() {
        let doc = MemoryDocument::new();
        doc.add_link([("rel", "apple-touch-icon"), ("href", "a.png")]);
        doc.add_link([("rel", "shortcut icon"), ("href", "b.png")]);
        assert!(doc.query_icon_link().is_none());
    }

    #[test]
    fn locate_prefers_explicit_target() {
        let doc = MemoryDocument::new();
        doc.add_icon("page.png", None);
        let other = doc.add_link([("rel", "alternate icon"), ("href", "alt.png")]);

        let located = locate(Some(&other), &doc).unwrap();
        assert_eq!(located.key(), other.key());
    }

    #[test]
    fn locate_returns_none_without_icon() {
        let doc = MemoryDocument::new();
        assert!(locate(None, &doc).is_none());
    }

    #[test]
    fn empty_href_is_not_a_source() {
        let doc = MemoryDocument::new();
        let link = doc.add_icon("", None);
        assert!(link.source().is_none());
        link.remove_attribute("href");
        assert!(link.source().is_none());
    }

    #[test]
    fn set_href_is_shared_between_clones() {
        let doc = MemoryDocument::new();
        let link = doc.add_icon("old.png", None);
        let handle = doc.query_icon_link().unwrap();

        handle.set_href("new.png").unwrap();
        assert_eq!(link.source().as_deref(), Some("new.png"));
        assert_eq!(link.href_writes(), 1);
        assert_eq!(doc.total_href_writes(), 1);
    }
}
