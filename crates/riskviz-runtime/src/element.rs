#![forbid(unsafe_code)]

//! Host elements the visualizer decorates.
//!
//! An [`ElementHandle`] is a shared, identity-compared reference to a node
//! with string attributes and an [`InlineStyle`]. A [`Document`] is a flat
//! collection of handles that can be queried by attribute, which is all the
//! registry needs from its host.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Attribute holding the textual risk score.
pub const RISK_SCORE_ATTR: &str = "data-risk-score";

/// Attribute whose presence enables pulsing.
pub const ANIMATED_ATTR: &str = "data-animated";

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique element identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el#{}", self.0)
    }
}

/// Inline style properties the engine reads and writes.
///
/// `None` means the property is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub background_color: Option<String>,
    pub color: Option<String>,
    pub box_shadow: Option<String>,
    pub transition: Option<String>,
}

#[derive(Debug, Default)]
struct ElementData {
    attributes: BTreeMap<String, String>,
    style: InlineStyle,
}

/// Shared handle to a host element.
///
/// Clones refer to the same element; equality and hashing use identity.
#[derive(Clone)]
pub struct ElementHandle {
    id: ElementId,
    data: Rc<RefCell<ElementData>>,
}

impl ElementHandle {
    /// Create a detached element with no attributes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ElementId::next(),
            data: Rc::new(RefCell::new(ElementData::default())),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attribute(self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Element identity.
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Attribute value, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.data.borrow().attributes.get(name).cloned()
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.data.borrow().attributes.contains_key(name)
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        self.data
            .borrow_mut()
            .attributes
            .insert(name.to_owned(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.data.borrow_mut().attributes.remove(name)
    }

    /// Snapshot of the inline style.
    #[must_use]
    pub fn style(&self) -> InlineStyle {
        self.data.borrow().style.clone()
    }

    /// Mutate the inline style in one step.
    ///
    /// Observers never see a partially applied update.
    pub fn update_style<R>(&self, f: impl FnOnce(&mut InlineStyle) -> R) -> R {
        f(&mut self.data.borrow_mut().style)
    }
}

impl Default for ElementHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ElementHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ElementHandle {}

impl Hash for ElementHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.borrow();
        f.debug_struct("ElementHandle")
            .field("id", &self.id)
            .field("attributes", &data.attributes)
            .field("style", &data.style)
            .finish()
    }
}

/// A host that can enumerate elements carrying an attribute.
pub trait ElementSource {
    /// All elements with `attribute` set, in document order.
    fn query_all(&self, attribute: &str) -> Vec<ElementHandle>;
}

/// Flat, ordered element collection.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<ElementHandle>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and return a handle to it.
    pub fn push(&mut self, element: ElementHandle) -> ElementHandle {
        self.elements.push(element.clone());
        element
    }

    /// Append a new element with the given risk score attribute.
    pub fn add_scored(&mut self, score: impl Into<String>, animated: bool) -> ElementHandle {
        let mut element = ElementHandle::new().with_attribute(RISK_SCORE_ATTR, score);
        if animated {
            element = element.with_attribute(ANIMATED_ATTR, "true");
        }
        self.push(element)
    }

    /// Remove an element by identity.
    pub fn remove(&mut self, element: &ElementHandle) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e != element);
        self.elements.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementHandle> {
        self.elements.iter()
    }
}

impl ElementSource for Document {
    fn query_all(&self, attribute: &str) -> Vec<ElementHandle> {
        self.elements
            .iter()
            .filter(|e| e.has_attribute(attribute))
            .cloned()
            .collect()
    }
}

impl ElementSource for [ElementHandle] {
    fn query_all(&self, attribute: &str) -> Vec<ElementHandle> {
        self.iter()
            .filter(|e| e.has_attribute(attribute))
            .cloned()
            .collect()
    }
}

impl ElementSource for Vec<ElementHandle> {
    fn query_all(&self, attribute: &str) -> Vec<ElementHandle> {
        self.as_slice().query_all(attribute)
    }
}
