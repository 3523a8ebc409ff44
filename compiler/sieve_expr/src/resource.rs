//! Run-scoped arena of stateful objects reachable from expressions.
//!
//! Expression values are plain booleans, numbers and strings, so an XML
//! document cannot travel through a `Value` directly. Instead functions
//! such as `xml_open` store the object here and return a string handle;
//! later calls hand the string back and the registry resolves it.
//!
//! Handles are generational: `xml#<slot>@<generation>`. Clearing the
//! registry bumps every generation, so an old handle string that is
//! replayed after its slot was reused is reported as stale instead of
//! silently reaching the new occupant.
//!
//! Every derived handle is cached by what it was derived from, so asking
//! for the same root, element or child list again (say, once per loop
//! iteration) returns the existing handle and the arena stays bounded by
//! the documents actually touched.

use std::fmt;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use sieve_diagnostic::{io_error, missing_resource, Result};

/// Handle prefix shared by every resource kind.
const HANDLE_PREFIX: &str = "xml#";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    slot: u32,
    generation: u32,
}

impl Handle {
    /// Parse the string form produced by `Display`.
    pub fn parse(text: &str) -> Option<Handle> {
        let rest = text.strip_prefix(HANDLE_PREFIX)?;
        let (slot, generation) = rest.split_once('@')?;
        Some(Handle {
            slot: slot.parse().ok()?,
            generation: generation.parse().ok()?,
        })
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{HANDLE_PREFIX}{}@{}", self.slot, self.generation)
    }
}

/// One element of a parsed XML document.
#[derive(Clone, Debug)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Indices of child elements in document order.
    pub children: Vec<usize>,
    /// Concatenated text of all descendant text nodes.
    pub text: String,
}

/// An XML document converted into an owned element arena. Element `0` is
/// the root.
#[derive(Clone, Debug)]
pub struct XmlDocument {
    pub path: PathBuf,
    pub elements: Vec<XmlElement>,
}

impl XmlDocument {
    /// Parse XML text into an owned arena.
    pub fn parse(path: &Path, text: &str) -> Result<XmlDocument> {
        let doc = roxmltree::Document::parse(text).map_err(|err| {
            missing_resource(format!("malformed XML in '{}'", path.display())).with_cause(err)
        })?;

        let mut elements = Vec::new();
        // (roxmltree node, index of its parent in `elements`)
        let mut pending = vec![(doc.root_element(), None::<usize>)];
        while let Some((node, parent)) = pending.pop() {
            let index = elements.len();
            elements.push(XmlElement {
                name: node.tag_name().name().to_string(),
                attributes: node
                    .attributes()
                    .map(|a| (a.name().to_string(), a.value().to_string()))
                    .collect(),
                children: Vec::new(),
                text: node
                    .descendants()
                    .filter(roxmltree::Node::is_text)
                    .filter_map(|n| n.text())
                    .collect(),
            });
            if let Some(parent) = parent {
                elements[parent].children.push(index);
            }
            // Reverse so that children are popped, and numbered, in order.
            let children: Vec<_> = node.children().filter(roxmltree::Node::is_element).collect();
            pending.extend(children.into_iter().rev().map(|child| (child, Some(index))));
        }

        Ok(XmlDocument {
            path: path.to_path_buf(),
            elements,
        })
    }
}

/// What a slot holds.
#[derive(Clone, Debug)]
pub enum Resource {
    Document(XmlDocument),
    /// An element of the document behind `doc`.
    Element { doc: Handle, index: usize },
    /// A list of elements of the document behind `doc`.
    ElementList { doc: Handle, indices: Vec<usize> },
}

impl Resource {
    fn describe(&self) -> &'static str {
        match self {
            Resource::Document(_) => "document",
            Resource::Element { .. } => "element",
            Resource::ElementList { .. } => "element list",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Key {
    Root(Handle),
    Element(Handle, usize),
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    resource: Option<Resource>,
}

/// The arena. Owned by the run context; not shared between runs.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    documents: FxHashMap<PathBuf, Handle>,
    elements: FxHashMap<Key, Handle>,
    /// Child lists keyed by (element handle, tag).
    lists: FxHashMap<(Handle, String), Handle>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live resources.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.resource.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a resource and return its handle.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "more than u32::MAX live resources is not a supported workload"
    )]
    pub fn insert(&mut self, resource: Resource) -> Handle {
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.resource = Some(resource);
            return Handle {
                slot,
                generation: entry.generation,
            };
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            resource: Some(resource),
        });
        Handle {
            slot,
            generation: 0,
        }
    }

    /// Resolve a handle string.
    pub fn get(&self, handle: &str) -> Result<&Resource> {
        let parsed = parse_handle(handle)?;
        self.get_handle(parsed)
            .ok_or_else(|| missing_resource(format!("stale resource handle '{handle}'")))
    }

    fn get_handle(&self, handle: Handle) -> Option<&Resource> {
        self.slots
            .get(handle.slot as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.resource.as_ref())
    }

    /// Release everything; returns how many resources were dropped.
    pub fn clear(&mut self) -> usize {
        let mut dropped = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.resource.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                if let Ok(index) = u32::try_from(index) {
                    self.free.push(index);
                }
                dropped += 1;
            }
        }
        self.documents.clear();
        self.elements.clear();
        self.lists.clear();
        dropped
    }

    // XML access

    /// Open (or reuse) the document at `path`.
    pub fn open_xml(&mut self, path: &Path) -> Result<Handle> {
        if let Some(handle) = self.documents.get(path) {
            return Ok(*handle);
        }
        let text = std::fs::read_to_string(path).map_err(|e| io_error("read", path, e))?;
        let document = XmlDocument::parse(path, &text)?;
        tracing::debug!(path = %path.display(), elements = document.elements.len(), "opened XML document");
        let handle = self.insert(Resource::Document(document));
        self.documents.insert(path.to_path_buf(), handle);
        Ok(handle)
    }

    /// Handle to the root element of a document.
    pub fn xml_root(&mut self, doc: &str) -> Result<Handle> {
        let doc = self.document_handle(doc)?;
        Ok(self.element_handle(Key::Root(doc), doc, 0))
    }

    /// Resolve an element handle to its element.
    pub fn xml_element(&self, handle: &str) -> Result<&XmlElement> {
        match self.get(handle)? {
            Resource::Element { doc, index } => self.element_of(*doc, *index),
            other => Err(wrong_kind(handle, other, "element")),
        }
    }

    /// List of the children of `element` named `tag` (`*` for all).
    pub fn xml_list(&mut self, element: &str, tag: &str) -> Result<Handle> {
        let key = (parse_handle(element)?, tag.to_string());
        if let Some(list) = self.lists.get(&key) {
            return Ok(*list);
        }
        let (doc, indices) = match self.get(element)? {
            Resource::Element { doc, index } => {
                let document = self.document_of(*doc)?;
                let parent = &document.elements[*index];
                let indices = parent
                    .children
                    .iter()
                    .copied()
                    .filter(|&child| tag == "*" || document.elements[child].name == tag)
                    .collect::<Vec<_>>();
                (*doc, indices)
            }
            other => return Err(wrong_kind(element, other, "element")),
        };
        let list = self.insert(Resource::ElementList { doc, indices });
        self.lists.insert(key, list);
        Ok(list)
    }

    pub fn xml_list_len(&self, list: &str) -> Result<usize> {
        match self.get(list)? {
            Resource::ElementList { indices, .. } => Ok(indices.len()),
            other => Err(wrong_kind(list, other, "element list")),
        }
    }

    /// Handle to the `position`-th element of a list.
    pub fn xml_list_get(&mut self, list: &str, position: i64) -> Result<Handle> {
        let (doc, index) = match self.get(list)? {
            Resource::ElementList { doc, indices } => {
                let found = usize::try_from(position)
                    .ok()
                    .and_then(|p| indices.get(p))
                    .copied()
                    .ok_or_else(|| {
                        missing_resource(format!(
                            "index {position} out of bounds for list of {} element(s)",
                            indices.len()
                        ))
                    })?;
                (*doc, found)
            }
            other => return Err(wrong_kind(list, other, "element list")),
        };
        Ok(self.element_handle(Key::Element(doc, index), doc, index))
    }

    fn element_handle(&mut self, key: Key, doc: Handle, index: usize) -> Handle {
        if let Some(handle) = self.elements.get(&key) {
            return *handle;
        }
        let handle = self.insert(Resource::Element { doc, index });
        self.elements.insert(key, handle);
        handle
    }

    fn document_handle(&self, handle: &str) -> Result<Handle> {
        match self.get(handle)? {
            Resource::Document(_) => parse_handle(handle),
            other => Err(wrong_kind(handle, other, "document")),
        }
    }

    fn document_of(&self, doc: Handle) -> Result<&XmlDocument> {
        match self.get_handle(doc) {
            Some(Resource::Document(doc)) => Ok(doc),
            _ => Err(missing_resource("owning XML document is no longer open")),
        }
    }

    fn element_of(&self, doc: Handle, index: usize) -> Result<&XmlElement> {
        self.document_of(doc)?
            .elements
            .get(index)
            .ok_or_else(|| missing_resource(format!("element {index} does not exist")))
    }
}

fn parse_handle(text: &str) -> Result<Handle> {
    Handle::parse(text).ok_or_else(|| missing_resource(format!("'{text}' is not a resource handle")))
}

#[cold]
fn wrong_kind(handle: &str, found: &Resource, expected: &str) -> sieve_diagnostic::Error {
    missing_resource(format!(
        "handle '{handle}' refers to a {}, expected {expected}",
        found.describe()
    ))
}
