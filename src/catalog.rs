//! The tag taxonomy: YAML documents parsed into [`TagNode`] trees, keyed by
//! catalog name, plus the flattening used to build selectable entries.

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info, warn};

mod parse;
mod path;

pub use parse::DocumentError;
pub use path::TagPath;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagNode {
    /// A snippet inserted verbatim.
    Leaf(String),
    /// Named children, in document order.
    Group(IndexMap<String, TagNode>),
    /// Unkeyed items; leaf items use their text as label and value.
    Sequence(Vec<TagNode>),
}

impl TagNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TagNode::Leaf(_))
    }

    /// Child by key for groups, by index for sequences.
    pub fn get(&self, segment: &str) -> Option<&TagNode> {
        match self {
            TagNode::Leaf(_) => None,
            TagNode::Group(children) => children.get(segment),
            TagNode::Sequence(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        }
    }

    /// Every leaf value below this node, depth-first.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TagNode::Leaf(value) => out.push(value),
            TagNode::Group(children) => {
                for child in children.values() {
                    child.collect_leaves(out);
                }
            }
            TagNode::Sequence(items) => {
                for item in items {
                    item.collect_leaves(out);
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Literal,
    Placeholder,
}

/// One selectable button: what to show, what to insert, and how deep it sits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderEntry {
    pub label: String,
    pub value: String,
    pub kind: EntryKind,
    pub depth: usize,
}

impl RenderEntry {
    fn literal(label: impl Into<String>, value: impl Into<String>, depth: usize) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            kind: EntryKind::Literal,
            depth,
        }
    }

    fn placeholder(label: impl Into<String>, path: &TagPath, depth: usize) -> Self {
        Self {
            label: label.into(),
            value: path.token(),
            kind: EntryKind::Placeholder,
            depth,
        }
    }
}

/// Already-fetched document content together with the identifier it came from.
#[derive(Clone, Debug)]
pub struct Source {
    pub id: String,
    pub content: String,
}

impl Source {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    pub fn catalog_name(&self) -> &str {
        catalog_name(&self.id)
    }
}

/// Base name of a source identifier with its last extension stripped.
pub fn catalog_name(id: &str) -> &str {
    let base = id.rsplit(['/', '\\']).next().unwrap_or(id);
    match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse {id}: {source}")]
    Parse {
        id: String,
        #[source]
        source: DocumentError,
    },
    #[error("failed to read {id}: {message}")]
    Unreadable { id: String, message: String },
    #[error("tag catalog '{0}' not found")]
    NotFound(String),
    #[error("tag '{path}' not found at '{segment}'")]
    PathNotFound { path: String, segment: String },
    #[error("no options found for tag '{0}'")]
    NoOptions(String),
    #[error("placeholders expand to more than {0} combinations")]
    TooManyCombinations(usize),
}

/// Result of a load: everything that parsed, plus what was skipped and why.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub catalog: TagCatalog,
    pub warnings: Vec<CatalogError>,
}

impl LoadReport {
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagCatalog {
    roots: IndexMap<String, TagNode>,
}

impl TagCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every source. A source that fails is skipped and reported in the
    /// returned warnings; the others still load.
    pub fn load<I>(sources: I) -> LoadReport
    where
        I: IntoIterator<Item = Source>,
    {
        let mut report = LoadReport::default();
        for source in sources {
            let name = source.catalog_name().to_string();
            match parse::parse_documents(&source.content) {
                Ok(root) => {
                    if report.catalog.roots.insert(name.clone(), root).is_some() {
                        debug!(catalog = %name, id = %source.id, "replacing catalog with a later document");
                    }
                }
                Err(err) => {
                    warn!("Failed to load tag file {}: {}", source.id, err);
                    report.warnings.push(CatalogError::Parse {
                        id: source.id,
                        source: err,
                    });
                }
            }
        }
        info!(
            "Loaded {} tag catalogs ({} skipped)",
            report.catalog.len(),
            report.warnings.len()
        );
        report
    }

    pub fn names(&self) -> Vec<&str> {
        self.roots.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.roots.contains_key(name)
    }

    pub fn entries_of(&self, name: &str) -> Result<&TagNode, CatalogError> {
        self.roots
            .get(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    /// Selectable entries for one catalog, see [`flatten`].
    pub fn render_entries(&self, name: &str) -> Result<Vec<RenderEntry>, CatalogError> {
        let root = self.entries_of(name)?;
        Ok(flatten(root, &TagPath::root(name)))
    }

    pub fn lookup(&self, path: &TagPath) -> Result<&TagNode, CatalogError> {
        let Some((name, rest)) = path.segments().split_first() else {
            return Err(CatalogError::NotFound(String::new()));
        };
        let mut node = self.entries_of(name)?;
        for segment in rest {
            node = node.get(segment).ok_or_else(|| CatalogError::PathNotFound {
                path: path.to_string(),
                segment: segment.clone(),
            })?;
        }
        Ok(node)
    }

    /// All snippets a placeholder for `path` may resolve to.
    pub fn options_at(&self, path: &TagPath) -> Result<Vec<String>, CatalogError> {
        let options: Vec<String> = self
            .lookup(path)?
            .leaves()
            .into_iter()
            .map(str::to_string)
            .collect();
        if options.is_empty() {
            return Err(CatalogError::NoOptions(path.to_string()));
        }
        Ok(options)
    }
}

/// Flattens the children of `node` depth-first.
///
/// Leaves of a group become literal entries labelled by their key. A keyed
/// child that is itself a group or sequence yields a placeholder entry for
/// `prefix:key` followed by its own children one level deeper. Leaf items of a
/// sequence use their text as both label and value; container items are
/// flattened one level deeper under their index.
pub fn flatten(node: &TagNode, prefix: &TagPath) -> Vec<RenderEntry> {
    let mut out = Vec::new();
    flatten_into(node, prefix, 0, &mut out);
    out
}

fn flatten_into(node: &TagNode, prefix: &TagPath, depth: usize, out: &mut Vec<RenderEntry>) {
    match node {
        TagNode::Leaf(value) => out.push(RenderEntry::literal(value.as_str(), value.as_str(), depth)),
        TagNode::Group(children) => {
            for (key, child) in children {
                match child {
                    TagNode::Leaf(value) => {
                        out.push(RenderEntry::literal(key.as_str(), value.as_str(), depth))
                    }
                    _ => {
                        let path = prefix.child(key.as_str());
                        out.push(RenderEntry::placeholder(key.as_str(), &path, depth));
                        flatten_into(child, &path, depth + 1, out);
                    }
                }
            }
        }
        TagNode::Sequence(items) => {
            for (idx, item) in items.iter().enumerate() {
                if item.is_leaf() {
                    flatten_into(item, prefix, depth, out);
                } else {
                    flatten_into(item, &prefix.index(idx), depth + 1, out);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod catalog_tests;
