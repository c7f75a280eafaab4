use std::fmt;

use quick_xml::escape::partial_escape;

use crate::errors::RecordError;
use crate::transcode::{Leaf, Transcode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    WaterLevels,
    Casings,
    Lithologies,
}

impl DocumentKind {
    pub fn root_name(&self) -> &'static str {
        match self {
            DocumentKind::WaterLevels => "WaterLevels",
            DocumentKind::Casings => "Casings",
            DocumentKind::Lithologies => "Lithologies",
        }
    }

    pub fn child_name(&self) -> &'static str {
        match self {
            DocumentKind::WaterLevels => "WaterLevel",
            DocumentKind::Casings => "Casing",
            DocumentKind::Lithologies => "Lithology",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_name())
    }
}

/// One per-record child of the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: &'static str,
    leaves: Vec<Leaf>,
}

impl Element {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Text of the first leaf with `name`.
    pub fn leaf(&self, name: &str) -> Option<&str> {
        self.leaves
            .iter()
            .find(|leaf| leaf.name == name)
            .map(|leaf| leaf.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    kind: DocumentKind,
    children: Vec<Element>,
}

impl ExportDocument {
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Element-tree text: no declaration, no namespaces, no whitespace between
    /// elements, pure ASCII.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        let root = self.kind.root_name();
        if self.children.is_empty() {
            write_empty(&mut out, root);
            return out;
        }

        open(&mut out, root);
        for child in &self.children {
            if child.leaves.is_empty() {
                write_empty(&mut out, child.name);
                continue;
            }
            open(&mut out, child.name);
            for leaf in &child.leaves {
                if leaf.text.is_empty() {
                    write_empty(&mut out, leaf.name);
                } else {
                    open(&mut out, leaf.name);
                    push_text(&mut out, &leaf.text);
                    close(&mut out, leaf.name);
                }
            }
            close(&mut out, child.name);
        }
        close(&mut out, root);
        out
    }
}

/// Build a document with one child per item, in item order. The first
/// failing record aborts the whole document.
pub fn assemble<T: Transcode>(
    kind: DocumentKind,
    items: &[T],
) -> Result<ExportDocument, RecordError> {
    assemble_with(kind, items, |index, item| {
        item.leaves()
            .map_err(|err| err.at(item.domain(), item.point_id(), index))
    })
}

pub fn assemble_with<T, F>(
    kind: DocumentKind,
    items: &[T],
    mut transcode: F,
) -> Result<ExportDocument, RecordError>
where
    F: FnMut(usize, &T) -> Result<Vec<Leaf>, RecordError>,
{
    let children = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            transcode(index, item).map(|leaves| Element {
                name: kind.child_name(),
                leaves,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExportDocument { kind, children })
}

fn open(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
}

fn close(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_empty(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push_str(" />");
}

fn push_text(out: &mut String, text: &str) {
    for ch in partial_escape(text).chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            out.push_str(&format!("&#{};", u32::from(ch)));
        }
    }
}
