// Definition of the virtual file system the game is played in. Nodes live in an
// arena and refer to each other by handle. A directory owns its children; the
// parent handle is only used to walk back up the tree.

use std::collections::BTreeMap;
use tracing::instrument;

use crate::fsystem::errors::{FSErrorType, FileSystemError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum EntryKind {
    Directory(BTreeMap<String, NodeId>),
    NormalFile(Vec<u8>),
    VirusFile { bytes: Vec<u8>, index: u32 },
}

#[derive(Debug, Clone)]
pub struct Entry {
    name: String,
    parent: Option<NodeId>,
    origin: Option<String>,
    kind: EntryKind,
}

impl Entry {
    fn new(name: String, kind: EntryKind) -> Entry {
        Entry {
            name,
            parent: None,
            origin: None,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    // Absolute path at the time the entry was last moved into a trash bin.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory(_))
    }

    pub fn is_normal_file(&self) -> bool {
        matches!(self.kind, EntryKind::NormalFile(_))
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            EntryKind::Directory(_) => None,
            EntryKind::NormalFile(bytes) => Some(bytes),
            EntryKind::VirusFile { bytes, .. } => Some(bytes),
        }
    }

    pub fn virus_index(&self) -> Option<u32> {
        match &self.kind {
            EntryKind::VirusFile { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn size(&self) -> usize {
        match &self.kind {
            EntryKind::Directory(children) => children.len(),
            EntryKind::NormalFile(bytes) => bytes.len(),
            EntryKind::VirusFile { bytes, .. } => bytes.len(),
        }
    }

    fn children(&self) -> Option<&BTreeMap<String, NodeId>> {
        match &self.kind {
            EntryKind::Directory(children) => Some(children),
            _ => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut BTreeMap<String, NodeId>> {
        match &mut self.kind {
            EntryKind::Directory(children) => Some(children),
            _ => None,
        }
    }
}

pub struct FileSystem {
    nodes: Vec<Option<Entry>>,
    root: NodeId,
}

impl FileSystem {
    pub fn new() -> FileSystem {
        let root = Entry::new("/".to_string(), EntryKind::Directory(BTreeMap::new()));
        FileSystem {
            nodes: vec![Some(root)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Entry> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn entry(&self, id: NodeId) -> Result<&Entry> {
        self.get(id).ok_or_else(|| {
            FileSystemError::new(FSErrorType::NotFound, format!("Node {} does not exist", id.0))
        })
    }

    fn entry_mut(&mut self, id: NodeId) -> Result<&mut Entry> {
        self.nodes
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| {
                FileSystemError::new(FSErrorType::NotFound, format!("Node {} does not exist", id.0))
            })
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.get(id).map(|e| e.name()).unwrap_or("")
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|e| e.parent())
    }

    pub fn is_dir(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|e| e.is_dir())
    }

    pub fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.get(dir)
            .and_then(|e| e.children())
            .and_then(|children| children.get(name).copied())
    }

    pub fn children(&self, dir: NodeId) -> Vec<NodeId> {
        self.get(dir)
            .and_then(|e| e.children())
            .map(|children| children.values().copied().collect())
            .unwrap_or_default()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| NodeId(i))
    }

    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !self.contains(next) {
                continue;
            }
            out.push(next);
            let mut children = self.children(next);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    // Also true when `id == ancestor`.
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    // Detached directories render as if they hung off the root.
    pub fn path_of(&self, id: NodeId) -> String {
        if id == self.root {
            return "/".to_string();
        }
        let mut parts = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == self.root {
                break;
            }
            parts.push(self.name(current));
            cursor = self.parent(current);
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    pub fn add_dir(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.add(parent, Entry::new(name.to_string(), EntryKind::Directory(BTreeMap::new())))
    }

    pub fn add_file(&mut self, parent: NodeId, name: &str, bytes: Vec<u8>) -> Result<NodeId> {
        self.add(parent, Entry::new(name.to_string(), EntryKind::NormalFile(bytes)))
    }

    pub fn add_virus(&mut self, parent: NodeId, name: &str, bytes: Vec<u8>, index: u32) -> Result<NodeId> {
        self.add(parent, Entry::new(name.to_string(), EntryKind::VirusFile { bytes, index }))
    }

    pub fn add_detached_dir(&mut self, name: &str) -> NodeId {
        self.push(Entry::new(name.to_string(), EntryKind::Directory(BTreeMap::new())))
    }

    fn push(&mut self, entry: Entry) -> NodeId {
        self.nodes.push(Some(entry));
        NodeId(self.nodes.len() - 1)
    }

    fn add(&mut self, parent: NodeId, entry: Entry) -> Result<NodeId> {
        if self.child(parent, &entry.name).is_some() {
            return Err(FileSystemError::new(
                FSErrorType::AlreadyExists,
                format!("{} already exists in {}", entry.name, self.path_of(parent)),
            ));
        }
        if !self.is_dir(parent) {
            return Err(FileSystemError::new(
                FSErrorType::NotADirectory,
                format!("{} is not a directory", self.path_of(parent)),
            ));
        }
        let name = entry.name.clone();
        let id = self.push(entry);
        self.attach_as(id, parent, name)?;
        Ok(id)
    }

    fn attach_as(&mut self, id: NodeId, dir: NodeId, name: String) -> Result<()> {
        let children = self.entry_mut(dir)?.children_mut().ok_or_else(|| {
            FileSystemError::new(FSErrorType::NotADirectory, "Target is not a directory".to_string())
        })?;
        children.insert(name.clone(), id);
        let entry = self.entry_mut(id)?;
        entry.name = name;
        entry.parent = Some(dir);
        Ok(())
    }

    pub fn free_name(&self, dir: NodeId, name: &str) -> String {
        if self.child(dir, name).is_none() {
            return name.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}~{}", name, n);
            if self.child(dir, &candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    fn detach(&mut self, id: NodeId) -> Result<()> {
        let entry = self.entry(id)?;
        let name = entry.name.clone();
        if let Some(parent) = entry.parent {
            if let Some(children) = self.entry_mut(parent)?.children_mut() {
                children.remove(&name);
            }
        }
        self.entry_mut(id)?.parent = None;
        Ok(())
    }

    pub fn relocate(&mut self, id: NodeId, dir: NodeId) -> Result<String> {
        let name = self.entry(id)?.name().to_string();
        self.relocate_as(id, dir, &name)
    }

    // Returns the name used, `name~N` if `name` was taken.
    #[instrument(skip(self))]
    pub fn relocate_as(&mut self, id: NodeId, dir: NodeId, name: &str) -> Result<String> {
        if id == self.root {
            return Err(FileSystemError::new(
                FSErrorType::InvalidPath,
                "Root folder cannot be moved!".to_string(),
            ));
        }
        if !self.is_dir(dir) {
            return Err(FileSystemError::new(
                FSErrorType::NotADirectory,
                format!("{} is not a directory", self.path_of(dir)),
            ));
        }
        if self.is_within(dir, id) {
            return Err(FileSystemError::new(
                FSErrorType::InvalidPath,
                format!("Cannot move {} into itself", self.path_of(id)),
            ));
        }
        if self.parent(id) == Some(dir) && self.name(id) == name {
            return Ok(name.to_string());
        }
        self.detach(id)?;
        let name = self.free_name(dir, name);
        self.attach_as(id, dir, name.clone())?;
        tracing::debug!("Moved node to {}", self.path_of(id));
        Ok(name)
    }

    #[instrument(skip(self))]
    pub fn remove(&mut self, id: NodeId) -> Result<Entry> {
        if id == self.root {
            return Err(FileSystemError::new(
                FSErrorType::InvalidPath,
                "Root folder cannot be removed!".to_string(),
            ));
        }
        self.detach(id)?;
        let doomed = self.descendants(id);
        let mut removed = None;
        for node in doomed {
            let taken = self.nodes[node.0].take();
            if node == id {
                removed = taken;
            }
        }
        removed.ok_or_else(|| {
            FileSystemError::new(FSErrorType::NotFound, format!("Node {} does not exist", id.0))
        })
    }

    pub fn set_origin(&mut self, id: NodeId, origin: Option<String>) -> Result<()> {
        self.entry_mut(id)?.origin = origin;
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn make_dirs(&mut self, path: &str) -> Result<NodeId> {
        let mut cursor = self.root;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            cursor = match self.child(cursor, part) {
                Some(next) if self.is_dir(next) => next,
                Some(_) => {
                    let msg = format!("Child {} of folder {} is a file", part, self.path_of(cursor));
                    tracing::info!(msg);
                    return Err(FileSystemError::new(FSErrorType::NotADirectory, msg));
                }
                None => {
                    tracing::info!("Creating new folder {}", part);
                    self.add_dir(cursor, part)?
                }
            };
        }
        Ok(cursor)
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        FileSystem::new()
    }
}
