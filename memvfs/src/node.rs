use std::collections::BTreeMap;

use log::debug;

use crate::alloc::FreeList;
use crate::error::{NameError, Result, VfsError};
use crate::io::BlockNumber;
use crate::path::SEPARATOR;

/// Handle to a node in the namespace arena. Handles are never reused, so a
/// stale handle can only miss, never alias a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
  Directory,
  File,
}

/// The blocks backing a file, in logical order, and the number of meaningful
/// bytes stored across them.
///
/// `blocks.len() == ceil(size / block_size)`; bytes of the last block past
/// `size` are zero.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extent {
  pub(crate) blocks: Vec<BlockNumber>,
  pub(crate) size: usize,
}

impl Extent {
  pub fn blocks(&self) -> &[BlockNumber] {
    &self.blocks
  }

  pub fn block_count(&self) -> usize {
    self.blocks.len()
  }

  pub fn size(&self) -> usize {
    self.size
  }
}

#[derive(Debug)]
enum Body {
  /// `anchor` is the first-inserted child still attached; traversal of the
  /// circular sibling list starts and stops there.
  Directory { anchor: Option<NodeId> },
  File(Extent),
}

#[derive(Debug)]
pub struct Node {
  name: String,
  /// Back reference only. A node is owned by its parent's child list.
  parent: Option<NodeId>,
  /// Whether the node currently sits in its parent's child list.
  linked: bool,
  /// Circular sibling links. A detached node links to itself.
  next: NodeId,
  prev: NodeId,
  body: Body,
}

impl Node {
  fn new(id: NodeId, name: String, kind: NodeKind, parent: Option<NodeId>) -> Self {
    let body = match kind {
      NodeKind::Directory => Body::Directory { anchor: None },
      NodeKind::File => Body::File(Extent::default()),
    };
    Self {
      name,
      parent,
      linked: false,
      next: id,
      prev: id,
      body,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn parent(&self) -> Option<NodeId> {
    self.parent
  }

  pub fn kind(&self) -> NodeKind {
    match self.body {
      Body::Directory { .. } => NodeKind::Directory,
      Body::File(_) => NodeKind::File,
    }
  }

  pub fn is_dir(&self) -> bool {
    self.kind() == NodeKind::Directory
  }

  /// File content layout, `None` for directories.
  pub fn extent(&self) -> Option<&Extent> {
    match &self.body {
      Body::File(extent) => Some(extent),
      Body::Directory { .. } => None,
    }
  }

  fn anchor(&self) -> Option<NodeId> {
    match self.body {
      Body::Directory { anchor } => anchor,
      Body::File(_) => None,
    }
  }
}

/// Hierarchical directory tree stored in an arena keyed by `NodeId`.
///
/// Directories keep their children in a circular doubly linked list threaded
/// through the arena, in insertion order. The root is named `/`, has no parent
/// and can not be removed.
#[derive(Debug)]
pub struct Namespace {
  nodes: BTreeMap<NodeId, Node>,
  next_id: usize,
  root: NodeId,
  max_name_len: usize,
}

impl Namespace {
  pub fn new(max_name_len: usize) -> Self {
    let root = NodeId(0);
    let mut nodes = BTreeMap::new();
    nodes.insert(
      root,
      Node::new(root, SEPARATOR.to_string(), NodeKind::Directory, None),
    );
    Self {
      nodes,
      next_id: 1,
      root,
      max_name_len,
    }
  }

  pub fn root(&self) -> NodeId {
    self.root
  }

  pub fn get(&self, id: NodeId) -> Option<&Node> {
    self.nodes.get(&id)
  }

  /// Number of live nodes, root included.
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  fn node(&self, id: NodeId) -> Result<&Node> {
    self
      .nodes
      .get(&id)
      .ok_or_else(|| VfsError::NotFound(format!("{:?}", id)))
  }

  fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
    self
      .nodes
      .get_mut(&id)
      .ok_or_else(|| VfsError::NotFound(format!("{:?}", id)))
  }

  fn link(&self, id: NodeId) -> &Node {
    // Sibling and anchor links only ever point at live nodes.
    &self.nodes[&id]
  }

  fn link_mut(&mut self, id: NodeId) -> &mut Node {
    self.nodes.get_mut(&id).expect("dangling sibling link")
  }

  /// # Errors
  ///
  /// `InvalidName` when the name is empty, longer than the configured bound,
  /// contains the separator or is one of `.` and `..`.
  pub fn validate_name(&self, name: &str) -> Result<()> {
    let reason = if name.is_empty() {
      NameError::Empty
    } else if name.len() > self.max_name_len {
      NameError::TooLong
    } else if name.contains(SEPARATOR) {
      NameError::ContainsSeparator
    } else if name == "." || name == ".." {
      NameError::Reserved
    } else {
      return Ok(());
    };
    Err(VfsError::InvalidName {
      name: name.to_string(),
      reason,
    })
  }

  /// Allocates a detached node whose back reference points at `parent`. The
  /// node becomes reachable once passed to `attach_child`.
  pub fn create_node(&mut self, name: &str, kind: NodeKind, parent: NodeId) -> Result<NodeId> {
    self.validate_name(name)?;
    let id = NodeId(self.next_id);
    self.next_id += 1;
    self
      .nodes
      .insert(id, Node::new(id, name.to_string(), kind, Some(parent)));
    Ok(id)
  }

  /// Inserts `child` at the tail of `parent`'s circular list.
  ///
  /// # Errors
  ///
  /// `NotADirectory` if `parent` is a file and `AlreadyExists` if `parent`
  /// already holds an entry with the same name.
  pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
    let parent_node = self.node(parent)?;
    if !parent_node.is_dir() {
      return Err(VfsError::NotADirectory(parent_node.name.clone()));
    }
    let child_node = self.node(child)?;
    let name = child_node.name.clone();
    if child == self.root || child_node.linked {
      return Err(VfsError::InvalidArgument(format!(
        "'{}' is already attached",
        name
      )));
    }
    if self.find_child(parent, &name).is_ok() {
      return Err(VfsError::AlreadyExists(name));
    }

    match self.link(parent).anchor() {
      None => {
        let node = self.link_mut(child);
        node.next = child;
        node.prev = child;
      }
      Some(first) => {
        let last = self.link(first).prev;
        self.link_mut(last).next = child;
        self.link_mut(first).prev = child;
        let node = self.link_mut(child);
        node.prev = last;
        node.next = first;
      }
    }
    if let Body::Directory { anchor } = &mut self.link_mut(parent).body {
      anchor.get_or_insert(child);
    }
    let node = self.link_mut(child);
    node.parent = Some(parent);
    node.linked = true;
    debug!("attached {:?} '{}' under {:?}", child, name, parent);
    Ok(())
  }

  /// Unlinks `child` from `parent`'s circular list. The anchor moves to the
  /// next sibling when the anchor itself is removed and the list becomes
  /// empty when the last child goes.
  pub fn detach_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
    let node = self.node(child)?;
    if !node.linked || node.parent != Some(parent) {
      return Err(VfsError::NotFound(node.name.clone()));
    }
    let (next, prev) = (node.next, node.prev);

    if let Body::Directory { anchor } = &mut self.link_mut(parent).body {
      if *anchor == Some(child) {
        *anchor = if next == child { None } else { Some(next) };
      }
    }
    if next != child {
      self.link_mut(prev).next = next;
      self.link_mut(next).prev = prev;
    }

    let node = self.link_mut(child);
    node.next = child;
    node.prev = child;
    node.parent = None;
    node.linked = false;
    debug!("detached {:?} from {:?}", child, parent);
    Ok(())
  }

  /// Linear scan of `parent`'s children for an exact, case sensitive match.
  ///
  /// # Errors
  ///
  /// `NotADirectory` if `parent` is a file, `NotFound` naming `name` otherwise.
  pub fn find_child(&self, parent: NodeId, name: &str) -> Result<NodeId> {
    let parent_node = self.node(parent)?;
    if !parent_node.is_dir() {
      return Err(VfsError::NotADirectory(parent_node.name.clone()));
    }
    self
      .children(parent)
      .find(|&id| self.link(id).name == name)
      .ok_or_else(|| VfsError::NotFound(name.to_string()))
  }

  /// Iterates the children of `dir` in insertion order. Yields nothing for a
  /// file or an unknown handle.
  pub fn children(&self, dir: NodeId) -> Children<'_> {
    let anchor = self.get(dir).and_then(Node::anchor);
    Children {
      namespace: self,
      anchor,
      cursor: anchor,
    }
  }

  pub fn has_children(&self, dir: NodeId) -> bool {
    self.get(dir).and_then(Node::anchor).is_some()
  }

  /// Creates `name` under `parent` after checking every precondition, so a
  /// failure leaves the tree untouched.
  pub fn add(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> Result<NodeId> {
    self.validate_name(name)?;
    match self.find_child(parent, name) {
      Ok(_) => return Err(VfsError::AlreadyExists(name.to_string())),
      Err(VfsError::NotFound(_)) => {}
      Err(e) => return Err(e),
    }
    let id = self.create_node(name, kind, parent)?;
    self.attach_child(parent, id)?;
    Ok(id)
  }

  /// Detaches and destroys an empty directory.
  ///
  /// # Errors
  ///
  /// `NotADirectory` for a file, `Busy` for the root and `NotEmpty` while the
  /// directory still has children.
  pub fn remove_directory(&mut self, id: NodeId) -> Result<()> {
    let node = self.node(id)?;
    if !node.is_dir() {
      return Err(VfsError::NotADirectory(node.name.clone()));
    }
    if id == self.root {
      return Err(VfsError::Busy(node.name.clone()));
    }
    if node.anchor().is_some() {
      return Err(VfsError::NotEmpty(node.name.clone()));
    }
    self.destroy(id)?;
    Ok(())
  }

  /// Releases every block held by a file, in logical order, then detaches and
  /// destroys it. Returns the number of blocks released.
  ///
  /// # Errors
  ///
  /// `NotAFile` when `id` is a directory.
  pub fn remove_file(&mut self, id: NodeId, free: &mut FreeList) -> Result<usize> {
    let node = self.node(id)?;
    if node.is_dir() {
      return Err(VfsError::NotAFile(node.name.clone()));
    }
    let released = match self.destroy(id)?.body {
      Body::File(extent) => {
        let count = extent.blocks.len();
        free.release_all(extent.blocks);
        count
      }
      Body::Directory { .. } => 0,
    };
    Ok(released)
  }

  pub fn extent(&self, id: NodeId) -> Result<&Extent> {
    let node = self.node(id)?;
    node
      .extent()
      .ok_or_else(|| VfsError::NotAFile(node.name.clone()))
  }

  pub fn extent_mut(&mut self, id: NodeId) -> Result<&mut Extent> {
    let node = self.node_mut(id)?;
    match &mut node.body {
      Body::File(extent) => Ok(extent),
      Body::Directory { .. } => Err(VfsError::NotAFile(node.name.clone())),
    }
  }

  /// Removes every node below the root, files releasing their blocks, leaving
  /// an empty root directory.
  ///
  /// The walk is post-order over an explicit stack, so tree depth is bounded
  /// by memory rather than by the call stack.
  pub fn teardown(&mut self, free: &mut FreeList) {
    let mut stack = vec![self.root];
    while let Some(&top) = stack.last() {
      if let Some(child) = self.link(top).anchor() {
        stack.push(child);
        continue;
      }
      stack.pop();
      if top == self.root {
        break;
      }
      // Detaching the anchor promotes the next sibling.
      match self.destroy(top) {
        Ok(Node {
          body: Body::File(extent),
          ..
        }) => free.release_all(extent.blocks),
        Ok(_) => {}
        Err(_) => break,
      }
    }
    debug!("namespace torn down, {} free blocks", free.free_count());
  }

  fn destroy(&mut self, id: NodeId) -> Result<Node> {
    let node = self.node(id)?;
    if let (true, Some(parent)) = (node.linked, node.parent) {
      self.detach_child(parent, id)?;
    }
    self
      .nodes
      .remove(&id)
      .ok_or_else(|| VfsError::NotFound(format!("{:?}", id)))
  }
}

/// Single pass over a circular sibling list, starting and stopping at the
/// anchor.
pub struct Children<'a> {
  namespace: &'a Namespace,
  anchor: Option<NodeId>,
  cursor: Option<NodeId>,
}

impl<'a> Iterator for Children<'a> {
  type Item = NodeId;

  fn next(&mut self) -> Option<Self::Item> {
    let current = self.cursor?;
    let next = self.namespace.link(current).next;
    self.cursor = if Some(next) == self.anchor {
      None
    } else {
      Some(next)
    };
    Some(current)
  }
}
