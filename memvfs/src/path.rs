//! Translation between slash separated paths and namespace nodes.

use crate::error::{NameError, Result, VfsError};
use crate::node::{Namespace, NodeId};

pub const SEPARATOR: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component<'a> {
    Current,
    Parent,
    Normal(&'a str),
}

/// Splits on the separator, collapsing empty components.
fn components(path: &str) -> impl Iterator<Item = Component<'_>> {
    path.split(SEPARATOR)
        .filter(|part| !part.is_empty())
        .map(|part| match part {
            "." => Component::Current,
            ".." => Component::Parent,
            name => Component::Normal(name),
        })
}

pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Resolves `path` to a node. Absolute paths start at the root, relative ones
/// at `cwd`. `..` at the root stays at the root. The final component may name a
/// file or a directory; every component before it must be a directory.
///
/// Nothing is mutated, so the caller's working directory is untouched on
/// failure.
///
/// # Errors
///
/// `NotFound` naming the first missing component, `NotADirectory` naming a file
/// that is traversed through.
pub fn resolve(ns: &Namespace, cwd: NodeId, path: &str) -> Result<NodeId> {
    let mut cursor = if is_absolute(path) { ns.root() } else { cwd };
    for component in components(path) {
        let node = ns
            .get(cursor)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
        if !node.is_dir() {
            return Err(VfsError::NotADirectory(node.name().to_string()));
        }
        cursor = match component {
            Component::Current => cursor,
            Component::Parent => node.parent().unwrap_or(cursor),
            Component::Normal(name) => ns.find_child(cursor, name)?,
        };
    }
    Ok(cursor)
}

/// Like `resolve`, but the target itself must also be a directory.
pub fn resolve_dir(ns: &Namespace, cwd: NodeId, path: &str) -> Result<NodeId> {
    let id = resolve(ns, cwd, path)?;
    match ns.get(id) {
        Some(node) if node.is_dir() => Ok(id),
        Some(node) => Err(VfsError::NotADirectory(node.name().to_string())),
        None => Err(VfsError::NotFound(path.to_string())),
    }
}

/// Resolves everything but the last component of `path` to a directory and
/// returns it along with the last component, for operations that create a new
/// entry. Trailing separators are ignored.
///
/// # Errors
///
/// `InvalidName` when the path has no final component (`""` or `"/"`), plus
/// any error of `resolve_dir` on the parent.
pub fn resolve_parent<'p>(ns: &Namespace, cwd: NodeId, path: &'p str) -> Result<(NodeId, &'p str)> {
    let trimmed = path.trim_end_matches(SEPARATOR);
    let (parent, leaf) = match trimmed.rfind(SEPARATOR) {
        Some(0) => ("/", &trimmed[1..]),
        Some(i) => (&trimmed[..i], &trimmed[i + 1..]),
        None => ("", trimmed),
    };
    if leaf.is_empty() {
        return Err(VfsError::InvalidName {
            name: path.to_string(),
            reason: NameError::Empty,
        });
    }
    Ok((resolve_dir(ns, cwd, parent)?, leaf))
}

/// The absolute path of `node`, `/` for the root.
pub fn absolute_path(ns: &Namespace, node: NodeId) -> String {
    let mut names = Vec::new();
    let mut cursor = ns.get(node);
    while let Some(current) = cursor {
        match current.parent() {
            Some(parent) => {
                names.push(current.name());
                cursor = ns.get(parent);
            }
            None => break,
        }
    }

    if names.is_empty() {
        return SEPARATOR.to_string();
    }
    names.iter().rev().fold(String::new(), |mut out, name| {
        out.push(SEPARATOR);
        out.push_str(name);
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    /// /a/b/f and /a/c
    fn tree() -> (Namespace, NodeId, NodeId, NodeId) {
        let mut ns = Namespace::new(50);
        let root = ns.root();
        let a = ns.add(root, "a", NodeKind::Directory).unwrap();
        let b = ns.add(a, "b", NodeKind::Directory).unwrap();
        ns.add(a, "c", NodeKind::Directory).unwrap();
        let f = ns.add(b, "f", NodeKind::File).unwrap();
        (ns, a, b, f)
    }

    #[test]
    fn components_collapse_empty_parts() {
        let parts: Vec<_> = components("//a/./..///b/").collect();
        assert_eq!(
            parts,
            vec![
                Component::Normal("a"),
                Component::Current,
                Component::Parent,
                Component::Normal("b"),
            ]
        );
    }

    #[test]
    fn absolute_and_relative_paths_resolve_to_the_same_node() {
        let (ns, a, b, _) = tree();
        let root = ns.root();
        assert_eq!(resolve(&ns, root, "/a/b").unwrap(), b);
        assert_eq!(resolve(&ns, a, "b").unwrap(), b);
        assert_eq!(resolve(&ns, b, "/a/b/../b").unwrap(), b);
        assert_eq!(resolve(&ns, b, "../c/../b/.").unwrap(), b);
        assert_eq!(resolve(&ns, b, "/").unwrap(), root);
        assert_eq!(resolve(&ns, b, "").unwrap(), b);
    }

    #[test]
    fn parent_of_root_is_root() {
        let (ns, a, _, _) = tree();
        let root = ns.root();
        assert_eq!(resolve(&ns, root, "..").unwrap(), root);
        assert_eq!(resolve(&ns, root, "/../../a").unwrap(), a);
    }

    #[test]
    fn missing_component_is_named_in_the_error() {
        let (ns, _, _, _) = tree();
        let root = ns.root();
        match resolve(&ns, root, "/a/missing/b") {
            Err(VfsError::NotFound(name)) => assert_eq!(name, "missing"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn files_can_only_be_the_final_component() {
        let (ns, _, _, f) = tree();
        let root = ns.root();
        assert_eq!(resolve(&ns, root, "a/b/f").unwrap(), f);
        assert!(matches!(
            resolve(&ns, root, "a/b/f/x"),
            Err(VfsError::NotADirectory(name)) if name == "f"
        ));
        assert!(matches!(
            resolve(&ns, root, "a/b/f/.."),
            Err(VfsError::NotADirectory(_))
        ));
        assert!(matches!(
            resolve_dir(&ns, root, "a/b/f"),
            Err(VfsError::NotADirectory(_))
        ));
    }

    #[test]
    fn parent_resolution_splits_off_the_leaf() {
        let (ns, a, b, _) = tree();
        let root = ns.root();
        assert_eq!(resolve_parent(&ns, root, "new").unwrap(), (root, "new"));
        assert_eq!(resolve_parent(&ns, root, "/new").unwrap(), (root, "new"));
        assert_eq!(resolve_parent(&ns, root, "a/b/new").unwrap(), (b, "new"));
        assert_eq!(resolve_parent(&ns, b, "../new/").unwrap(), (a, "new"));
        assert!(matches!(
            resolve_parent(&ns, root, "/"),
            Err(VfsError::InvalidName { .. })
        ));
        assert!(matches!(
            resolve_parent(&ns, root, "zz/new"),
            Err(VfsError::NotFound(_))
        ));
    }

    #[test]
    fn absolute_path_walks_back_to_root() {
        let (ns, a, b, f) = tree();
        assert_eq!(absolute_path(&ns, ns.root()), "/");
        assert_eq!(absolute_path(&ns, a), "/a");
        assert_eq!(absolute_path(&ns, b), "/a/b");
        assert_eq!(absolute_path(&ns, f), "/a/b/f");
    }
}
