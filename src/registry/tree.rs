use crate::error::NamespaceError;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Node<V> {
    Branch(BTreeMap<String, Node<V>>),
    Leaf(V),
}

/// Insert-once tree keyed by `.`-separated paths.
///
/// There is no remove or update. A failed [`insert`](NamespaceTree::insert)
/// leaves the tree exactly as it was: containers are only created for
/// segments that were missing, and a failure can only be detected before the
/// first missing segment is reached.
#[derive(Debug, Clone)]
pub struct NamespaceTree<V> {
    root: BTreeMap<String, Node<V>>,
    len: usize,
}

impl<V> Default for NamespaceTree<V> {
    fn default() -> Self {
        Self {
            root: BTreeMap::new(),
            len: 0,
        }
    }
}

impl<V> NamespaceTree<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `value` at `path`, creating intermediate containers as needed.
    ///
    /// # Errors
    /// - [`NamespaceError::Collision`] if the final segment is already taken,
    ///   by a leaf or by a container.
    /// - [`NamespaceError::Blocked`] if a leaf sits on an intermediate segment.
    /// - [`NamespaceError::InvalidPath`] for an empty path or empty segment.
    pub fn insert(&mut self, path: &str, value: V) -> Result<(), NamespaceError> {
        let segments = split_path(path)?;
        let Some((last, parents)) = segments.split_last() else {
            return Err(NamespaceError::InvalidPath(path.to_owned()));
        };

        let mut level = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            let node = level
                .entry((*segment).to_owned())
                .or_insert_with(|| Node::Branch(BTreeMap::new()));
            level = match node {
                Node::Branch(children) => children,
                Node::Leaf(_) => {
                    return Err(NamespaceError::Blocked {
                        path: path.to_owned(),
                        at: segments[..=depth].join("."),
                    })
                }
            };
        }

        match level.entry((*last).to_owned()) {
            Entry::Occupied(_) => Err(NamespaceError::Collision(path.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(Node::Leaf(value));
                self.len += 1;
                Ok(())
            }
        }
    }

    /// The value registered at exactly `path`, if any.
    pub fn get(&self, path: &str) -> Option<&V> {
        let segments = split_path(path).ok()?;
        let (last, parents) = segments.split_last()?;

        let mut level = &self.root;
        for segment in parents {
            match level.get(*segment)? {
                Node::Branch(children) => level = children,
                Node::Leaf(_) => return None,
            }
        }
        match level.get(*last)? {
            Node::Leaf(value) => Some(value),
            Node::Branch(_) => None,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Succeeds iff [`insert`](NamespaceTree::insert) at `path` would, without
    /// touching the tree.
    pub fn check_vacant(&self, path: &str) -> Result<(), NamespaceError> {
        let segments = split_path(path)?;
        let mut level = &self.root;
        for (depth, segment) in segments.iter().enumerate() {
            let is_last = depth + 1 == segments.len();
            match level.get(*segment) {
                None => return Ok(()),
                Some(_) if is_last => return Err(NamespaceError::Collision(path.to_owned())),
                Some(Node::Branch(children)) => level = children,
                Some(Node::Leaf(_)) => {
                    return Err(NamespaceError::Blocked {
                        path: path.to_owned(),
                        at: segments[..=depth].join("."),
                    })
                }
            }
        }
        Ok(())
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every leaf path, in sorted order.
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::with_capacity(self.len);
        collect_paths(&self.root, &mut Vec::new(), &mut paths);
        paths
    }
}

fn collect_paths<V>(level: &BTreeMap<String, Node<V>>, prefix: &mut Vec<String>, out: &mut Vec<String>) {
    for (segment, node) in level {
        prefix.push(segment.clone());
        match node {
            Node::Leaf(_) => out.push(prefix.join(".")),
            Node::Branch(children) => collect_paths(children, prefix, out),
        }
        prefix.pop();
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, NamespaceError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(NamespaceError::InvalidPath(path.to_owned()));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_read_back() {
        let mut tree = NamespaceTree::new();
        for path in ["namespaceTest", "a.b.c", "utils.uniqueId", "a.b.d"] {
            assert_eq!(tree.insert(path, path.len()), Ok(()));
            assert_eq!(tree.get(path), Some(&path.len()));
        }
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_occupied_leaf_is_never_overwritten() {
        let mut tree = NamespaceTree::new();
        tree.insert("a.b.c", "first").unwrap();

        let err = tree.insert("a.b.c", "second").unwrap_err();
        assert_eq!(err, NamespaceError::Collision("a.b.c".into()));
        assert_eq!(tree.get("a.b.c"), Some(&"first"));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_container_counts_as_occupied() {
        let mut tree = NamespaceTree::new();
        tree.insert("a.b", 1).unwrap();

        assert_eq!(tree.get("a"), None);
        assert_eq!(tree.check_vacant("a"), Err(NamespaceError::Collision("a".into())));
        assert_eq!(tree.check_vacant("a.c"), Ok(()));
        assert_eq!(tree.insert("a", 2), Err(NamespaceError::Collision("a".into())));
        assert_eq!(tree.paths(), vec!["a.b"]);
    }

    #[test]
    fn test_leaf_blocks_deeper_paths_without_side_effects() {
        let mut tree = NamespaceTree::new();
        tree.insert("utils", 1).unwrap();

        assert!(tree.check_vacant("utils.uniqueId.extra").is_err());
        let err = tree.insert("utils.uniqueId.extra", 2).unwrap_err();
        assert_eq!(
            err,
            NamespaceError::Blocked {
                path: "utils.uniqueId.extra".into(),
                at: "utils".into(),
            }
        );
        assert_eq!(tree.paths(), vec!["utils"]);
    }

    #[test]
    fn test_invalid_paths() {
        let mut tree = NamespaceTree::new();
        for path in ["", "a..b", ".a", "a."] {
            assert_eq!(
                tree.insert(path, 0),
                Err(NamespaceError::InvalidPath(path.into()))
            );
            assert!(!tree.contains(path));
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_paths_are_sorted() {
        let mut tree = NamespaceTree::new();
        tree.insert("shop.cart", ()).unwrap();
        tree.insert("analytics", ()).unwrap();
        tree.insert("shop.badge", ()).unwrap();
        assert_eq!(tree.paths(), vec!["analytics", "shop.badge", "shop.cart"]);
    }
}
