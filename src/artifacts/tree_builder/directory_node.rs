use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::errors::{FormatError, Result};
use std::collections::HashMap;

/// Index of the root node in the arena
const ROOT: usize = 0;

/// One filesystem entry collected during a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    pub name: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A file whose blob digest is already known
    File { mode: FileMode, oid: ObjectId },
    /// A directory; children are indices into the arena
    Directory { children: Vec<usize> },
}

/// In-memory hierarchy of one working tree, owned by a single build
///
/// Nodes live in an arena. Directories are registered by path so that a
/// child can find its parent, which means parents must be inserted before
/// their children.
#[derive(Debug, Clone)]
pub struct DirectoryTree {
    nodes: Vec<DirectoryNode>,
    directories: HashMap<String, usize>,
}

impl Default for DirectoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryTree {
    pub fn new() -> Self {
        DirectoryTree {
            nodes: vec![DirectoryNode {
                name: String::new(),
                kind: NodeKind::Directory {
                    children: Vec::new(),
                },
            }],
            directories: HashMap::from([(String::new(), ROOT)]),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a directory at `path` (relative, `/`-separated)
    pub fn insert_directory(&mut self, path: &str) -> Result<()> {
        if self.directories.contains_key(path) {
            return Ok(());
        }

        let index = self.attach(
            path,
            NodeKind::Directory {
                children: Vec::new(),
            },
        )?;
        self.directories.insert(path.to_string(), index);

        Ok(())
    }

    /// Register a file at `path` with its blob digest
    pub fn insert_file(&mut self, path: &str, mode: FileMode, oid: ObjectId) -> Result<()> {
        self.attach(path, NodeKind::File { mode, oid }).map(|_| ())
    }

    /// Register a file, creating any missing ancestor directories first
    pub fn insert_file_with_parents(
        &mut self,
        path: &str,
        mode: FileMode,
        oid: ObjectId,
    ) -> Result<()> {
        let ancestors = path.match_indices('/').map(|(position, _)| &path[..position]);
        for ancestor in ancestors {
            self.insert_directory(ancestor)?;
        }

        self.insert_file(path, mode, oid)
    }

    fn attach(&mut self, path: &str, kind: NodeKind) -> Result<usize> {
        if path.split('/').any(str::is_empty) {
            return Err(FormatError::EmptyPathComponent(path.to_string()).into());
        }
        let (parent_path, name) = path.rsplit_once('/').unwrap_or(("", path));

        let parent = *self
            .directories
            .get(parent_path)
            .ok_or_else(|| FormatError::MissingParent(path.to_string()))?;

        let siblings = match &self.nodes[parent].kind {
            NodeKind::Directory { children } => children,
            NodeKind::File { .. } => return Err(FormatError::MissingParent(path.to_string()).into()),
        };
        // a tree holds each name once
        if siblings.iter().any(|&sibling| self.nodes[sibling].name == name) {
            return Err(FormatError::PathConflict(path.to_string()).into());
        }

        let index = self.nodes.len();
        if let NodeKind::Directory { children } = &mut self.nodes[parent].kind {
            children.push(index);
        }

        self.nodes.push(DirectoryNode {
            name: name.to_string(),
            kind,
        });

        Ok(index)
    }

    /// Resolve every directory bottom-up into tree objects
    ///
    /// `store` is called once per non-empty directory, children before their
    /// parent, and returns the digest of the tree it persisted. Directories
    /// without any file beneath them are left out of their parent. The root
    /// is always stored, as the empty tree if nothing else.
    pub fn write_trees<F>(&self, store: &mut F) -> Result<ObjectId>
    where
        F: FnMut(&Tree) -> Result<ObjectId>,
    {
        let tree = self.tree_of(ROOT, store)?.unwrap_or_default();
        store(&tree)
    }

    fn tree_of<F>(&self, index: usize, store: &mut F) -> Result<Option<Tree>>
    where
        F: FnMut(&Tree) -> Result<ObjectId>,
    {
        let NodeKind::Directory { children } = &self.nodes[index].kind else {
            return Ok(None);
        };

        let mut tree = Tree::default();
        for &child in children {
            let node = &self.nodes[child];

            match &node.kind {
                NodeKind::File { mode, oid } => {
                    tree.add_entry(&node.name, TreeEntry::new((*mode).into(), oid.clone()));
                }
                NodeKind::Directory { .. } => {
                    if let Some(subtree) = self.tree_of(child, store)? {
                        let oid = store(&subtree)?;
                        tree.add_entry(&node.name, TreeEntry::new(EntryMode::Directory, oid));
                    }
                }
            }
        }

        Ok((!tree.is_empty()).then_some(tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::object::Object;
    use crate::errors::Error;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn hash_only(tree: &Tree) -> Result<ObjectId> {
        tree.object_id()
    }

    fn blob(content: &str) -> ObjectId {
        ObjectId::hash(format!("blob {}\0{}", content.len(), content).as_bytes())
    }

    #[test]
    fn hello_world_tree_has_known_digests() {
        let mut directory = DirectoryTree::new();
        directory
            .insert_file("a.txt", FileMode::Regular, blob("hello"))
            .unwrap();
        directory.insert_directory("b").unwrap();
        directory
            .insert_file("b/c.txt", FileMode::Regular, blob("world"))
            .unwrap();

        let mut stored = Vec::new();
        let root = directory
            .write_trees(&mut |tree: &Tree| {
                stored.push(tree.clone());
                tree.object_id()
            })
            .unwrap();

        assert_eq!(root.as_ref(), "6eb73f435afc727a3c937c842d7941465d20b129");
        // subtree first, root last
        assert_eq!(stored.len(), 2);
        assert_eq!(
            stored[0].object_id().unwrap().as_ref(),
            "c64bf409eb6421cd3d3c349ab8f337b4e4991f41"
        );
        let names = stored[1].entries().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a.txt", "b"]);
    }

    #[test]
    fn empty_tree_is_still_written() {
        let directory = DirectoryTree::new();
        let mut calls = 0;

        let root = directory
            .write_trees(&mut |tree: &Tree| {
                calls += 1;
                tree.object_id()
            })
            .unwrap();

        assert_eq!(root.as_ref(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
        assert_eq!(calls, 1);
    }

    #[test]
    fn empty_directories_are_left_out() {
        let mut with_empty = DirectoryTree::new();
        with_empty.insert_directory("empty").unwrap();
        with_empty.insert_directory("empty/nested").unwrap();
        with_empty
            .insert_file("a.txt", FileMode::Regular, blob("hello"))
            .unwrap();

        let mut without = DirectoryTree::new();
        without
            .insert_file("a.txt", FileMode::Regular, blob("hello"))
            .unwrap();

        assert_eq!(
            with_empty.write_trees(&mut hash_only).unwrap(),
            without.write_trees(&mut hash_only).unwrap()
        );
    }

    #[test]
    fn child_before_parent_is_rejected() {
        let mut directory = DirectoryTree::new();

        assert!(matches!(
            directory.insert_file("dir/a.txt", FileMode::Regular, blob("a")),
            Err(Error::Format(FormatError::MissingParent(path))) if path == "dir/a.txt"
        ));
    }

    #[test]
    fn file_cannot_be_a_parent() {
        let mut directory = DirectoryTree::new();
        directory
            .insert_file("a", FileMode::Regular, blob("a"))
            .unwrap();

        assert!(directory.insert_directory("a/b").is_err());
    }

    #[test]
    fn file_and_directory_with_the_same_name_conflict() {
        let mut file_first = DirectoryTree::new();
        file_first
            .insert_file("a", FileMode::Regular, blob("a"))
            .unwrap();

        assert!(matches!(
            file_first.insert_file_with_parents("a/b", FileMode::Regular, blob("b")),
            Err(Error::Format(FormatError::PathConflict(path))) if path == "a"
        ));

        let mut directory_first = DirectoryTree::new();
        directory_first
            .insert_file_with_parents("a/b", FileMode::Regular, blob("b"))
            .unwrap();

        assert!(matches!(
            directory_first.insert_file("a", FileMode::Regular, blob("a")),
            Err(Error::Format(FormatError::PathConflict(path))) if path == "a"
        ));
    }

    #[test]
    fn same_file_twice_conflicts() {
        let mut directory = DirectoryTree::new();
        directory
            .insert_file("a.txt", FileMode::Regular, blob("a"))
            .unwrap();

        assert!(matches!(
            directory.insert_file("a.txt", FileMode::Regular, blob("b")),
            Err(Error::Format(FormatError::PathConflict(_)))
        ));
    }

    #[test]
    fn empty_path_components_are_rejected() {
        for path in ["", "/a.txt", "a//b.txt", "dir/"] {
            let mut directory = DirectoryTree::new();

            assert!(
                matches!(
                    directory.insert_file_with_parents(path, FileMode::Regular, blob("a")),
                    Err(Error::Format(FormatError::EmptyPathComponent(_)))
                ),
                "{path:?} was accepted"
            );
        }
    }

    #[test]
    fn executable_mode_changes_the_digest() {
        let mut regular = DirectoryTree::new();
        regular
            .insert_file("run.sh", FileMode::Regular, blob("echo"))
            .unwrap();
        let mut executable = DirectoryTree::new();
        executable
            .insert_file("run.sh", FileMode::Executable, blob("echo"))
            .unwrap();

        assert_ne!(
            regular.write_trees(&mut hash_only).unwrap(),
            executable.write_trees(&mut hash_only).unwrap()
        );
    }

    #[test]
    fn missing_parents_can_be_created_on_the_fly() {
        let mut implicit = DirectoryTree::new();
        implicit
            .insert_file_with_parents("x/y/z.txt", FileMode::Regular, blob("z"))
            .unwrap();

        let mut explicit = DirectoryTree::new();
        explicit.insert_directory("x").unwrap();
        explicit.insert_directory("x/y").unwrap();
        explicit
            .insert_file("x/y/z.txt", FileMode::Regular, blob("z"))
            .unwrap();

        assert_eq!(implicit.len(), 3);
        assert_eq!(
            implicit.write_trees(&mut hash_only).unwrap(),
            explicit.write_trees(&mut hash_only).unwrap()
        );
    }

    fn arb_files() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::btree_map(
            ("[a-c]{1,2}", prop::option::of("[a-c]{1,2}"), "[a-e]{1,3}\\.txt"),
            "[a-z ]{0,12}",
            1..12,
        )
        .prop_map(|files| {
            files
                .into_iter()
                .map(|((top, sub, file), content)| {
                    let path = match sub {
                        Some(sub) => format!("d{top}/d{sub}/{file}"),
                        None => format!("d{top}/{file}"),
                    };
                    (path, content)
                })
                .collect()
        })
    }

    fn build(files: &[(String, String)]) -> ObjectId {
        let mut directory = DirectoryTree::new();
        for (path, content) in files {
            directory
                .insert_file_with_parents(path, FileMode::Regular, blob(content))
                .unwrap();
        }
        directory.write_trees(&mut hash_only).unwrap()
    }

    proptest! {
        #[test]
        fn visit_order_does_not_change_the_root_digest(
            (files, shuffled) in arb_files().prop_flat_map(|files| {
                let shuffled = Just(files.clone()).prop_shuffle();
                (Just(files), shuffled)
            })
        ) {
            prop_assert_eq!(build(&files), build(&shuffled));
        }
    }
}
