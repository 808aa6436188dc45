//! Resource hierarchy of the mail service.
//!
//! Routes and hyperlinks are both derived from one [`BuilderTree`] of path
//! segments, so a handler can link to a parent collection by walking up
//! the tree instead of formatting URLs by hand.

use crate::builder::{BuilderTree, NodeId};

/// One path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// The service root, contributes nothing to the path.
    Root,
    /// A fixed segment such as `mails`.
    Literal(&'static str),
    /// A numeric identifier captured under the given parameter name.
    Id(&'static str),
}

/// A node of the resource tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Path segment.
    pub segment: Segment,
    /// Whether the resource is a collection of items.
    pub collection: bool,
}

impl Resource {
    fn collection(name: &'static str) -> Self {
        Self {
            segment: Segment::Literal(name),
            collection: true,
        }
    }

    fn item(param: &'static str) -> Self {
        Self {
            segment: Segment::Id(param),
            collection: false,
        }
    }
}

/// The resource tree and the well-known nodes in it.
#[derive(Debug, Clone)]
pub struct ResourceMap {
    tree: BuilderTree<Resource>,
    /// `/users`
    pub users: NodeId,
    /// `/mailboxes`
    pub mailboxes: NodeId,
    /// `/mailboxes/:mailbox_id`
    pub mailbox: NodeId,
    /// `/mailboxes/:mailbox_id/contacts`
    pub contacts: NodeId,
    /// `/mailboxes/:mailbox_id/mails`
    pub mails: NodeId,
    /// `/mailboxes/:mailbox_id/mails/:mail_id`
    pub mail: NodeId,
}

impl Default for ResourceMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceMap {
    /// Build the resource tree.
    pub fn new() -> Self {
        let mut tree = BuilderTree::new(Resource {
            segment: Segment::Root,
            collection: false,
        });
        let root = tree.root();
        let users = tree.add_child(root, Resource::collection("users"));
        let mailboxes = tree.add_child(root, Resource::collection("mailboxes"));
        let mailbox = tree.add_child(mailboxes, Resource::item("mailbox_id"));
        let contacts = tree.add_child(mailbox, Resource::collection("contacts"));
        let mails = tree.add_child(mailbox, Resource::collection("mails"));
        let mail = tree.add_child(mails, Resource::item("mail_id"));

        Self {
            tree,
            users,
            mailboxes,
            mailbox,
            contacts,
            mails,
            mail,
        }
    }

    /// The underlying tree.
    pub fn tree(&self) -> &BuilderTree<Resource> {
        &self.tree
    }

    /// Router pattern of a node, e.g. `/mailboxes/:mailbox_id/mails`.
    pub fn pattern(&self, node: NodeId) -> String {
        self.build(node, |param, _| format!(":{param}"), &[])
            .unwrap_or_default()
    }

    /// Concrete path of a node. `ids` fills the identifier segments from the
    /// root down. Returns `None` when too few ids are given.
    pub fn href(&self, node: NodeId, ids: &[i64]) -> Option<String> {
        let needed = self.id_count(node)?;
        if ids.len() < needed {
            return None;
        }
        self.build(node, |_, id| id.to_string(), ids)
    }

    /// The collection closest above `node`.
    pub fn parent_collection(&self, node: NodeId) -> Option<NodeId> {
        self.tree.up_to(node, |r| r.collection)
    }

    /// Path of the collection above `node`, e.g. a mail's mail list.
    pub fn parent_collection_href(&self, node: NodeId, ids: &[i64]) -> Option<String> {
        let parent = self.parent_collection(node)?;
        let needed = self.id_count(parent)?;
        self.href(parent, ids.get(..needed)?)
    }

    fn id_count(&self, node: NodeId) -> Option<usize> {
        let path = self.tree.path_from_root(node)?;
        Some(
            path.into_iter()
                .filter_map(|id| self.tree.value(id))
                .filter(|r| matches!(r.segment, Segment::Id(_)))
                .count(),
        )
    }

    fn build<F>(&self, node: NodeId, mut fill: F, ids: &[i64]) -> Option<String>
    where
        F: FnMut(&'static str, i64) -> String,
    {
        let mut ids = ids.iter().copied();
        let mut out = String::new();
        for id in self.tree.path_from_root(node)? {
            match self.tree.value(id)?.segment {
                Segment::Root => {}
                Segment::Literal(name) => {
                    out.push('/');
                    out.push_str(name);
                }
                Segment::Id(param) => {
                    out.push('/');
                    out.push_str(&fill(param, ids.next().unwrap_or_default()));
                }
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        Some(out)
    }
}
