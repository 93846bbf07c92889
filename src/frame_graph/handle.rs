//! Scoped graph membership.
//!
//! Registering an object with a [`FrameGraph`](super::FrameGraph) yields a
//! [`Handle`]. Handles are shared: cloning one is cheap, and the object stays
//! in the graph until the last clone is dropped. Dropping the last clone
//! pushes the node id onto the graph's release queue; the graph removes the
//! node the next time it is mutated or compiled.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::node::{Node, NodeId, NodeType};
use crate::resources::Trackable;

/// Node ids whose last handle was dropped, waiting to be removed.
pub(crate) type ReleaseQueue = Mutex<Vec<NodeId>>;

struct Membership {
    node: Node,
    releases: Weak<ReleaseQueue>,
}

impl Drop for Membership {
    fn drop(&mut self) {
        // The graph may already be gone, in which case there is nothing to release.
        if let Some(releases) = self.releases.upgrade() {
            releases.lock().push(self.node.id);
        }
    }
}

/// Weak view of a membership, kept by the graph to count live handles
/// without keeping the node alive itself.
#[derive(Clone)]
pub(crate) struct Tracker(Weak<Membership>);

impl Tracker {
    pub(crate) fn share_count(&self) -> usize {
        self.0.strong_count()
    }
}

/// Typed, reference-counted membership of one object in a frame graph.
pub struct Handle<T> {
    membership: Arc<Membership>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Trackable> Handle<T> {
    pub(crate) fn new(id: NodeId, releases: &Arc<ReleaseQueue>) -> Self {
        Self {
            membership: Arc::new(Membership {
                node: Node::new(id, T::NODE_TYPE),
                releases: Arc::downgrade(releases),
            }),
            _marker: PhantomData,
        }
    }

    pub(crate) fn tracker(&self) -> Tracker {
        Tracker(Arc::downgrade(&self.membership))
    }

    /// Type-erased clone of this handle.
    pub fn erase(&self) -> AnyHandle {
        AnyHandle {
            membership: Arc::clone(&self.membership),
        }
    }
}

impl<T> Handle<T> {
    pub fn id(&self) -> NodeId {
        self.membership.node.id
    }

    pub fn node(&self) -> Node {
        self.membership.node
    }

    /// Number of live clones of this handle (typed and erased).
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.membership)
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            membership: Arc::clone(&self.membership),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.node())
    }
}

/// A [`Handle`] with its type erased, for fields that may reference any
/// category (for example the resources a compute pass writes).
#[derive(Clone)]
pub struct AnyHandle {
    membership: Arc<Membership>,
}

impl AnyHandle {
    pub fn id(&self) -> NodeId {
        self.membership.node.id
    }

    pub fn node(&self) -> Node {
        self.membership.node
    }

    pub fn node_type(&self) -> NodeType {
        self.membership.node.node_type
    }

    /// Recover the typed handle if the category matches.
    pub fn downcast<T: Trackable>(&self) -> Option<Handle<T>> {
        (self.node_type() == T::NODE_TYPE).then(|| Handle {
            membership: Arc::clone(&self.membership),
            _marker: PhantomData,
        })
    }
}

impl<T: Trackable> From<Handle<T>> for AnyHandle {
    fn from(handle: Handle<T>) -> Self {
        Self {
            membership: handle.membership,
        }
    }
}

impl PartialEq for AnyHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for AnyHandle {}

impl Hash for AnyHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for AnyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyHandle({})", self.node())
    }
}
