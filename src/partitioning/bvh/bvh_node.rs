use crate::bounding_volume::Aabb;
use smallvec::SmallVec;

/// The index of a node in a [`Bvh`](super::Bvh).
///
/// Identifiers are only meaningful for the hierarchy that created them, and are invalidated
/// by [`Bvh::clear`](super::Bvh::clear).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BvNodeId(pub(crate) u32);

impl BvNodeId {
    /// The index of this node in the hierarchy's node arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
/// State flags of a hierarchy node.
pub struct BvNodeFlags(u8);

bitflags::bitflags! {
    impl BvNodeFlags: u8 {
        /// The node directly references original geometry.
        const ANNOTATED = 1 << 0;
        /// The node is the root of its hierarchy.
        const ROOT = 1 << 1;
    }
}

/// A node of a bounding volume hierarchy.
///
/// Nodes are owned by their [`Bvh`](super::Bvh). Links to the parent and children are
/// plain identifiers into the same arena.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BvNode {
    pub(crate) volume: Aabb,
    pub(crate) children: SmallVec<[BvNodeId; 4]>,
    pub(crate) parent: Option<BvNodeId>,
    pub(crate) geometry: SmallVec<[u32; 1]>,
    pub(crate) flags: BvNodeFlags,
}

impl BvNode {
    pub(crate) fn new(volume: Aabb, parent: Option<BvNodeId>) -> Self {
        Self {
            volume,
            children: SmallVec::new(),
            parent,
            geometry: SmallVec::new(),
            flags: BvNodeFlags::empty(),
        }
    }

    /// The bounding volume of this node, in the local frame of its hierarchy.
    #[inline]
    pub fn volume(&self) -> &Aabb {
        &self.volume
    }

    /// The children of this node.
    #[inline]
    pub fn children(&self) -> &[BvNodeId] {
        &self.children
    }

    /// The parent of this node, if any.
    #[inline]
    pub fn parent(&self) -> Option<BvNodeId> {
        self.parent
    }

    /// Indices of the primitives referenced by this node.
    ///
    /// Empty unless the node is annotated.
    #[inline]
    pub fn geometry(&self) -> &[u32] {
        &self.geometry
    }

    /// The state flags of this node.
    #[inline]
    pub fn flags(&self) -> BvNodeFlags {
        self.flags
    }

    /// A node is a leaf iff it has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Is this node the root of its hierarchy?
    #[inline]
    pub fn is_root(&self) -> bool {
        self.flags.contains(BvNodeFlags::ROOT)
    }

    /// Does this node reference original geometry?
    #[inline]
    pub fn is_annotated(&self) -> bool {
        self.flags.contains(BvNodeFlags::ANNOTATED)
    }
}
