use super::{BvNode, BvNodeFlags, BvNodeId, BvhError};
use crate::bounding_volume::Aabb;
use core::ops::Index;
use slab::Slab;

/// A bounding volume hierarchy.
///
/// The hierarchy owns every one of its nodes in an arena. Parent and child links are node
/// identifiers into that arena, so the tree never holds owning cycles and every node lives
/// exactly as long as the hierarchy (or until the next [`Bvh::clear`]).
///
/// A hierarchy is filled once by a builder (see
/// [`TopDownBuilder`](super::TopDownBuilder) and [`BottomUpBuilder`](super::BottomUpBuilder))
/// and only read afterward. It is not designed for incremental updates.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Bvh {
    pub(crate) nodes: Slab<BvNode>,
    pub(crate) root: Option<BvNodeId>,
}

impl Bvh {
    /// Creates an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every node of this hierarchy.
    ///
    /// All the node identifiers previously returned by `self` become invalid.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// The number of nodes of this hierarchy, including detached ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Does this hierarchy contain no node?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root of this hierarchy, if it has one.
    #[inline]
    pub fn root(&self) -> Option<BvNodeId> {
        self.root
    }

    /// Does `id` refer to a node of this hierarchy?
    #[inline]
    pub fn contains(&self, id: BvNodeId) -> bool {
        self.nodes.contains(id.index())
    }

    /// The node with the given identifier, if it exists.
    #[inline]
    pub fn get(&self, id: BvNodeId) -> Option<&BvNode> {
        self.nodes.get(id.index())
    }

    /// The node with the given identifier.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this hierarchy.
    #[inline]
    pub fn node(&self, id: BvNodeId) -> &BvNode {
        &self.nodes[id.index()]
    }

    /// Inserts a new node.
    ///
    /// If `parent` is `None`, the new node becomes the root of the hierarchy. This fails if the
    /// hierarchy already has a root. Otherwise, the new node is appended to the children of
    /// `parent`.
    pub fn insert(&mut self, parent: Option<BvNodeId>, volume: Aabb) -> Result<BvNodeId, BvhError> {
        match parent {
            None => {
                if self.root.is_some() {
                    return Err(BvhError::RootAlreadySet);
                }

                let id = self.insert_detached(volume);
                self.nodes[id.index()].flags.insert(BvNodeFlags::ROOT);
                self.root = Some(id);
                Ok(id)
            }
            Some(parent) => {
                if !self.contains(parent) {
                    return Err(BvhError::InvalidNode(parent));
                }

                let id = BvNodeId(self.nodes.insert(BvNode::new(volume, Some(parent))) as u32);
                self.nodes[parent.index()].children.push(id);
                Ok(id)
            }
        }
    }

    /// Inserts a node that has neither parent nor children yet.
    ///
    /// It must later be given a parent with [`Bvh::attach`] or become the root with
    /// [`Bvh::set_root`] for the hierarchy to be well-formed.
    pub fn insert_detached(&mut self, volume: Aabb) -> BvNodeId {
        BvNodeId(self.nodes.insert(BvNode::new(volume, None)) as u32)
    }

    /// Makes `child` a child of `parent`.
    ///
    /// Fails if `child` already has a parent or is the root.
    pub fn attach(&mut self, parent: BvNodeId, child: BvNodeId) -> Result<(), BvhError> {
        if !self.contains(parent) {
            return Err(BvhError::InvalidNode(parent));
        }

        let child_node = self
            .nodes
            .get_mut(child.index())
            .ok_or(BvhError::InvalidNode(child))?;

        if parent == child || child_node.parent.is_some() || child_node.is_root() {
            return Err(BvhError::AlreadyAttached(child));
        }

        child_node.parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Makes the detached node `id` the root of this hierarchy.
    pub fn set_root(&mut self, id: BvNodeId) -> Result<(), BvhError> {
        if self.root.is_some() {
            return Err(BvhError::RootAlreadySet);
        }

        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(BvhError::InvalidNode(id))?;

        if node.parent.is_some() {
            return Err(BvhError::AlreadyAttached(id));
        }

        node.flags.insert(BvNodeFlags::ROOT);
        self.root = Some(id);
        Ok(())
    }

    /// Marks the node `id` as annotated with the given primitive indices.
    pub fn annotate(
        &mut self,
        id: BvNodeId,
        geometry: impl IntoIterator<Item = u32>,
    ) -> Result<(), BvhError> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(BvhError::InvalidNode(id))?;
        node.geometry.extend(geometry);
        node.flags.insert(BvNodeFlags::ANNOTATED);
        Ok(())
    }

    /// Replaces the bounding volume of the node `id`.
    pub fn set_volume(&mut self, id: BvNodeId, volume: Aabb) -> Result<(), BvhError> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(BvhError::InvalidNode(id))?;
        node.volume = volume;
        Ok(())
    }

    /// Iterates through all the nodes of this hierarchy, in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (BvNodeId, &BvNode)> {
        self.nodes.iter().map(|(i, node)| (BvNodeId(i as u32), node))
    }

    /// Iterates through all the leaves of this hierarchy, in identifier order.
    pub fn leaves(&self) -> impl Iterator<Item = (BvNodeId, &BvNode)> {
        self.iter().filter(|(_, node)| node.is_leaf())
    }

    /// The number of leaves of this hierarchy.
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// The number of nodes on the longest path from the root to a leaf.
    ///
    /// Zero for an empty hierarchy, one if the root is a leaf.
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };

        let mut max_depth = 0;
        let mut stack = vec![(root, 1)];

        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(self.node(id).children.iter().map(|child| (*child, depth + 1)));
        }

        max_depth
    }

    /// Identifiers of every node reachable from the root, each parent before its children.
    pub fn preorder(&self) -> Vec<BvNodeId> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<_> = self.root.into_iter().collect();

        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }

        result
    }

    /// Recomputes the volume of every internal node from the volumes of its children.
    ///
    /// Leaf volumes are left untouched.
    pub fn refit(&mut self) {
        for id in self.preorder().into_iter().rev() {
            let node = &self.nodes[id.index()];

            if !node.is_leaf() {
                let volume = super::fit_volume(
                    node.children.iter().map(|child| self.nodes[child.index()].volume),
                    &[] as &[Aabb],
                    [],
                );
                self.nodes[id.index()].volume = volume;
            }
        }
    }
}

impl Index<BvNodeId> for Bvh {
    type Output = BvNode;

    #[inline]
    fn index(&self, id: BvNodeId) -> &BvNode {
        self.node(id)
    }
}
