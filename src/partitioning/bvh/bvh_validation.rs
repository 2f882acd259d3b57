use super::{Bvh, BvNodeId};
use crate::bounding_volume::BoundingVolume;
use crate::shape::Primitive;
use crate::utils::hashset::HashSet;

impl Bvh {
    /// Panics if the tree isn’t well-formed.
    ///
    /// The tree is well-formed if it is topologically correct:
    /// - it is either empty or has exactly one root,
    /// - every node is reachable from the root exactly once,
    /// - the parent of every child is the node listing it as a child,
    /// - only leaves are annotated;
    ///
    /// and geometrically correct: the volume of each internal node contains the volumes of
    /// its children.
    pub fn assert_well_formed(&self) {
        let Some(root) = self.root else {
            assert!(self.is_empty(), "A non-empty hierarchy must have a root.");
            return;
        };

        assert!(self.node(root).is_root());
        assert_eq!(self.node(root).parent(), None);

        let mut visited = HashSet::default();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                panic!("Detected loop. Node {:?} visited twice.", id);
            }

            let node = self.node(id);

            if node.is_annotated() {
                assert!(node.is_leaf(), "Annotated node {:?} has children.", id);
            }

            for child in node.children() {
                let child_node = self
                    .get(*child)
                    .unwrap_or_else(|| panic!("Dangling child {:?} of {:?}.", child, id));
                assert_eq!(child_node.parent(), Some(id));
                assert!(!child_node.is_root());
                assert!(
                    node.volume().contains(child_node.volume()),
                    "The volume of {:?} does not contain the volume of its child {:?}.",
                    id,
                    child
                );
                stack.push(*child);
            }
        }

        assert_eq!(
            visited.len(),
            self.len(),
            "Some nodes are not reachable from the root."
        );
    }

    /// Checks that every leaf volume contains the bounds of the primitives it references, and
    /// that every internal volume contains the volumes of its children.
    pub fn check_containment<P: Primitive>(&self, primitives: &[P]) -> bool {
        self.iter().all(|(_, node)| {
            let children_ok = node
                .children()
                .iter()
                .all(|child| node.volume().contains(self.node(*child).volume()));
            let geometry_ok = node.geometry().iter().all(|id| {
                primitives
                    .get(*id as usize)
                    .is_some_and(|prim| node.volume().contains(&prim.local_aabb()))
            });
            children_ok && geometry_ok
        })
    }

    /// For each primitive, the leaf that references it.
    ///
    /// Returns `None` if a primitive is referenced by no leaf, by more than one leaf, or by a
    /// non-leaf node, or if a reference is out of bounds.
    pub fn leaf_of_each_primitive(&self, primitive_count: usize) -> Option<Vec<BvNodeId>> {
        let mut result = vec![None; primitive_count];

        for (id, node) in self.iter() {
            for prim in node.geometry() {
                let slot = result.get_mut(*prim as usize)?;

                if slot.is_some() || !node.is_leaf() {
                    return None;
                }

                *slot = Some(id);
            }
        }

        result.into_iter().collect()
    }
}
