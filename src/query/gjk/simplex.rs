use crate::math::{Point, Real};
use crate::query::gjk::{self, CsoPoint};
use crate::query::GjkError;

/// Set of the slots of a [`Simplex`] currently in use.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SimplexMask(u8);

bitflags::bitflags! {
    impl SimplexMask: u8 {
        /// The first slot is in use.
        const V0 = 1 << 0;
        /// The second slot is in use.
        const V1 = 1 << 1;
        /// The third slot is in use.
        const V2 = 1 << 2;
        /// The fourth slot is in use.
        const V3 = 1 << 3;
    }
}

impl SimplexMask {
    /// The mask with only the `i`-th slot set.
    pub fn slot(i: usize) -> Self {
        SimplexMask::from_bits_truncate(1 << i)
    }

    /// Is the `i`-th slot set?
    pub fn has_slot(self, i: usize) -> bool {
        self.contains(Self::slot(i))
    }
}

/// A simplex of up to four points of the Minkowski difference of two shapes.
///
/// Points live in four fixed slots. The slots in use are tracked by a [`SimplexMask`], so the
/// dimension of the simplex (1 for a vertex up to 4 for a tetrahedron) is the number of bits
/// set in the mask. Reducing the simplex clears bits without moving the remaining points.
///
/// The weights are the barycentric coordinates of the projection of the origin computed by
/// the last reduction. They are only meaningful for the slots in use.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Simplex {
    points: [CsoPoint; 4],
    weights: [Real; 4],
    mask: SimplexMask,
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplex {
    /// An empty simplex.
    pub fn new() -> Self {
        Simplex {
            points: [CsoPoint::single_point(Point::origin()); 4],
            weights: [0.0; 4],
            mask: SimplexMask::empty(),
        }
    }

    /// A simplex made of a single point.
    pub fn from_point(pt: CsoPoint) -> Self {
        let mut result = Self::new();
        result.points[0] = pt;
        result.weights[0] = 1.0;
        result.mask = SimplexMask::V0;
        result
    }

    /// A simplex made of the given points, in order.
    ///
    /// Points are not checked for duplicates.
    pub fn from_points(pts: &[CsoPoint]) -> Result<Self, GjkError> {
        if pts.is_empty() {
            return Err(GjkError::EmptySimplex);
        }

        if pts.len() > 4 {
            return Err(GjkError::TooManyPoints(pts.len()));
        }

        let mut result = Self::new();
        for (i, pt) in pts.iter().enumerate() {
            result.points[i] = *pt;
            result.mask |= SimplexMask::slot(i);
        }
        result.weights[0] = 1.0;

        Ok(result)
    }

    /// Adds a point to the first free slot.
    ///
    /// Returns `false` and leaves the simplex unchanged if the simplex is full, or if the point
    /// is closer than [`gjk::eps_tol`] to a point already in it.
    pub fn add_point(&mut self, pt: CsoPoint) -> bool {
        let mut free = None;

        for i in 0..4 {
            if self.mask.has_slot(i) {
                if (self.points[i].point - pt.point).norm_squared() < gjk::eps_tol() {
                    return false;
                }
            } else if free.is_none() {
                free = Some(i);
            }
        }

        let Some(free) = free else {
            return false;
        };

        self.points[free] = pt;
        self.weights[free] = 0.0;
        self.mask |= SimplexMask::slot(free);
        true
    }

    /// The number of points of this simplex.
    pub fn dimension(&self) -> usize {
        self.mask.bits().count_ones() as usize
    }

    /// The slots in use.
    pub fn mask(&self) -> SimplexMask {
        self.mask
    }

    /// The slots in use, with their point and weight, in slot order.
    pub fn points(&self) -> impl Iterator<Item = (usize, &CsoPoint, Real)> + '_ {
        (0..4)
            .filter(|i| self.mask.has_slot(*i))
            .map(|i| (i, &self.points[i], self.weights[i]))
    }

    /// The point in the slot `i`, if that slot is in use.
    pub fn point(&self, i: usize) -> Option<&CsoPoint> {
        (i < 4 && self.mask.has_slot(i)).then(|| &self.points[i])
    }

    /// The weight of the slot `i`, zero if that slot is not in use.
    pub fn weight(&self, i: usize) -> Real {
        if i < 4 && self.mask.has_slot(i) {
            self.weights[i]
        } else {
            0.0
        }
    }

    /// The projection of the origin computed by the last reduction.
    pub fn projection(&self) -> Point<Real> {
        self.points()
            .fold(Point::origin(), |acc, (_, pt, w)| acc + pt.point.coords * w)
    }

    /// The closest points on both shapes matching the projection of the origin computed by the
    /// last reduction.
    pub fn closest_points(&self) -> (Point<Real>, Point<Real>) {
        self.points()
            .fold((Point::origin(), Point::origin()), |(p1, p2), (_, pt, w)| {
                (p1 + pt.orig1.coords * w, p2 + pt.orig2.coords * w)
            })
    }

    /// The largest squared norm of the points of this simplex.
    pub fn max_sq_len(&self) -> Real {
        self.points()
            .map(|(_, pt, _)| pt.point.coords.norm_squared())
            .fold(0.0, Real::max)
    }

    /// Keeps only the given slots, with the given weights.
    pub(crate) fn reduce(&mut self, kept: &[(usize, Real)]) {
        self.mask = SimplexMask::empty();
        for (slot, weight) in kept {
            self.mask |= SimplexMask::slot(*slot);
            self.weights[*slot] = *weight;
        }
    }
}
