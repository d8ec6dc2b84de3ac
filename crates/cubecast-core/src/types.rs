use glam::IVec3;

/// Registry-assigned object identifier. Equals the object's slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId(pub u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Integer cell coordinate in grid space.
pub type CellCoord = IVec3;

/// Inclusive range of cells `center ± extent` an object's inflated box touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageBox {
    pub center: CellCoord,
    pub extent: IVec3,
}

impl CoverageBox {
    pub fn new(center: CellCoord, extent: IVec3) -> Self {
        Self { center, extent }
    }

    /// Smallest corner of the box. Saturates at `i32::MIN`.
    pub fn min(&self) -> CellCoord {
        IVec3::new(
            self.center.x.saturating_sub(self.extent.x),
            self.center.y.saturating_sub(self.extent.y),
            self.center.z.saturating_sub(self.extent.z),
        )
    }

    /// Largest corner of the box (inclusive). Saturates at `i32::MAX`.
    pub fn max(&self) -> CellCoord {
        IVec3::new(
            self.center.x.saturating_add(self.extent.x),
            self.center.y.saturating_add(self.extent.y),
            self.center.z.saturating_add(self.extent.z),
        )
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        let (lo, hi) = (self.min(), self.max());
        cell.cmpge(lo).all() && cell.cmple(hi).all()
    }

    /// Iterate every cell of the box in x-major, then y, then z order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let (lo, hi) = (self.min(), self.max());
        (lo.x..=hi.x).flat_map(move |x| {
            (lo.y..=hi.y).flat_map(move |y| (lo.z..=hi.z).map(move |z| IVec3::new(x, y, z)))
        })
    }

    /// Cells of the box inside `[0, dim)^3`. Work is bounded by the grid,
    /// not by the box, so oversized or far-off boxes stay cheap.
    pub fn cells_within(&self, dim: u32) -> impl Iterator<Item = CellCoord> {
        let last = IVec3::splat(dim.min(i32::MAX as u32) as i32 - 1);
        let lo = self.min().max(IVec3::ZERO);
        let hi = self.max().min(last);
        (lo.x..=hi.x).flat_map(move |x| {
            (lo.y..=hi.y).flat_map(move |y| (lo.z..=hi.z).map(move |z| IVec3::new(x, y, z)))
        })
    }

    /// Number of cells in the box, including out-of-grid ones. Saturates
    /// at `usize::MAX`.
    pub fn volume(&self) -> usize {
        let (lo, hi) = (self.min(), self.max());
        let side = |a: i32, b: i32| (b as i64 - a as i64 + 1).max(0) as u128;
        let v = side(lo.x, hi.x) * side(lo.y, hi.y) * side(lo.z, hi.z);
        v.min(usize::MAX as u128) as usize
    }
}
