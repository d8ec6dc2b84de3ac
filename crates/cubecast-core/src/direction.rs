use glam::{IVec3, Vec3};

/// Grid axes in the fixed tie-break order used by the ray marcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// All axes, X before Y before Z.
pub const ALL_AXES: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

impl Axis {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn unit(self) -> IVec3 {
        match self {
            Axis::X => IVec3::X,
            Axis::Y => IVec3::Y,
            Axis::Z => IVec3::Z,
        }
    }

    /// Axis with the largest absolute component of `v`. Ties go to the
    /// earlier axis.
    pub fn dominant(v: Vec3) -> Axis {
        let a = v.abs();
        if a.x >= a.y && a.x >= a.z {
            Axis::X
        } else if a.y >= a.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }
}

/// One of the 6 faces of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    NegX = 0,
    PosX = 1,
    NegY = 2,
    PosY = 3,
    NegZ = 4,
    PosZ = 5,
}

/// All 6 faces.
pub const ALL_FACES: [Face; 6] = [
    Face::NegX,
    Face::PosX,
    Face::NegY,
    Face::PosY,
    Face::NegZ,
    Face::PosZ,
];

impl Face {
    /// Face crossed when entering a cell by stepping along `axis` with `sign`.
    /// Entering with a positive step crosses the cell's negative face.
    pub fn entered(axis: Axis, positive_step: bool) -> Face {
        match (axis, positive_step) {
            (Axis::X, true) => Face::NegX,
            (Axis::X, false) => Face::PosX,
            (Axis::Y, true) => Face::NegY,
            (Axis::Y, false) => Face::PosY,
            (Axis::Z, true) => Face::NegZ,
            (Axis::Z, false) => Face::PosZ,
        }
    }

    /// Outward unit offset of this face.
    pub fn offset(self) -> IVec3 {
        match self {
            Face::NegX => IVec3::new(-1, 0, 0),
            Face::PosX => IVec3::new(1, 0, 0),
            Face::NegY => IVec3::new(0, -1, 0),
            Face::PosY => IVec3::new(0, 1, 0),
            Face::NegZ => IVec3::new(0, 0, -1),
            Face::PosZ => IVec3::new(0, 0, 1),
        }
    }

    /// Outward normal as a float vector.
    pub fn normal(self) -> Vec3 {
        self.offset().as_vec3()
    }

    pub fn axis(self) -> Axis {
        match self {
            Face::NegX | Face::PosX => Axis::X,
            Face::NegY | Face::PosY => Axis::Y,
            Face::NegZ | Face::PosZ => Axis::Z,
        }
    }
}
