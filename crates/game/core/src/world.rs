//! World coordinates and block data used to anchor effects.
//!
//! Positions are continuous (`Vec3`) while terrain is addressed per block
//! (`BlockPos`). Partitioned deployments split each world into square
//! regions ([`RegionId`]) along the X/Z axes.

use std::ops::{Add, AddAssign, Mul, Sub};

// ============================================================================
// Vector math
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn distance_squared(self, other: Self) -> f64 {
        (self - other).length_squared()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len <= f64::EPSILON {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

// ============================================================================
// Locations and blocks
// ============================================================================

/// Identifier of a world (dimension).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldId(pub u32);

/// A point in a world.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub world: WorldId,
    pub position: Vec3,
}

impl Location {
    pub const fn new(world: WorldId, position: Vec3) -> Self {
        Self { world, position }
    }

    pub const fn at(x: f64, y: f64, z: f64) -> Self {
        Self::new(WorldId(0), Vec3::new(x, y, z))
    }

    /// Block containing this location.
    pub fn block(&self) -> BlockPos {
        BlockPos {
            world: self.world,
            x: self.position.x.floor() as i32,
            y: self.position.y.floor() as i32,
            z: self.position.z.floor() as i32,
        }
    }

    /// Same world, moved by `offset`.
    pub fn offset(&self, offset: Vec3) -> Self {
        Self::new(self.world, self.position + offset)
    }

    /// Squared distance; locations in different worlds are infinitely apart.
    pub fn distance_squared(&self, other: &Location) -> f64 {
        if self.world != other.world {
            return f64::INFINITY;
        }
        self.position.distance_squared(other.position)
    }
}

/// Integer block coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockPos {
    pub world: WorldId,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(world: WorldId, x: i32, y: i32, z: i32) -> Self {
        Self { world, x, y, z }
    }

    /// Center of the block as a location.
    pub fn center(&self) -> Location {
        Location::new(
            self.world,
            Vec3::new(
                self.x as f64 + 0.5,
                self.y as f64 + 0.5,
                self.z as f64 + 0.5,
            ),
        )
    }
}

/// Block material, reduced to what effect logic needs to know.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockKind {
    #[default]
    Air,
    Water,
    Lava,
    Ice,
    Stone,
    Dirt,
    /// Any other solid material.
    Solid(u16),
}

impl BlockKind {
    /// Returns true if projectiles collide with this block.
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Ice | Self::Stone | Self::Dirt | Self::Solid(_))
    }

    pub const fn is_liquid(self) -> bool {
        matches!(self, Self::Water | Self::Lava)
    }
}

// ============================================================================
// Regions
// ============================================================================

/// Square X/Z region of a world owned by one tick loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionId {
    pub world: WorldId,
    pub x: i32,
    pub z: i32,
}

impl RegionId {
    /// Region containing `location` for regions `region_size` blocks wide.
    ///
    /// `region_size` of zero is treated as one.
    pub fn containing(location: &Location, region_size: u32) -> Self {
        let block = location.block();
        let size = region_size.max(1) as i32;
        Self {
            world: block.world,
            x: block.x.div_euclid(size),
            z: block.z.div_euclid(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_handles_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
        let unit = Vec3::new(3.0, 0.0, 4.0).normalize();
        assert!((unit.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn block_of_negative_coordinates_floors() {
        let block = Location::at(-0.5, 64.2, 10.9).block();
        assert_eq!((block.x, block.y, block.z), (-1, 64, 10));
    }

    #[test]
    fn regions_partition_by_block() {
        let a = RegionId::containing(&Location::at(0.0, 0.0, 0.0), 16);
        let b = RegionId::containing(&Location::at(15.9, 80.0, 15.9), 16);
        let c = RegionId::containing(&Location::at(16.0, 0.0, 0.0), 16);
        let d = RegionId::containing(&Location::at(-0.1, 0.0, 0.0), 16);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(d.x, -1);
    }

    #[test]
    fn cross_world_distance_is_infinite() {
        let a = Location::at(0.0, 0.0, 0.0);
        let b = Location::new(WorldId(1), Vec3::ZERO);
        assert!(a.distance_squared(&b).is_infinite());
    }

    #[test]
    fn solidity() {
        assert!(BlockKind::Stone.is_solid());
        assert!(!BlockKind::Water.is_solid());
        assert!(!BlockKind::Air.is_solid());
        assert!(BlockKind::Water.is_liquid());
    }
}
