// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Primitive topologies written to the GS `PRIM` register and their classes.

/// The `PRIM` field of the `PRIM`/`PRMODE` registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PrimTopology {
    PointList = 0,
    LineList = 1,
    LineStrip = 2,
    TriangleList = 3,
    TriangleStrip = 4,
    TriangleFan = 5,
    Sprite = 6,
    /// Code 7 is reserved; the GS draws nothing for it.
    Invalid = 7,
}

/// How vertices of a topology group into drawable primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PrimClass {
    Point = 0,
    Line = 1,
    Triangle = 2,
    Sprite = 3,
    Invalid = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid primitive topology {0}")]
pub struct InvalidTopology(pub u32);

impl PrimTopology {
    pub const ALL: [PrimTopology; 8] = [
        PrimTopology::PointList,
        PrimTopology::LineList,
        PrimTopology::LineStrip,
        PrimTopology::TriangleList,
        PrimTopology::TriangleStrip,
        PrimTopology::TriangleFan,
        PrimTopology::Sprite,
        PrimTopology::Invalid,
    ];

    /// Decodes the low three bits of a `PRIM` register value.
    pub const fn from_prim_register(prim: u32) -> PrimTopology {
        PrimTopology::ALL[(prim & 7) as usize]
    }
}

impl TryFrom<u32> for PrimTopology {
    type Error = InvalidTopology;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PrimTopology::ALL
            .get(value as usize)
            .copied()
            .ok_or(InvalidTopology(value))
    }
}

impl PrimClass {
    pub const ALL: [PrimClass; 5] = [
        PrimClass::Point,
        PrimClass::Line,
        PrimClass::Triangle,
        PrimClass::Sprite,
        PrimClass::Invalid,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_decode_masks_high_bits() {
        assert_eq!(PrimTopology::from_prim_register(0x3), PrimTopology::TriangleList);
        assert_eq!(PrimTopology::from_prim_register(0x1E), PrimTopology::Sprite);
        assert_eq!(PrimTopology::from_prim_register(0x7), PrimTopology::Invalid);
    }

    #[test]
    fn try_from_rejects_out_of_range() {
        assert_eq!(PrimTopology::try_from(5), Ok(PrimTopology::TriangleFan));
        assert_eq!(PrimTopology::try_from(8), Err(InvalidTopology(8)));
    }
}
