// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Lookup tables used during primitive assembly and texture cache aliasing checks.
//!
//! The tables are evaluated at compile time by [`GsTables::new`]; [`tables`]
//! hands out the shared instance.
//!
//! # Compatible bits vs shared bits
//!
//! *Compatible* formats hold the same data in the same place, so a target in one
//! format can be read back through the other without conversion (e.g. a
//! `PSMCT32` target sampled as `PSMCT24`).
//!
//! *Shared* bits mean two formats occupy different bits of the same 32-bit
//! words: writing `PSMCT24` leaves the top byte alone, which is exactly where
//! `PSMT8H` keeps its palette indices. A write in one format does not
//! invalidate the other, but both live in one block of memory.

use crate::prim::{PrimClass, PrimTopology};
use crate::psm::{FormatSet, Psm};

static TABLES: GsTables = GsTables::new();

/// The process-wide tables.
#[inline]
pub fn tables() -> &'static GsTables {
    &TABLES
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsTables {
    prim_class: [PrimClass; 8],
    vertex_count: [u8; 8],
    class_vertex_count: [u8; 5],
    /// Row = source format.
    compatible_bits: [FormatSet; Psm::COUNT],
    /// Row = destination format.
    shared_bits: [FormatSet; Psm::COUNT],
}

const COMPATIBLE_PAIRS: [(Psm, Psm); 4] = [
    (Psm::PSMCT32, Psm::PSMCT24),
    (Psm::PSMCT16, Psm::PSMCT16S),
    (Psm::PSMZ32, Psm::PSMZ24),
    (Psm::PSMZ16, Psm::PSMZ16S),
];

/// (destination, source) pairs whose bits interleave within a word.
const SHARED_BITS: [(Psm, Psm); 14] = [
    (Psm::PSMCT24, Psm::PSMT8H),
    (Psm::PSMCT24, Psm::PSMT4HL),
    (Psm::PSMCT24, Psm::PSMT4HH),
    (Psm::PSMZ24, Psm::PSMT8H),
    (Psm::PSMZ24, Psm::PSMT4HL),
    (Psm::PSMZ24, Psm::PSMT4HH),
    (Psm::PSMT8H, Psm::PSMCT24),
    (Psm::PSMT8H, Psm::PSMZ24),
    (Psm::PSMT4HL, Psm::PSMCT24),
    (Psm::PSMT4HL, Psm::PSMZ24),
    (Psm::PSMT4HL, Psm::PSMT4HH),
    (Psm::PSMT4HH, Psm::PSMCT24),
    (Psm::PSMT4HH, Psm::PSMZ24),
    (Psm::PSMT4HH, Psm::PSMT4HL),
];

impl GsTables {
    pub const fn new() -> GsTables {
        let mut prim_class = [PrimClass::Invalid; 8];
        prim_class[PrimTopology::PointList as usize] = PrimClass::Point;
        prim_class[PrimTopology::LineList as usize] = PrimClass::Line;
        prim_class[PrimTopology::LineStrip as usize] = PrimClass::Line;
        prim_class[PrimTopology::TriangleList as usize] = PrimClass::Triangle;
        prim_class[PrimTopology::TriangleStrip as usize] = PrimClass::Triangle;
        prim_class[PrimTopology::TriangleFan as usize] = PrimClass::Triangle;
        prim_class[PrimTopology::Sprite as usize] = PrimClass::Sprite;
        prim_class[PrimTopology::Invalid as usize] = PrimClass::Invalid;

        let mut vertex_count = [1u8; 8];
        vertex_count[PrimTopology::PointList as usize] = 1;
        vertex_count[PrimTopology::LineList as usize] = 2;
        vertex_count[PrimTopology::LineStrip as usize] = 2;
        vertex_count[PrimTopology::TriangleList as usize] = 3;
        vertex_count[PrimTopology::TriangleStrip as usize] = 3;
        vertex_count[PrimTopology::TriangleFan as usize] = 3;
        vertex_count[PrimTopology::Sprite as usize] = 2;
        vertex_count[PrimTopology::Invalid as usize] = 1;

        let mut class_vertex_count = [1u8; 5];
        class_vertex_count[PrimClass::Point as usize] = 1;
        class_vertex_count[PrimClass::Line as usize] = 2;
        class_vertex_count[PrimClass::Triangle as usize] = 3;
        class_vertex_count[PrimClass::Sprite as usize] = 2;
        class_vertex_count[PrimClass::Invalid as usize] = 1;

        let mut compatible_bits = [FormatSet::EMPTY; Psm::COUNT];
        let mut i = 0;
        while i < Psm::COUNT {
            compatible_bits[i] = FormatSet::single(Psm::ALL[i]);
            i += 1;
        }
        let mut i = 0;
        while i < COMPATIBLE_PAIRS.len() {
            let (a, b) = COMPATIBLE_PAIRS[i];
            compatible_bits[a.index()] = compatible_bits[a.index()].with(b);
            compatible_bits[b.index()] = compatible_bits[b.index()].with(a);
            i += 1;
        }

        let mut shared_bits = [FormatSet::EMPTY; Psm::COUNT];
        let mut i = 0;
        while i < SHARED_BITS.len() {
            let (dst, src) = SHARED_BITS[i];
            shared_bits[dst.index()] = shared_bits[dst.index()].with(src);
            i += 1;
        }

        GsTables {
            prim_class,
            vertex_count,
            class_vertex_count,
            compatible_bits,
            shared_bits,
        }
    }

    #[inline]
    pub fn prim_class(&self, topology: PrimTopology) -> PrimClass {
        self.prim_class[topology as usize]
    }

    /// Vertices consumed per primitive of `topology`.
    #[inline]
    pub fn vertex_count(&self, topology: PrimTopology) -> u32 {
        self.vertex_count[topology as usize] as u32
    }

    #[inline]
    pub fn class_vertex_count(&self, class: PrimClass) -> u32 {
        self.class_vertex_count[class as usize] as u32
    }

    /// Whether data written as `spsm` can be read back as `dpsm` unchanged.
    #[inline]
    pub fn has_compatible_bits(&self, spsm: Psm, dpsm: Psm) -> bool {
        self.compatible_bits[spsm.index()].contains(dpsm)
    }

    /// Formats whose bits interleave with `dpsm` within the same words.
    #[inline]
    pub fn shared_bits_row(&self, dpsm: Psm) -> FormatSet {
        self.shared_bits[dpsm.index()]
    }

    /// Whether `spsm` and `dpsm` occupy different bits of the same words.
    #[inline]
    pub fn shares_bits(&self, spsm: Psm, dpsm: Psm) -> bool {
        self.shared_bits[dpsm.index()].contains(spsm)
    }

    #[inline]
    pub fn no_shared_bits(&self, spsm: Psm, dpsm: Psm) -> bool {
        !self.shares_bits(spsm, dpsm)
    }

    /// True only when both buffers start at the same block and the formats
    /// share no bits there.
    ///
    /// A different base pointer and an overlapping format pair both make this
    /// false.
    #[inline]
    pub fn no_shared_bits_at(&self, sbp: u32, spsm: Psm, dbp: u32, dpsm: Psm) -> bool {
        sbp == dbp && self.no_shared_bits(spsm, dpsm)
    }
}

impl Default for GsTables {
    fn default() -> Self {
        GsTables::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_and_class_vertex_counts_agree() {
        let t = tables();
        for topology in PrimTopology::ALL {
            assert_eq!(
                t.vertex_count(topology),
                t.class_vertex_count(t.prim_class(topology)),
                "{topology:?}"
            );
        }
    }

    #[test]
    fn classification() {
        let t = tables();
        assert_eq!(t.prim_class(PrimTopology::LineStrip), PrimClass::Line);
        assert_eq!(t.prim_class(PrimTopology::TriangleFan), PrimClass::Triangle);
        assert_eq!(t.prim_class(PrimTopology::Sprite), PrimClass::Sprite);
        assert_eq!(t.prim_class(PrimTopology::Invalid), PrimClass::Invalid);
        assert_eq!(t.vertex_count(PrimTopology::Sprite), 2);
        assert_eq!(t.class_vertex_count(PrimClass::Triangle), 3);
    }

    #[test]
    fn every_format_is_compatible_with_itself() {
        let t = tables();
        for psm in Psm::ALL {
            assert!(t.has_compatible_bits(psm, psm), "{psm:?}");
        }
    }

    #[test]
    fn compatible_pairs() {
        let t = tables();
        assert!(t.has_compatible_bits(Psm::PSMCT32, Psm::PSMCT24));
        assert!(t.has_compatible_bits(Psm::PSMCT24, Psm::PSMCT32));
        assert!(t.has_compatible_bits(Psm::PSMZ16S, Psm::PSMZ16));
        assert!(!t.has_compatible_bits(Psm::PSMCT32, Psm::PSMZ32));
        assert!(!t.has_compatible_bits(Psm::PSMCT24, Psm::PSMT8H));
    }

    #[test]
    fn shared_bits_rows() {
        let t = tables();
        let row = t.shared_bits_row(Psm::PSMT4HL);
        assert_eq!(
            row.iter().collect::<Vec<_>>(),
            vec![Psm::PSMCT24, Psm::PSMT4HH, Psm::PSMZ24]
        );
        assert!(t.shared_bits_row(Psm::PSMCT32).is_empty());
        assert!(t.shares_bits(Psm::PSMT8H, Psm::PSMCT24));
        assert!(t.shares_bits(Psm::PSMCT24, Psm::PSMT8H));
        assert!(!t.shares_bits(Psm::PSMT8H, Psm::PSMT4HL));
        assert!(!t.shares_bits(Psm::PSMCT32, Psm::PSMCT32));
    }

    #[test]
    fn same_base_pointer_truth_table() {
        let t = tables();
        assert!(!t.no_shared_bits_at(0, Psm::PSMCT24, 0, Psm::PSMT8H));
        assert!(!t.no_shared_bits_at(0, Psm::PSMCT32, 4, Psm::PSMCT32));
        assert!(t.no_shared_bits_at(0, Psm::PSMCT32, 0, Psm::PSMCT16));
        assert!(!t.no_shared_bits_at(0x100, Psm::PSMT4HH, 0x80, Psm::PSMZ24));
    }

    #[test]
    fn factory_matches_shared_instance() {
        assert_eq!(&GsTables::new(), tables());
    }
}
