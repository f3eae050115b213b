// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! GS pixel storage modes.
//!
//! A PSM describes how the GS packs colour, depth or palette indices into local
//! memory. The discriminants are the raw codes written to the `TEX0`, `FRAME`
//! and `ZBUF` registers, so a [`Psm`] can be produced directly from register
//! bits with [`Psm::try_from`].
//!
//! # Examples
//!
//! ```
//! use gs_util::psm::Psm;
//!
//! let psm = Psm::try_from(0x1Bu32).unwrap();
//! assert_eq!(psm, Psm::PSMT8H);
//! assert!(psm.is_paletted());
//! assert_eq!(psm.to_string(), "P_8H");
//! ```

use std::fmt::Display;

/// A GS pixel storage mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(clippy::upper_case_acronyms)]
pub enum Psm {
    PSMCT32 = 0x00,
    PSMCT24 = 0x01,
    PSMCT16 = 0x02,
    PSMCT16S = 0x0A,
    /// 24-bit colour as seen by the PS1 GPU compatibility mode.
    PSGPU24 = 0x12,
    PSMT8 = 0x13,
    PSMT4 = 0x14,
    /// 8-bit palette index stored in bits 24..32 of a 32-bit word.
    PSMT8H = 0x1B,
    /// 4-bit palette index stored in bits 24..28.
    PSMT4HL = 0x24,
    /// 4-bit palette index stored in bits 28..32.
    PSMT4HH = 0x2C,
    PSMZ32 = 0x30,
    PSMZ24 = 0x31,
    PSMZ16 = 0x32,
    PSMZ16S = 0x3A,
}

/// A raw code that names no storage mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid pixel storage mode {0:#04x}")]
pub struct InvalidPsm(pub u32);

impl Psm {
    /// Number of storage modes.
    pub const COUNT: usize = 14;

    /// Every storage mode, in [`Psm::index`] order.
    pub const ALL: [Psm; Psm::COUNT] = [
        Psm::PSMCT32,
        Psm::PSMCT24,
        Psm::PSMCT16,
        Psm::PSMCT16S,
        Psm::PSGPU24,
        Psm::PSMT8,
        Psm::PSMT4,
        Psm::PSMT8H,
        Psm::PSMT4HL,
        Psm::PSMT4HH,
        Psm::PSMZ32,
        Psm::PSMZ24,
        Psm::PSMZ16,
        Psm::PSMZ16S,
    ];

    /// Dense index in `0..COUNT`, used to address the compatibility tables.
    pub const fn index(self) -> usize {
        match self {
            Psm::PSMCT32 => 0,
            Psm::PSMCT24 => 1,
            Psm::PSMCT16 => 2,
            Psm::PSMCT16S => 3,
            Psm::PSGPU24 => 4,
            Psm::PSMT8 => 5,
            Psm::PSMT4 => 6,
            Psm::PSMT8H => 7,
            Psm::PSMT4HL => 8,
            Psm::PSMT4HH => 9,
            Psm::PSMZ32 => 10,
            Psm::PSMZ24 => 11,
            Psm::PSMZ16 => 12,
            Psm::PSMZ16S => 13,
        }
    }

    /// The register code.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Bits occupied by one pixel in GS local memory.
    ///
    /// 24-bit modes still occupy a 32-bit word; the value returned here is the
    /// number of bits the mode actually writes.
    pub const fn bits_per_pixel(self) -> u8 {
        match self {
            Psm::PSMCT32 | Psm::PSMZ32 => 32,
            Psm::PSMCT24 | Psm::PSMZ24 | Psm::PSGPU24 => 24,
            Psm::PSMCT16 | Psm::PSMCT16S | Psm::PSMZ16 | Psm::PSMZ16S => 16,
            Psm::PSMT8 | Psm::PSMT8H => 8,
            Psm::PSMT4 | Psm::PSMT4HL | Psm::PSMT4HH => 4,
        }
    }

    pub const fn is_depth(self) -> bool {
        matches!(self, Psm::PSMZ32 | Psm::PSMZ24 | Psm::PSMZ16 | Psm::PSMZ16S)
    }

    pub const fn is_paletted(self) -> bool {
        matches!(
            self,
            Psm::PSMT8 | Psm::PSMT4 | Psm::PSMT8H | Psm::PSMT4HL | Psm::PSMT4HH
        )
    }

    pub const fn is_color(self) -> bool {
        !self.is_depth() && !self.is_paletted()
    }

    /// Short name used in dump file names and logs.
    pub const fn short_name(self) -> &'static str {
        match self {
            Psm::PSMCT32 => "C_32",
            Psm::PSMCT24 => "C_24",
            Psm::PSMCT16 => "C_16",
            Psm::PSMCT16S => "C_16S",
            Psm::PSMT8 => "P_8",
            Psm::PSMT4 => "P_4",
            Psm::PSMT8H => "P_8H",
            Psm::PSMT4HL => "P_4HL",
            Psm::PSMT4HH => "P_4HH",
            Psm::PSMZ32 => "Z_32",
            Psm::PSMZ24 => "Z_24",
            Psm::PSMZ16 => "Z_16",
            Psm::PSMZ16S => "Z_16S",
            Psm::PSGPU24 => "PS24",
        }
    }

    /// Short name of a raw register code; unknown codes are `BAD_PSM`.
    pub fn name_of_code(code: u32) -> &'static str {
        match Psm::try_from(code) {
            Ok(psm) => psm.short_name(),
            Err(_) => "BAD_PSM",
        }
    }
}

impl TryFrom<u32> for Psm {
    type Error = InvalidPsm;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Psm::ALL
            .into_iter()
            .find(|psm| psm.code() == code)
            .ok_or(InvalidPsm(code))
    }
}

impl Display for Psm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A set of storage modes, one bit per [`Psm::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct FormatSet(u16);

impl FormatSet {
    pub const EMPTY: FormatSet = FormatSet(0);

    pub const fn single(psm: Psm) -> FormatSet {
        FormatSet(1 << psm.index())
    }

    #[must_use]
    pub const fn with(self, psm: Psm) -> FormatSet {
        FormatSet(self.0 | (1 << psm.index()))
    }

    #[inline]
    pub const fn contains(self, psm: Psm) -> bool {
        self.0 & (1 << psm.index()) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in [`Psm::index`] order.
    pub fn iter(self) -> impl Iterator<Item = Psm> {
        Psm::ALL.into_iter().filter(move |psm| self.contains(*psm))
    }
}
