// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Renderer kinds and the CRC hack policy that depends on them.

/// The renderer a GS instance is running with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererType {
    Dx11Hw,
    OglHw,
    OglSw,
    Null,
}

impl RendererType {
    pub const fn is_hardware(self) -> bool {
        matches!(self, RendererType::Dx11Hw | RendererType::OglHw)
    }
}

/// How aggressively per-game CRC hacks are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CrcHackLevel {
    /// Pick [`recommended_crc_hack_level`] for the active renderer.
    #[default]
    Automatic,
    None,
    Minimum,
    Partial,
    Full,
    Aggressive,
}

impl CrcHackLevel {
    /// The level actually applied when running with `renderer`.
    pub const fn resolve(self, renderer: RendererType) -> CrcHackLevel {
        match self {
            CrcHackLevel::Automatic => recommended_crc_hack_level(renderer),
            level => level,
        }
    }
}

/// Hardware renderers emulate enough of the GS to need only partial hacks.
pub const fn recommended_crc_hack_level(renderer: RendererType) -> CrcHackLevel {
    if renderer.is_hardware() {
        CrcHackLevel::Partial
    } else {
        CrcHackLevel::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_renderers_get_partial() {
        assert_eq!(recommended_crc_hack_level(RendererType::OglHw), CrcHackLevel::Partial);
        assert_eq!(recommended_crc_hack_level(RendererType::Dx11Hw), CrcHackLevel::Partial);
        assert_eq!(recommended_crc_hack_level(RendererType::OglSw), CrcHackLevel::Full);
        assert_eq!(recommended_crc_hack_level(RendererType::Null), CrcHackLevel::Full);
    }

    #[test]
    fn explicit_levels_are_kept() {
        assert_eq!(CrcHackLevel::Automatic.resolve(RendererType::OglSw), CrcHackLevel::Full);
        assert_eq!(CrcHackLevel::Minimum.resolve(RendererType::OglHw), CrcHackLevel::Minimum);
        assert_eq!(CrcHackLevel::default(), CrcHackLevel::Automatic);
    }
}
