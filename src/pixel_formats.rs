// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Host storage formats of GS textures.
//!
//! These are the formats the hardware renderer allocates its render targets,
//! depth buffers and source textures in. Each format carries its DXGI numeric
//! code, which is what the texture handle reports as its format code and what
//! diagnostic dumps and logs print.
//!
//! # Available Formats
//!
//! ## Colour
//! - [`TextureFormat::R8G8B8A8Unorm`] - PSMCT32/24/16 targets after conversion
//! - [`TextureFormat::B8G8R8A8Unorm`] - swap chain and dump order
//! - [`TextureFormat::R16G16B16A16Unorm`] - high precision blending targets
//!
//! ## Single channel
//! - [`TextureFormat::R32Float`], [`TextureFormat::R32Uint`],
//!   [`TextureFormat::R16Uint`], [`TextureFormat::R8Unorm`],
//!   [`TextureFormat::A8Unorm`] - palette, date and auxiliary textures
//!
//! ## Depth
//! - [`TextureFormat::R32G8X24Typeless`] - storage of the depth buffer, viewed
//!   either as depth/stencil or as float depth
//! - [`TextureFormat::D32FloatS8X24Uint`] - depth/stencil view of the above
//! - [`TextureFormat::R32FloatX8X24Typeless`] - shader view of the above
//!
//! # Examples
//!
//! ```
//! use gs_util::pixel_formats::TextureFormat;
//!
//! let depth = TextureFormat::R32G8X24Typeless;
//! assert_eq!(depth.dxgi_code(), 19);
//! assert_eq!(depth.shader_view_override(), Some(TextureFormat::R32FloatX8X24Typeless));
//! ```

/*
The GS picks texture formats at runtime from register state, so unlike the
compile-time pixel types of a texture upload API this is a plain enum.
 */
pub(crate) mod png_support;

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8G8B8A8Unorm,
    B8G8R8A8Unorm,
    R16G16B16A16Unorm,
    R32Float,
    R32Uint,
    R16Uint,
    R8Unorm,
    A8Unorm,
    R32G8X24Typeless,
    D32FloatS8X24Uint,
    R32FloatX8X24Typeless,
}

impl TextureFormat {
    pub const ALL: [TextureFormat; 11] = [
        TextureFormat::R8G8B8A8Unorm,
        TextureFormat::B8G8R8A8Unorm,
        TextureFormat::R16G16B16A16Unorm,
        TextureFormat::R32Float,
        TextureFormat::R32Uint,
        TextureFormat::R16Uint,
        TextureFormat::R8Unorm,
        TextureFormat::A8Unorm,
        TextureFormat::R32G8X24Typeless,
        TextureFormat::D32FloatS8X24Uint,
        TextureFormat::R32FloatX8X24Typeless,
    ];

    /// The `DXGI_FORMAT` value of this format.
    pub const fn dxgi_code(self) -> u32 {
        match self {
            TextureFormat::R16G16B16A16Unorm => 11,
            TextureFormat::R32G8X24Typeless => 19,
            TextureFormat::D32FloatS8X24Uint => 20,
            TextureFormat::R32FloatX8X24Typeless => 21,
            TextureFormat::R8G8B8A8Unorm => 28,
            TextureFormat::R32Float => 41,
            TextureFormat::R32Uint => 42,
            TextureFormat::R16Uint => 57,
            TextureFormat::R8Unorm => 61,
            TextureFormat::A8Unorm => 65,
            TextureFormat::B8G8R8A8Unorm => 87,
        }
    }

    pub fn from_dxgi_code(code: u32) -> Option<TextureFormat> {
        TextureFormat::ALL
            .into_iter()
            .find(|format| format.dxgi_code() == code)
    }

    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::R8Unorm | TextureFormat::A8Unorm => 1,
            TextureFormat::R16Uint => 2,
            TextureFormat::R8G8B8A8Unorm
            | TextureFormat::B8G8R8A8Unorm
            | TextureFormat::R32Float
            | TextureFormat::R32Uint => 4,
            TextureFormat::R16G16B16A16Unorm
            | TextureFormat::R32G8X24Typeless
            | TextureFormat::D32FloatS8X24Uint
            | TextureFormat::R32FloatX8X24Typeless => 8,
        }
    }

    /// Typeless storage needs an explicit format on every view.
    pub const fn is_typeless(self) -> bool {
        matches!(
            self,
            TextureFormat::R32G8X24Typeless | TextureFormat::R32FloatX8X24Typeless
        )
    }

    pub const fn is_depth_stencil(self) -> bool {
        matches!(
            self,
            TextureFormat::R32G8X24Typeless
                | TextureFormat::D32FloatS8X24Uint
                | TextureFormat::R32FloatX8X24Typeless
        )
    }

    /// View format to use when sampling a texture stored in this format.
    pub const fn shader_view_override(self) -> Option<TextureFormat> {
        match self {
            TextureFormat::R32G8X24Typeless => Some(TextureFormat::R32FloatX8X24Typeless),
            _ => None,
        }
    }

    /// View format to use when binding a texture stored in this format as depth.
    pub const fn depth_stencil_view_override(self) -> Option<TextureFormat> {
        match self {
            TextureFormat::R32G8X24Typeless => Some(TextureFormat::D32FloatS8X24Uint),
            _ => None,
        }
    }

    /// Whether the storage of `self` can be viewed as `view`.
    pub const fn can_view_as(self, view: TextureFormat) -> bool {
        match self {
            TextureFormat::R32G8X24Typeless => matches!(
                view,
                TextureFormat::R32G8X24Typeless
                    | TextureFormat::D32FloatS8X24Uint
                    | TextureFormat::R32FloatX8X24Typeless
            ),
            _ => self as u8 == view as u8,
        }
    }
}

impl Display for TextureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({})", self, self.dxgi_code())
    }
}

#[cfg(test)]
mod tests {
    use super::TextureFormat;

    #[test]
    fn dxgi_codes_are_unique() {
        for format in TextureFormat::ALL {
            assert_eq!(TextureFormat::from_dxgi_code(format.dxgi_code()), Some(format));
        }
        assert_eq!(TextureFormat::from_dxgi_code(0), None);
    }

    #[test]
    fn only_typeless_depth_has_overrides() {
        for format in TextureFormat::ALL {
            let overridden = format.shader_view_override().is_some();
            assert_eq!(overridden, format == TextureFormat::R32G8X24Typeless, "{format:?}");
            assert_eq!(format.depth_stencil_view_override().is_some(), overridden);
        }
    }

    #[test]
    fn typeless_depth_accepts_both_view_formats() {
        let storage = TextureFormat::R32G8X24Typeless;
        assert!(storage.can_view_as(TextureFormat::D32FloatS8X24Uint));
        assert!(storage.can_view_as(TextureFormat::R32FloatX8X24Typeless));
        assert!(!storage.can_view_as(TextureFormat::R32Float));
        assert!(TextureFormat::R8Unorm.can_view_as(TextureFormat::R8Unorm));
        assert!(!TextureFormat::R8Unorm.can_view_as(TextureFormat::A8Unorm));
    }
}
