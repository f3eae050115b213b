// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Texture descriptions.
//!
//! A [`TextureDesc`] is the configuration a backend allocates a texture from and
//! the description a resource reports back. The constructors cover the roles
//! the GS renderer allocates:
//!
//! ```
//! use gs_util::desc::{TextureDesc, TextureKind, Usage};
//! use gs_util::pixel_formats::TextureFormat;
//!
//! let target = TextureDesc::render_target(640, 448, TextureFormat::R8G8B8A8Unorm);
//! assert_eq!(TextureKind::from_desc(&target), TextureKind::RenderTarget);
//!
//! let readback = target.staging_copy();
//! assert_eq!(readback.usage, Usage::Staging);
//! assert_eq!(TextureKind::from_desc(&readback), TextureKind::Offscreen);
//! ```

use crate::pixel_formats::TextureFormat;

/// Who reads and writes the resource, and how often.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Usage {
    /// GPU read/write.
    #[default]
    Default,
    /// GPU read only, contents fixed at creation.
    Immutable,
    /// GPU read, CPU write.
    Dynamic,
    /// CPU-mappable copy target. Cannot be bound to the pipeline.
    Staging,
}

bitflags::bitflags! {
    /// Pipeline stages a texture may be bound to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BindFlags: u32 {
        const SHADER_RESOURCE = 0x8;
        const RENDER_TARGET = 0x20;
        const DEPTH_STENCIL = 0x40;
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CpuAccess: u32 {
        const WRITE = 0x10000;
        const READ = 0x20000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    pub array_size: u32,
    pub format: TextureFormat,
    pub usage: Usage,
    pub bind_flags: BindFlags,
    pub cpu_access: CpuAccess,
}

impl TextureDesc {
    pub fn render_target(width: u32, height: u32, format: TextureFormat) -> Self {
        TextureDesc {
            width,
            height,
            mip_levels: 1,
            array_size: 1,
            format,
            usage: Usage::Default,
            bind_flags: BindFlags::RENDER_TARGET | BindFlags::SHADER_RESOURCE,
            cpu_access: CpuAccess::empty(),
        }
    }

    pub fn depth_stencil(width: u32, height: u32, format: TextureFormat) -> Self {
        TextureDesc {
            bind_flags: BindFlags::DEPTH_STENCIL | BindFlags::SHADER_RESOURCE,
            ..Self::render_target(width, height, format)
        }
    }

    /// A sampled source texture with `mip_levels` levels.
    pub fn texture(width: u32, height: u32, format: TextureFormat, mip_levels: u32) -> Self {
        TextureDesc {
            mip_levels: mip_levels.max(1),
            bind_flags: BindFlags::SHADER_RESOURCE,
            ..Self::render_target(width, height, format)
        }
    }

    /// A CPU-readable and writable staging texture.
    pub fn offscreen(width: u32, height: u32, format: TextureFormat) -> Self {
        TextureDesc {
            usage: Usage::Staging,
            bind_flags: BindFlags::empty(),
            cpu_access: CpuAccess::READ | CpuAccess::WRITE,
            ..Self::render_target(width, height, format)
        }
    }

    /// Description of a CPU-readable copy target for this texture.
    pub fn staging_copy(&self) -> Self {
        TextureDesc {
            usage: Usage::Staging,
            bind_flags: BindFlags::empty(),
            cpu_access: CpuAccess::READ,
            ..*self
        }
    }

    pub fn subresource_count(&self) -> u32 {
        self.mip_levels * self.array_size
    }

    /// Dimensions of mip `level`.
    pub fn mip_extent(&self, level: u32) -> (u32, u32) {
        let shrink = |v: u32| v.checked_shr(level).unwrap_or(0).max(1);
        (shrink(self.width), shrink(self.height))
    }

    /// Mip level of subresource index `subresource`.
    pub fn mip_of(&self, subresource: u32) -> u32 {
        subresource % self.mip_levels.max(1)
    }

    /// Byte size of one subresource stored with rows of exactly `width * bpp` bytes.
    pub fn tight_subresource_len(&self, subresource: u32) -> usize {
        let (w, h) = self.mip_extent(self.mip_of(subresource));
        w as usize * h as usize * self.format.bytes_per_pixel()
    }
}

/// The role a texture plays in the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    RenderTarget,
    DepthStencil,
    Texture,
    Offscreen,
}

impl TextureKind {
    /// First matching role in the order render target, depth stencil, texture.
    /// Anything that cannot be bound is offscreen.
    pub fn from_desc(desc: &TextureDesc) -> Self {
        if desc.bind_flags.contains(BindFlags::RENDER_TARGET) {
            TextureKind::RenderTarget
        } else if desc.bind_flags.contains(BindFlags::DEPTH_STENCIL) {
            TextureKind::DepthStencil
        } else if desc.bind_flags.contains(BindFlags::SHADER_RESOURCE) {
            TextureKind::Texture
        } else {
            TextureKind::Offscreen
        }
    }
}

/// A texel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Rect { x, y, width, height }
    }

    pub const fn full(width: u32, height: u32) -> Self {
        Rect { x: 0, y: 0, width, height }
    }

    /// From left/top/right/bottom edges. Inverted edges give an empty rect.
    pub fn from_ltrb(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Rect {
            x: left,
            y: top,
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        }
    }

    pub const fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    pub const fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_priority() {
        let mut desc = TextureDesc::render_target(4, 4, TextureFormat::R8G8B8A8Unorm);
        desc.bind_flags |= BindFlags::DEPTH_STENCIL;
        assert_eq!(TextureKind::from_desc(&desc), TextureKind::RenderTarget);

        let depth = TextureDesc::depth_stencil(4, 4, TextureFormat::R32G8X24Typeless);
        assert_eq!(TextureKind::from_desc(&depth), TextureKind::DepthStencil);

        let source = TextureDesc::texture(4, 4, TextureFormat::R8Unorm, 3);
        assert_eq!(TextureKind::from_desc(&source), TextureKind::Texture);

        let offscreen = TextureDesc::offscreen(4, 4, TextureFormat::R8G8B8A8Unorm);
        assert_eq!(TextureKind::from_desc(&offscreen), TextureKind::Offscreen);
    }

    #[test]
    fn mip_extents_clamp_to_one() {
        let desc = TextureDesc::texture(16, 4, TextureFormat::R8G8B8A8Unorm, 6);
        assert_eq!(desc.mip_extent(0), (16, 4));
        assert_eq!(desc.mip_extent(2), (4, 1));
        assert_eq!(desc.mip_extent(5), (1, 1));
        assert_eq!(desc.mip_extent(40), (1, 1));
        assert_eq!(desc.tight_subresource_len(1), 8 * 2 * 4);
    }

    #[test]
    fn staging_copy_keeps_geometry() {
        let desc = TextureDesc::texture(32, 16, TextureFormat::B8G8R8A8Unorm, 2);
        let copy = desc.staging_copy();
        assert_eq!((copy.width, copy.height, copy.mip_levels), (32, 16, 2));
        assert_eq!(copy.cpu_access, CpuAccess::READ);
        assert!(copy.bind_flags.is_empty());
    }

    #[test]
    fn rect_edges() {
        let r = Rect::from_ltrb(2, 3, 10, 7);
        assert_eq!(r, Rect::new(2, 3, 8, 4));
        assert!(r.fits_within(10, 7));
        assert!(!r.fits_within(9, 7));
        assert!(Rect::from_ltrb(5, 5, 1, 1).is_empty());
    }
}
