// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::desc::BindFlags;
use crate::pixel_formats::TextureFormat;

/// The wgpu format a texture stored in `format` is allocated in.
///
/// The whole typeless depth family shares one wgpu format; views pick the
/// aspect instead of the format.
pub(super) const fn wgpu_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::R8G8B8A8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::B8G8R8A8Unorm => wgpu::TextureFormat::Bgra8Unorm,
        TextureFormat::R16G16B16A16Unorm => wgpu::TextureFormat::Rgba16Unorm,
        TextureFormat::R32Float => wgpu::TextureFormat::R32Float,
        TextureFormat::R32Uint => wgpu::TextureFormat::R32Uint,
        TextureFormat::R16Uint => wgpu::TextureFormat::R16Uint,
        TextureFormat::R8Unorm | TextureFormat::A8Unorm => wgpu::TextureFormat::R8Unorm,
        TextureFormat::R32G8X24Typeless
        | TextureFormat::D32FloatS8X24Uint
        | TextureFormat::R32FloatX8X24Typeless => wgpu::TextureFormat::Depth32FloatStencil8,
    }
}

/// Device features needed to allocate `format`.
pub(super) fn required_features(format: TextureFormat) -> wgpu::Features {
    match format {
        TextureFormat::R16G16B16A16Unorm => wgpu::Features::TEXTURE_FORMAT_16BIT_NORM,
        TextureFormat::R32G8X24Typeless
        | TextureFormat::D32FloatS8X24Uint
        | TextureFormat::R32FloatX8X24Typeless => wgpu::Features::DEPTH32FLOAT_STENCIL8,
        _ => wgpu::Features::empty(),
    }
}

pub(super) fn wgpu_usage(bind_flags: BindFlags) -> wgpu::TextureUsages {
    let mut usage = wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::COPY_DST;
    if bind_flags.contains(BindFlags::SHADER_RESOURCE) {
        usage |= wgpu::TextureUsages::TEXTURE_BINDING;
    }
    if bind_flags.intersects(BindFlags::RENDER_TARGET | BindFlags::DEPTH_STENCIL) {
        usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }
    usage
}

/// `bytes` rounded up to the row alignment of buffer copies.
pub(super) const fn aligned_bytes_per_row(bytes: usize) -> usize {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
    bytes.div_ceil(align) * align
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_family_shares_storage() {
        let storage = wgpu_format(TextureFormat::R32G8X24Typeless);
        assert_eq!(wgpu_format(TextureFormat::D32FloatS8X24Uint), storage);
        assert_eq!(wgpu_format(TextureFormat::R32FloatX8X24Typeless), storage);
        assert!(storage.has_depth_aspect());
    }

    #[test]
    fn usage_always_copies() {
        let usage = wgpu_usage(BindFlags::empty());
        assert_eq!(usage, wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::COPY_DST);
        let target = wgpu_usage(BindFlags::RENDER_TARGET | BindFlags::SHADER_RESOURCE);
        assert!(target.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
        assert!(target.contains(wgpu::TextureUsages::TEXTURE_BINDING));
    }

    #[test]
    fn rows_align_to_copy_alignment() {
        assert_eq!(aligned_bytes_per_row(4), 256);
        assert_eq!(aligned_bytes_per_row(256), 256);
        assert_eq!(aligned_bytes_per_row(257), 512);
    }
}
