// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The host graphics API seam.
//!
//! A backend supplies a [`Device`], its immediate [`Context`] and texture
//! [`Resource`]s. The traits carry only what the texture handle needs: query a
//! resource, create views, upload, map, unmap and copy.

use crate::desc::{BindFlags, Rect, TextureDesc, Usage};
use crate::pixel_formats::TextureFormat;
use std::fmt::Debug;
use std::ops::DerefMut;

pub mod soft;

#[cfg(feature = "backend_wgpu")]
pub mod wgpu;

pub use soft::{SoftDevice, SoftFault, SoftStats};

#[cfg(feature = "backend_wgpu")]
pub use self::wgpu::WgpuDevice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapMode {
    Read,
    Write,
    ReadWrite,
}

impl MapMode {
    pub const fn reads(self) -> bool {
        matches!(self, MapMode::Read | MapMode::ReadWrite)
    }

    pub const fn writes(self) -> bool {
        matches!(self, MapMode::Write | MapMode::ReadWrite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    ShaderResource,
    RenderTarget,
    DepthStencil,
}

/// Shader view parameters. `None` fields inherit from the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShaderViewDesc {
    pub format: Option<TextureFormat>,
    pub mip_levels: Option<u32>,
}

/// A mapped subresource.
#[derive(Debug)]
pub struct MappedSubresource<M> {
    pub data: M,
    /// Bytes between the starts of consecutive rows.
    pub row_pitch: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("subresource {index} out of range ({count} subresources)")]
    InvalidSubresource { index: u32, count: u32 },
    #[error("region {region:?} exceeds {width}x{height}")]
    RegionOutOfBounds { region: Rect, width: u32, height: u32 },
    #[error("source data holds {got} bytes, {needed} needed")]
    DataTooShort { needed: usize, got: usize },
    #[error("row pitch {pitch} is smaller than a row of {row} bytes")]
    PitchTooSmall { pitch: usize, row: usize },
    #[error("resource is not CPU accessible for {0:?}")]
    NotMappable(MapMode),
    #[error("subresource {0} is already mapped")]
    AlreadyMapped(u32),
    #[error("resource was not created with the bind flag for a {0:?} view")]
    InvalidBind(ViewKind),
    #[error("{storage} cannot be viewed as {view}")]
    InvalidViewFormat { storage: TextureFormat, view: TextureFormat },
    #[error("typeless {0} needs an explicit view format")]
    TypelessView(TextureFormat),
    #[error("immutable resources cannot be written")]
    Immutable,
    #[error("copy between {dst:?} and {src:?} is not possible")]
    IncompatibleCopy { dst: TextureDesc, src: TextureDesc },
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
    #[error("injected {0:?} failure")]
    Injected(SoftFault),
    #[error("backend: {0}")]
    Backend(String),
}

/// A 2D texture owned by a backend.
///
/// Handles are cheap to clone; equality is identity of the underlying object.
pub trait Resource: Clone + PartialEq + Debug {
    type Device: Device<Resource = Self>;

    fn device(&self) -> Self::Device;
    fn desc(&self) -> TextureDesc;
}

pub trait Device: Clone + Debug + 'static {
    type Resource: Resource<Device = Self>;
    type Context: Context<Device = Self>;
    type ShaderView: Clone + Debug;
    type RenderTargetView: Clone + Debug;
    type DepthStencilView: Clone + Debug;

    fn immediate_context(&self) -> Self::Context;

    fn create_texture(&self, desc: &TextureDesc) -> Result<Self::Resource, DeviceError>;

    fn create_shader_view(
        &self,
        resource: &Self::Resource,
        desc: Option<ShaderViewDesc>,
    ) -> Result<Self::ShaderView, DeviceError>;

    fn create_render_target_view(
        &self,
        resource: &Self::Resource,
    ) -> Result<Self::RenderTargetView, DeviceError>;

    fn create_depth_stencil_view(
        &self,
        resource: &Self::Resource,
        format: Option<TextureFormat>,
    ) -> Result<Self::DepthStencilView, DeviceError>;
}

/// Command submission for a [`Device`].
pub trait Context: Debug {
    type Device: Device<Context = Self>;
    type Mapping<'a>: DerefMut<Target = [u8]>
    where
        Self: 'a;

    /// Writes `region` of `subresource` from `data`, whose rows are
    /// `row_pitch` bytes apart.
    fn update_subresource(
        &self,
        resource: &<Self::Device as Device>::Resource,
        subresource: u32,
        region: Rect,
        data: &[u8],
        row_pitch: usize,
    ) -> Result<(), DeviceError>;

    fn map<'a>(
        &'a self,
        resource: &'a <Self::Device as Device>::Resource,
        subresource: u32,
        mode: MapMode,
    ) -> Result<MappedSubresource<Self::Mapping<'a>>, DeviceError>;

    fn unmap(&self, resource: &<Self::Device as Device>::Resource, subresource: u32);

    /// Copies every subresource of `src` into `dst`.
    fn copy_resource(
        &self,
        dst: &<Self::Device as Device>::Resource,
        src: &<Self::Device as Device>::Resource,
    ) -> Result<(), DeviceError>;
}

/// Checks shared by backends before allocating a texture.
pub(crate) fn validate_desc(desc: &TextureDesc) -> Result<(), DeviceError> {
    if desc.width == 0 || desc.height == 0 || desc.mip_levels == 0 || desc.array_size == 0 {
        return Err(DeviceError::Unsupported("zero sized texture"));
    }
    if desc.usage == Usage::Staging && !desc.bind_flags.is_empty() {
        return Err(DeviceError::Unsupported("staging textures cannot be bound"));
    }
    Ok(())
}

/// Checks shared by backends before an upload.
pub(crate) fn validate_upload(
    desc: &TextureDesc,
    subresource: u32,
    region: Rect,
    data: &[u8],
    row_pitch: usize,
) -> Result<(), DeviceError> {
    validate_subresource(desc, subresource)?;
    let (width, height) = desc.mip_extent(desc.mip_of(subresource));
    if !region.fits_within(width, height) {
        return Err(DeviceError::RegionOutOfBounds {
            region,
            width,
            height,
        });
    }
    if region.is_empty() {
        return Ok(());
    }
    let row = region.width as usize * desc.format.bytes_per_pixel();
    if row_pitch < row {
        return Err(DeviceError::PitchTooSmall {
            pitch: row_pitch,
            row,
        });
    }
    let needed = (region.height as usize - 1) * row_pitch + row;
    if data.len() < needed {
        return Err(DeviceError::DataTooShort {
            needed,
            got: data.len(),
        });
    }
    Ok(())
}

pub(crate) fn validate_subresource(desc: &TextureDesc, subresource: u32) -> Result<(), DeviceError> {
    let count = desc.subresource_count();
    if subresource >= count {
        return Err(DeviceError::InvalidSubresource {
            index: subresource,
            count,
        });
    }
    Ok(())
}

/// The format a view of `kind` over `desc` is created in.
///
/// Fails when the resource lacks the `required` bind flag, when `requested`
/// cannot alias the storage, or when typeless storage gets no view format.
pub(crate) fn resolve_view_format(
    desc: &TextureDesc,
    kind: ViewKind,
    required: BindFlags,
    requested: Option<TextureFormat>,
) -> Result<TextureFormat, DeviceError> {
    if !desc.bind_flags.contains(required) {
        return Err(DeviceError::InvalidBind(kind));
    }
    match requested {
        Some(view) if desc.format.can_view_as(view) => Ok(view),
        Some(view) => Err(DeviceError::InvalidViewFormat {
            storage: desc.format,
            view,
        }),
        None if desc.format.is_typeless() => Err(DeviceError::TypelessView(desc.format)),
        None => Ok(desc.format),
    }
}

/// Whether `CopyResource` between the two descriptions is legal.
pub(crate) fn copy_compatible(dst: &TextureDesc, src: &TextureDesc) -> bool {
    dst.width == src.width
        && dst.height == src.height
        && dst.mip_levels == src.mip_levels
        && dst.array_size == src.array_size
        && dst.format.bytes_per_pixel() == src.format.bytes_per_pixel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desc_validation() {
        let target = TextureDesc::render_target(4, 4, TextureFormat::R8G8B8A8Unorm);
        assert!(validate_desc(&target).is_ok());
        assert!(validate_desc(&target.staging_copy()).is_ok());
        for empty in [
            TextureDesc { width: 0, ..target },
            TextureDesc { height: 0, ..target },
            TextureDesc { mip_levels: 0, ..target },
            TextureDesc { array_size: 0, ..target },
        ] {
            assert_eq!(
                validate_desc(&empty),
                Err(DeviceError::Unsupported("zero sized texture"))
            );
        }
        let bound_staging = TextureDesc {
            usage: Usage::Staging,
            ..target
        };
        assert_eq!(
            validate_desc(&bound_staging),
            Err(DeviceError::Unsupported("staging textures cannot be bound"))
        );
    }

    #[test]
    fn upload_validation() {
        let desc = TextureDesc::texture(8, 8, TextureFormat::R8G8B8A8Unorm, 2);
        let data = vec![0u8; 8 * 8 * 4];
        assert!(validate_upload(&desc, 0, Rect::full(8, 8), &data, 32).is_ok());
        assert_eq!(
            validate_upload(&desc, 2, Rect::full(1, 1), &data, 4),
            Err(DeviceError::InvalidSubresource { index: 2, count: 2 })
        );
        assert!(matches!(
            validate_upload(&desc, 1, Rect::full(8, 8), &data, 32),
            Err(DeviceError::RegionOutOfBounds { width: 4, height: 4, .. })
        ));
        assert_eq!(
            validate_upload(&desc, 0, Rect::new(0, 0, 8, 2), &data, 16),
            Err(DeviceError::PitchTooSmall { pitch: 16, row: 32 })
        );
        assert_eq!(
            validate_upload(&desc, 0, Rect::new(0, 0, 4, 3), &data[..40], 16),
            Err(DeviceError::DataTooShort { needed: 48, got: 40 })
        );
    }
}
