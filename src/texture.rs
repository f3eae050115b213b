// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The GS renderer's handle over a backend texture.
//!
//! A [`Texture`] wraps one backend resource together with the device that
//! created it and that device's immediate context. It answers queries from the
//! description captured at construction, uploads and maps subresources, hands
//! out views that are created once and cached, and dumps its contents to disk
//! for debugging.
//!
//! ```
//! use gs_util::desc::{Rect, TextureDesc, TextureKind};
//! use gs_util::imp::{Device, SoftDevice};
//! use gs_util::pixel_formats::TextureFormat;
//! use gs_util::texture::Texture;
//!
//! let device = SoftDevice::new();
//! let desc = TextureDesc::render_target(4, 4, TextureFormat::R8G8B8A8Unorm);
//! let mut target = Texture::new(device.create_texture(&desc).unwrap());
//! assert_eq!(target.kind(), TextureKind::RenderTarget);
//!
//! target.update(Rect::full(4, 4), &[0xFF; 64], 16, 0).unwrap();
//! let first = target.as_render_target_view().unwrap().clone();
//! assert_eq!(target.as_render_target_view().unwrap(), &first);
//! assert_eq!(device.stats().render_target_views_created, 1);
//! ```

use crate::bittricks::hex32;
use crate::dds;
use crate::desc::{Rect, TextureDesc, TextureKind, Usage};
use crate::imp::{Context, Device, DeviceError, MapMode, Resource, ShaderViewDesc};
use crate::pixel_formats::TextureFormat;
use crate::pixel_formats::png_support::{encode_rgba8, png_channel_order, to_rgba8};
use std::fmt::Debug;
use std::fs::File;
use std::io::BufWriter;
use std::ops::{Deref, DerefMut};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("only whole subresources can be mapped")]
    RegionMapNotSupported,
    #[error("layer {layer} out of range, texture has {max}")]
    LayerOutOfRange { layer: u32, max: u32 },
    #[error("only staging textures can be mapped")]
    NotStaging,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("{0} cannot be dumped")]
    UnsupportedFormat(TextureFormat),
}

pub struct Texture<D: Device> {
    resource: D::Resource,
    device: D,
    context: D::Context,
    desc: TextureDesc,
    kind: TextureKind,
    max_layer: u32,
    /// Subresource of the last successful [`Texture::map`].
    mapped_layer: u32,
    shader_view: Option<D::ShaderView>,
    render_target_view: Option<D::RenderTargetView>,
    depth_stencil_view: Option<D::DepthStencilView>,
}

/// Bytes of a mapped layer.
///
/// Dropping this ends CPU access on the backend side; call [`Texture::unmap`]
/// afterwards to tell the device.
pub struct Mapped<'a, D: Device>
where
    D::Context: 'a,
{
    data: <D::Context as Context>::Mapping<'a>,
    pitch: usize,
}

impl<'a, D: Device> Mapped<'a, D>
where
    D::Context: 'a,
{
    /// Bytes between the starts of consecutive rows.
    pub fn pitch(&self) -> usize {
        self.pitch
    }
}

impl<'a, D: Device> Deref for Mapped<'a, D>
where
    D::Context: 'a,
{
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl<'a, D: Device> DerefMut for Mapped<'a, D>
where
    D::Context: 'a,
{
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl<D: Device> Texture<D> {
    pub fn new<R>(resource: R) -> Self
    where
        R: Resource<Device = D>,
        D: Device<Resource = R>,
    {
        let device = resource.device();
        let context = device.immediate_context();
        let desc = resource.desc();
        Texture {
            kind: TextureKind::from_desc(&desc),
            max_layer: desc.mip_levels,
            mapped_layer: 0,
            resource,
            device,
            context,
            desc,
            shader_view: None,
            render_target_view: None,
            depth_stencil_view: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.desc.width, self.desc.height)
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    pub fn format(&self) -> TextureFormat {
        self.desc.format
    }

    /// The numeric code of [`Texture::format`].
    pub fn format_code(&self) -> u32 {
        self.desc.format.dxgi_code()
    }

    /// Number of addressable layers (mip levels).
    pub fn max_layer(&self) -> u32 {
        self.max_layer
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    pub fn as_raw_resource(&self) -> &D::Resource {
        &self.resource
    }

    /// Uploads `rect` of `layer` from `data`, whose rows are `pitch` bytes apart.
    ///
    /// Layers past the last one are ignored and report success.
    pub fn update(&mut self, rect: Rect, data: &[u8], pitch: usize, layer: u32) -> Result<(), Error> {
        if layer >= self.max_layer {
            logwise::warn_sync!(
                "ignoring update of layer {layer}, texture has {max} layers",
                layer = layer,
                max = self.max_layer
            );
            return Ok(());
        }
        self.context
            .update_subresource(&self.resource, layer, rect, data, pitch)
            .map_err(|err| {
                logwise::error_sync!("texture update failed: {err}", err = logwise::privacy::LogIt(&err));
                Error::Device(err)
            })
    }

    /// Maps a whole layer for reading and writing.
    ///
    /// Only staging textures can be mapped, and `rect` must be `None`.
    pub fn map(&mut self, rect: Option<Rect>, layer: u32) -> Result<Mapped<'_, D>, Error> {
        if rect.is_some() {
            return Err(Error::RegionMapNotSupported);
        }
        if layer >= self.max_layer {
            return Err(Error::LayerOutOfRange {
                layer,
                max: self.max_layer,
            });
        }
        if self.desc.usage != Usage::Staging {
            return Err(Error::NotStaging);
        }
        let mapped = self
            .context
            .map(&self.resource, layer, MapMode::ReadWrite)?;
        self.mapped_layer = layer;
        Ok(Mapped {
            data: mapped.data,
            pitch: mapped.row_pitch,
        })
    }

    /// Ends the mapping started by the last [`Texture::map`].
    pub fn unmap(&mut self) {
        self.context.unmap(&self.resource, self.mapped_layer);
    }

    pub fn as_shader_view(&mut self) -> Result<&D::ShaderView, Error> {
        let view = match self.shader_view.take() {
            Some(view) => view,
            None => {
                let desc = self.desc.format.shader_view_override().map(|format| ShaderViewDesc {
                    format: Some(format),
                    mip_levels: Some(1),
                });
                let view = self.device.create_shader_view(&self.resource, desc)?;
                logwise::debuginternal_sync!(
                    "created shader view {view}",
                    view = logwise::privacy::LogIt(&view)
                );
                view
            }
        };
        Ok(self.shader_view.insert(view))
    }

    pub fn as_render_target_view(&mut self) -> Result<&D::RenderTargetView, Error> {
        let view = match self.render_target_view.take() {
            Some(view) => view,
            None => {
                let view = self.device.create_render_target_view(&self.resource)?;
                logwise::debuginternal_sync!(
                    "created render target view {view}",
                    view = logwise::privacy::LogIt(&view)
                );
                view
            }
        };
        Ok(self.render_target_view.insert(view))
    }

    pub fn as_depth_stencil_view(&mut self) -> Result<&D::DepthStencilView, Error> {
        let view = match self.depth_stencil_view.take() {
            Some(view) => view,
            None => {
                let format = self.desc.format.depth_stencil_view_override();
                let view = self.device.create_depth_stencil_view(&self.resource, format)?;
                logwise::debuginternal_sync!(
                    "created depth stencil view {view}",
                    view = logwise::privacy::LogIt(&view)
                );
                view
            }
        };
        Ok(self.depth_stencil_view.insert(view))
    }

    /// Copies mip 0 into a staging texture and returns it as tightly packed
    /// 4-byte texels with the alpha channel boosted.
    fn read_back(&self) -> Result<Vec<u8>, Error> {
        let staging = self.device.create_texture(&self.desc.staging_copy())?;
        self.context.copy_resource(&staging, &self.resource)?;

        let row_len = self.desc.width as usize * 4;
        let mut pixels = vec![0u8; row_len * self.desc.height as usize];
        {
            let mapped = self.context.map(&staging, 0, MapMode::Read)?;
            for (y, row) in pixels.chunks_exact_mut(row_len).enumerate() {
                let start = (y * mapped.row_pitch).min(mapped.data.len());
                let end = (start + row_len).min(mapped.data.len());
                row[..end - start].copy_from_slice(&mapped.data[start..end]);
            }
        }
        self.context.unmap(&staging, 0);
        dds::boost_alpha(&mut pixels);
        Ok(pixels)
    }

    /// Writes mip 0 to `path` as an uncompressed 32-bit DDS file.
    ///
    /// Only formats with 4 bytes per texel can be dumped. Failures to read the
    /// texture back or to create the file are errors. Write failures after that
    /// are logged and the partial file is left behind.
    pub fn save_dds(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        if self.desc.format.bytes_per_pixel() != 4 {
            return Err(Error::UnsupportedFormat(self.desc.format));
        }
        let pixels = self.read_back()?;
        let file = File::create(path)?;
        let row_len = self.desc.width as usize * 4;
        if let Err(err) = dds::write_dump(
            BufWriter::new(file),
            self.desc.width,
            self.desc.height,
            &pixels,
            row_len,
        ) {
            logwise::warn_sync!(
                "dump to {path} incomplete: {err}",
                path = logwise::privacy::LogIt(&path),
                err = logwise::privacy::LogIt(&err)
            );
            return Ok(());
        }
        logwise::info_sync!(
            "saved {w}x{h} dump of format {code} to {path}",
            w = self.desc.width,
            h = self.desc.height,
            code = hex32(self.format_code()),
            path = logwise::privacy::LogIt(&path)
        );
        Ok(())
    }

    /// Writes mip 0 to `path` as an RGBA8 PNG. Only 8-bit RGBA and BGRA
    /// textures are supported.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let order = png_channel_order(self.desc.format).ok_or(Error::UnsupportedFormat(self.desc.format))?;
        let mut pixels = self.read_back()?;
        to_rgba8(&mut pixels, order);
        let file = File::create(path)?;
        encode_rgba8(BufWriter::new(file), self.desc.width, self.desc.height, &pixels)?;
        logwise::info_sync!(
            "saved {w}x{h} png to {path}",
            w = self.desc.width,
            h = self.desc.height,
            path = logwise::privacy::LogIt(&path)
        );
        Ok(())
    }
}

impl<D: Device> PartialEq for Texture<D> {
    fn eq(&self, other: &Self) -> bool {
        self.resource == other.resource
    }
}

impl<D: Device> Debug for Texture<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("resource", &self.resource)
            .field("kind", &self.kind)
            .field("desc", &self.desc)
            .finish()
    }
}
