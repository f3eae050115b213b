// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The wgpu backend.
//!
//! [`WgpuDevice`] wraps a device and queue the caller already created, so the
//! adapter and surface setup stay with the application.

mod pixel_format;
mod texture;

pub use texture::{WgpuMapping, WgpuTexture, WgpuView};

use crate::desc::{BindFlags, CpuAccess, Rect, TextureDesc, Usage};
use crate::imp::{
    Context, Device, DeviceError, MapMode, MappedSubresource, Resource, ShaderViewDesc, ViewKind,
    copy_compatible, resolve_view_format, validate_desc, validate_subresource, validate_upload,
};
use crate::pixel_formats::TextureFormat;
use pixel_format::{aligned_bytes_per_row, required_features};
use std::sync::Arc;
use std::sync::mpsc;
use texture::Storage;
use wgpu::{Extent3d, PollType, TexelCopyBufferInfo, TexelCopyBufferLayout, TexelCopyTextureInfo};

#[derive(Debug)]
struct DeviceShared {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

#[derive(Debug, Clone)]
pub struct WgpuDevice(Arc<DeviceShared>);

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        WgpuDevice(Arc::new(DeviceShared { device, queue }))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.0.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.0.queue
    }

    fn view(
        &self,
        resource: &WgpuTexture,
        kind: ViewKind,
        required: BindFlags,
        format: Option<TextureFormat>,
        mip_levels: Option<u32>,
    ) -> Result<WgpuView, DeviceError> {
        let desc = resource.desc();
        let format = resolve_view_format(&desc, kind, required, format)?;
        let texture = resource
            .gpu_texture()
            .ok_or(DeviceError::InvalidBind(kind))?;
        // Depth is sampled through the depth aspect of the shared storage format.
        let aspect = if kind == ViewKind::ShaderResource && format.is_depth_stencil() {
            wgpu::TextureAspect::DepthOnly
        } else {
            wgpu::TextureAspect::All
        };
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("gs view"),
            aspect,
            mip_level_count: mip_levels,
            ..Default::default()
        });
        logwise::debuginternal_sync!(
            "wgpu view {kind} as {format}",
            kind = logwise::privacy::LogIt(&kind),
            format = logwise::privacy::LogIt(&format)
        );
        Ok(WgpuView(Arc::new(view)))
    }
}

impl Device for WgpuDevice {
    type Resource = WgpuTexture;
    type Context = WgpuContext;
    type ShaderView = WgpuView;
    type RenderTargetView = WgpuView;
    type DepthStencilView = WgpuView;

    fn immediate_context(&self) -> WgpuContext {
        WgpuContext {
            device: self.clone(),
        }
    }

    fn create_texture(&self, desc: &TextureDesc) -> Result<WgpuTexture, DeviceError> {
        validate_desc(desc)?;
        if !self.0.device.features().contains(required_features(desc.format)) {
            return Err(DeviceError::Unsupported("format needs a device feature that is not enabled"));
        }
        WgpuTexture::new(self, desc)
    }

    fn create_shader_view(
        &self,
        resource: &WgpuTexture,
        desc: Option<ShaderViewDesc>,
    ) -> Result<WgpuView, DeviceError> {
        let desc = desc.unwrap_or_default();
        self.view(
            resource,
            ViewKind::ShaderResource,
            BindFlags::SHADER_RESOURCE,
            desc.format,
            desc.mip_levels,
        )
    }

    fn create_render_target_view(&self, resource: &WgpuTexture) -> Result<WgpuView, DeviceError> {
        self.view(
            resource,
            ViewKind::RenderTarget,
            BindFlags::RENDER_TARGET,
            None,
            Some(1),
        )
    }

    fn create_depth_stencil_view(
        &self,
        resource: &WgpuTexture,
        format: Option<TextureFormat>,
    ) -> Result<WgpuView, DeviceError> {
        self.view(
            resource,
            ViewKind::DepthStencil,
            BindFlags::DEPTH_STENCIL,
            format,
            Some(1),
        )
    }
}

#[derive(Debug, Clone)]
pub struct WgpuContext {
    device: WgpuDevice,
}

/// Rows and origin of one subresource.
fn subresource_copy(desc: &TextureDesc, subresource: u32) -> (u32, u32, Extent3d) {
    let mip = desc.mip_of(subresource);
    let layer = subresource / desc.mip_levels.max(1);
    let (width, height) = desc.mip_extent(mip);
    (
        mip,
        layer,
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    )
}

impl WgpuContext {
    fn write_gpu(
        &self,
        texture: &wgpu::Texture,
        desc: &TextureDesc,
        subresource: u32,
        region: Rect,
        data: &[u8],
        row_pitch: usize,
    ) -> Result<(), DeviceError> {
        if desc.format.is_depth_stencil() {
            return Err(DeviceError::Unsupported("depth textures cannot be written from the CPU"));
        }
        let (mip, layer, _) = subresource_copy(desc, subresource);
        let bytes_per_row =
            u32::try_from(row_pitch).map_err(|_| DeviceError::Backend(format!("row pitch {row_pitch} too large")))?;
        self.device.queue().write_texture(
            TexelCopyTextureInfo {
                texture,
                mip_level: mip,
                origin: wgpu::Origin3d {
                    x: region.x,
                    y: region.y,
                    z: layer,
                },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(region.height),
            },
            Extent3d {
                width: region.width,
                height: region.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    /// Copies one GPU subresource into `out`, tightly packed.
    fn read_gpu(
        &self,
        texture: &wgpu::Texture,
        desc: &TextureDesc,
        subresource: u32,
        out: &mut [u8],
    ) -> Result<(), DeviceError> {
        let (mip, layer, extent) = subresource_copy(desc, subresource);
        let row = extent.width as usize * desc.format.bytes_per_pixel();
        let padded_row = aligned_bytes_per_row(row);
        let device = self.device.device();
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gs readback"),
            size: (padded_row * extent.height as usize) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("gs readback"),
        });
        encoder.copy_texture_to_buffer(
            TexelCopyTextureInfo {
                texture,
                mip_level: mip,
                origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
                aspect: wgpu::TextureAspect::All,
            },
            TexelCopyBufferInfo {
                buffer: &buffer,
                layout: TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row as u32),
                    rows_per_image: Some(extent.height),
                },
            },
            extent,
        );
        self.device.queue().submit(std::iter::once(encoder.finish()));

        let (tx, rx) = mpsc::channel();
        buffer.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(PollType::Wait)
            .map_err(|err| DeviceError::Backend(err.to_string()))?;
        rx.recv()
            .map_err(|_| DeviceError::Backend("readback callback dropped".to_string()))?
            .map_err(|err| DeviceError::Backend(err.to_string()))?;
        {
            let mapped = buffer.slice(..).get_mapped_range();
            for (dst, src) in out.chunks_exact_mut(row).zip(mapped.chunks(padded_row)) {
                dst.copy_from_slice(&src[..row]);
            }
        }
        buffer.unmap();
        Ok(())
    }
}

impl Context for WgpuContext {
    type Device = WgpuDevice;
    type Mapping<'a>
        = WgpuMapping<'a>
    where
        Self: 'a;

    fn update_subresource(
        &self,
        resource: &WgpuTexture,
        subresource: u32,
        region: Rect,
        data: &[u8],
        row_pitch: usize,
    ) -> Result<(), DeviceError> {
        let desc = resource.desc();
        if desc.usage == Usage::Immutable {
            return Err(DeviceError::Immutable);
        }
        validate_upload(&desc, subresource, region, data, row_pitch)?;
        if region.is_empty() {
            return Ok(());
        }
        match resource.storage() {
            Storage::Gpu(texture) => {
                self.write_gpu(texture, &desc, subresource, region, data, row_pitch)
            }
            Storage::Staging(_) => {
                let mut level = resource.lock_level(subresource)?;
                let bpp = desc.format.bytes_per_pixel();
                let pitch = desc.mip_extent(desc.mip_of(subresource)).0 as usize * bpp;
                let row = region.width as usize * bpp;
                for y in 0..region.height as usize {
                    let offset = (region.y as usize + y) * pitch + region.x as usize * bpp;
                    level[offset..offset + row]
                        .copy_from_slice(&data[y * row_pitch..y * row_pitch + row]);
                }
                Ok(())
            }
        }
    }

    fn map<'a>(
        &'a self,
        resource: &'a WgpuTexture,
        subresource: u32,
        mode: MapMode,
    ) -> Result<MappedSubresource<WgpuMapping<'a>>, DeviceError> {
        let desc = resource.desc();
        validate_subresource(&desc, subresource)?;
        let allowed = desc.usage == Usage::Staging
            && (!mode.reads() || desc.cpu_access.contains(CpuAccess::READ))
            && (!mode.writes() || desc.cpu_access.contains(CpuAccess::WRITE));
        if !allowed {
            return Err(DeviceError::NotMappable(mode));
        }
        let guard = resource.lock_level(subresource)?;
        let row_pitch = desc.mip_extent(desc.mip_of(subresource)).0 as usize * desc.format.bytes_per_pixel();
        Ok(MappedSubresource {
            data: WgpuMapping(guard),
            row_pitch,
        })
    }

    fn unmap(&self, _resource: &WgpuTexture, subresource: u32) {
        logwise::trace_sync!("wgpu unmap {subresource}", subresource = subresource);
    }

    fn copy_resource(&self, dst: &WgpuTexture, src: &WgpuTexture) -> Result<(), DeviceError> {
        let (dst_desc, src_desc) = (dst.desc(), src.desc());
        if dst == src || !copy_compatible(&dst_desc, &src_desc) {
            return Err(DeviceError::IncompatibleCopy {
                dst: dst_desc,
                src: src_desc,
            });
        }
        let subresources = dst_desc.subresource_count();
        match (dst.storage(), src.storage()) {
            (Storage::Gpu(to), Storage::Gpu(from)) => {
                let mut encoder =
                    self.device
                        .device()
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("gs copy"),
                        });
                for sub in 0..subresources {
                    let (mip, layer, extent) = subresource_copy(&dst_desc, sub);
                    let origin = wgpu::Origin3d { x: 0, y: 0, z: layer };
                    encoder.copy_texture_to_texture(
                        TexelCopyTextureInfo {
                            texture: from,
                            mip_level: mip,
                            origin,
                            aspect: wgpu::TextureAspect::All,
                        },
                        TexelCopyTextureInfo {
                            texture: to,
                            mip_level: mip,
                            origin,
                            aspect: wgpu::TextureAspect::All,
                        },
                        extent,
                    );
                }
                self.device.queue().submit(std::iter::once(encoder.finish()));
            }
            (Storage::Gpu(to), Storage::Staging(_)) => {
                for sub in 0..subresources {
                    let level = src.lock_level(sub)?;
                    let (_, _, extent) = subresource_copy(&src_desc, sub);
                    let pitch = extent.width as usize * src_desc.format.bytes_per_pixel();
                    let region = Rect::full(extent.width, extent.height);
                    self.write_gpu(to, &dst_desc, sub, region, &level, pitch)?;
                }
            }
            (Storage::Staging(_), Storage::Gpu(from)) => {
                for sub in 0..subresources {
                    let mut level = dst.lock_level(sub)?;
                    self.read_gpu(from, &src_desc, sub, &mut level)?;
                }
            }
            (Storage::Staging(_), Storage::Staging(_)) => {
                for sub in 0..subresources {
                    let from = src.lock_level(sub)?;
                    dst.lock_level(sub)?.copy_from_slice(&from);
                }
            }
        }
        logwise::debuginternal_sync!(
            "wgpu copy of {subresources} subresources",
            subresources = subresources
        );
        Ok(())
    }
}
