// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Texture resources on wgpu.

wgpu has no CPU-mappable textures, so staging textures are kept in host memory
with one tightly packed buffer per subresource. Copies between a staging
texture and a GPU texture go through `Queue::write_texture` in one direction
and a read-back buffer in the other.
*/

use crate::desc::{TextureDesc, Usage};
use crate::imp::wgpu::WgpuDevice;
use crate::imp::wgpu::pixel_format::{wgpu_format, wgpu_usage};
use crate::imp::{DeviceError, Resource};
use std::fmt::Debug;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

#[derive(Debug)]
pub(super) enum Storage {
    Gpu(wgpu::Texture),
    Staging(Vec<Mutex<Vec<u8>>>),
}

#[derive(Debug)]
struct Shared {
    device: WgpuDevice,
    desc: TextureDesc,
    storage: Storage,
}

#[derive(Clone)]
pub struct WgpuTexture(Arc<Shared>);

impl WgpuTexture {
    pub(super) fn new(device: &WgpuDevice, desc: &TextureDesc) -> Result<Self, DeviceError> {
        let storage = if desc.usage == Usage::Staging {
            if desc.format.is_depth_stencil() {
                return Err(DeviceError::Unsupported("depth formats cannot be staged"));
            }
            Storage::Staging(
                (0..desc.subresource_count())
                    .map(|sub| Mutex::new(vec![0u8; desc.tight_subresource_len(sub)]))
                    .collect(),
            )
        } else {
            let descriptor = wgpu::TextureDescriptor {
                label: Some("gs texture"),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: desc.array_size,
                },
                mip_level_count: desc.mip_levels,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu_format(desc.format),
                usage: wgpu_usage(desc.bind_flags),
                view_formats: &[],
            };
            Storage::Gpu(device.device().create_texture(&descriptor))
        };
        Ok(WgpuTexture(Arc::new(Shared {
            device: device.clone(),
            desc: *desc,
            storage,
        })))
    }

    pub(super) fn storage(&self) -> &Storage {
        &self.0.storage
    }

    /// The GPU texture, or `None` for staging textures.
    pub fn gpu_texture(&self) -> Option<&wgpu::Texture> {
        match &self.0.storage {
            Storage::Gpu(texture) => Some(texture),
            Storage::Staging(_) => None,
        }
    }

    /// Locks the host copy of a staging subresource.
    pub(super) fn lock_level(&self, subresource: u32) -> Result<MutexGuard<'_, Vec<u8>>, DeviceError> {
        let Storage::Staging(levels) = &self.0.storage else {
            return Err(DeviceError::Unsupported("not a staging texture"));
        };
        let level = levels
            .get(subresource as usize)
            .ok_or(DeviceError::InvalidSubresource {
                index: subresource,
                count: levels.len() as u32,
            })?;
        match level.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::WouldBlock) => Err(DeviceError::AlreadyMapped(subresource)),
            Err(TryLockError::Poisoned(_)) => Err(DeviceError::Backend(format!(
                "staging subresource {subresource} poisoned"
            ))),
        }
    }
}

impl PartialEq for WgpuTexture {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for WgpuTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuTexture")
            .field("desc", &self.0.desc)
            .field("staging", &matches!(self.0.storage, Storage::Staging(_)))
            .finish()
    }
}

impl Resource for WgpuTexture {
    type Device = WgpuDevice;

    fn device(&self) -> WgpuDevice {
        self.0.device.clone()
    }

    fn desc(&self) -> TextureDesc {
        self.0.desc
    }
}

/// A locked staging subresource.
pub struct WgpuMapping<'a>(pub(super) MutexGuard<'a, Vec<u8>>);

impl Deref for WgpuMapping<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl DerefMut for WgpuMapping<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

/// A view over a GPU texture.
#[derive(Debug, Clone)]
pub struct WgpuView(pub(super) Arc<wgpu::TextureView>);

impl WgpuView {
    pub fn texture_view(&self) -> &wgpu::TextureView {
        &self.0
    }
}

impl PartialEq for WgpuView {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
