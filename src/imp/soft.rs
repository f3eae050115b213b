// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! A device backed by CPU memory.
//!
//! The soft device follows the rules a hardware driver enforces (bind flags,
//! typeless views, staging-only mapping, copy compatibility) so code written
//! against it behaves the same on a GPU backend. Every call is counted in
//! [`SoftStats`], and [`SoftDevice::inject_fault`] makes chosen operations fail.

use crate::desc::{BindFlags, CpuAccess, Rect, TextureDesc, Usage};
use crate::imp::{
    Context, Device, DeviceError, MapMode, MappedSubresource, Resource, ShaderViewDesc, ViewKind,
    copy_compatible, resolve_view_format, validate_desc, validate_subresource, validate_upload,
};
use crate::pixel_formats::TextureFormat;
use std::cell::{Cell, RefCell, RefMut};
use std::fmt::Debug;
use std::rc::Rc;

bitflags::bitflags! {
    /// Operations that can be made to fail.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SoftFault: u32 {
        const CREATE_TEXTURE = 1 << 0;
        const CREATE_VIEW = 1 << 1;
        const UPDATE = 1 << 2;
        const MAP = 1 << 3;
        const COPY = 1 << 4;
    }
}

/// Call counters. Failed calls are counted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SoftStats {
    pub textures_created: u32,
    pub shader_views_created: u32,
    pub render_target_views_created: u32,
    pub depth_stencil_views_created: u32,
    pub updates: u32,
    pub maps: u32,
    pub unmaps: u32,
    pub copies: u32,
}

#[derive(Debug, Default)]
struct SoftDeviceShared {
    stats: Cell<SoftStats>,
    faults: Cell<SoftFault>,
    next_id: Cell<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct SoftDevice(Rc<SoftDeviceShared>);

impl PartialEq for SoftDevice {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl SoftDevice {
    pub fn new() -> Self {
        SoftDevice::default()
    }

    pub fn stats(&self) -> SoftStats {
        self.0.stats.get()
    }

    /// Makes `faults` fail until [`SoftDevice::clear_faults`].
    pub fn inject_fault(&self, faults: SoftFault) {
        self.0.faults.set(self.0.faults.get() | faults);
    }

    pub fn clear_faults(&self) {
        self.0.faults.set(SoftFault::empty());
    }

    /// Creates a texture and fills subresource 0 with `data`, tightly packed.
    pub fn create_texture_with_data(
        &self,
        desc: &TextureDesc,
        data: &[u8],
    ) -> Result<SoftTexture, DeviceError> {
        let texture = self.create_texture(desc)?;
        let expected = desc.tight_subresource_len(0);
        if data.len() < expected {
            return Err(DeviceError::DataTooShort {
                needed: expected,
                got: data.len(),
            });
        }
        texture.0.storage.borrow_mut()[0].copy_from_slice(&data[..expected]);
        Ok(texture)
    }

    fn count(&self, f: impl FnOnce(&mut SoftStats)) {
        let mut stats = self.0.stats.get();
        f(&mut stats);
        self.0.stats.set(stats);
    }

    fn check_fault(&self, fault: SoftFault) -> Result<(), DeviceError> {
        if self.0.faults.get().intersects(fault) {
            logwise::warn_sync!(
                "soft device: failing {fault}",
                fault = logwise::privacy::LogIt(&fault)
            );
            return Err(DeviceError::Injected(fault));
        }
        Ok(())
    }

    fn next_id(&self) -> u64 {
        let id = self.0.next_id.get();
        self.0.next_id.set(id + 1);
        id
    }
}

#[derive(Debug)]
struct SoftTextureShared {
    id: u64,
    desc: TextureDesc,
    device: SoftDevice,
    /// One tightly packed buffer per subresource.
    storage: RefCell<Vec<Vec<u8>>>,
}

#[derive(Clone)]
pub struct SoftTexture(Rc<SoftTextureShared>);

impl SoftTexture {
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// A copy of subresource `subresource`, tightly packed.
    pub fn contents(&self, subresource: u32) -> Option<Vec<u8>> {
        self.0.storage.try_borrow().ok()?.get(subresource as usize).cloned()
    }

    fn row_pitch(&self, subresource: u32) -> usize {
        let desc = &self.0.desc;
        desc.mip_extent(desc.mip_of(subresource)).0 as usize * desc.format.bytes_per_pixel()
    }
}

impl PartialEq for SoftTexture {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for SoftTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftTexture")
            .field("id", &self.0.id)
            .field("desc", &self.0.desc)
            .finish()
    }
}

impl Resource for SoftTexture {
    type Device = SoftDevice;

    fn device(&self) -> SoftDevice {
        self.0.device.clone()
    }

    fn desc(&self) -> TextureDesc {
        self.0.desc
    }
}

#[derive(Debug)]
pub struct SoftViewInfo {
    pub id: u64,
    pub kind: ViewKind,
    pub format: TextureFormat,
    pub mip_levels: u32,
    pub resource: SoftTexture,
}

/// A view handle. Clones share identity.
#[derive(Debug, Clone)]
pub struct SoftView(Rc<SoftViewInfo>);

impl SoftView {
    pub fn info(&self) -> &SoftViewInfo {
        &self.0
    }
}

impl PartialEq for SoftView {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl SoftDevice {
    fn make_view(
        &self,
        resource: &SoftTexture,
        kind: ViewKind,
        required: BindFlags,
        format: Option<TextureFormat>,
        mip_levels: Option<u32>,
    ) -> Result<SoftView, DeviceError> {
        self.check_fault(SoftFault::CREATE_VIEW)?;
        let desc = resource.desc();
        let format = resolve_view_format(&desc, kind, required, format)?;
        let info = SoftViewInfo {
            id: self.next_id(),
            kind,
            format,
            mip_levels: mip_levels.unwrap_or(desc.mip_levels),
            resource: resource.clone(),
        };
        Ok(SoftView(Rc::new(info)))
    }
}

impl Device for SoftDevice {
    type Resource = SoftTexture;
    type Context = SoftContext;
    type ShaderView = SoftView;
    type RenderTargetView = SoftView;
    type DepthStencilView = SoftView;

    fn immediate_context(&self) -> SoftContext {
        SoftContext {
            device: self.clone(),
        }
    }

    fn create_texture(&self, desc: &TextureDesc) -> Result<SoftTexture, DeviceError> {
        self.count(|s| s.textures_created += 1);
        self.check_fault(SoftFault::CREATE_TEXTURE)?;
        validate_desc(desc)?;
        let storage = (0..desc.subresource_count())
            .map(|sub| vec![0u8; desc.tight_subresource_len(sub)])
            .collect();
        let shared = SoftTextureShared {
            id: self.next_id(),
            desc: *desc,
            device: self.clone(),
            storage: RefCell::new(storage),
        };
        Ok(SoftTexture(Rc::new(shared)))
    }

    fn create_shader_view(
        &self,
        resource: &SoftTexture,
        desc: Option<ShaderViewDesc>,
    ) -> Result<SoftView, DeviceError> {
        self.count(|s| s.shader_views_created += 1);
        let desc = desc.unwrap_or_default();
        self.make_view(
            resource,
            ViewKind::ShaderResource,
            BindFlags::SHADER_RESOURCE,
            desc.format,
            desc.mip_levels,
        )
    }

    fn create_render_target_view(&self, resource: &SoftTexture) -> Result<SoftView, DeviceError> {
        self.count(|s| s.render_target_views_created += 1);
        self.make_view(
            resource,
            ViewKind::RenderTarget,
            BindFlags::RENDER_TARGET,
            None,
            Some(1),
        )
    }

    fn create_depth_stencil_view(
        &self,
        resource: &SoftTexture,
        format: Option<TextureFormat>,
    ) -> Result<SoftView, DeviceError> {
        self.count(|s| s.depth_stencil_views_created += 1);
        self.make_view(
            resource,
            ViewKind::DepthStencil,
            BindFlags::DEPTH_STENCIL,
            format,
            Some(1),
        )
    }
}

#[derive(Debug, Clone)]
pub struct SoftContext {
    device: SoftDevice,
}

impl Context for SoftContext {
    type Device = SoftDevice;
    type Mapping<'a>
        = RefMut<'a, [u8]>
    where
        Self: 'a;

    fn update_subresource(
        &self,
        resource: &SoftTexture,
        subresource: u32,
        region: Rect,
        data: &[u8],
        row_pitch: usize,
    ) -> Result<(), DeviceError> {
        self.device.count(|s| s.updates += 1);
        self.device.check_fault(SoftFault::UPDATE)?;
        let desc = resource.desc();
        if desc.usage == Usage::Immutable {
            return Err(DeviceError::Immutable);
        }
        validate_upload(&desc, subresource, region, data, row_pitch)?;

        let mut storage = resource
            .0
            .storage
            .try_borrow_mut()
            .map_err(|_| DeviceError::AlreadyMapped(subresource))?;
        let dst = &mut storage[subresource as usize];
        let bpp = desc.format.bytes_per_pixel();
        let dst_pitch = resource.row_pitch(subresource);
        let row = region.width as usize * bpp;
        for y in 0..region.height as usize {
            let src = &data[y * row_pitch..y * row_pitch + row];
            let offset = (region.y as usize + y) * dst_pitch + region.x as usize * bpp;
            dst[offset..offset + row].copy_from_slice(src);
        }
        Ok(())
    }

    fn map<'a>(
        &'a self,
        resource: &'a SoftTexture,
        subresource: u32,
        mode: MapMode,
    ) -> Result<MappedSubresource<RefMut<'a, [u8]>>, DeviceError> {
        self.device.count(|s| s.maps += 1);
        self.device.check_fault(SoftFault::MAP)?;
        let desc = resource.desc();
        validate_subresource(&desc, subresource)?;
        let allowed = desc.usage == Usage::Staging
            && (!mode.reads() || desc.cpu_access.contains(CpuAccess::READ))
            && (!mode.writes() || desc.cpu_access.contains(CpuAccess::WRITE));
        if !allowed {
            return Err(DeviceError::NotMappable(mode));
        }
        let storage = resource
            .0
            .storage
            .try_borrow_mut()
            .map_err(|_| DeviceError::AlreadyMapped(subresource))?;
        let data = RefMut::map(storage, |levels| levels[subresource as usize].as_mut_slice());
        Ok(MappedSubresource {
            data,
            row_pitch: resource.row_pitch(subresource),
        })
    }

    fn unmap(&self, _resource: &SoftTexture, _subresource: u32) {
        self.device.count(|s| s.unmaps += 1);
    }

    fn copy_resource(&self, dst: &SoftTexture, src: &SoftTexture) -> Result<(), DeviceError> {
        self.device.count(|s| s.copies += 1);
        self.device.check_fault(SoftFault::COPY)?;
        let (dst_desc, src_desc) = (dst.desc(), src.desc());
        if dst == src || !copy_compatible(&dst_desc, &src_desc) {
            return Err(DeviceError::IncompatibleCopy {
                dst: dst_desc,
                src: src_desc,
            });
        }
        if dst_desc.usage == Usage::Immutable {
            return Err(DeviceError::Immutable);
        }
        let source = src
            .0
            .storage
            .try_borrow()
            .map_err(|_| DeviceError::AlreadyMapped(0))?;
        let mut target = dst
            .0
            .storage
            .try_borrow_mut()
            .map_err(|_| DeviceError::AlreadyMapped(0))?;
        for (to, from) in target.iter_mut().zip(source.iter()) {
            to.copy_from_slice(from);
        }
        logwise::debuginternal_sync!(
            "soft copy {src} -> {dst}",
            src = logwise::privacy::LogIt(&src.id()),
            dst = logwise::privacy::LogIt(&dst.id())
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(w: u32, h: u32) -> TextureDesc {
        TextureDesc::texture(w, h, TextureFormat::R8G8B8A8Unorm, 1)
    }

    #[test]
    fn update_writes_sub_rectangle() {
        let device = SoftDevice::new();
        let texture = device.create_texture(&rgba(4, 2)).unwrap();
        let ctx = device.immediate_context();
        let data = [0xAAu8; 8];
        ctx.update_subresource(&texture, 0, Rect::new(1, 1, 2, 1), &data, 8)
            .unwrap();
        let contents = texture.contents(0).unwrap();
        assert_eq!(&contents[..16], &[0u8; 16]);
        assert_eq!(&contents[16..20], &[0u8; 4]);
        assert_eq!(&contents[20..28], &[0xAAu8; 8]);
        assert_eq!(&contents[28..], &[0u8; 4]);
        assert_eq!(device.stats().updates, 1);
    }

    #[test]
    fn only_staging_maps() {
        let device = SoftDevice::new();
        let ctx = device.immediate_context();
        let gpu = device.create_texture(&rgba(2, 2)).unwrap();
        assert_eq!(
            ctx.map(&gpu, 0, MapMode::Read).unwrap_err(),
            DeviceError::NotMappable(MapMode::Read)
        );

        let readback = device.create_texture(&rgba(2, 2).staging_copy()).unwrap();
        assert!(ctx.map(&readback, 0, MapMode::Read).is_ok());
        assert_eq!(
            ctx.map(&readback, 0, MapMode::Write).unwrap_err(),
            DeviceError::NotMappable(MapMode::Write)
        );
    }

    #[test]
    fn double_map_is_rejected() {
        let device = SoftDevice::new();
        let ctx = device.immediate_context();
        let desc = TextureDesc::offscreen(2, 2, TextureFormat::R8G8B8A8Unorm);
        let staging = device.create_texture(&desc).unwrap();
        let first = ctx.map(&staging, 0, MapMode::ReadWrite).unwrap();
        assert_eq!(first.row_pitch, 8);
        assert_eq!(
            ctx.map(&staging, 0, MapMode::ReadWrite).unwrap_err(),
            DeviceError::AlreadyMapped(0)
        );
        drop(first);
        assert!(ctx.map(&staging, 0, MapMode::ReadWrite).is_ok());
    }

    #[test]
    fn copy_requires_matching_geometry() {
        let device = SoftDevice::new();
        let ctx = device.immediate_context();
        let src = device
            .create_texture_with_data(&rgba(2, 1), &[1, 2, 3, 4, 5, 6, 7, 8])
            .unwrap();
        let dst = device.create_texture(&rgba(2, 1).staging_copy()).unwrap();
        ctx.copy_resource(&dst, &src).unwrap();
        assert_eq!(dst.contents(0).unwrap(), vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let wrong = device.create_texture(&rgba(1, 2)).unwrap();
        assert!(matches!(
            ctx.copy_resource(&wrong, &src),
            Err(DeviceError::IncompatibleCopy { .. })
        ));
    }

    #[test]
    fn typeless_views_need_a_format() {
        let device = SoftDevice::new();
        let desc = TextureDesc::depth_stencil(4, 4, TextureFormat::R32G8X24Typeless);
        let depth = device.create_texture(&desc).unwrap();
        assert_eq!(
            device.create_shader_view(&depth, None).unwrap_err(),
            DeviceError::TypelessView(TextureFormat::R32G8X24Typeless)
        );
        let view = device
            .create_depth_stencil_view(&depth, Some(TextureFormat::D32FloatS8X24Uint))
            .unwrap();
        assert_eq!(view.info().format, TextureFormat::D32FloatS8X24Uint);
        assert_eq!(
            device.create_render_target_view(&depth).unwrap_err(),
            DeviceError::InvalidBind(ViewKind::RenderTarget)
        );
    }

    #[test]
    fn injected_faults_persist_until_cleared() {
        let device = SoftDevice::new();
        device.inject_fault(SoftFault::CREATE_TEXTURE);
        assert_eq!(
            device.create_texture(&rgba(1, 1)).unwrap_err(),
            DeviceError::Injected(SoftFault::CREATE_TEXTURE)
        );
        assert!(device.create_texture(&rgba(1, 1)).is_err());
        device.clear_faults();
        assert!(device.create_texture(&rgba(1, 1)).is_ok());
        assert_eq!(device.stats().textures_created, 3);
    }
}
