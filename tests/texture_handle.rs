use gs_util::desc::{Rect, TextureDesc, TextureKind, Usage};
use gs_util::imp::{Device, Resource, SoftDevice, SoftFault};
use gs_util::pixel_formats::TextureFormat;
use gs_util::texture::{Error, Texture};

fn texture(device: &SoftDevice, desc: TextureDesc) -> Texture<SoftDevice> {
    Texture::new(device.create_texture(&desc).unwrap())
}

#[test]
fn views_are_created_once() {
    let device = SoftDevice::new();
    let mut target = texture(
        &device,
        TextureDesc::render_target(16, 16, TextureFormat::R8G8B8A8Unorm),
    );

    let first = target.as_shader_view().unwrap().clone();
    let second = target.as_shader_view().unwrap().clone();
    assert_eq!(first, second);

    let rtv = target.as_render_target_view().unwrap().clone();
    assert_eq!(target.as_render_target_view().unwrap(), &rtv);

    let stats = device.stats();
    assert_eq!(stats.shader_views_created, 1);
    assert_eq!(stats.render_target_views_created, 1);
}

#[test]
fn typeless_depth_uses_typed_views() {
    let device = SoftDevice::new();
    let mut depth = texture(
        &device,
        TextureDesc::depth_stencil(8, 8, TextureFormat::R32G8X24Typeless),
    );
    assert_eq!(depth.kind(), TextureKind::DepthStencil);

    let srv = depth.as_shader_view().unwrap().info();
    assert_eq!(srv.format, TextureFormat::R32FloatX8X24Typeless);
    assert_eq!(srv.mip_levels, 1);

    let dsv = depth.as_depth_stencil_view().unwrap().info();
    assert_eq!(dsv.format, TextureFormat::D32FloatS8X24Uint);
}

#[test]
fn update_past_last_layer_is_ignored() {
    let device = SoftDevice::new();
    let mut source = texture(
        &device,
        TextureDesc::texture(4, 4, TextureFormat::R8G8B8A8Unorm, 2),
    );
    assert_eq!(source.max_layer(), 2);

    source.update(Rect::full(4, 4), &[0xFF; 64], 16, 2).unwrap();
    source.update(Rect::full(4, 4), &[0xFF; 64], 16, 7).unwrap();
    assert_eq!(device.stats().updates, 0);
    assert!(source.as_raw_resource().contents(0).unwrap().iter().all(|b| *b == 0));

    source.update(Rect::full(2, 2), &[0xFF; 16], 8, 1).unwrap();
    assert_eq!(device.stats().updates, 1);
    assert_eq!(source.as_raw_resource().contents(1).unwrap(), vec![0xFF; 16]);
}

#[test]
fn update_reports_device_failures() {
    let device = SoftDevice::new();
    let mut source = texture(
        &device,
        TextureDesc::texture(4, 4, TextureFormat::R8G8B8A8Unorm, 1),
    );
    assert!(matches!(
        source.update(Rect::full(8, 8), &[0; 256], 32, 0),
        Err(Error::Device(_))
    ));
    device.inject_fault(SoftFault::UPDATE);
    assert!(source.update(Rect::full(4, 4), &[0; 64], 16, 0).is_err());
}

#[test]
fn map_with_region_always_fails() {
    let device = SoftDevice::new();
    let descs = [
        TextureDesc::offscreen(4, 4, TextureFormat::R8G8B8A8Unorm),
        TextureDesc::render_target(4, 4, TextureFormat::R8G8B8A8Unorm),
        TextureDesc::texture(4, 4, TextureFormat::R8Unorm, 1),
    ];
    for desc in descs {
        let mut t = texture(&device, desc);
        assert!(matches!(
            t.map(Some(Rect::new(0, 0, 1, 1)), 0),
            Err(Error::RegionMapNotSupported)
        ));
    }
    assert_eq!(device.stats().maps, 0);
}

#[test]
fn only_staging_textures_map() {
    let device = SoftDevice::new();
    let mut target = texture(
        &device,
        TextureDesc::render_target(4, 4, TextureFormat::R8G8B8A8Unorm),
    );
    assert!(matches!(target.map(None, 0), Err(Error::NotStaging)));

    let mut offscreen = texture(
        &device,
        TextureDesc::offscreen(4, 4, TextureFormat::R8G8B8A8Unorm),
    );
    assert_eq!(offscreen.desc().usage, Usage::Staging);
    {
        let mut mapped = offscreen.map(None, 0).unwrap();
        assert_eq!(mapped.pitch(), 16);
        mapped[..4].copy_from_slice(&[1, 2, 3, 4]);
    }
    offscreen.unmap();
    assert_eq!(&offscreen.as_raw_resource().contents(0).unwrap()[..4], &[1, 2, 3, 4]);
    assert_eq!(device.stats().unmaps, 1);
}

#[test]
fn equality_is_resource_identity() {
    let device = SoftDevice::new();
    let desc = TextureDesc::render_target(4, 4, TextureFormat::R8G8B8A8Unorm);
    let resource = device.create_texture(&desc).unwrap();
    let a = Texture::new(resource.clone());
    let b = Texture::new(resource);
    let c = texture(&device, desc);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn backend_is_inferred_from_the_resource() {
    let device = SoftDevice::new();
    let desc = TextureDesc::depth_stencil(4, 2, TextureFormat::R32G8X24Typeless);
    let depth = Texture::new(device.create_texture(&desc).unwrap());
    assert_eq!(depth.size(), (4, 2));
    assert_eq!(depth.as_raw_resource().desc(), desc);
}

#[test]
fn empty_descriptions_are_rejected() {
    let device = SoftDevice::new();
    let desc = TextureDesc {
        width: 0,
        ..TextureDesc::render_target(4, 4, TextureFormat::R8G8B8A8Unorm)
    };
    assert!(device.create_texture(&desc).is_err());
    let bound_staging = TextureDesc {
        usage: Usage::Staging,
        ..TextureDesc::render_target(4, 4, TextureFormat::R8G8B8A8Unorm)
    };
    assert!(device.create_texture(&bound_staging).is_err());
}
