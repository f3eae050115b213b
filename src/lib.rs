// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
gs_util holds the format compatibility tables and the GPU texture wrapper of a
hardware renderer for the PlayStation 2 Graphics Synthesizer (GS).

# Format tables

The GS stores colour, depth and palette data in one local memory, in a handful
of pixel storage modes ([`psm::Psm`]). The texture cache and the render target
tracker need to know which of those modes alias each other. [`tables::tables`]
answers that, along with the primitive questions of draw assembly:

```
use gs_util::prim::{PrimClass, PrimTopology};
use gs_util::psm::Psm;
use gs_util::tables::tables;

let t = tables();
assert_eq!(t.prim_class(PrimTopology::TriangleFan), PrimClass::Triangle);
assert_eq!(t.vertex_count(PrimTopology::Sprite), 2);
assert!(t.has_compatible_bits(Psm::PSMCT32, Psm::PSMCT24));
assert!(t.shares_bits(Psm::PSMCT24, Psm::PSMT8H));
```

# Textures

[`texture::Texture`] wraps a backend texture. Backends implement the traits in
[`imp`]:

| Backend | Feature | Notes |
|---------|---------|-------|
| [`imp::SoftDevice`] | always | CPU memory, call counters, fault injection |
| `imp::WgpuDevice` | `backend_wgpu` | wraps an existing `wgpu::Device` and `wgpu::Queue` |

Textures can be dumped to disk with [`texture::Texture::save_dds`] and
[`texture::Texture::save_png`] for debugging.
*/

logwise::declare_logging_domain!();

pub mod bittricks;
pub mod dds;
pub mod desc;
pub mod imp;
pub mod pixel_formats;
pub mod prim;
pub mod psm;
pub mod renderer;
pub mod tables;
pub mod texture;

pub use bittricks::hex32;
pub use renderer::{CrcHackLevel, RendererType, recommended_crc_hack_level};
pub use tables::{GsTables, tables};
