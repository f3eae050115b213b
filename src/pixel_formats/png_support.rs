use crate::pixel_formats::TextureFormat;
use png::{BitDepth, ColorType};
use std::io::Write;

/// Formats a readback can be encoded from, with the swizzle to RGBA.
pub(crate) fn png_channel_order(format: TextureFormat) -> Option<[usize; 4]> {
    match format {
        TextureFormat::R8G8B8A8Unorm => Some([0, 1, 2, 3]),
        TextureFormat::B8G8R8A8Unorm => Some([2, 1, 0, 3]),
        _ => None,
    }
}

/// Reorders tightly packed 4-byte texels into RGBA.
pub(crate) fn to_rgba8(pixels: &mut [u8], order: [usize; 4]) {
    for texel in pixels.chunks_exact_mut(4) {
        let src = [texel[0], texel[1], texel[2], texel[3]];
        for (dst, channel) in texel.iter_mut().zip(order) {
            *dst = src[channel];
        }
    }
}

pub(crate) fn encode_rgba8<W: Write>(
    writer: W,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgra_swizzles_to_rgba() {
        let mut texels = vec![1, 2, 3, 4, 10, 20, 30, 40];
        let order = png_channel_order(TextureFormat::B8G8R8A8Unorm).unwrap();
        to_rgba8(&mut texels, order);
        assert_eq!(texels, vec![3, 2, 1, 4, 30, 20, 10, 40]);
        assert!(png_channel_order(TextureFormat::R32Float).is_none());
    }

    #[test]
    fn encodes_decodable_png() {
        let rgba = vec![255u8, 0, 0, 255, 0, 255, 0, 128];
        let mut out = Vec::new();
        encode_rgba8(&mut out, 2, 1, &rgba).unwrap();

        let decoder = png::Decoder::new(std::io::Cursor::new(out));
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; rgba.len()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (2, 1));
        assert_eq!(buf, rgba);
    }
}
