// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The uncompressed 32-bit DDS container used for texture dumps.
//!
//! A dump is a fixed 128 byte header followed by `width * height * 4` bytes of
//! pixel data, top row first. The masks declare red in the lowest byte.

use std::io::{self, Write};

pub const MAGIC: [u8; 4] = *b"DDS ";
pub const HEADER_SIZE: u32 = 0x7C;
/// CAPS | HEIGHT | WIDTH | PITCH | PIXELFORMAT | MIPMAPCOUNT.
pub const HEADER_FLAGS: u32 = 0x0002_100F;
pub const PIXEL_FORMAT_SIZE: u32 = 0x20;
/// ALPHAPIXELS | RGB.
pub const PIXEL_FORMAT_FLAGS: u32 = 0x41;
pub const BIT_COUNT: u32 = 0x20;
pub const RED_MASK: u32 = 0x0000_00FF;
pub const GREEN_MASK: u32 = 0x0000_FF00;
pub const BLUE_MASK: u32 = 0x00FF_0000;
pub const ALPHA_MASK: u32 = 0xFF00_0000;
pub const CAPS_TEXTURE: u32 = 0x1000;
/// Bytes before the pixel data, magic included.
pub const DATA_OFFSET: usize = 128;

const PITCH_FIELD: u32 = 0x800;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("file is {0} bytes, shorter than a DDS header")]
    TooShort(usize),
    #[error("bad magic {0:02X?}")]
    BadMagic([u8; 4]),
    #[error("header field {field} is {found:#x}, expected {expected:#x}")]
    UnexpectedField {
        field: &'static str,
        found: u32,
        expected: u32,
    },
    #[error("{width}x{height} at {bit_count} bits per pixel does not fit in memory")]
    TooLarge {
        width: u32,
        height: u32,
        bit_count: u32,
    },
    #[error("payload is {got} bytes, {needed} needed for {width}x{height}")]
    PayloadLength {
        width: u32,
        height: u32,
        needed: usize,
        got: usize,
    },
}

/// Encodes the 128 byte header of a `width` by `height` dump.
pub fn header(width: u32, height: u32) -> [u8; DATA_OFFSET] {
    let mut words = [0u32; 31];
    words[..7].copy_from_slice(&[HEADER_SIZE, HEADER_FLAGS, height, width, PITCH_FIELD, 1, 1]);
    // 11 reserved words follow, then the pixel format at word 18.
    words[18..27].copy_from_slice(&[
        PIXEL_FORMAT_SIZE,
        PIXEL_FORMAT_FLAGS,
        0,
        BIT_COUNT,
        RED_MASK,
        GREEN_MASK,
        BLUE_MASK,
        ALPHA_MASK,
        CAPS_TEXTURE,
    ]);

    let mut out = [0u8; DATA_OFFSET];
    out[..4].copy_from_slice(&MAGIC);
    for (chunk, word) in out[4..].chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    out
}

/// Writes a complete dump.
///
/// `pixels` is read one row at a time, `row_pitch` bytes apart. Each row
/// contributes `width * 4` bytes; rows shorter than that are padded with zeros.
pub fn write_dump<W: Write>(
    mut writer: W,
    width: u32,
    height: u32,
    pixels: &[u8],
    row_pitch: usize,
) -> io::Result<()> {
    writer.write_all(&header(width, height))?;
    let row_len = width as usize * 4;
    let mut padded = vec![0u8; row_len];
    for y in 0..height as usize {
        let start = (y * row_pitch).min(pixels.len());
        let end = (start + row_len).min(pixels.len());
        let row = &pixels[start..end];
        if row.len() == row_len {
            writer.write_all(row)?;
        } else {
            padded[..row.len()].copy_from_slice(row);
            padded[row.len()..].fill(0);
            writer.write_all(&padded)?;
        }
    }
    writer.flush()
}

/// Doubles every alpha byte of 4-byte texels, saturating at 255.
pub fn boost_alpha(texels: &mut [u8]) {
    for texel in texels.chunks_exact_mut(4) {
        texel[3] = texel[3].saturating_mul(2);
    }
}

/// The fields of a parsed dump header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpHeader {
    pub width: u32,
    pub height: u32,
    pub bit_count: u32,
    /// Red, green, blue and alpha masks.
    pub masks: [u32; 4],
    pub data_offset: usize,
}

impl DumpHeader {
    /// Parses and checks a dump produced by [`write_dump`].
    pub fn parse(file: &[u8]) -> Result<DumpHeader, Error> {
        if file.len() < DATA_OFFSET {
            return Err(Error::TooShort(file.len()));
        }
        let magic = [file[0], file[1], file[2], file[3]];
        if magic != MAGIC {
            return Err(Error::BadMagic(magic));
        }
        let word = |index: usize| {
            let at = 4 + index * 4;
            u32::from_le_bytes([file[at], file[at + 1], file[at + 2], file[at + 3]])
        };
        let expect = |field: &'static str, index: usize, expected: u32| {
            let found = word(index);
            if found == expected {
                Ok(())
            } else {
                Err(Error::UnexpectedField {
                    field,
                    found,
                    expected,
                })
            }
        };
        expect("dwSize", 0, HEADER_SIZE)?;
        expect("ddspf.dwSize", 18, PIXEL_FORMAT_SIZE)?;
        expect("ddspf.dwFlags", 19, PIXEL_FORMAT_FLAGS)?;

        let header = DumpHeader {
            height: word(2),
            width: word(3),
            bit_count: word(21),
            masks: [word(22), word(23), word(24), word(25)],
            data_offset: DATA_OFFSET,
        };
        let needed = (header.width as usize)
            .checked_mul(header.height as usize)
            .and_then(|texels| texels.checked_mul(header.bit_count as usize / 8))
            .ok_or(Error::TooLarge {
                width: header.width,
                height: header.height,
                bit_count: header.bit_count,
            })?;
        let got = file.len() - DATA_OFFSET;
        if got != needed {
            return Err(Error::PayloadLength {
                width: header.width,
                height: header.height,
                needed,
                got,
            });
        }
        Ok(header)
    }
}
