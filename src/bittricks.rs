// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
register formatting.
*/

/// Zero-padded, upper-case, 8 digit hex. Game CRCs and register dumps are
/// logged this way.
pub fn hex32(value: u32) -> String {
    format!("{value:08X}")
}

#[cfg(test)]
mod tests {
    use super::hex32;

    #[test]
    fn pads_and_uppercases() {
        assert_eq!(hex32(0xabcd), "0000ABCD");
        assert_eq!(hex32(0), "00000000");
        assert_eq!(hex32(u32::MAX), "FFFFFFFF");
    }
}
