//! Numeric fields of the SCIP wire format.
//!
//! Outbound parameters are zero-padded decimal ASCII. Inbound measurements,
//! timestamps and times are packed 6 bits per byte with an offset of `0x30`.

/// Offset added to every 6-bit group by the device.
const PACKED_OFFSET: u8 = 0x30;

/// Renders `value` as a decimal field exactly `width` characters long.
///
/// Shorter values are left-padded with `'0'`. Values whose decimal form is
/// longer than `width` keep only their leftmost `width` digits, so
/// `encode_decimal(555555, 4)` yields `"5555"`. Devices accept whatever ends
/// up on the wire; callers must keep parameters within their field width.
pub fn encode_decimal(value: u32, width: usize) -> String {
    let mut field = format!("{:0width$}", value, width = width);
    field.truncate(width);
    field
}

/// Decodes a packed field, most significant group first.
///
/// The field width is the length of `bytes`: callers slice exactly the
/// field (2 or 3 bytes per sample, 4 for timestamps and times). Up to five
/// bytes fit in the result; earlier groups of longer input are shifted out.
///
/// Bytes are not range checked: anything below `0x30` wraps and is merged
/// into the result as is.
#[inline]
pub fn decode_packed(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |value, &b| {
        (value << 6) | u32::from(b.wrapping_sub(PACKED_OFFSET))
    })
}

/// Packs `value` into `width` bytes. Only used to build device replies in tests.
#[cfg(test)]
pub(crate) fn encode_packed(value: u32, width: usize) -> Vec<u8> {
    (0..width)
        .rev()
        .map(|i| PACKED_OFFSET + ((value >> (6 * i)) & 0x3f) as u8)
        .collect()
}
