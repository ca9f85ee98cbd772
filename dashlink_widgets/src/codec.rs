//! Little-endian field decoding shared by the widgets

/// Decode exactly `N` consecutive little-endian f32 values.
///
/// `None` unless `data` is exactly `4 * N` bytes long.
pub(crate) fn f32_array<const N: usize>(data: &[u8]) -> Option<[f32; N]> {
    if data.len() != N * 4 {
        return None;
    }
    let mut values = [0.0f32; N];
    for (value, chunk) in values.iter_mut().zip(data.chunks_exact(4)) {
        *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Some(values)
}

/// Encode f32 values as consecutive little-endian bytes
pub fn encode_f32s(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}
