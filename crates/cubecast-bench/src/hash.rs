//! Deterministic integer hash for scene layout and per-tick jitter.
//! Same input always yields the same output, so runs are comparable.

/// Hash three coordinates and a tick into a well-mixed u32.
pub fn bench_hash(x: i32, y: i32, z: i32, tick: u32) -> u32 {
    let mut state = (x as u32)
        .wrapping_mul(0x9E3779B9)
        .wrapping_add((y as u32).wrapping_mul(0x517CC1B7))
        .wrapping_add((z as u32).wrapping_mul(0x6C62272E))
        .wrapping_add(tick.wrapping_mul(0x2545F491));

    state ^= state >> 16;
    state = state.wrapping_mul(0x45D9F3B);
    state ^= state >> 16;
    state = state.wrapping_mul(0x45D9F3B);
    state ^= state >> 16;
    state
}

/// Map a hash to `[0, 1)`.
pub fn unit_float(hash: u32) -> f32 {
    (hash >> 8) as f32 / 16_777_216.0
}

/// Map a hash to `[-1, 1)`.
pub fn signed_float(hash: u32) -> f32 {
    unit_float(hash) * 2.0 - 1.0
}
