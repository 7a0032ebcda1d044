/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Widen a 5 bit channel to 8 bits, replicating the top bits
/// into the low ones so that 31 maps to 255
#[inline(always)]
const fn expand_5_bits(v: u16) -> u8 {
    let v = (v & 31) as u8;
    (v << 3) | (v >> 2)
}

/// Unpack a little endian 15 bit `ARRRRRGGGGGBBBBB` word
/// returning `[r, g, b]`
#[inline(always)]
pub(crate) const fn unpack_555(word: u16) -> [u8; 3] {
    [
        expand_5_bits(word >> 10),
        expand_5_bits(word >> 5),
        expand_5_bits(word)
    ]
}

/// Mirror every row of an RGBA image
pub(crate) fn flip_horizontal(pixels: &mut [u8], width: usize) {
    if width < 2 {
        return;
    }
    let stride = width * 4;

    for row in pixels.chunks_exact_mut(stride) {
        for x in 0..width / 2 {
            let (left, right) = row.split_at_mut((width - x - 1) * 4);
            left[x * 4..x * 4 + 4].swap_with_slice(&mut right[..4]);
        }
    }
}

/// Mirror an RGBA image top to bottom
pub(crate) fn flip_vertical(pixels: &mut [u8], width: usize, height: usize) {
    let stride = width * 4;

    for y in 0..height / 2 {
        let (top, bottom) = pixels.split_at_mut((height - y - 1) * stride);
        top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
    }
}
