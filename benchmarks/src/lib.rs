/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// A width*height RGBA image with smooth gradients and a few flat areas
pub fn sample_rgba(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);

    for y in 0..height {
        for x in 0..width {
            if (x / 64 + y / 64) % 3 == 0 {
                pixels.extend_from_slice(&[200, 30, 30, 255]);
            } else {
                pixels.extend_from_slice(&[x as u8, y as u8, (x ^ y) as u8, (x + y) as u8]);
            }
        }
    }
    pixels
}

/// Gray version of [`sample_rgba`]
pub fn sample_luma(width: usize, height: usize) -> Vec<u8> {
    sample_rgba(width, height)
        .chunks_exact(4)
        .map(|px| px[1])
        .collect()
}
