/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![no_main]

use libfuzzer_sys::fuzz_target;
use zune_tga::{decode, encode, TgaPixels};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let width = usize::from(data[0] % 32) + 1;
    let pixels = &data[1..];
    let height = pixels.len() / (width * 4);

    let pixels = &pixels[..width * height * 4];
    let file = encode(TgaPixels::Rgba(pixels), width, height).unwrap();
    let (decoded, w, h, _) = decode(&file).unwrap();

    assert_eq!((w, h), (width, height));
    assert_eq!(decoded, pixels);
});
