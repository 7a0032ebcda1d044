/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fs::read;
use std::path::Path;

use zune_core::bytestream::{ZCursor, ZWriter};
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_tga::{AlphaMode, TgaDecoder, TgaFooter, TgaHeader, TgaPixels};

use crate::{hash, TestEntry};

/// Deterministic pixels for an entry, in the entry's colorspace
fn generate(entry: &TestEntry) -> Vec<u8> {
    let components = entry.colorspace.to_colorspace().num_components();
    let run = entry.run.unwrap_or(1).max(1);
    let seed = usize::from(hash(entry.name.as_bytes()) as u8);

    let mut pixels = Vec::with_capacity(entry.width * entry.height * components);

    for y in 0..entry.height {
        for x in 0..entry.width {
            for c in 0..components {
                pixels.push(((x / run) * 5 + y * 3 + c * 71 + seed) as u8);
            }
        }
    }
    pixels
}

/// What a decoder should return for `pixels`
fn reference_rgba(pixels: &[u8], colorspace: ColorSpace) -> Vec<u8> {
    match colorspace {
        ColorSpace::Luma => pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        ColorSpace::RGB => pixels
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        ColorSpace::RGBA => pixels.to_vec(),
        ColorSpace::BGRA => pixels
            .chunks_exact(4)
            .flat_map(|px| [px[2], px[1], px[0], px[3]])
            .collect(),
        _ => unreachable!()
    }
}

/// Pack stored pixels into run length packets
fn rle_pack(stored: &[u8], size: usize, out: &mut Vec<u8>) {
    let pixels: Vec<&[u8]> = stored.chunks_exact(size).collect();
    let mut i = 0;

    while i < pixels.len() {
        let mut run = 1;
        while i + run < pixels.len() && run < 128 && pixels[i + run] == pixels[i] {
            run += 1;
        }
        if run > 1 {
            out.push(0x80 | (run - 1) as u8);
            out.extend_from_slice(pixels[i]);
            i += run;
            continue;
        }
        // literals until a repeat starts
        let start = i;
        while i < pixels.len()
            && i - start < 128
            && !(i + 1 < pixels.len() && pixels[i + 1] == pixels[i])
        {
            i += 1;
        }
        out.push((i - start - 1) as u8);
        for px in &pixels[start..i] {
            out.extend_from_slice(px);
        }
    }
}

/// Write `rgba` the way other TGA writers do, optionally run length
/// encoded and with a bottom-left origin
fn write_fixture(
    rgba: &[u8], width: usize, height: usize, colorspace: ColorSpace, alpha_mode: AlphaMode,
    rle: bool, bottom_left: bool
) -> Vec<u8> {
    let (image_type, bpp, alpha_bits) = match colorspace {
        ColorSpace::Luma => (3, 8, 0),
        ColorSpace::RGB => (2, 24, 0),
        _ => (2, 32, 8)
    };
    let size = usize::from(bpp / 8);

    let mut stored = Vec::with_capacity(width * height * size);

    let mut rows: Vec<&[u8]> = if width == 0 {
        vec![]
    } else {
        rgba.chunks_exact(width * 4).collect()
    };
    if bottom_left {
        rows.reverse();
    }
    for row in rows {
        for px in row.chunks_exact(4) {
            match size {
                1 => stored.push(px[0]),
                3 => stored.extend_from_slice(&[px[2], px[1], px[0]]),
                _ => stored.extend_from_slice(&[px[2], px[1], px[0], px[3]])
            }
        }
    }

    let header = TgaHeader {
        image_type: if rle { image_type | 8 } else { image_type },
        width: width as u16,
        height: height as u16,
        bpp,
        flags: if bottom_left { alpha_bits } else { alpha_bits | 0x20 },
        ..Default::default()
    };

    let mut file = vec![];
    {
        let mut writer = ZWriter::new(&mut file);
        header.write(&mut writer).unwrap();

        if rle {
            let mut packed = vec![];
            rle_pack(&stored, size, &mut packed);
            writer.write_all(&packed).unwrap();
        } else {
            writer.write_all(&stored).unwrap();
        }

        let mut ext_offset = 0;

        if alpha_bits != 0 {
            ext_offset = writer.bytes_written() as u32;

            let mut area = [0_u8; 0x1ef];
            area[0] = 0xef;
            area[1] = 0x01;
            area[0x1ee] = match alpha_mode {
                AlphaMode::Straight => 3,
                AlphaMode::Premultiplied => 4
            };
            writer.write_all(&area).unwrap();
        }
        TgaFooter::new(ext_offset).write(&mut writer).unwrap();
    }
    file
}

fn decode(file: &[u8]) -> (Vec<u8>, AlphaMode) {
    let mut decoder = TgaDecoder::new_with_options(ZCursor::new(file), DecoderOptions::default());
    let pixels = decoder.decode().unwrap();
    (pixels, decoder.alpha_mode().unwrap())
}

#[test]
#[allow(clippy::uninlined_format_args)]
fn test_tga() {
    let file = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/tga.json");

    let json_file = read(file).unwrap();

    let entries: Vec<TestEntry> = serde_json::from_slice(&json_file).unwrap();

    let mut error = false;
    let mut files = Vec::new();

    for entry in &entries {
        let colorspace = entry.colorspace.to_colorspace();
        let alpha_mode = entry
            .alpha
            .map(|a| a.to_alpha_mode())
            .unwrap_or(AlphaMode::Straight);

        let pixels = generate(entry);
        let expected = reference_rgba(&pixels, colorspace);
        let expected_hash = hash(&expected);

        let mut variants = vec![(
            "zune-tga encoder",
            zune_tga::encode(
                TgaPixels::new(&pixels, colorspace, alpha_mode),
                entry.width,
                entry.height
            )
            .unwrap()
        )];
        for (name, rle, bottom_left) in [
            ("raw top-left", false, false),
            ("raw bottom-left", false, true),
            ("rle top-left", true, false),
            ("rle bottom-left", true, true)
        ] {
            let file = write_fixture(
                &expected,
                entry.width,
                entry.height,
                colorspace,
                alpha_mode,
                rle,
                bottom_left
            );
            variants.push((name, file));
        }

        for (variant, file) in &variants {
            let (decoded, decoded_alpha) = decode(file);
            let hash = hash(&decoded);

            if hash != expected_hash || decoded_alpha != alpha_mode {
                error = true;
                files.push(entry.name.clone());
                // report error
                let err = format!(
                    "Mismatch for {} ({})\nExpected hash {} but found {}, alpha {:?} found {:?}\nConfig:{:#?}",
                    entry.name, variant, expected_hash, hash, alpha_mode, decoded_alpha, entry
                );
                eprintln!("{}\n", err);
            }
        }
    }
    if error {
        panic!("Errors found during test decoding\n {:#?}", files);
    }
}
