/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Decoding and encoding TARGA images
//!
//! [Format Specification](https://www.dca.fee.unicamp.br/~martino/disciplinas/ea978/tgaffs.pdf)
//!
//! # Features
//! - Decoding and encoding
//! - `no_std`
//! - Paletted, truecolor and monochrome images, raw or run length encoded
//! - Straight and premultiplied alpha via the TGA 2.0 extension area
//!
//! Decoded images are always 8 bit RGBA with a top-left origin,
//! whatever the origin corner stored in the file.
//!
//! ## `no_std`
//! You can use `no_std` with alloc feature to compile for `no_std` endpoints
//!
//! # Example
//! ```
//! use zune_tga::{decode, encode, AlphaMode, TgaPixels};
//!
//! let gray = [0_u8, 85, 170, 255];
//! let file = encode(TgaPixels::Luma(&gray), 2, 2).unwrap();
//!
//! let (pixels, width, height, alpha_mode) = decode(&file).unwrap();
//! assert_eq!((width, height, alpha_mode), (2, 2, AlphaMode::Straight));
//! assert_eq!(&pixels[4..8], &[85, 85, 85, 255]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![macro_use]
extern crate alloc;
extern crate core;

use alloc::vec::Vec;

pub use common::{AlphaMode, TgaEncoding, TgaFooter, TgaHeader, TgaImageType};
pub use decoder::*;
pub use encoder::*;
pub use errors::*;
pub use zune_core;
use zune_core::bytestream::ZCursor;
use zune_core::options::DecoderOptions;

mod common;
mod constants;
mod decoder;
mod encoder;
mod errors;
mod utils;

/// Decoder options that accept any dimension a TGA header can store
fn unrestricted_options() -> DecoderOptions {
    DecoderOptions::default()
        .set_max_width(usize::from(u16::MAX))
        .set_max_height(usize::from(u16::MAX))
}

/// Decode a TGA image held in memory
///
/// # Returns
/// - RGBA pixels with a top-left origin
/// - Width
/// - Height
/// - Whether color channels are premultiplied by alpha
pub fn decode(bytes: &[u8]) -> Result<(Vec<u8>, usize, usize, AlphaMode), TgaDecodeErrors> {
    let mut decoder = TgaDecoder::new_with_options(ZCursor::new(bytes), unrestricted_options());
    let pixels = decoder.decode()?;

    let (width, height) = decoder
        .dimensions()
        .ok_or(TgaDecodeErrors::GenericStatic("Headers were not decoded"))?;
    let alpha_mode = decoder
        .alpha_mode()
        .ok_or(TgaDecodeErrors::GenericStatic("Headers were not decoded"))?;

    Ok((pixels, width, height, alpha_mode))
}

/// Read the dimensions and alpha interpretation of a TGA image
/// without touching palette or pixel data
pub fn decode_config(bytes: &[u8]) -> Result<(usize, usize, AlphaMode), TgaDecodeErrors> {
    let mut decoder = TgaDecoder::new_with_options(ZCursor::new(bytes), unrestricted_options());
    decoder.decode_headers()?;

    let (width, height) = decoder
        .dimensions()
        .ok_or(TgaDecodeErrors::GenericStatic("Headers were not decoded"))?;
    let alpha_mode = decoder
        .alpha_mode()
        .ok_or(TgaDecodeErrors::GenericStatic("Headers were not decoded"))?;

    Ok((width, height, alpha_mode))
}

/// Encode pixels into a new TGA file
pub fn encode(pixels: TgaPixels, width: usize, height: usize) -> Result<Vec<u8>, TgaEncodeErrors> {
    let encoder = TgaEncoder::from_pixels(pixels, width, height);
    encoder.check_options()?;

    let mut output = Vec::with_capacity(encoder.max_size());
    encoder.encode(&mut output)?;

    Ok(output)
}
