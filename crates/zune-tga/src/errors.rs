/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Errors possible during decoding and encoding.
use core::fmt::{Debug, Display, Formatter};

use zune_core::bit_depth::BitDepth;
use zune_core::bytestream::ZByteIoError;
use zune_core::colorspace::ColorSpace;

/// Possible errors that may occur during decoding
#[non_exhaustive]
pub enum TgaDecodeErrors {
    /// The alpha size bits in the image descriptor are not
    /// one of `0`, `1` or `8`
    InvalidAlphaSize(u8),
    /// The image type is not paletted, truecolor or monochrome
    UnsupportedImageType(u8),
    /// The combination of image type and bits per pixel
    /// is not one we can decode
    InvalidImageFormat { image_type: u8, bpp: u8 },
    /// The color map description is unusable
    InvalidPalette(&'static str),
    /// A pixel referenced a palette entry that doesn't exist
    ///
    /// # Arguments
    /// - 1st argument is the index found
    /// - 2nd argument is the number of palette entries
    PaletteIndexOutOfRange(usize, usize),
    /// The stream is too short to carry the 26 byte TGA footer
    ///
    /// The argument is the stream length
    MissingFooter(usize),
    /// Image dimensions exceed configured limits
    TooLargeDimensions(&'static str, usize, usize),
    /// The output buffer is too small, expected at least
    /// a size but got another size
    TooSmallOutput(usize, usize),
    /// The stream ends before the pixel data it describes could
    ///
    /// # Arguments
    /// - 1st argument is the minimum number of bytes needed
    /// - 2nd argument is the number of bytes available
    TruncatedData(usize, usize),
    /// Generic message does not need heap allocation
    GenericStatic(&'static str),
    IoErrors(ZByteIoError)
}

impl Debug for TgaDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            TgaDecodeErrors::InvalidAlphaSize(size) => {
                writeln!(f, "Invalid alpha size {size}, expected one of 0, 1 or 8")
            }
            TgaDecodeErrors::UnsupportedImageType(kind) => {
                writeln!(f, "Invalid or unsupported image type {kind}")
            }
            TgaDecodeErrors::InvalidImageFormat { image_type, bpp } => {
                writeln!(
                    f,
                    "Invalid image format, image type {image_type} cannot have {bpp} bits per pixel"
                )
            }
            TgaDecodeErrors::InvalidPalette(reason) => {
                writeln!(f, "Invalid palette: {reason}")
            }
            TgaDecodeErrors::PaletteIndexOutOfRange(index, length) => {
                writeln!(
                    f,
                    "Palette index {index} out of range, palette has {length} entries"
                )
            }
            TgaDecodeErrors::MissingFooter(length) => {
                writeln!(
                    f,
                    "Stream of {length} bytes is too short to contain a TGA footer"
                )
            }
            TgaDecodeErrors::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension}, {found} exceeds {expected}"
                )
            }
            TgaDecodeErrors::TooSmallOutput(expected, found) => {
                writeln!(
                    f,
                    "Too small output size, expected {expected}, but found {found}"
                )
            }
            TgaDecodeErrors::TruncatedData(needed, available) => {
                writeln!(
                    f,
                    "Not enough data for the image, need at least {needed} bytes but only {available} remain"
                )
            }
            TgaDecodeErrors::GenericStatic(val) => {
                writeln!(f, "{val}")
            }
            TgaDecodeErrors::IoErrors(value) => {
                writeln!(f, "I/O error {:?}", value)
            }
        }
    }
}

impl From<ZByteIoError> for TgaDecodeErrors {
    fn from(value: ZByteIoError) -> Self {
        TgaDecodeErrors::IoErrors(value)
    }
}

/// Errors encountered during encoding
#[non_exhaustive]
pub enum TgaEncodeErrors {
    /// Unsupported colorspace
    ///
    /// The first argument is the colorspace encountered
    /// The second argument is list of supported colorspaces
    UnsupportedColorspace(ColorSpace, &'static [ColorSpace]),
    /// TGA only stores 8 bit channels
    UnsupportedBitDepth(BitDepth),
    /// Too large dimensions
    ///
    /// TGA stores width and height as 16 bit integers
    TooLargeDimensions(usize),
    /// The input buffer length is not `width*height*components`
    ///
    /// # Arguments
    /// - 1st argument is the expected length
    /// - 2nd argument is the length found
    TooShortInput(usize, usize),
    Generic(&'static str),
    IoError(ZByteIoError)
}

impl Debug for TgaEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            TgaEncodeErrors::UnsupportedColorspace(found, supported) => {
                writeln!(f, "Cannot encode image with colorspace {found:?} into TGA, supported ones are {supported:?}")
            }
            TgaEncodeErrors::UnsupportedBitDepth(depth) => {
                writeln!(f, "Unsupported bit depth {depth:?}, TGA can only encode 8 bit images")
            }
            TgaEncodeErrors::TooLargeDimensions(found) => {
                writeln!(
                    f,
                    "Too large image dimensions {found}, TGA can only encode images less than {}",
                    u16::MAX
                )
            }
            TgaEncodeErrors::TooShortInput(expected, found) => {
                writeln!(
                    f,
                    "Input length mismatch, expected {expected} bytes but found {found}"
                )
            }
            TgaEncodeErrors::Generic(val) => {
                writeln!(f, "{}", val)
            }
            TgaEncodeErrors::IoError(v) => {
                writeln!(f, "I/O error {:?}", v)
            }
        }
    }
}

impl Display for TgaEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl Display for TgaDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TgaEncodeErrors {}

#[cfg(feature = "std")]
impl std::error::Error for TgaDecodeErrors {}

impl From<ZByteIoError> for TgaEncodeErrors {
    fn from(value: ZByteIoError) -> Self {
        Self::IoError(value)
    }
}
