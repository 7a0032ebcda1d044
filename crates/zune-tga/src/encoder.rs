/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::borrow::Cow;
use alloc::vec;
use alloc::vec::Vec;

use zune_core::bit_depth::BitDepth;
use zune_core::bytestream::{ZByteWriterTrait, ZWriter};
use zune_core::colorspace::ColorSpace;
use zune_core::log::trace;
use zune_core::options::EncoderOptions;

use crate::common::{AlphaMode, TgaFooter, TgaHeader, TgaImageType};
use crate::constants::{
    ATTR_TYPE_ALPHA, ATTR_TYPE_PREMULTIPLIED_ALPHA, EXT_AREA_ATTR_TYPE_OFFSET, FLAG_ORIGIN_TOP,
    TGA_FOOTER_SIZE, TGA_HEADER_SIZE
};
use crate::errors::TgaEncodeErrors;

const SUPPORTED_COLORSPACES: [ColorSpace; 7] = [
    ColorSpace::Luma,
    ColorSpace::LumaA,
    ColorSpace::RGB,
    ColorSpace::RGBA,
    ColorSpace::BGR,
    ColorSpace::BGRA,
    ColorSpace::ARGB
];

/// Size of the extension area written by the encoder,
/// just enough to reach the attribute type field
const EXT_AREA_SIZE: usize = EXT_AREA_ATTR_TYPE_OFFSET + 1;

/// Pixels handed to the encoder, tagged with their layout
#[derive(Copy, Clone, Debug)]
pub enum TgaPixels<'a> {
    /// One gray byte per pixel
    Luma(&'a [u8]),
    /// RGBA with color independent of alpha
    Rgba(&'a [u8]),
    /// RGBA with color already multiplied by alpha
    PremultipliedRgba(&'a [u8]),
    /// Any other 8 bit layout, converted to straight RGBA before encoding
    Other(&'a [u8], ColorSpace)
}

/// Pixels in one of the two layouts the encoder writes
enum CanonicalPixels<'a> {
    Luma(&'a [u8]),
    Rgba(Cow<'a, [u8]>, AlphaMode)
}

impl<'a> TgaPixels<'a> {
    /// Tag `data` using its colorspace
    ///
    /// `alpha_mode` is only consulted for layouts that carry alpha
    pub fn new(data: &'a [u8], colorspace: ColorSpace, alpha_mode: AlphaMode) -> TgaPixels<'a> {
        match (colorspace, alpha_mode) {
            (ColorSpace::Luma, _) => TgaPixels::Luma(data),
            (ColorSpace::RGBA, AlphaMode::Straight) => TgaPixels::Rgba(data),
            (ColorSpace::RGBA, AlphaMode::Premultiplied) => TgaPixels::PremultipliedRgba(data),
            (colorspace, _) => TgaPixels::Other(data, colorspace)
        }
    }

    pub const fn data(&self) -> &'a [u8] {
        match self {
            TgaPixels::Luma(data)
            | TgaPixels::Rgba(data)
            | TgaPixels::PremultipliedRgba(data)
            | TgaPixels::Other(data, _) => data
        }
    }

    pub const fn colorspace(&self) -> ColorSpace {
        match self {
            TgaPixels::Luma(_) => ColorSpace::Luma,
            TgaPixels::Rgba(_) | TgaPixels::PremultipliedRgba(_) => ColorSpace::RGBA,
            TgaPixels::Other(_, colorspace) => *colorspace
        }
    }

    pub const fn alpha_mode(&self) -> AlphaMode {
        match self {
            TgaPixels::PremultipliedRgba(_) => AlphaMode::Premultiplied,
            _ => AlphaMode::Straight
        }
    }

    fn canonical(self) -> Result<CanonicalPixels<'a>, TgaEncodeErrors> {
        match self {
            TgaPixels::Luma(data) => Ok(CanonicalPixels::Luma(data)),
            TgaPixels::Rgba(data) => Ok(CanonicalPixels::Rgba(Cow::Borrowed(data), AlphaMode::Straight)),
            TgaPixels::PremultipliedRgba(data) => Ok(CanonicalPixels::Rgba(
                Cow::Borrowed(data),
                AlphaMode::Premultiplied
            )),
            TgaPixels::Other(data, colorspace) => {
                let rgba = convert_to_rgba(data, colorspace)?;
                Ok(CanonicalPixels::Rgba(Cow::Owned(rgba), AlphaMode::Straight))
            }
        }
    }
}

/// Convert an 8 bit layout to RGBA, filling missing alpha with 255
fn convert_to_rgba(data: &[u8], colorspace: ColorSpace) -> Result<Vec<u8>, TgaEncodeErrors> {
    let components = colorspace.num_components();
    let pixels = data.len() / components.max(1);

    let mut output = vec![0_u8; pixels * 4];
    let out_chunks = output.chunks_exact_mut(4);

    match colorspace {
        ColorSpace::LumaA => {
            for (out, px) in out_chunks.zip(data.chunks_exact(2)) {
                out.copy_from_slice(&[px[0], px[0], px[0], px[1]]);
            }
        }
        ColorSpace::RGB => {
            for (out, px) in out_chunks.zip(data.chunks_exact(3)) {
                out.copy_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }
        ColorSpace::BGR => {
            for (out, px) in out_chunks.zip(data.chunks_exact(3)) {
                out.copy_from_slice(&[px[2], px[1], px[0], 255]);
            }
        }
        ColorSpace::BGRA => {
            for (out, px) in out_chunks.zip(data.chunks_exact(4)) {
                out.copy_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
        }
        ColorSpace::ARGB => {
            for (out, px) in out_chunks.zip(data.chunks_exact(4)) {
                out.copy_from_slice(&[px[1], px[2], px[3], px[0]]);
            }
        }
        _ => {
            return Err(TgaEncodeErrors::UnsupportedColorspace(
                colorspace,
                &SUPPORTED_COLORSPACES
            ))
        }
    }
    Ok(output)
}

/// A TGA encoder
///
/// Images are always written uncompressed with a top-left origin,
/// grayscale as 8 bit monochrome and everything else as 32 bit BGRA
/// followed by an extension area recording whether alpha is premultiplied.
///
/// # Example
/// - Encode a 100 by 100 RGBA image
///
/// ```
/// use zune_core::bit_depth::BitDepth;
/// use zune_core::colorspace::ColorSpace;
/// use zune_core::options::EncoderOptions;
/// use zune_tga::{TgaEncodeErrors, TgaEncoder};
///
/// const W: usize = 100;
/// const H: usize = 100;
///
/// fn main() -> Result<(), TgaEncodeErrors> {
///     let pixels: Vec<u8> = (0..W * H * 4).map(|i| (i % 256) as u8).collect();
///     let encoder = TgaEncoder::new(&pixels, EncoderOptions::new(W, H, ColorSpace::RGBA, BitDepth::Eight));
///     let mut sink = vec![];
///     encoder.encode(&mut sink)?;
///     Ok(())
/// }
/// ```
pub struct TgaEncoder<'a> {
    pixel_data: &'a [u8],
    width:      usize,
    height:     usize,
    colorspace: ColorSpace,
    depth:      BitDepth,
    alpha_mode: AlphaMode
}

impl<'a> TgaEncoder<'a> {
    /// Create a new encoder which will encode the pixels
    ///
    /// # Arguments
    /// - data: Pixel data, size must be equal to `width*height*colorspace channels`
    /// - options: Width, height, colorspace and depth of `data`
    ///
    /// # Panics
    /// If the height in `options` is zero, [`EncoderOptions::height`] asserts on it.
    /// Use [`TgaEncoder::from_pixels`] for empty images.
    pub fn new(data: &'a [u8], options: EncoderOptions) -> TgaEncoder<'a> {
        TgaEncoder {
            pixel_data: data,
            width:      options.width(),
            height:     options.height(),
            colorspace: options.colorspace(),
            depth:      options.depth(),
            alpha_mode: AlphaMode::Straight
        }
    }

    /// Create an encoder from tagged pixels
    ///
    /// Either dimension may be zero.
    pub fn from_pixels(pixels: TgaPixels<'a>, width: usize, height: usize) -> TgaEncoder<'a> {
        TgaEncoder {
            pixel_data: pixels.data(),
            width,
            height,
            colorspace: pixels.colorspace(),
            depth: BitDepth::Eight,
            alpha_mode: pixels.alpha_mode()
        }
    }

    /// Mark RGBA input as premultiplied or straight alpha
    ///
    /// Default is straight alpha
    pub fn set_alpha_mode(&mut self, mode: AlphaMode) {
        self.alpha_mode = mode;
    }

    /// Return the maximum size of the encoded image
    ///
    /// Saturates at `usize::MAX` for dimensions TGA can't store.
    pub fn max_size(&self) -> usize {
        self.width
            .saturating_mul(self.height)
            .saturating_mul(4)
            .saturating_add(TGA_HEADER_SIZE + EXT_AREA_SIZE + TGA_FOOTER_SIZE)
    }

    /// Check dimensions, depth, colorspace and input length
    pub(crate) fn check_options(&self) -> Result<(), TgaEncodeErrors> {
        if self.depth != BitDepth::Eight {
            return Err(TgaEncodeErrors::UnsupportedBitDepth(self.depth));
        }
        if self.width > usize::from(u16::MAX) {
            return Err(TgaEncodeErrors::TooLargeDimensions(self.width));
        }
        if self.height > usize::from(u16::MAX) {
            return Err(TgaEncodeErrors::TooLargeDimensions(self.height));
        }
        if !SUPPORTED_COLORSPACES.contains(&self.colorspace) {
            return Err(TgaEncodeErrors::UnsupportedColorspace(
                self.colorspace,
                &SUPPORTED_COLORSPACES
            ));
        }
        // 16 bit dimensions, so this only fails on 32 bit targets
        let plane_size = self
            .width
            .checked_mul(self.height)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or(TgaEncodeErrors::Generic("Image too large for this platform"))?;

        let expected_len = plane_size / 4 * self.colorspace.num_components();

        if self.pixel_data.len() != expected_len {
            return Err(TgaEncodeErrors::TooShortInput(
                expected_len,
                self.pixel_data.len()
            ));
        }
        // the footer stores the extension area offset in 32 bits
        if (TGA_HEADER_SIZE + plane_size) as u64 > u64::from(u32::MAX) {
            return Err(TgaEncodeErrors::Generic(
                "Image too large for a TGA extension area offset"
            ));
        }
        Ok(())
    }

    /// Encode the image into `sink`
    ///
    /// Nothing is written if the options or input are invalid.
    ///
    /// # Returns
    /// - Ok(size): Bytes written
    /// - Err: The error encountered during encoding
    pub fn encode<T: ZByteWriterTrait>(&self, sink: T) -> Result<usize, TgaEncodeErrors> {
        self.check_options()?;

        let pixels = TgaPixels::new(self.pixel_data, self.colorspace, self.alpha_mode).canonical()?;

        let mut writer = ZWriter::new(sink);
        writer.reserve(self.max_size())?;

        let mut header = TgaHeader {
            width: self.width as u16,
            height: self.height as u16,
            flags: FLAG_ORIGIN_TOP,
            ..Default::default()
        };

        match pixels {
            CanonicalPixels::Luma(data) => {
                header.image_type = TgaImageType::Monochrome.to_u8();
                header.bpp = 8;
                header.write(&mut writer)?;

                writer.write_all(data)?;

                // no extension area, absence of alpha is the default
                TgaFooter::new(0).write(&mut writer)?;
            }
            CanonicalPixels::Rgba(data, alpha_mode) => {
                header.image_type = TgaImageType::TrueColor.to_u8();
                header.bpp = 32;
                header.flags |= 8;
                header.write(&mut writer)?;

                let row_size = self.width * 4;
                let mut row = vec![0_u8; row_size];

                if row_size > 0 {
                    for in_row in data.chunks_exact(row_size) {
                        for (out, px) in row.chunks_exact_mut(4).zip(in_row.chunks_exact(4)) {
                            out.copy_from_slice(&[px[2], px[1], px[0], px[3]]);
                        }
                        writer.write_all(&row)?;
                    }
                }

                let attr_type = match alpha_mode {
                    AlphaMode::Straight => ATTR_TYPE_ALPHA,
                    AlphaMode::Premultiplied => ATTR_TYPE_PREMULTIPLIED_ALPHA
                };
                let ext_offset = writer.bytes_written() as u32;

                let mut ext_area = [0_u8; EXT_AREA_SIZE];
                ext_area[..2].copy_from_slice(&(EXT_AREA_SIZE as u16).to_le_bytes());
                ext_area[EXT_AREA_ATTR_TYPE_OFFSET] = attr_type;
                writer.write_all(&ext_area)?;

                TgaFooter::new(ext_offset).write(&mut writer)?;
            }
        }
        trace!("Wrote {} bytes", writer.bytes_written());

        Ok(writer.bytes_written())
    }
}
