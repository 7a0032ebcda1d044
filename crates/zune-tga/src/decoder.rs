/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec;
use alloc::vec::Vec;

use zune_core::bit_depth::BitDepth;
use zune_core::bytestream::{ZByteReaderTrait, ZReader, ZSeekFrom};
use zune_core::colorspace::ColorSpace;
use zune_core::log::{trace, warn};
use zune_core::options::DecoderOptions;

use crate::common::{AlphaMode, TgaEncoding, TgaFooter, TgaHeader, TgaImageType};
use crate::constants::{
    ATTR_TYPE_ALPHA, ATTR_TYPE_NO_ALPHA, ATTR_TYPE_PREMULTIPLIED_ALPHA,
    EXT_AREA_ATTR_TYPE_OFFSET, RLE_COUNT_MASK, RLE_PACKET_FLAG, TGA_FOOTER_SIZE, TGA_HEADER_SIZE
};
use crate::errors::TgaDecodeErrors;
use crate::utils::{flip_horizontal, flip_vertical, unpack_555};

/// Converts one stored pixel into RGBA
struct PixelExpander<'a> {
    image_type:  TgaImageType,
    has_alpha:   bool,
    palette:     &'a [u8],
    palette_bpp: u8
}

impl<'a> PixelExpander<'a> {
    /// Expand `src`, which holds exactly one stored pixel, into
    /// the four bytes of `dst`
    #[inline(always)]
    fn expand(&self, src: &[u8], dst: &mut [u8]) -> Result<(), TgaDecodeErrors> {
        let mut alpha = 255;

        let [r, g, b] = match *src {
            [b, g, r, a] => {
                if self.has_alpha {
                    alpha = a;
                }
                [r, g, b]
            }
            [b, g, r] => [r, g, b],
            [v, a] if self.image_type == TgaImageType::Monochrome => {
                if self.has_alpha {
                    alpha = a;
                }
                [v, v, v]
            }
            [lo, hi] => {
                let word = u16::from_le_bytes([lo, hi]);
                // top bit is the attribute bit, clear means transparent
                if self.has_alpha && (word & (1 << 15)) == 0 {
                    alpha = 0;
                }
                unpack_555(word)
            }
            [index] if self.image_type == TgaImageType::Paletted => {
                return self.expand_palette(usize::from(index), dst);
            }
            [v] => [v, v, v],
            _ => unreachable!()
        };

        dst[0] = r;
        dst[1] = g;
        dst[2] = b;
        dst[3] = alpha;

        Ok(())
    }

    fn expand_palette(&self, index: usize, dst: &mut [u8]) -> Result<(), TgaDecodeErrors> {
        let entry_size = (usize::from(self.palette_bpp) + 7) >> 3;
        let entries = self.palette.len() / entry_size;

        if index >= entries {
            return Err(TgaDecodeErrors::PaletteIndexOutOfRange(index, entries));
        }
        let entry = &self.palette[index * entry_size..(index + 1) * entry_size];

        match *entry {
            [b, g, r, a] => {
                dst[0] = r;
                dst[1] = g;
                dst[2] = b;
                dst[3] = if self.has_alpha { a } else { 255 };
            }
            [b, g, r] => {
                dst[0] = r;
                dst[1] = g;
                dst[2] = b;
                dst[3] = 255;
            }
            [lo, hi] => {
                let [r, g, b] = unpack_555(u16::from_le_bytes([lo, hi]));
                dst[0] = r;
                dst[1] = g;
                dst[2] = b;
                dst[3] = 255;
            }
            _ => unreachable!()
        }
        Ok(())
    }
}

/// A TGA decoder
///
/// The decoder reads the 18 byte header, resolves the alpha
/// interpretation from the TGA 2.0 extension area and expands every
/// pixel into RGBA with a top-left origin.
///
/// The footer is required, streams shorter than 26 bytes are rejected
/// even if the header parses.
///
/// # Extracting image metadata
/// ```no_run
/// use zune_core::bytestream::ZCursor;
/// use zune_tga::TgaDecoder;
///
/// fn main() -> Result<(), zune_tga::TgaDecodeErrors> {
///     let mut decoder = TgaDecoder::new(ZCursor::new(b"TGA"));
///     decoder.decode_headers()?;
///     let (w, h) = decoder.dimensions().unwrap();
///     println!("Image width: {}\t Image height: {}", w, h);
///     println!("Alpha: {:?}", decoder.alpha_mode().unwrap());
///     Ok(())
/// }
/// ```
///
/// # Getting the pixels
/// ```no_run
/// use zune_core::bytestream::ZCursor;
/// use zune_tga::TgaDecoder;
///
/// fn main() -> Result<(), zune_tga::TgaDecodeErrors> {
///     let mut decoder = TgaDecoder::new(ZCursor::new(b"TGA"));
///     let pixels = decoder.decode()?;
///     println!("Pixels length:{}", pixels.len());
///     Ok(())
/// }
/// ```
pub struct TgaDecoder<T>
where
    T: ZByteReaderTrait
{
    stream:          ZReader<T>,
    options:         DecoderOptions,
    header:          TgaHeader,
    image_type:      TgaImageType,
    encoding:        TgaEncoding,
    has_alpha:       bool,
    alpha_mode:      AlphaMode,
    width:           usize,
    height:          usize,
    palette:         Vec<u8>,
    stream_len:      usize,
    decoded_headers: bool
}

impl<T> TgaDecoder<T>
where
    T: ZByteReaderTrait
{
    /// Create a new TGA decoder with the default options
    ///
    /// # Arguments
    /// - `data`: The encoded TGA stream
    pub fn new(data: T) -> TgaDecoder<T> {
        TgaDecoder::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new TGA decoder that obeys the limits in `options`
    ///
    /// E.g can be used to set width and height limits to prevent OOM attacks
    ///
    /// # Example
    /// ```
    /// use zune_core::bytestream::ZCursor;
    /// use zune_core::options::DecoderOptions;
    /// use zune_tga::TgaDecoder;
    ///
    /// let options = DecoderOptions::default().set_max_width(10).set_max_height(10);
    /// let decoder = TgaDecoder::new_with_options(ZCursor::new(b""), options);
    /// ```
    pub fn new_with_options(data: T, options: DecoderOptions) -> TgaDecoder<T> {
        TgaDecoder {
            stream: ZReader::new(data),
            options,
            header: TgaHeader::default(),
            image_type: TgaImageType::TrueColor,
            encoding: TgaEncoding::Raw,
            has_alpha: false,
            alpha_mode: AlphaMode::Straight,
            width: 0,
            height: 0,
            palette: vec![],
            stream_len: 0,
            decoded_headers: false
        }
    }

    /// Decode the header and the extension area, storing
    /// the results in the decoder
    ///
    /// Neither palette nor pixel data is read.
    ///
    /// # Returns
    /// - `Ok(())`: Headers were valid, image information can be queried
    /// - `Err`: The reason the stream can't be decoded
    pub fn decode_headers(&mut self) -> Result<(), TgaDecodeErrors> {
        if self.decoded_headers {
            return Ok(());
        }
        self.stream.set_position(0)?;

        let header = TgaHeader::read(&mut self.stream)?;
        let format = header.validate()?;

        let width = usize::from(header.width);
        let height = usize::from(header.height);

        if width > self.options.max_width() {
            return Err(TgaDecodeErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                width
            ));
        }
        if height > self.options.max_height() {
            return Err(TgaDecodeErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                height
            ));
        }

        self.header = header;
        self.image_type = format.image_type;
        self.encoding = format.encoding;
        self.has_alpha = format.has_alpha;
        self.alpha_mode = AlphaMode::Straight;
        self.width = width;
        self.height = height;

        self.apply_extensions()?;

        trace!("Image width: {}", self.width);
        trace!("Image height: {}", self.height);
        trace!("Image type: {:?}", self.image_type);
        trace!("Encoding: {:?}", self.encoding);
        trace!("Bits per pixel: {}", self.header.bpp);
        trace!("Alpha: {} {:?}", self.has_alpha, self.alpha_mode);

        self.decoded_headers = true;

        Ok(())
    }

    /// Read the footer and, if it points to an extension area,
    /// the attribute type that tells how to treat alpha
    fn apply_extensions(&mut self) -> Result<(), TgaDecodeErrors> {
        let length = self.stream.seek(ZSeekFrom::End(0))? as usize;
        self.stream_len = length;

        if length < TGA_FOOTER_SIZE {
            return Err(TgaDecodeErrors::MissingFooter(length));
        }
        self.stream.set_position(length - TGA_FOOTER_SIZE)?;

        let footer = TgaFooter::read(&mut self.stream)?;

        if !footer.is_valid() {
            warn!("No TGA 2.0 signature in footer, using header alpha");
            return Ok(());
        }
        if footer.ext_area_offset == 0 {
            return Ok(());
        }
        let offset = footer.ext_area_offset as usize + EXT_AREA_ATTR_TYPE_OFFSET;

        self.stream.set_position(offset)?;

        match self.stream.read_u8_err()? {
            ATTR_TYPE_ALPHA => {
                self.has_alpha = true;
                self.alpha_mode = AlphaMode::Straight;
            }
            ATTR_TYPE_PREMULTIPLIED_ALPHA => {
                self.has_alpha = true;
                self.alpha_mode = AlphaMode::Premultiplied;
            }
            ATTR_TYPE_NO_ALPHA => {
                self.has_alpha = false;
            }
            _ => {
                warn!("Attribute type is not an alpha channel, ignoring it");
                self.has_alpha = false;
            }
        }
        Ok(())
    }

    /// Return the number of bytes required to hold a decoded image frame
    ///
    /// # Returns
    ///  - `Some(usize)`: Minimum size for a buffer needed to decode the image
    ///  - `None`: Headers haven't been decoded or the size overflows
    pub fn output_buffer_size(&self) -> Option<usize> {
        if !self.decoded_headers {
            return None;
        }
        self.width.checked_mul(self.height)?.checked_mul(4)
    }

    /// Decode the TGA image returning RGBA pixels with a
    /// top-left origin
    ///
    /// # Returns
    /// - On success: The decoded pixels, `width*height*4` bytes
    /// - On error: The reason the image couldn't be decoded
    pub fn decode(&mut self) -> Result<Vec<u8>, TgaDecodeErrors> {
        self.decode_headers()?;

        let size = self
            .output_buffer_size()
            .ok_or(TgaDecodeErrors::GenericStatic("Output size overflowed"))?;

        // don't allocate for pixels the stream can't hold
        self.check_plane_size()?;

        let mut output = vec![0; size];
        self.decode_into(&mut output)?;

        Ok(output)
    }

    /// Decode the TGA image into `pixels`
    ///
    /// Returns an error if the buffer cannot hold `width*height*4` bytes.
    /// On error the contents of `pixels` are unspecified.
    pub fn decode_into(&mut self, pixels: &mut [u8]) -> Result<(), TgaDecodeErrors> {
        self.decode_headers()?;

        let size = self
            .output_buffer_size()
            .ok_or(TgaDecodeErrors::GenericStatic("Output size overflowed"))?;

        if pixels.len() < size {
            return Err(TgaDecodeErrors::TooSmallOutput(size, pixels.len()));
        }
        let pixels = &mut pixels[..size];

        self.check_plane_size()?;

        // skip header and image id
        self.stream
            .set_position(TGA_HEADER_SIZE + usize::from(self.header.id_length))?;

        if self.image_type == TgaImageType::Paletted {
            self.read_palette()?;
        }

        match self.header.pixel_size() {
            1 => self.decode_plane::<1>(pixels)?,
            2 => self.decode_plane::<2>(pixels)?,
            3 => self.decode_plane::<3>(pixels)?,
            4 => self.decode_plane::<4>(pixels)?,
            _ => unreachable!()
        }

        if self.header.origin_is_right() {
            flip_horizontal(pixels, self.width);
        }
        if !self.header.origin_is_top() {
            flip_vertical(pixels, self.width, self.height);
        }
        trace!("Finished decoding image");

        Ok(())
    }

    /// Fail if the stream is shorter than the smallest pixel data
    /// that could describe the image
    fn check_plane_size(&self) -> Result<(), TgaDecodeErrors> {
        let header = &self.header;

        let mut data_start = TGA_HEADER_SIZE + usize::from(header.id_length);

        if self.image_type == TgaImageType::Paletted {
            data_start += header.palette_entry_size() * usize::from(header.palette_length);
        }
        let pixels = self.width.saturating_mul(self.height);
        let pixel_size = header.pixel_size();

        let needed = match self.encoding {
            TgaEncoding::Raw => pixels.saturating_mul(pixel_size),
            // every packet covers at most 128 pixels
            TgaEncoding::RunLength => pixels.div_ceil(128).saturating_mul(1 + pixel_size)
        };
        let available = self.stream_len.saturating_sub(data_start);

        if needed > available {
            return Err(TgaDecodeErrors::TruncatedData(needed, available));
        }
        Ok(())
    }

    fn read_palette(&mut self) -> Result<(), TgaDecodeErrors> {
        let entry_size = self.header.palette_entry_size();
        let entries = self.header.palette_entries();

        // entries before palette_first can't be indexed
        self.stream
            .skip(entry_size * usize::from(self.header.palette_first))?;

        self.palette.resize(entry_size * entries, 0);
        self.stream.read_exact_bytes(&mut self.palette)?;

        trace!("Palette entries: {}", entries);

        Ok(())
    }

    fn decode_plane<const SIZE: usize>(&mut self, pixels: &mut [u8]) -> Result<(), TgaDecodeErrors> {
        let expander = PixelExpander {
            image_type:  self.image_type,
            has_alpha:   self.has_alpha,
            palette:     &self.palette,
            palette_bpp: self.header.palette_bpp
        };
        let stream = &mut self.stream;

        match self.encoding {
            TgaEncoding::Raw => {
                for pixel in pixels.chunks_exact_mut(4) {
                    let src = stream.read_fixed_bytes_or_error::<SIZE>()?;
                    expander.expand(&src, pixel)?;
                }
            }
            TgaEncoding::RunLength => {
                let mut position = 0;
                let mut px = [0_u8; 4];

                while position < pixels.len() {
                    let packet = stream.read_u8_err()?;
                    let count = usize::from(packet & RLE_COUNT_MASK) + 1;
                    // packets crossing the end of the image are clipped
                    let end = pixels.len().min(position + count * 4);

                    if packet & RLE_PACKET_FLAG != 0 {
                        let src = stream.read_fixed_bytes_or_error::<SIZE>()?;
                        expander.expand(&src, &mut px)?;

                        for pixel in pixels[position..end].chunks_exact_mut(4) {
                            pixel.copy_from_slice(&px);
                        }
                    } else {
                        for pixel in pixels[position..end].chunks_exact_mut(4) {
                            let src = stream.read_fixed_bytes_or_error::<SIZE>()?;
                            expander.expand(&src, pixel)?;
                        }
                    }
                    position = end;
                }
            }
        }
        Ok(())
    }

    /// Return the parsed header, or `None` if
    /// headers haven't been decoded
    pub const fn header(&self) -> Option<&TgaHeader> {
        if self.decoded_headers {
            Some(&self.header)
        } else {
            None
        }
    }

    /// Return the width and height of the image
    ///
    /// Or none if the headers haven't been decoded
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if self.decoded_headers {
            return Some((self.width, self.height));
        }
        None
    }

    /// Return the colorspace of decoded pixels
    ///
    /// This is always [`ColorSpace::RGBA`] once headers are decoded
    pub const fn colorspace(&self) -> Option<ColorSpace> {
        if self.decoded_headers {
            Some(ColorSpace::RGBA)
        } else {
            None
        }
    }

    /// Return whether decoded pixels carry straight or
    /// premultiplied alpha
    pub const fn alpha_mode(&self) -> Option<AlphaMode> {
        if self.decoded_headers {
            Some(self.alpha_mode)
        } else {
            None
        }
    }

    /// Return TGA bit depth of decoded pixels
    ///
    /// This is always 8
    pub const fn bit_depth(&self) -> BitDepth {
        BitDepth::Eight
    }
}
