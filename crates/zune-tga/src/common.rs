/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_core::bytestream::{ZByteIoError, ZByteReaderTrait, ZByteWriterTrait, ZReader, ZWriter};

use crate::constants::{
    FLAG_ALPHA_SIZE_MASK, FLAG_ORIGIN_RIGHT, FLAG_ORIGIN_TOP, IMAGE_TYPE_FLAG_RLE,
    IMAGE_TYPE_MASK, IMAGE_TYPE_MONOCHROME, IMAGE_TYPE_PALETTED, IMAGE_TYPE_TRUECOLOR,
    TGA_SIGNATURE
};
use crate::errors::TgaDecodeErrors;

/// The kind of pixel data stored in the file
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TgaImageType {
    /// Pixels are indexes into a color map
    Paletted,
    /// Pixels carry their own color
    TrueColor,
    /// Grayscale pixels
    Monochrome
}

impl TgaImageType {
    pub fn from_u8(num: u8) -> Option<TgaImageType> {
        match num {
            IMAGE_TYPE_PALETTED => Some(TgaImageType::Paletted),
            IMAGE_TYPE_TRUECOLOR => Some(TgaImageType::TrueColor),
            IMAGE_TYPE_MONOCHROME => Some(TgaImageType::Monochrome),
            _ => None
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            TgaImageType::Paletted => IMAGE_TYPE_PALETTED,
            TgaImageType::TrueColor => IMAGE_TYPE_TRUECOLOR,
            TgaImageType::Monochrome => IMAGE_TYPE_MONOCHROME
        }
    }
}

/// How pixel data is laid out after the palette
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TgaEncoding {
    /// One pixel after another
    Raw,
    /// Run length packets
    RunLength
}

/// Interpretation of the alpha channel in decoded pixels
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum AlphaMode {
    /// Color channels are independent of alpha
    #[default]
    Straight,
    /// Color channels have already been multiplied by alpha
    Premultiplied
}

/// The 18 byte header found at the start of every TGA file
///
/// Multi-byte fields are little endian on disk.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TgaHeader {
    /// Length of the image identification field that follows the header
    pub id_length:      u8,
    /// Zero when the file carries no color map
    pub palette_type:   u8,
    /// Raw image type, including the RLE bit
    pub image_type:     u8,
    /// Index of the first color map entry in use
    pub palette_first:  u16,
    /// Number of color map entries
    pub palette_length: u16,
    /// Bits per color map entry
    pub palette_bpp:    u8,
    pub origin_x:       u16,
    pub origin_y:       u16,
    pub width:          u16,
    pub height:         u16,
    /// Bits per pixel
    pub bpp:            u8,
    /// Image descriptor, alpha size and origin bits
    pub flags:          u8
}

/// Layout information derived from a valid header
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct TgaFormat {
    pub image_type: TgaImageType,
    pub encoding:   TgaEncoding,
    pub has_alpha:  bool
}

impl TgaHeader {
    /// Read a header from the current stream position
    pub fn read<T: ZByteReaderTrait>(stream: &mut ZReader<T>) -> Result<TgaHeader, ZByteIoError> {
        Ok(TgaHeader {
            id_length:      stream.read_u8_err()?,
            palette_type:   stream.read_u8_err()?,
            image_type:     stream.read_u8_err()?,
            palette_first:  stream.get_u16_le_err()?,
            palette_length: stream.get_u16_le_err()?,
            palette_bpp:    stream.read_u8_err()?,
            origin_x:       stream.get_u16_le_err()?,
            origin_y:       stream.get_u16_le_err()?,
            width:          stream.get_u16_le_err()?,
            height:         stream.get_u16_le_err()?,
            bpp:            stream.read_u8_err()?,
            flags:          stream.read_u8_err()?
        })
    }

    /// Write the header in its on-disk layout
    pub fn write<T: ZByteWriterTrait>(&self, writer: &mut ZWriter<T>) -> Result<(), ZByteIoError> {
        writer.write_u8_err(self.id_length)?;
        writer.write_u8_err(self.palette_type)?;
        writer.write_u8_err(self.image_type)?;
        writer.write_u16_le_err(self.palette_first)?;
        writer.write_u16_le_err(self.palette_length)?;
        writer.write_u8_err(self.palette_bpp)?;
        writer.write_u16_le_err(self.origin_x)?;
        writer.write_u16_le_err(self.origin_y)?;
        writer.write_u16_le_err(self.width)?;
        writer.write_u16_le_err(self.height)?;
        writer.write_u8_err(self.bpp)?;
        writer.write_u8_err(self.flags)?;
        Ok(())
    }

    pub const fn encoding(&self) -> TgaEncoding {
        if self.image_type & IMAGE_TYPE_FLAG_RLE != 0 {
            TgaEncoding::RunLength
        } else {
            TgaEncoding::Raw
        }
    }
    /// Number of attribute bits per pixel
    pub const fn alpha_size(&self) -> u8 {
        self.flags & FLAG_ALPHA_SIZE_MASK
    }

    pub const fn origin_is_right(&self) -> bool {
        self.flags & FLAG_ORIGIN_RIGHT != 0
    }

    pub const fn origin_is_top(&self) -> bool {
        self.flags & FLAG_ORIGIN_TOP != 0
    }

    /// Bytes per stored pixel
    pub const fn pixel_size(&self) -> usize {
        (self.bpp >> 3) as usize
    }

    /// Bytes per color map entry
    pub const fn palette_entry_size(&self) -> usize {
        (self.palette_bpp as usize + 7) >> 3
    }

    /// Number of color map entries addressable by pixel indexes
    pub const fn palette_entries(&self) -> usize {
        self.palette_length.saturating_sub(self.palette_first) as usize
    }

    /// Check that the header describes an image we can decode
    ///
    /// This doesn't look at the extension area, so `has_alpha` is what
    /// the header alone implies.
    pub(crate) fn validate(&self) -> Result<TgaFormat, TgaDecodeErrors> {
        let encoding = self.encoding();
        let raw_type = self.image_type & IMAGE_TYPE_MASK;

        let alpha_size = self.alpha_size();

        if alpha_size != 0 && alpha_size != 1 && alpha_size != 8 {
            return Err(TgaDecodeErrors::InvalidAlphaSize(alpha_size));
        }

        let has_alpha = alpha_size != 0
            || self.bpp == 32
            || (raw_type == IMAGE_TYPE_MONOCHROME && self.bpp == 16)
            || (raw_type == IMAGE_TYPE_PALETTED && self.palette_bpp == 32);

        let image_type = TgaImageType::from_u8(raw_type)
            .ok_or(TgaDecodeErrors::UnsupportedImageType(raw_type))?;

        let is_valid = match image_type {
            TgaImageType::Paletted => {
                if self.palette_type == 0 {
                    return Err(TgaDecodeErrors::InvalidPalette(
                        "Paletted image without a color map"
                    ));
                }
                if self.palette_first >= self.palette_length {
                    return Err(TgaDecodeErrors::InvalidPalette(
                        "First palette entry is past the palette length"
                    ));
                }
                if !matches!(self.palette_bpp, 15 | 16 | 24 | 32) {
                    return Err(TgaDecodeErrors::InvalidPalette(
                        "Palette entries must be 15, 16, 24 or 32 bits"
                    ));
                }
                self.bpp == 8
            }
            TgaImageType::TrueColor => {
                self.bpp == 32 || self.bpp == 16 || (self.bpp == 24 && !has_alpha)
            }
            TgaImageType::Monochrome => {
                (has_alpha && self.bpp == 16) || (!has_alpha && self.bpp == 8)
            }
        };

        if !is_valid {
            return Err(TgaDecodeErrors::InvalidImageFormat {
                image_type: raw_type,
                bpp:        self.bpp
            });
        }

        Ok(TgaFormat {
            image_type,
            encoding,
            has_alpha
        })
    }
}

/// The 26 byte footer at the end of a TGA 2.0 file
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TgaFooter {
    /// Absolute offset of the extension area, zero if absent
    pub ext_area_offset: u32,
    /// Absolute offset of the developer directory, zero if absent
    pub dev_dir_offset:  u32,
    pub signature:       [u8; 18]
}

impl TgaFooter {
    /// A footer with a valid signature pointing to an
    /// extension area at `ext_area_offset`
    pub const fn new(ext_area_offset: u32) -> TgaFooter {
        TgaFooter {
            ext_area_offset,
            dev_dir_offset: 0,
            signature: *TGA_SIGNATURE
        }
    }

    pub fn read<T: ZByteReaderTrait>(stream: &mut ZReader<T>) -> Result<TgaFooter, ZByteIoError> {
        Ok(TgaFooter {
            ext_area_offset: stream.get_u32_le_err()?,
            dev_dir_offset:  stream.get_u32_le_err()?,
            signature:       stream.read_fixed_bytes_or_error::<18>()?
        })
    }

    pub fn write<T: ZByteWriterTrait>(&self, writer: &mut ZWriter<T>) -> Result<(), ZByteIoError> {
        writer.write_u32_le_err(self.ext_area_offset)?;
        writer.write_u32_le_err(self.dev_dir_offset)?;
        writer.write_const_bytes(&self.signature)?;
        Ok(())
    }

    /// Whether this is a TGA 2.0 footer, i.e. the signature matches
    pub fn is_valid(&self) -> bool {
        &self.signature == TGA_SIGNATURE
    }
}

#[cfg(test)]
mod tests {
    use zune_core::bytestream::ZCursor;

    use super::*;
    use crate::errors::TgaDecodeErrors;

    fn truecolor(bpp: u8, flags: u8) -> TgaHeader {
        TgaHeader {
            image_type: IMAGE_TYPE_TRUECOLOR,
            width: 2,
            height: 2,
            bpp,
            flags,
            ..Default::default()
        }
    }

    #[test]
    fn header_reads_little_endian_fields() {
        let bytes: [u8; 18] = [
            3, 1, 9, 2, 0, 0x10, 0x01, 24, 5, 0, 6, 0, 0x34, 0x12, 0x02, 0x01, 8, 0x28
        ];
        let mut reader = ZReader::new(ZCursor::new(&bytes[..]));
        let header = TgaHeader::read(&mut reader).unwrap();

        assert_eq!(header.id_length, 3);
        assert_eq!(header.palette_first, 2);
        assert_eq!(header.palette_length, 0x110);
        assert_eq!(header.palette_bpp, 24);
        assert_eq!(header.origin_x, 5);
        assert_eq!(header.origin_y, 6);
        assert_eq!(header.width, 0x1234);
        assert_eq!(header.height, 0x0102);
        assert_eq!(header.encoding(), TgaEncoding::RunLength);
        assert_eq!(header.alpha_size(), 8);
        assert!(header.origin_is_top());
        assert!(!header.origin_is_right());
    }

    #[test]
    fn header_write_matches_read() {
        let header = TgaHeader {
            id_length: 1,
            palette_type: 1,
            image_type: IMAGE_TYPE_PALETTED,
            palette_first: 4,
            palette_length: 300,
            palette_bpp: 32,
            width: 640,
            height: 480,
            bpp: 8,
            flags: FLAG_ORIGIN_TOP,
            ..Default::default()
        };
        let mut out = vec![];
        header.write(&mut ZWriter::new(&mut out)).unwrap();
        assert_eq!(out.len(), crate::constants::TGA_HEADER_SIZE);

        let parsed = TgaHeader::read(&mut ZReader::new(ZCursor::new(&out))).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn alpha_size_must_be_zero_one_or_eight() {
        for size in 0..16 {
            let result = truecolor(32, size).validate();
            match size {
                0 | 1 | 8 => assert!(result.is_ok()),
                _ => assert!(matches!(result, Err(TgaDecodeErrors::InvalidAlphaSize(s)) if s == size))
            }
        }
    }

    #[test]
    fn truecolor_24_bit_rejects_alpha() {
        assert!(truecolor(24, 0).validate().is_ok());
        assert!(matches!(
            truecolor(24, 8).validate(),
            Err(TgaDecodeErrors::InvalidImageFormat { bpp: 24, .. })
        ));
        assert!(truecolor(8, 0).validate().is_err());
    }

    #[test]
    fn monochrome_depth_follows_alpha() {
        let mut header = truecolor(8, 0);
        header.image_type = IMAGE_TYPE_MONOCHROME;
        let format = header.validate().unwrap();
        assert!(!format.has_alpha);

        header.bpp = 16;
        let format = header.validate().unwrap();
        assert!(format.has_alpha);

        header.bpp = 8;
        header.flags = 8;
        assert!(header.validate().is_err());
    }

    #[test]
    fn paletted_requires_color_map() {
        let mut header = TgaHeader {
            palette_type: 1,
            image_type: IMAGE_TYPE_PALETTED | IMAGE_TYPE_FLAG_RLE,
            palette_length: 16,
            palette_bpp: 24,
            bpp: 8,
            ..Default::default()
        };
        let format = header.validate().unwrap();
        assert_eq!(format.image_type, TgaImageType::Paletted);
        assert_eq!(format.encoding, TgaEncoding::RunLength);

        header.palette_bpp = 8;
        assert!(matches!(header.validate(), Err(TgaDecodeErrors::InvalidPalette(_))));

        header.palette_bpp = 15;
        header.palette_first = 16;
        assert!(matches!(header.validate(), Err(TgaDecodeErrors::InvalidPalette(_))));
    }

    #[test]
    fn unknown_image_type_is_rejected() {
        let header = truecolor(32, 0);
        let header = TgaHeader {
            image_type: 0,
            ..header
        };
        assert!(matches!(
            header.validate(),
            Err(TgaDecodeErrors::UnsupportedImageType(0))
        ));
    }

    #[test]
    fn footer_signature() {
        let footer = TgaFooter::new(100);
        assert!(footer.is_valid());

        let mut out = vec![];
        footer.write(&mut ZWriter::new(&mut out)).unwrap();
        assert_eq!(out.len(), crate::constants::TGA_FOOTER_SIZE);
        assert_eq!(&out[8..], TGA_SIGNATURE);

        let mut broken = footer;
        broken.signature[0] = b'X';
        assert!(!broken.is_valid());
    }
}
