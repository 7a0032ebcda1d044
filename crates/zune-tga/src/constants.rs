/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Size of the fixed TGA header
pub const TGA_HEADER_SIZE: usize = 18;
/// Size of the TGA 2.0 footer
pub const TGA_FOOTER_SIZE: usize = 26;
/// Signature terminating every TGA 2.0 file
pub const TGA_SIGNATURE: &[u8; 18] = b"TRUEVISION-XFILE.\0";

pub const FLAG_ORIGIN_RIGHT: u8 = 1 << 4;
pub const FLAG_ORIGIN_TOP: u8 = 1 << 5;
pub const FLAG_ALPHA_SIZE_MASK: u8 = 0x0f;

pub const IMAGE_TYPE_PALETTED: u8 = 1;
pub const IMAGE_TYPE_TRUECOLOR: u8 = 2;
pub const IMAGE_TYPE_MONOCHROME: u8 = 3;
pub const IMAGE_TYPE_MASK: u8 = 3;
pub const IMAGE_TYPE_FLAG_RLE: u8 = 1 << 3;

/// Offset of the attribute type inside the extension area
pub const EXT_AREA_ATTR_TYPE_OFFSET: usize = 0x1ee;

pub const ATTR_TYPE_NO_ALPHA: u8 = 0;
pub const ATTR_TYPE_ALPHA: u8 = 3;
pub const ATTR_TYPE_PREMULTIPLIED_ALPHA: u8 = 4;

// RLE packet header
pub const RLE_PACKET_FLAG: u8 = 1 << 7;
pub const RLE_COUNT_MASK: u8 = 0x7f;
