/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use serde::Deserialize;
use xxhash_rust::xxh3::xxh3_128;
use zune_core::colorspace::ColorSpace;
use zune_tga::AlphaMode;

mod tga;

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonColorspace {
    RGB,
    RGBA,
    Luma,
    BGRA
}

impl JsonColorspace {
    pub fn to_colorspace(self) -> ColorSpace {
        match self {
            Self::RGB => ColorSpace::RGB,
            Self::Luma => ColorSpace::Luma,
            Self::RGBA => ColorSpace::RGBA,
            Self::BGRA => ColorSpace::BGRA
        }
    }
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonAlpha {
    Straight,
    Premultiplied
}

impl JsonAlpha {
    pub fn to_alpha_mode(self) -> AlphaMode {
        match self {
            Self::Straight => AlphaMode::Straight,
            Self::Premultiplied => AlphaMode::Premultiplied
        }
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct TestEntry {
    pub name:       String,
    pub width:      usize,
    pub height:     usize,
    pub colorspace: JsonColorspace,
    pub alpha:      Option<JsonAlpha>,
    /// Columns sharing a color, to produce long runs
    pub run:        Option<usize>,
    pub comment:    Option<String>
}

fn hash(contents: &[u8]) -> u128 {
    xxh3_128(contents)
}
