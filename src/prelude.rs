// src/prelude.rs
//! Удобные re-export'ы для внешнего кода и бинарников.

pub use crate::core::types::{
    BarcodeFormat, DecodedExtras, DecodedSymbol, GrayImage, LumaImage, Orientation, Point, Quad,
    ResultPoint, Symbology,
};
pub use crate::error::{ReaderError, ReaderResult};
pub use crate::hints::DecodeHints;
