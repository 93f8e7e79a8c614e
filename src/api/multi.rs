// src/api/multi.rs
//! Диспетчер форматов, управляемый картой подсказок (см. §4.K, §8).
//!
//! В отличие от `Pipeline` (фиксированный набор включённых декодеров),
//! `MultiFormatReader` принимает `DecodeHints.possible_formats` и
//! отфильтровывает уже декодированные символы по этому набору — а не
//! отключает сами декодеры. Это важно для UPC/EAN: `ean13::decode_row`
//! декодирует и EAN-13, и UPC-A одним и тем же проходом (UPC-A — это
//! EAN-13 с ведущим нулём, «rewrite rule» из `MultiFormatUPCEANReader`),
//! так что при `possible_formats = {UpcA}` декодер всё равно обязан
//! отработать на строке EAN-13 — и только результат с "неправильной"
//! символогией отбрасывается, вместо ложного совпадения с UPC-A.

use super::Pipeline;
use crate::error::{ReaderError, ReaderResult};
use crate::hints::DecodeHints;
use crate::prelude::{DecodedSymbol, LumaImage};

/// Единая точка входа с учётом подсказок вызывающего кода.
#[derive(Clone, Debug, Default)]
pub struct MultiFormatReader {
    pipeline: Pipeline,
}

impl MultiFormatReader {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Декодировать первый подходящий под `hints.possible_formats` символ.
    pub fn decode(&self, img: &LumaImage, hints: &DecodeHints) -> ReaderResult<DecodedSymbol> {
        self.decode_all(img, hints)
            .into_iter()
            .next()
            .ok_or(ReaderError::NotFound)
    }

    /// Декодировать все символы, допускаемые подсказками.
    ///
    /// Запускает полный `Pipeline` (все декодеры), затем отбрасывает
    /// результаты не из `hints.possible_formats`. Пустой `possible_formats`
    /// разрешает всё (см. `DecodeHints::allows`).
    pub fn decode_all(&self, img: &LumaImage, hints: &DecodeHints) -> Vec<DecodedSymbol> {
        let pipeline = self.pipeline.with_qr_character_set(hints.character_set.clone());
        pipeline
            .decode_all(img)
            .into_iter()
            .filter(|sym| hints.allows(sym.symbology))
            .inspect(|sym| {
                if let Some(q) = sym.quad {
                    hints.emit_point(q.p0);
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Symbology;
    use crate::one_d::ean13::synthesize_ideal_row;
    use std::collections::BTreeSet;

    fn stacked_rows(row: &[u8], height: usize) -> Vec<u8> {
        row.iter().copied().cycle().take(row.len() * height).collect()
    }

    #[test]
    fn restricting_to_upca_rejects_true_ean13() {
        // "4006381333931" — валидный EAN-13, не начинается с '0' => не UPC-A.
        let row = synthesize_ideal_row("4006381333931", 3);
        let data = stacked_rows(&row, 15);
        let img = crate::core::types::GrayImage::new(&data, row.len(), 15);

        let mut hints = DecodeHints::new();
        hints.possible_formats = BTreeSet::from([Symbology::UpcA]);

        let reader = MultiFormatReader::new();
        let result = reader.decode(&img, &hints);
        assert_eq!(result, Err(ReaderError::NotFound));
    }

    #[test]
    fn unrestricted_hints_find_the_ean13() {
        let row = synthesize_ideal_row("4006381333931", 3);
        let data = stacked_rows(&row, 15);
        let img = crate::core::types::GrayImage::new(&data, row.len(), 15);

        let hints = DecodeHints::new();
        let reader = MultiFormatReader::new();
        let results = reader.decode_all(&img, &hints);
        assert!(results.iter().any(|s| s.symbology == Symbology::Ean13 && s.text == "4006381333931"));
    }
}
