// src/qr/detector.rs
//! Оркестрация полного QR-пайплайна (§4.G, §8 QR-сценарии): поиск
//! finder-паттернов → подбор версии/размерности → чтение формат-слова →
//! семплинг сетки → снятие маски и служебных модулей → деинтерливинг+RS →
//! разбор битового потока.
//!
//! Раньше (`Xzdes-ultracode`'s `api::try_decode_qr_v1_all_levels_with_correction`)
//! версия была жёстко зафиксирована (v1, 21×21); здесь размерность не
//! оценивается по расстоянию между finder-центрами и уточнению
//! alignment-паттерна (это потребовало бы итеративного уточнения гомографии,
//! которое трудно провалидировать руками без компилятора), а подбирается
//! перебором версий 1..40 с проверкой по защищённому BCH(15,5) формат-слову:
//! ложные совпадения на случайном шуме статистически исчезающе редки
//! (BCH допускает лишь 3-битные ошибки на 32 валидных кодовых слова из 2^15).
//! Решение зафиксировано как ответ на открытый вопрос в DESIGN.md.

use crate::core::binarizer::{BinaryBitmap, HybridBinarizer};
use crate::core::luminance::BufferLuminanceSource;
use crate::error::{ReaderError, ReaderResult};
use crate::prelude::{DecodedSymbol, Point, Quad, Symbology};
use super::finder::{self, PointF};
use super::format::{decode_format_word, format_bit_positions};
use super::databits::{function_pattern_mask, read_codewords};
use super::datablock::deinterleave_and_correct;
use super::decoder::decode_bitstream;
use super::sample::{sample_grid, SymbolCorners};
use super::version::Version;
use super::QrOptions;
use crate::core::types::GrayImage;

fn to_point(p: PointF) -> Point {
    Point { x: p.x, y: p.y }
}

fn read_word(modules: &crate::core::bits::BitMatrix, track: &[(usize, usize); 15]) -> u32 {
    let mut v = 0u32;
    for (i, &(x, y)) in track.iter().enumerate() {
        if modules.get(x, y) {
            v |= 1 << i;
        }
    }
    v
}

const MAX_VERSION_TO_TRY: u8 = 40;

/// Находит и декодирует один QR-символ на изображении.
pub fn detect_and_decode(img: &GrayImage<'_>, opts: &QrOptions) -> ReaderResult<DecodedSymbol> {
    let finders = finder::find_finder_patterns(img, opts);
    if finders.len() < 3 {
        return Err(ReaderError::NotFound);
    }
    decode_from_finders(img, opts, finders[0], finders[1], finders[2])
}

/// Декодировать QR-символ при уже известной тройке finder-центров
/// (bottom-left, top-left, top-right). Вынесено из `detect_and_decode`,
/// чтобы `qr::multi` могло прогонять пайплайн по каждой тройке, найденной
/// группировкой кластеров, независимо от одиночного поиска.
pub fn decode_from_finders(
    img: &GrayImage<'_>,
    opts: &QrOptions,
    bl: PointF,
    tl: PointF,
    tr: PointF,
) -> ReaderResult<DecodedSymbol> {
    let src = BufferLuminanceSource::from_slice(img.data, img.width, img.height);
    let bitmap = BinaryBitmap::new(HybridBinarizer::new(src));
    let black = bitmap.black_matrix()?;

    for version_num in 1..=MAX_VERSION_TO_TRY {
        let version = Version::new(version_num);
        let dim = version.dimension();
        let corners = SymbolCorners::from_finders(tl, tr, bl);
        let sampled = match sample_grid(&black, dim, corners) {
            Ok(m) => m,
            Err(_) => continue,
        };

        let [track1, track2] = format_bit_positions(dim);
        let word_a = read_word(&sampled, &track1);
        let word_b = read_word(&sampled, &track2);

        let decoded_fmt = decode_format_word(word_a).or_else(|| decode_format_word(word_b));
        let Some((ec, mask_id, _dist)) = decoded_fmt else {
            continue;
        };
        if !opts.allowed_ec_levels.is_empty() && !opts.allowed_ec_levels.contains(&ec) {
            continue;
        }

        let function_mask = function_pattern_mask(&version);
        let raw = read_codewords(&sampled, &function_mask, mask_id, &version);
        let data = match deinterleave_and_correct(&raw, &version, ec) {
            Ok(d) => d,
            Err(_) => continue,
        };
        let parsed = match decode_bitstream(&data, &version, opts.character_set.as_deref()) {
            Ok(p) => p,
            Err(_) => continue,
        };

        let quad = Quad::new(to_point(corners.tl), to_point(corners.tr), to_point(corners.br), to_point(corners.bl));
        let symbol = DecodedSymbol::new(Symbology::QR, parsed.text)
            .with_quad(quad)
            .with_byte_segments(parsed.byte_segments)
            .with_extras(parsed.extras);
        return Ok(symbol);
    }

    Err(ReaderError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::encode::synthesize_qr_v1_from_text;

    #[test]
    fn detects_and_decodes_synthetic_v1_qr() {
        let img = synthesize_qr_v1_from_text("HI", 3, 4);
        let opts = QrOptions::default();
        let res = detect_and_decode(&img, &opts);
        assert!(res.is_ok(), "expected successful decode: {res:?}");
        let sym = res.unwrap();
        assert_eq!(sym.symbology, Symbology::QR);
        assert_eq!(sym.text, "HI");
    }
}
