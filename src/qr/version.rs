// src/qr/version.rs
//! Таблица версий QR (§3 "QR Version", §4.G dimension estimate, §4.H.2,
//! §4.I.1 block layout).
//!
//! Константы ниже — стандартные таблицы ISO/IEC 18004, взятые построчно из
//! `examples/nayuki-QR-Code-generator/rust/src/lib.rs` (`ECC_CODEWORDS_PER_BLOCK`,
//! `NUM_ERROR_CORRECTION_BLOCKS`) и его формулы `get_alignment_pattern_positions`/
//! `get_num_raw_data_modules` — тот же самый стандартный материал, который
//! `original_source/` (zxing) хранит как `Version::VERSIONS`/`ECBlocks`/`ECB`
//! (см. `symbian/QQrDecoder/zxing/qrcode/Version.h`), только в табличной, а не
//! формульной форме там. Используем формулы нануки: они эквивалентны и
//! позволяют не хардкодить 40 записей руками для геометрии паттернов.

use crate::qr::format::EcLevel;

/// Индекс уровня коррекции в таблицах ниже: L=0, M=1, Q=2, H=3. Это тот же
/// порядок, что и `ECC_CODEWORDS_PER_BLOCK`/`NUM_ERROR_CORRECTION_BLOCKS` у
/// nayuki (Low, Medium, Quartile, High).
#[inline]
fn ec_ordinal(ec: EcLevel) -> usize {
    match ec {
        EcLevel::L => 0,
        EcLevel::M => 1,
        EcLevel::Q => 2,
        EcLevel::H => 3,
    }
}

#[rustfmt::skip]
static ECC_CODEWORDS_PER_BLOCK: [[i16; 41]; 4] = [
    [-1,  7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30],
    [-1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28],
    [-1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30],
    [-1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30],
];

#[rustfmt::skip]
static NUM_ERROR_CORRECTION_BLOCKS: [[i16; 41]; 4] = [
    [-1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4,  4,  4,  4,  4,  6,  6,  6,  6,  7,  8,  8,  9,  9, 10, 12, 12, 12, 13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25],
    [-1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5,  5,  8,  9,  9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21, 23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49],
    [-1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8,  8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68],
    [-1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81],
];

/// Одна группа блоков с одинаковым числом кодвордов данных: `count` блоков,
/// каждый по `data_codewords` байт данных (плюс общие для версии EC-байты).
#[derive(Clone, Copy, Debug)]
pub struct EcBlockGroup {
    pub count: usize,
    pub data_codewords: usize,
}

#[derive(Clone, Debug)]
pub struct Version {
    pub number: u8, // 1..=40
}

impl Version {
    #[inline]
    pub fn new(number: u8) -> Self {
        debug_assert!((1..=40).contains(&number));
        Self { number }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        17 + 4 * self.number as usize
    }

    /// Версия по наблюдаемому размеру стороны матрицы (версии 1..6 всегда
    /// определяются размером однозначно; версии >=7 уточняются по битам
    /// версии — см. `qr::format::decode_version_info`).
    pub fn from_dimension(dim: usize) -> Option<Self> {
        if dim < 21 || (dim - 21) % 4 != 0 {
            return None;
        }
        let number = (dim - 21) / 4 + 1;
        if number > 40 {
            return None;
        }
        Some(Self::new(number as u8))
    }

    pub fn alignment_pattern_centers(&self) -> Vec<usize> {
        let ver = self.number as i32;
        if ver == 1 {
            return vec![];
        }
        let numalign = ver / 7 + 2;
        let step = if ver != 32 {
            (ver * 4 + numalign * 2 + 1) / (2 * numalign - 2) * 2
        } else {
            26
        };
        let mut result = vec![6i32];
        let mut pos = ver * 4 + 10;
        for _ in 0..numalign - 1 {
            result.insert(1, pos);
            pos -= step;
        }
        result.into_iter().map(|v| v as usize).collect()
    }

    pub fn num_raw_data_modules(&self) -> usize {
        let ver = self.number as i64;
        let mut result: i64 = (16 * ver + 128) * ver + 64;
        if ver >= 2 {
            let numalign = ver / 7 + 2;
            result -= (25 * numalign - 10) * numalign - 55;
            if ver >= 7 {
                result -= 36;
            }
        }
        result as usize
    }

    #[inline]
    pub fn total_codewords(&self) -> usize {
        self.num_raw_data_modules() / 8
    }

    #[inline]
    fn table_get(table: &[[i16; 41]; 4], ver: u8, ec: EcLevel) -> usize {
        let v = table[ec_ordinal(ec)][ver as usize];
        debug_assert!(v >= 0);
        v as usize
    }

    #[inline]
    pub fn ec_codewords_per_block(&self, ec: EcLevel) -> usize {
        Self::table_get(&ECC_CODEWORDS_PER_BLOCK, self.number, ec)
    }

    #[inline]
    pub fn num_error_correction_blocks(&self, ec: EcLevel) -> usize {
        Self::table_get(&NUM_ERROR_CORRECTION_BLOCKS, self.number, ec)
    }

    pub fn num_data_codewords(&self, ec: EcLevel) -> usize {
        self.total_codewords() - self.ec_codewords_per_block(ec) * self.num_error_correction_blocks(ec)
    }

    /// Группы блоков данных для интерливинга/деинтерливинга (§4.I.1): блоки
    /// делятся на "короткие" и на один байт длиннее "длинные"; короткие идут
    /// первыми, как и при кодировании.
    pub fn block_groups(&self, ec: EcLevel) -> Vec<EcBlockGroup> {
        let num_blocks = self.num_error_correction_blocks(ec);
        let total_data = self.num_data_codewords(ec);
        let short_len = total_data / num_blocks;
        let num_long = total_data % num_blocks;
        let num_short = num_blocks - num_long;
        let mut groups = Vec::new();
        if num_short > 0 {
            groups.push(EcBlockGroup {
                count: num_short,
                data_codewords: short_len,
            });
        }
        if num_long > 0 {
            groups.push(EcBlockGroup {
                count: num_long,
                data_codewords: short_len + 1,
            });
        }
        groups
    }

    /// Три "корзины" ширины поля количества символов по §3/Mode.cpp:
    /// версии 1-9 / 10-26 / 27-40.
    #[inline]
    pub fn char_count_bracket(&self) -> usize {
        match self.number {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_and_from_dimension_roundtrip() {
        for v in 1..=40u8 {
            let ver = Version::new(v);
            let d = ver.dimension();
            let back = Version::from_dimension(d).unwrap();
            assert_eq!(back.number, v);
        }
    }

    #[test]
    fn version1_has_no_alignment_patterns() {
        assert!(Version::new(1).alignment_pattern_centers().is_empty());
    }

    #[test]
    fn version7_has_alignment_patterns_and_version_bits() {
        let v = Version::new(7);
        assert!(!v.alignment_pattern_centers().is_empty());
        assert_eq!(v.dimension(), 45);
    }

    #[test]
    fn version1_l_block_layout_matches_known_values() {
        // Версия 1, EC=L: 19 байт данных, 7 байт EC, один блок — это в точности
        // разбиение, которое уже используется в api.rs для v1.
        let v = Version::new(1);
        assert_eq!(v.num_data_codewords(EcLevel::L), 19);
        assert_eq!(v.ec_codewords_per_block(EcLevel::L), 7);
        assert_eq!(v.num_error_correction_blocks(EcLevel::L), 1);
        let groups = v.block_groups(EcLevel::L);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 1);
        assert_eq!(groups[0].data_codewords, 19);
    }

    #[test]
    fn version1_all_ec_levels_match_teacher_table() {
        let v = Version::new(1);
        assert_eq!(v.num_data_codewords(EcLevel::L), 19);
        assert_eq!(v.num_data_codewords(EcLevel::M), 16);
        assert_eq!(v.num_data_codewords(EcLevel::Q), 13);
        assert_eq!(v.num_data_codewords(EcLevel::H), 9);
    }
}
