// src/qr/format.rs
//! Формат-инфо (15 бит, BCH(15,5)) и инфо-о-версии (18 бит, BCH(18,6)) —
//! см. спецификацию §4.H.1/§4.H.2.
//!
//! BCH-арифметика и таблица масок 0x5412/генератор 0x537 унаследованы от
//! `Xzdes-ultracode`'s `qr::format` один-в-один (та же стандартная
//! константа ISO/IEC 18004). Геометрия чтения обобщена с хардкода 21×21 на
//! произвольный размер `D` по формулам, совпадающим с `draw_format_bits`/
//! `draw_version` из `examples/nayuki-QR-Code-generator` (та же раскладка,
//! используемая для записи — чтение идёт по тем же координатам).

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EcLevel {
    L,
    M,
    Q,
    H,
}

impl EcLevel {
    /// Два бита уровня EC по стандарту: L=01, M=00, Q=11, H=10.
    #[inline]
    pub fn to_bits2(self) -> u8 {
        match self {
            EcLevel::L => 0b01,
            EcLevel::M => 0b00,
            EcLevel::Q => 0b11,
            EcLevel::H => 0b10,
        }
    }

    pub fn from_bits2(b2: u8) -> Option<Self> {
        match b2 & 0b11 {
            0b01 => Some(EcLevel::L),
            0b00 => Some(EcLevel::M),
            0b11 => Some(EcLevel::Q),
            0b10 => Some(EcLevel::H),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H",
        }
    }
}

pub const ALL_EC_LEVELS: [EcLevel; 4] = [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H];

/// Генератор BCH(15,5): x^10 + x^8 + x^5 + x^4 + x^2 + x + 1
const BCH15_5_GEN: u32 = 0x537;
/// Маска формата из стандарта.
const FORMAT_MASK: u32 = 0x5412;
/// Генератор BCH(18,6) для инфо-о-версии.
const BCH18_6_GEN: u32 = 0x1F25;

fn bch_remainder(v: u32, gen: u32, data_bits: u32, rem_bits: u32) -> u32 {
    let mut v = v;
    for shift in (rem_bits..rem_bits + data_bits).rev() {
        if (v >> shift) & 1 == 1 {
            v ^= gen << (shift - rem_bits);
        }
    }
    v & ((1 << rem_bits) - 1)
}

fn encode_format_word_unmasked(ec: EcLevel, mask_id: u8) -> u32 {
    let data5 = ((ec.to_bits2() as u32) << 3) | (mask_id as u32 & 0x7);
    let payload = data5 << 10;
    let rem = bch_remainder(payload, BCH15_5_GEN, 5, 10);
    payload | rem
}

pub fn encode_format_word_masked(ec: EcLevel, mask_id: u8) -> u32 {
    encode_format_word_unmasked(ec, mask_id) ^ FORMAT_MASK
}

#[inline]
fn hamming(a: u32, b: u32) -> u32 {
    (a ^ b).count_ones()
}

/// Декодирование по подбору среди всех 32 валидных слов (§4.H.1: "на >3-бит
/// ошибку — `FormatError`").
pub fn decode_format_word(word: u32) -> Option<(EcLevel, u8, u32)> {
    let mut best: Option<(EcLevel, u8, u32)> = None;
    for &ec in &ALL_EC_LEVELS {
        for mask in 0u8..8 {
            let valid = encode_format_word_masked(ec, mask);
            let d = hamming(word & 0x7FFF, valid);
            match best {
                None => best = Some((ec, mask, d)),
                Some((_, _, bd)) if d < bd => best = Some((ec, mask, d)),
                _ => {}
            }
        }
    }
    match best {
        Some((ec, mask, d)) if d <= 3 => Some((ec, mask, d)),
        _ => None,
    }
}

pub fn encode_version_word(version: u8) -> u32 {
    debug_assert!((7..=40).contains(&version));
    let rem = bch_remainder((version as u32) << 12, BCH18_6_GEN, 6, 12);
    ((version as u32) << 12) | rem
}

/// Декодирование 18-битного инфо-о-версии (версии 7..40, §4.H.2). Допуск по
/// расстоянию Хэмминга — 3 бита, как и для формата.
pub fn decode_version_word(word: u32) -> Option<(u8, u32)> {
    let mut best: Option<(u8, u32)> = None;
    for v in 7u8..=40 {
        let valid = encode_version_word(v);
        let d = hamming(word & 0x3FFFF, valid);
        match best {
            None => best = Some((v, d)),
            Some((_, bd)) if d < bd => best = Some((v, d)),
            _ => {}
        }
    }
    match best {
        Some((v, d)) if d <= 3 => Some((v, d)),
        _ => None,
    }
}

/// Координаты двух дорожек чтения формата (по 15 точек `(x,y)`, бит `i` —
/// LSB-первый) для матрицы стороны `dim`. Раскладка идентична
/// `draw_format_bits` в стандарте ISO/IEC 18004 (см. модуль-комментарий).
pub fn format_bit_positions(dim: usize) -> [[(usize, usize); 15]; 2] {
    let size = dim as i64;
    let mut track1 = [(0usize, 0usize); 15];
    for i in 0..6i64 {
        track1[i as usize] = (8, i as usize);
    }
    track1[6] = (8, 7);
    track1[7] = (8, 8);
    track1[8] = (7, 8);
    for i in 9..15i64 {
        track1[i as usize] = ((14 - i) as usize, 8);
    }

    let mut track2 = [(0usize, 0usize); 15];
    for i in 0..8i64 {
        track2[i as usize] = ((size - 1 - i) as usize, 8);
    }
    for i in 8..15i64 {
        track2[i as usize] = (8, (size - 15 + i) as usize);
    }

    [track1, track2]
}

/// Координаты двух дорожек чтения версии (18 точек каждая) для `dim >= 45`.
pub fn version_bit_positions(dim: usize) -> [[(usize, usize); 18]; 2] {
    let size = dim as i64;
    let mut a_track = [(0usize, 0usize); 18];
    let mut b_track = [(0usize, 0usize); 18];
    for i in 0..18i64 {
        let a = size - 11 + i % 3;
        let b = i / 3;
        a_track[i as usize] = (a as usize, b as usize);
        b_track[i as usize] = (b as usize, a as usize);
    }
    [a_track, b_track]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bch_roundtrip() {
        for &ec in &ALL_EC_LEVELS {
            for m in 0u8..8 {
                let w = encode_format_word_masked(ec, m);
                let (dec_ec, dec_mask, dist) = decode_format_word(w).unwrap();
                assert_eq!(dec_ec, ec);
                assert_eq!(dec_mask, m);
                assert_eq!(dist, 0);
            }
        }
    }

    #[test]
    fn format_bch_tolerates_up_to_3_bit_errors() {
        let w = encode_format_word_masked(EcLevel::Q, 5);
        let corrupted = w ^ 0b0000_0000_0000_0111; // flip 3 low bits
        let (ec, mask, dist) = decode_format_word(corrupted).unwrap();
        assert_eq!(ec, EcLevel::Q);
        assert_eq!(mask, 5);
        assert!(dist <= 3);
    }

    #[test]
    fn version_bch_roundtrip() {
        for v in 7u8..=40 {
            let w = encode_version_word(v);
            let (dec_v, dist) = decode_version_word(w).unwrap();
            assert_eq!(dec_v, v);
            assert_eq!(dist, 0);
        }
    }

    #[test]
    fn format_positions_v1_match_15_points_in_bounds() {
        let [t1, t2] = format_bit_positions(21);
        for &(x, y) in t1.iter().chain(t2.iter()) {
            assert!(x < 21 && y < 21);
        }
    }
}
