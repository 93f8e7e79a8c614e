// src/qr/databits.rs
//! Маска служебных ("function") модулей и обратный зигзаг-обход кодвордов
//! (§4.H.3, §4.I.1). Геометрия служебных модулей и порядок обхода —
//! один-в-один `draw_function_patterns`/`draw_codewords` из
//! `examples/nayuki-QR-Code-generator`, только в обратную сторону: там
//! рисуют, здесь читаем уже просемплированную матрицу.
//!
//! Раньше (`Xzdes-ultracode`'s `qr::data`) эта логика была захардкожена под
//! версию 1 (`is_function_v1`/`walk_pairs_v1`); здесь она параметризована
//! `Version` и работает для версий 1..40.

use crate::core::bits::BitMatrix;
use super::mask::mask_predicate;
use super::version::Version;

/// Строит маску служебных модулей: `true`, если модуль `(x,y)` не несёт
/// данные (finder/separator, timing, alignment, format/version info, тёмный
/// модуль).
pub fn function_pattern_mask(version: &Version) -> BitMatrix {
    let dim = version.dimension();
    let mut m = BitMatrix::new(dim, dim);

    // Горизонтальная и вертикальная timing-дорожки.
    for i in 0..dim {
        m.set(6, i);
        m.set(i, 6);
    }

    mark_finder(&mut m, dim, 3, 3);
    mark_finder(&mut m, dim, dim - 4, 3);
    mark_finder(&mut m, dim, 3, dim - 4);

    let centers = version.alignment_pattern_centers();
    let n = centers.len();
    for i in 0..n {
        for j in 0..n {
            if (i == 0 && j == 0) || (i == 0 && j == n - 1) || (i == n - 1 && j == 0) {
                continue; // совпадает с finder-паттернами
            }
            mark_alignment(&mut m, centers[i], centers[j]);
        }
    }

    for &(x, y) in super::format::format_bit_positions(dim).iter().flatten() {
        m.set(x, y);
    }
    if version.number >= 7 {
        for &(x, y) in super::format::version_bit_positions(dim).iter().flatten() {
            m.set(x, y);
        }
    }
    // Тёмный модуль, всегда чёрный, не участвует в данных.
    m.set(8, dim - 8);

    m
}

/// Значение тёмного модуля и служебных паттернов не бывает амбивалентным:
/// при сборке матрицы их можно (но не обязательно) также явно выставлять в
/// ожидаемые значения. Здесь мы только маскируем — значения читаются из уже
/// просемплированной `BitMatrix`, это ответственность `qr::detector`.
fn mark_finder(m: &mut BitMatrix, dim: usize, cx: usize, cy: usize) {
    let (cx, cy) = (cx as i64, cy as i64);
    for i in -4i64..5 {
        for j in -4i64..5 {
            let xx = cx + j;
            let yy = cy + i;
            if xx >= 0 && (xx as usize) < dim && yy >= 0 && (yy as usize) < dim {
                m.set(xx as usize, yy as usize);
            }
        }
    }
}

fn mark_alignment(m: &mut BitMatrix, cx: usize, cy: usize) {
    let (cx, cy) = (cx as i64, cy as i64);
    for i in -2i64..3 {
        for j in -2i64..3 {
            let xx = cx + j;
            let yy = cy + i;
            if xx >= 0 && yy >= 0 {
                m.set(xx as usize, yy as usize);
            }
        }
    }
}

/// Читает кодворды из просемплированной и размаскированной матрицы модулей,
/// проходя зигзагом по тем же столбцам, что и кодировщик, но в обратном
/// порядке бит-потока (бит 0 кодворда — старший).
pub fn read_codewords(modules: &BitMatrix, function_mask: &BitMatrix, mask_id: u8, version: &Version) -> Vec<u8> {
    let dim = version.dimension();
    let total_bits = version.num_raw_data_modules();
    let mut bits = Vec::with_capacity(total_bits);

    let mut right: i64 = dim as i64 - 1;
    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        for vert in 0..dim {
            for j in 0..2i64 {
                let x = (right - j) as usize;
                let upward = (right + 1) & 2 == 0;
                let y = if upward { dim - 1 - vert } else { vert };
                if !function_mask.get(x, y) {
                    let raw = modules.get(x, y);
                    let bit = raw ^ mask_predicate(mask_id, x, y);
                    bits.push(bit);
                }
            }
        }
        right -= 2;
    }

    let mut out = vec![0u8; total_bits / 8];
    for (i, b) in bits.iter().enumerate().take(out.len() * 8) {
        if *b {
            out[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::format::EcLevel;

    #[test]
    fn v1_function_mask_covers_known_finder_corner() {
        let v = Version::new(1);
        let m = function_pattern_mask(&v);
        assert!(m.get(0, 0));
        assert!(m.get(7, 7));
        assert!(!m.get(10, 10));
    }

    #[test]
    fn read_codewords_v1_produces_expected_byte_count() {
        let v = Version::new(1);
        let fm = function_pattern_mask(&v);
        let modules = BitMatrix::new(v.dimension(), v.dimension());
        let cws = read_codewords(&modules, &fm, 0, &v);
        assert_eq!(cws.len(), v.total_codewords());
        assert_eq!(v.num_data_codewords(EcLevel::L) + v.ec_codewords_per_block(EcLevel::L), cws.len());
    }
}
