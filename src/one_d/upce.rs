//! UPC-E: 6 «сжатых» цифр + расширение до 12-значного UPC-A.
//!
//! Паритет (L/G) шести цифр кодирует связку (number_system, check_digit);
//! для `number_system=0` эта связка использует ту же таблицу масок, что и
//! первая цифра EAN-13 (`ean13::FIRST_DIGIT_MASKS`) — известное свойство
//! семейства UPC/EAN. `number_system=1` здесь не реализован (см. DESIGN.md).

use super::ean13::{best_match, find_guard_start, A_PATTERNS, B_PATTERNS, FIRST_DIGIT_MASKS};
use crate::binarize::{binarize_row, binarize_row_adaptive, normalize_modules, runs};
use crate::one_d::DecodeOptions;

/// Декодировать один ряд как UPC-E и вернуть раскрытый 12-значный UPC-A.
pub fn decode_row(row_gray: &[u8], opts: &DecodeOptions) -> Option<String> {
    if row_gray.len() < opts.min_modules {
        return None;
    }

    let (modules, _) = {
        let rb = binarize_row_adaptive(row_gray);
        let rl = runs(&rb);
        if rl.len() >= 20 {
            normalize_modules(&rb, &rl)
        } else {
            let rb2 = binarize_row(row_gray);
            let rl2 = runs(&rb2);
            if rl2.len() < 20 {
                return None;
            }
            normalize_modules(&rb2, &rl2)
        }
    };

    let i = find_guard_start(&modules)?;
    let mut idx = i + 3;

    let mut digits = [0u8; 6];
    let mut is_b = [false; 6];
    for k in 0..6 {
        if idx + 3 >= modules.len() {
            return None;
        }
        let pat = (modules[idx], modules[idx + 1], modules[idx + 2], modules[idx + 3]);
        let (da, dist_a) = best_match(&pat, &A_PATTERNS);
        let (db, dist_b) = best_match(&pat, &B_PATTERNS);
        if dist_a <= dist_b {
            digits[k] = da;
            is_b[k] = false;
        } else {
            digits[k] = db;
            is_b[k] = true;
        }
        idx += 4;
    }

    let check_digit = FIRST_DIGIT_MASKS.iter().position(|mask| {
        is_b[0] == mask.0
            && is_b[1] == mask.1
            && is_b[2] == mask.2
            && is_b[3] == mask.3
            && is_b[4] == mask.4
            && is_b[5] == mask.5
    })? as u8;

    Some(expand_to_upca(0, &digits, check_digit))
}

/// Раскрыть 6 сжатых цифр UPC-E (+ number system + check digit) в 12-значный UPC-A.
fn expand_to_upca(number_system: u8, d: &[u8; 6], check_digit: u8) -> String {
    let mut out = [0u8; 12];
    out[0] = number_system;
    out[11] = check_digit;
    match d[5] {
        0 | 1 | 2 => {
            out[1] = d[0];
            out[2] = d[1];
            out[3] = d[5];
            out[4] = 0;
            out[5] = 0;
            out[6] = 0;
            out[7] = 0;
            out[8] = d[2];
            out[9] = d[3];
            out[10] = d[4];
        }
        3 => {
            out[1] = d[0];
            out[2] = d[1];
            out[3] = d[2];
            out[4] = 0;
            out[5] = 0;
            out[6] = 0;
            out[7] = 0;
            out[8] = 0;
            out[9] = d[3];
            out[10] = d[4];
        }
        4 => {
            out[1] = d[0];
            out[2] = d[1];
            out[3] = d[2];
            out[4] = d[3];
            out[5] = 0;
            out[6] = 0;
            out[7] = 0;
            out[8] = 0;
            out[9] = 0;
            out[10] = d[4];
        }
        _ => {
            out[1] = d[0];
            out[2] = d[1];
            out[3] = d[2];
            out[4] = d[3];
            out[5] = d[4];
            out[6] = 0;
            out[7] = 0;
            out[8] = 0;
            out[9] = 0;
            out[10] = d[5];
        }
    }
    out.iter().map(|v| (b'0' + *v) as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_trailing_zero_form() {
        // d5=0 форма: manufacturer=d0 d1 d5, product = 0000 + d2 d3 d4
        let upca = expand_to_upca(0, &[1, 2, 3, 4, 5, 0], 7);
        assert_eq!(upca, "012000003457");
    }

    #[test]
    fn expands_trailing_5_9_form() {
        let upca = expand_to_upca(0, &[1, 2, 3, 4, 5, 6], 7);
        assert_eq!(upca, "012345000067");
    }
}
