//! EAN-8: декодер по одной строке. 8 цифр, без разброса A/B слева (только
//! L-паттерны) — в отличие от EAN-13 первая цифра не кодируется паритетом,
//! она читается напрямую как часть левой четвёрки.

use super::ean13::{best_match, find_guard_start, is_guard_center, is_guard_end, A_PATTERNS};
use crate::binarize::{binarize_row, binarize_row_adaptive, normalize_modules, runs};
use crate::one_d::DecodeOptions;

/// Декодировать один ряд как EAN-8. Возвращает строку из 8 цифр.
pub fn decode_row(row_gray: &[u8], opts: &DecodeOptions) -> Option<String> {
    if row_gray.len() < opts.min_modules {
        return None;
    }

    let (modules, _) = {
        let rb = binarize_row_adaptive(row_gray);
        let rl = runs(&rb);
        if rl.len() >= 30 {
            normalize_modules(&rb, &rl)
        } else {
            let rb2 = binarize_row(row_gray);
            let rl2 = runs(&rb2);
            if rl2.len() < 30 {
                return None;
            }
            normalize_modules(&rb2, &rl2)
        }
    };

    let i = find_guard_start(&modules)?;
    let mut idx = i + 3;

    let mut digits = [0u8; 8];
    for d in digits.iter_mut().take(4) {
        if idx + 3 >= modules.len() {
            return None;
        }
        let pat = (modules[idx], modules[idx + 1], modules[idx + 2], modules[idx + 3]);
        let (digit, _dist) = best_match(&pat, &A_PATTERNS);
        *d = digit;
        idx += 4;
    }

    if !is_guard_center(&modules, idx) {
        return None;
    }
    idx += 5;

    for d in digits.iter_mut().skip(4) {
        if idx + 3 >= modules.len() {
            return None;
        }
        let pat = (modules[idx], modules[idx + 1], modules[idx + 2], modules[idx + 3]);
        let (digit, _dist) = best_match(&pat, &A_PATTERNS);
        *d = digit;
        idx += 4;
    }

    if !is_guard_end(&modules, idx) {
        return None;
    }

    if !check_ean8_checksum(&digits) {
        return None;
    }

    Some(digits.iter().map(|d| (b'0' + *d) as char).collect())
}

fn check_ean8_checksum(d: &[u8; 8]) -> bool {
    let mut sum = 0u32;
    for i in 0..7 {
        let w = if i % 2 == 0 { 3 } else { 1 };
        sum += d[i] as u32 * w;
    }
    let check = (10 - (sum % 10)) % 10;
    check == d[7] as u32
}

#[cfg(test)]
pub fn synthesize_ideal_row(digits: &str, unit: usize) -> Vec<u8> {
    let ds: Vec<u8> = digits.bytes().map(|c| c - b'0').collect();
    assert_eq!(ds.len(), 8);

    let mut modules: Vec<u8> = vec![9, 1, 1, 1];
    for &d in &ds[..4] {
        let (a, b, c, dw) = A_PATTERNS[d as usize];
        modules.extend([a, b, c, dw]);
    }
    modules.extend([1, 1, 1, 1, 1]);
    for &d in &ds[4..] {
        let (a, b, c, dw) = A_PATTERNS[d as usize];
        modules.extend([a, b, c, dw]);
    }
    modules.extend([1, 1, 1, 9]);

    let mut pix: Vec<u8> = Vec::new();
    let mut black = false;
    for m in modules {
        let w = m as usize * unit;
        let val = if black { 0u8 } else { 255u8 };
        for _ in 0..w {
            pix.push(val);
        }
        black = !black;
    }
    pix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_valid_ean8() {
        // 96385074: checksum digit computed to satisfy mod-10.
        let row = synthesize_ideal_row("96385074", 3);
        let opts = DecodeOptions::default();
        let res = decode_row(&row, &opts);
        assert_eq!(res.as_deref(), Some("96385074"));
    }
}
