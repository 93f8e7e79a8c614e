//! ITF (Interleaved 2 of 5): декодер по одной строке.
//!
//! Пары цифр интерливингом: нечётная цифра кодируется барами, чётная —
//! пробелами того же run'а. Таблица ширин — стандартная "2 из 5" (в каждой
//! цифре ровно 2 широких элемента из 5); использует те же примитивы
//! `record_pattern`/`pattern_match_variance`, что и `code39` (см. `row.rs`).
//! Старт-паттерн — 4 узких элемента, стоп — широкий бар + узкий пробел +
//! узкий бар (§4.J).

use super::row::{pattern_match_variance, record_pattern};
use crate::binarize::{binarize_row, binarize_row_adaptive, runs};
use crate::one_d::DecodeOptions;

// (bar1,bar2,bar3,bar4,bar5) ширины: 1=узкий, 2=широкий. Ровно 2 широких на цифру.
const DIGIT_PATTERNS: [[u8; 5]; 10] = [
    [1, 1, 2, 2, 1], // 0
    [2, 1, 1, 1, 2], // 1
    [1, 2, 1, 1, 2], // 2
    [2, 2, 1, 1, 1], // 3
    [1, 1, 2, 1, 2], // 4
    [2, 1, 2, 1, 1], // 5
    [1, 2, 2, 1, 1], // 6
    [1, 1, 1, 2, 2], // 7
    [2, 1, 1, 2, 1], // 8
    [1, 2, 1, 2, 1], // 9
];

const START_PATTERN: [u8; 4] = [1, 1, 1, 1];
const END_PATTERN: [u8; 3] = [2, 1, 1];

fn best_digit(counters: &[u8; 5]) -> Option<(u8, f32)> {
    let mut best: Option<(u8, f32)> = None;
    for (d, pat) in DIGIT_PATTERNS.iter().enumerate() {
        let counters_usize: Vec<usize> = counters.iter().map(|&c| c as usize).collect();
        let v = pattern_match_variance(&counters_usize, pat, 0.5);
        if best.map_or(true, |(_, bv)| v < bv) {
            best = Some((d as u8, v));
        }
    }
    best
}

/// Декодировать ряд как ITF. Возвращает строку из чётного числа цифр.
pub fn decode_row(row_gray: &[u8], opts: &DecodeOptions) -> Option<String> {
    if row_gray.len() < opts.min_modules {
        return None;
    }
    let rb = binarize_row_adaptive(row_gray);
    let rl = runs(&rb);
    let rl = if rl.len() >= 14 {
        rl
    } else {
        let rb2 = binarize_row(row_gray);
        let rl2 = runs(&rb2);
        if rl2.len() < 14 {
            return None;
        }
        rl2
    };

    // Найти старт: 4 узких run'а подряд (bar,space,bar,space), примерно равных.
    let mut start: Option<usize> = None;
    for i in 0..=rl.len().saturating_sub(4) {
        let mut counters = [0usize; 4];
        if record_pattern(&rl, i, &mut counters).is_some() {
            let v = pattern_match_variance(&counters, &START_PATTERN, 0.5);
            if v < f32::MAX / 4.0 {
                start = Some(i);
                break;
            }
        }
    }
    let mut idx = start? + 4;

    let mut digits: Vec<u8> = Vec::new();
    loop {
        // проверка на стоп-паттерн (3 run'а: широкий бар, узкий пробел, узкий бар)
        if idx + 3 <= rl.len() {
            let mut end_counters = [0usize; 3];
            if record_pattern(&rl, idx, &mut end_counters).is_some() {
                let v = pattern_match_variance(&end_counters, &END_PATTERN, 0.5);
                if v < f32::MAX / 4.0 {
                    break;
                }
            }
        }
        if idx + 10 > rl.len() {
            return None;
        }
        // 10 run'ов: 5 баров (нечётная цифра) interleaved с 5 пробелами (чётная цифра).
        let mut bar_counters = [0u8; 5];
        let mut space_counters = [0u8; 5];
        for k in 0..5 {
            bar_counters[k] = *rl.get(idx + 2 * k)? as u8;
            space_counters[k] = *rl.get(idx + 2 * k + 1)? as u8;
        }
        let (d1, v1) = best_digit(&bar_counters)?;
        let (d2, v2) = best_digit(&space_counters)?;
        if v1 >= f32::MAX / 4.0 || v2 >= f32::MAX / 4.0 {
            return None;
        }
        digits.push(d1);
        digits.push(d2);
        idx += 10;
    }

    if digits.is_empty() || digits.len() % 2 != 0 {
        return None;
    }
    Some(digits.iter().map(|d| (b'0' + d) as char).collect())
}

#[cfg(test)]
pub fn synthesize_row_itf(digits: &str, unit: usize) -> Vec<u8> {
    assert!(digits.len() % 2 == 0, "ITF requires an even digit count");
    let ds: Vec<u8> = digits.bytes().map(|c| c - b'0').collect();

    let mut modules: Vec<u8> = vec![9];
    modules.extend_from_slice(&START_PATTERN);
    for pair in ds.chunks(2) {
        let bar = DIGIT_PATTERNS[pair[0] as usize];
        let space = DIGIT_PATTERNS[pair[1] as usize];
        for k in 0..5 {
            modules.push(bar[k]);
            modules.push(space[k]);
        }
    }
    modules.extend_from_slice(&END_PATTERN);
    modules.push(9);

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
    fn decodes_simple_itf_digits() {
        let row = synthesize_row_itf("0123456789", 3);
        let opts = DecodeOptions::default();
        let res = decode_row(&row, &opts);
        assert_eq!(res.as_deref(), Some("0123456789"));
    }

    #[test]
    fn decodes_even_length_itf() {
        let row = synthesize_row_itf("4242", 4);
        let opts = DecodeOptions::default();
        let res = decode_row(&row, &opts);
        assert_eq!(res.as_deref(), Some("4242"));
    }
}
