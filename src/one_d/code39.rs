//! Code 39: декодер по одной строке, стандартный (не расширенный) набор.
//!
//! 44 символа (0-9, A-Z, `-.  $/+%` и старт/стоп `*`), каждый — 9 run'ов
//! (5 баров + 4 пробела чередованием), ровно 3 из 9 широкие. Таблица
//! взята из общеизвестной кодировки ISO/IEC 16388 (AIM USS-39) — тот же
//! битовый расклад, что используется в `zxing`'s `Code39Reader` (значения
//! `CHARACTER_ENCODINGS`), не входящей в пак как исходник, т.к. прямого
//! `Code39Reader.cpp`/`.rs` в retrieved-примерах нет.
//!
//! Расширенный (полный ASCII) режим `$A..$Z`/`%A..%F`/… не реализован —
//! см. DESIGN.md (открытый вопрос).

use super::row::{pattern_match_variance, record_pattern};
use crate::binarize::{binarize_row, binarize_row_adaptive, runs};
use crate::one_d::DecodeOptions;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

// 9-битная кодировка ширин на символ (bar,space,bar,space,bar,space,bar,space,bar),
// 1 = широкий элемент, 0 = узкий. Значения — `CHARACTER_ENCODINGS` общепринятой таблицы.
const CHARACTER_ENCODINGS: [u16; 43] = [
    0x034, 0x121, 0x061, 0x160, 0x031, 0x130, 0x070, 0x025, 0x124, 0x064, // 0-9
    0x109, 0x049, 0x148, 0x019, 0x118, 0x058, 0x00D, 0x10C, 0x04C, 0x01C, // A-J
    0x103, 0x043, 0x142, 0x013, 0x112, 0x052, 0x007, 0x106, 0x046, 0x016, // K-T
    0x181, 0x0C1, 0x1C0, 0x091, 0x190, 0x0D0, 0x085, 0x184, 0x0C4, 0x0A8, // U-Z,-,.,space,$
    0x0A2, 0x08A, 0x02A, // /,+,%
];
const ASTERISK_ENCODING: u16 = 0x094;

fn encoding_to_pattern(enc: u16) -> [u8; 9] {
    let mut out = [0u8; 9];
    for (i, slot) in out.iter_mut().enumerate() {
        let bit = (enc >> (8 - i)) & 1;
        *slot = if bit == 1 { 2 } else { 1 };
    }
    out
}

fn best_char_match(counters: &[usize; 9]) -> Option<(u8, f32)> {
    let mut best: Option<(u8, f32)> = None;
    for (i, &enc) in CHARACTER_ENCODINGS.iter().enumerate() {
        let pattern = encoding_to_pattern(enc);
        let variance = pattern_match_variance(counters, &pattern, 0.5);
        if best.map_or(true, |(_, v)| variance < v) {
            best = Some((ALPHABET[i], variance));
        }
    }
    best
}

fn is_asterisk(counters: &[usize; 9]) -> bool {
    let pattern = encoding_to_pattern(ASTERISK_ENCODING);
    pattern_match_variance(counters, &pattern, 0.5) < f32::MAX / 4.0
}

/// Декодировать строку в Code 39 (без `*`-ограничителей в тексте).
/// `assume_check_digit`: если true — требовать и проверить mod-43 контрольный символ.
pub fn decode_row(row_gray: &[u8], opts: &DecodeOptions, assume_check_digit: bool) -> Option<String> {
    if row_gray.len() < opts.min_modules {
        return None;
    }
    let rb = binarize_row_adaptive(row_gray);
    let rl = runs(&rb);
    let rl = if rl.len() >= 18 {
        rl
    } else {
        let rb2 = binarize_row(row_gray);
        let rl2 = runs(&rb2);
        if rl2.len() < 18 {
            return None;
        }
        rl2
    };

    // Найти старт: окно из 9 run'ов, распознающееся как '*'.
    let mut start: Option<usize> = None;
    for i in 0..=rl.len().saturating_sub(9) {
        let mut counters = [0usize; 9];
        if record_pattern(&rl, i, &mut counters).is_some() && is_asterisk(&counters) {
            start = Some(i);
            break;
        }
    }
    // старт-символ занимает 9 run'ов, за ним — межсимвольный пробел (1 run).
    let mut idx = start? + 9 + 1;

    let mut chars: Vec<u8> = Vec::new();
    loop {
        if idx + 9 > rl.len() {
            return None;
        }
        let mut counters = [0usize; 9];
        if record_pattern(&rl, idx, &mut counters).is_none() {
            return None;
        }
        if is_asterisk(&counters) {
            break; // стоп-символ
        }
        let (ch, variance) = best_char_match(&counters)?;
        if variance >= f32::MAX / 4.0 {
            return None;
        }
        chars.push(ch);
        idx += 9 + 1; // символ + межсимвольный пробел
    }

    if chars.is_empty() {
        return None;
    }

    if assume_check_digit {
        let last = *chars.last().unwrap();
        let payload = &chars[..chars.len() - 1];
        let sum: u32 = payload
            .iter()
            .map(|&c| ALPHABET.iter().position(|&a| a == c).unwrap() as u32)
            .sum();
        let expected = ALPHABET[(sum % 43) as usize];
        if expected != last {
            return None;
        }
        return Some(String::from_utf8(payload.to_vec()).ok()?);
    }

    String::from_utf8(chars).ok()
}

#[cfg(test)]
pub fn synthesize_row_code39(text: &str, unit: usize) -> Vec<u8> {
    let mut modules: Vec<u8> = vec![9];
    let push_char = |modules: &mut Vec<u8>, ch: u8| {
        let enc = if ch == b'*' {
            ASTERISK_ENCODING
        } else {
            let pos = ALPHABET.iter().position(|&a| a == ch).expect("char in alphabet");
            CHARACTER_ENCODINGS[pos]
        };
        modules.extend_from_slice(&encoding_to_pattern(enc));
        modules.push(1); // межсимвольный пробел
    };
    push_char(&mut modules, b'*');
    for &b in text.as_bytes() {
        push_char(&mut modules, b);
    }
    push_char(&mut modules, b'*');
    modules.push(9);

    let mut pix: Vec<u8> = Vec::new();
    let mut black = false; // modules[0] — quiet zone (белый)
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
    use crate::GrayImage;

    #[test]
    fn decodes_simple_code39_text() {
        let row = synthesize_row_code39("CODE39", 3);
        let opts = DecodeOptions::default();
        let res = decode_row(&row, &opts, false);
        assert_eq!(res.as_deref(), Some("CODE39"));
    }

    #[test]
    fn full_image_scan_finds_code39() {
        let row = synthesize_row_code39("HI-42", 3);
        let img = GrayImage {
            width: row.len(),
            height: 1,
            data: &row,
        };
        let opts = DecodeOptions::default();
        let out = super::super::decode_code39(&img, &opts, false);
        assert!(out.iter().any(|b| b.text == "HI-42"));
    }
}
