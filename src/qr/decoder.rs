// src/qr/decoder.rs
//! Разбор битового потока кодвордов данных по режимам (§4.I.4): NUMERIC,
//! ALPHANUMERIC, BYTE, KANJI, HANZI, ECI, STRUCTURED_APPEND, FNC1.
//!
//! Индикаторы режимов и ширины полей длины по версии — те же, что в zxing
//! `Mode.{h,cpp}`/`DecodedBitStreamParser.cpp` (не включены в пак как
//! исходник, но это тот же общепринятый стандарт ISO/IEC 18004 §7.4.1, на
//! который также опирается `examples/nayuki-QR-Code-generator`'s кодировщик
//! режимов). Раньше (`Xzdes-ultracode`'s `qr::bytes`) был только жёстко
//! зашитый под v1 разбор Byte mode; здесь — полный цикл по всем режимам с
//! шириной поля длины, зависящей от версии (`Version::char_count_bracket`).

use crate::error::{ReaderError, ReaderResult};
use crate::prelude::DecodedExtras;
use super::version::Version;

const ALPHANUMERIC_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    fn bits_left(&self) -> usize {
        self.data.len() * 8 - self.bit_pos
    }

    fn read(&mut self, n: usize) -> ReaderResult<u32> {
        if n > self.bits_left() {
            return Err(ReaderError::FormatError("bit stream exhausted"));
        }
        let mut v = 0u32;
        for _ in 0..n {
            let byte = self.data[self.bit_pos / 8];
            let bit = (byte >> (7 - (self.bit_pos % 8))) & 1;
            v = (v << 1) | u32::from(bit);
            self.bit_pos += 1;
        }
        Ok(v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Terminator,
    Numeric,
    Alphanumeric,
    StructuredAppend,
    Byte,
    Fnc1First,
    Eci,
    Kanji,
    Fnc1Second,
    Hanzi,
}

fn mode_from_indicator(v: u32) -> Option<Mode> {
    match v {
        0b0000 => Some(Mode::Terminator),
        0b0001 => Some(Mode::Numeric),
        0b0010 => Some(Mode::Alphanumeric),
        0b0011 => Some(Mode::StructuredAppend),
        0b0100 => Some(Mode::Byte),
        0b0101 => Some(Mode::Fnc1First),
        0b0111 => Some(Mode::Eci),
        0b1000 => Some(Mode::Kanji),
        0b1001 => Some(Mode::Fnc1Second),
        0b1101 => Some(Mode::Hanzi),
        _ => None,
    }
}

fn char_count_bits(mode: &Mode, bracket: usize) -> usize {
    match mode {
        Mode::Numeric => [10, 12, 14][bracket],
        Mode::Alphanumeric => [9, 11, 13][bracket],
        Mode::Byte => [8, 16, 16][bracket],
        Mode::Kanji | Mode::Hanzi => [8, 10, 12][bracket],
        _ => 0,
    }
}

/// Результат разбора потока: итоговый текст (конкатенация всех сегментов),
/// байтовые сегменты BYTE-режима (§4.I.4 "byte_segments") и метаданные
/// (ECI/FNC1/Structured Append) в `extras.properties`.
pub struct DecodedBitStream {
    pub text: String,
    pub byte_segments: Vec<Vec<u8>>,
    pub extras: DecodedExtras,
}

pub fn decode_bitstream(
    data: &[u8],
    version: &Version,
    character_set_hint: Option<&str>,
) -> ReaderResult<DecodedBitStream> {
    let bracket = version.char_count_bracket();
    let mut r = BitReader::new(data);
    let mut text = String::new();
    let mut byte_segments = Vec::new();
    let mut extras = DecodedExtras::new();
    let forced_charset = character_set_hint.and_then(parse_charset_hint);
    let mut eci_charset: Option<Charset> = None;

    loop {
        if r.bits_left() < 4 {
            break;
        }
        let indicator = r.read(4)?;
        let mode = match mode_from_indicator(indicator) {
            Some(Mode::Terminator) | None => break,
            Some(m) => m,
        };

        match mode {
            Mode::Numeric => decode_numeric(&mut r, bracket, &mut text)?,
            Mode::Alphanumeric => decode_alphanumeric(&mut r, bracket, &mut text)?,
            Mode::Byte => {
                let charset = forced_charset.or(eci_charset);
                decode_byte(&mut r, bracket, &mut text, &mut byte_segments, charset)?;
            }
            Mode::Kanji => decode_kanji(&mut r, bracket, &mut text, &mut byte_segments)?,
            Mode::Hanzi => decode_hanzi(&mut r, bracket, &mut text, &mut byte_segments)?,
            Mode::Eci => {
                // §4.I.4 / ISO-IEC-18004 6.4.2.1: 0xxxxxxx -> 7-bit value (8 бит всего),
                // 10xxxxxx xxxxxxxx -> 14-bit value (16 бит), 110xxxxx ... -> 21-bit
                // value (24 бита); третий префиксный бит "110" тоже нужно съесть.
                let eci_value = if r.read(1)? == 0 {
                    r.read(7)?
                } else if r.read(1)? == 0 {
                    r.read(14)?
                } else {
                    r.read(1)?;
                    r.read(21)?
                };
                extras = extras.with("eci", eci_value.to_string());
                if let Some(cs) = eci_to_charset(eci_value) {
                    eci_charset = Some(cs);
                }
            }
            Mode::Fnc1First | Mode::Fnc1Second => {
                extras = extras.with("fnc1", "true");
            }
            Mode::StructuredAppend => {
                let seq = r.read(4)?;
                let total = r.read(4)?;
                let _parity = r.read(8)?;
                extras = extras.with("structured_append_index", seq.to_string());
                extras = extras.with("structured_append_total", (total + 1).to_string());
            }
            Mode::Terminator => unreachable!(),
        }
    }

    Ok(DecodedBitStream { text, byte_segments, extras })
}

fn decode_numeric(r: &mut BitReader<'_>, bracket: usize, out: &mut String) -> ReaderResult<()> {
    let count_bits = char_count_bits(&Mode::Numeric, bracket);
    let mut count = r.read(count_bits)? as usize;
    while count >= 3 {
        let triple = r.read(10)?;
        if triple > 999 {
            return Err(ReaderError::FormatError("numeric triple out of range"));
        }
        out.push_str(&format!("{triple:03}"));
        count -= 3;
    }
    if count == 2 {
        let pair = r.read(7)?;
        if pair > 99 {
            return Err(ReaderError::FormatError("numeric pair out of range"));
        }
        out.push_str(&format!("{pair:02}"));
    } else if count == 1 {
        let digit = r.read(4)?;
        if digit > 9 {
            return Err(ReaderError::FormatError("numeric digit out of range"));
        }
        out.push_str(&format!("{digit}"));
    }
    Ok(())
}

fn decode_alphanumeric(r: &mut BitReader<'_>, bracket: usize, out: &mut String) -> ReaderResult<()> {
    let count_bits = char_count_bits(&Mode::Alphanumeric, bracket);
    let mut count = r.read(count_bits)? as usize;
    while count >= 2 {
        let pair = r.read(11)?;
        let a = pair / 45;
        let b = pair % 45;
        out.push(*ALPHANUMERIC_CHARS.get(a as usize).ok_or(ReaderError::FormatError("bad alphanumeric code"))? as char);
        out.push(*ALPHANUMERIC_CHARS.get(b as usize).ok_or(ReaderError::FormatError("bad alphanumeric code"))? as char);
        count -= 2;
    }
    if count == 1 {
        let v = r.read(6)?;
        out.push(*ALPHANUMERIC_CHARS.get(v as usize).ok_or(ReaderError::FormatError("bad alphanumeric code"))? as char);
    }
    Ok(())
}

/// Набор символов для BYTE-сегмента (§6). Без отдельного кодека Shift-JIS/
/// GB2312/EUC-JP в этом крейте эти три варианта определяют только то, какая
/// эвристика `guess_charset` сработала — сам текст всё равно собирается как
/// UTF-8 лучшим усилием; исходные байты в любом случае сохраняются в
/// `byte_segments` без потерь.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charset {
    Utf8,
    Iso8859_1,
    ShiftJis,
    Gb2312,
    EucJp,
}

impl Charset {
    fn decode(self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Iso8859_1 => bytes.iter().map(|&b| b as char).collect(),
            Charset::ShiftJis | Charset::Gb2312 | Charset::EucJp => {
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }
}

/// Явное назначение ECI (§4.I.4) для кодировок, которые мы умеем различать.
/// Значения — стандартные ISO/IEC 18004 Table 1 designator numbers.
fn eci_to_charset(value: u32) -> Option<Charset> {
    match value {
        3 => Some(Charset::Iso8859_1),
        20 => Some(Charset::ShiftJis),
        26 => Some(Charset::Utf8),
        29 => Some(Charset::Gb2312),
        _ => None,
    }
}

/// `DecodeHints::character_set` (§6) -> `Charset`, по именам, которые
/// обычно передаёт вызывающий код.
fn parse_charset_hint(name: &str) -> Option<Charset> {
    match name.to_ascii_uppercase().replace('-', "_").as_str() {
        "UTF8" => Some(Charset::Utf8),
        "ISO8859_1" | "LATIN1" => Some(Charset::Iso8859_1),
        "SHIFT_JIS" | "SJIS" => Some(Charset::ShiftJis),
        "GB2312" | "GBK" => Some(Charset::Gb2312),
        "EUC_JP" | "EUCJP" => Some(Charset::EucJp),
        _ => None,
    }
}

/// §6 "default guess": валидный многобайтовый UTF-8 берём как есть; чистый
/// ASCII тривиален; иначе считаем долю байтовых пар, похожих на лид-байты
/// Shift-JIS/EUC-JP/GB2312, и берём максимум. По умолчанию — ISO-8859-1,
/// как и требует §6.
fn guess_charset(bytes: &[u8]) -> Charset {
    if bytes.iter().all(|&b| b < 0x80) {
        return Charset::Iso8859_1;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return Charset::Utf8;
    }

    let mut sjis_pairs = 0usize;
    let mut eucjp_pairs = 0usize;
    let mut gb_pairs = 0usize;
    let mut i = 0;
    while i + 1 < bytes.len() {
        let (a, b) = (bytes[i], bytes[i + 1]);
        if matches!(a, 0x81..=0x9F | 0xE0..=0xFC) && matches!(b, 0x40..=0xFC) && b != 0x7F {
            sjis_pairs += 1;
        }
        if matches!(a, 0xA1..=0xFE) && matches!(b, 0xA1..=0xFE) {
            eucjp_pairs += 1;
            gb_pairs += 1;
        }
        i += 1;
    }

    if sjis_pairs > 0 && sjis_pairs >= eucjp_pairs && sjis_pairs >= gb_pairs {
        Charset::ShiftJis
    } else if gb_pairs > 0 && gb_pairs >= eucjp_pairs {
        Charset::Gb2312
    } else if eucjp_pairs > 0 {
        Charset::EucJp
    } else {
        Charset::Iso8859_1
    }
}

fn decode_byte(
    r: &mut BitReader<'_>,
    bracket: usize,
    out: &mut String,
    byte_segments: &mut Vec<Vec<u8>>,
    charset: Option<Charset>,
) -> ReaderResult<()> {
    let count_bits = char_count_bits(&Mode::Byte, bracket);
    let count = r.read(count_bits)? as usize;
    let mut bytes = Vec::with_capacity(count);
    for _ in 0..count {
        bytes.push(r.read(8)? as u8);
    }
    let resolved = charset.unwrap_or_else(|| guess_charset(&bytes));
    out.push_str(&resolved.decode(&bytes));
    byte_segments.push(bytes);
    Ok(())
}

/// JIS X 0208 (Shift-JIS) двухбайтовые символы (§4.I.4 KANJI).
/// Пересборка 13-битного значения в Shift-JIS код — тот же алгоритм, что
/// `DecodedBitStreamParser::decodeKanjiSegment` в zxing.
fn decode_kanji(
    r: &mut BitReader<'_>,
    bracket: usize,
    out: &mut String,
    byte_segments: &mut Vec<Vec<u8>>,
) -> ReaderResult<()> {
    let count_bits = char_count_bits(&Mode::Kanji, bracket);
    let count = r.read(count_bits)? as usize;
    let mut bytes = Vec::with_capacity(count * 2);
    for _ in 0..count {
        let two_bytes = r.read(13)?;
        let assembled = ((two_bytes / 0x0C0) << 8) | (two_bytes % 0x0C0);
        let shift_jis = if assembled < 0x01F00 {
            assembled + 0x08140
        } else {
            assembled + 0x0C140
        };
        bytes.push((shift_jis >> 8) as u8);
        bytes.push(shift_jis as u8);
    }
    out.push_str(&String::from_utf8_lossy(&bytes));
    byte_segments.push(bytes);
    Ok(())
}

/// GB2312 двухбайтовые символы (§3/§4.I.4 HANZI, subset=1). Подмножество,
/// отличное от 1, стандартом не определено — декодируем как GB2312 в любом
/// случае, только консьюмим поле, чтобы курсор не разъехался.
fn decode_hanzi(
    r: &mut BitReader<'_>,
    bracket: usize,
    out: &mut String,
    byte_segments: &mut Vec<Vec<u8>>,
) -> ReaderResult<()> {
    let _subset = r.read(4)?;
    let count_bits = char_count_bits(&Mode::Hanzi, bracket);
    let count = r.read(count_bits)? as usize;
    let mut bytes = Vec::with_capacity(count * 2);
    for _ in 0..count {
        let two_bytes = r.read(13)?;
        let gb = if two_bytes < 0x00A00 {
            two_bytes + 0x0A1A1
        } else {
            two_bytes + 0x0A6A1
        };
        bytes.push((gb >> 8) as u8);
        bytes.push(gb as u8);
    }
    out.push_str(&String::from_utf8_lossy(&bytes));
    byte_segments.push(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_to_bytes(bits: &[u32], widths: &[usize]) -> Vec<u8> {
        let mut bitstream = Vec::new();
        for (&v, &w) in bits.iter().zip(widths.iter()) {
            for i in (0..w).rev() {
                bitstream.push((v >> i) & 1 != 0);
            }
        }
        while bitstream.len() % 8 != 0 {
            bitstream.push(false);
        }
        let mut out = vec![0u8; bitstream.len() / 8];
        for (i, b) in bitstream.iter().enumerate() {
            if *b {
                out[i / 8] |= 1 << (7 - (i % 8));
            }
        }
        out
    }

    #[test]
    fn decodes_numeric_segment() {
        let v = Version::new(1);
        // mode=0001, count=3 (digits "123"), triple=123, terminator 0000
        let data = bits_to_bytes(&[0b0001, 3, 123, 0], &[4, 10, 10, 4]);
        let res = decode_bitstream(&data, &v, None).unwrap();
        assert_eq!(res.text, "123");
    }

    #[test]
    fn decodes_alphanumeric_segment() {
        let v = Version::new(1);
        // "AB" -> codes 10, 11 -> pair = 10*45+11 = 461
        let data = bits_to_bytes(&[0b0010, 2, 461, 0], &[4, 9, 11, 4]);
        let res = decode_bitstream(&data, &v, None).unwrap();
        assert_eq!(res.text, "AB");
    }

    #[test]
    fn decodes_byte_segment_and_records_segment() {
        let v = Version::new(1);
        let payload = b"hi";
        let data = bits_to_bytes(&[0b0100, 2, payload[0] as u32, payload[1] as u32, 0], &[4, 8, 8, 8, 4]);
        let res = decode_bitstream(&data, &v, None).unwrap();
        assert_eq!(res.text, "hi");
        assert_eq!(res.byte_segments, vec![payload.to_vec()]);
    }

    #[test]
    fn two_byte_eci_keeps_following_byte_segment_aligned() {
        let v = Version::new(1);
        // ECI: prefix "10" + 14-bit value 1000, then BYTE "A", then terminator.
        let data = bits_to_bytes(
            &[0b0111, 1, 0, 1000, 0b0100, 1, 0x41, 0],
            &[4, 1, 1, 14, 4, 8, 8, 4],
        );
        let res = decode_bitstream(&data, &v, None).unwrap();
        assert_eq!(res.extras.properties.get("eci").map(String::as_str), Some("1000"));
        assert_eq!(res.text, "A");
    }

    #[test]
    fn three_byte_eci_keeps_following_byte_segment_aligned() {
        let v = Version::new(1);
        // ECI: prefix "110" + 21-bit value 20000, then BYTE "B", then terminator.
        let data = bits_to_bytes(
            &[0b0111, 1, 1, 0, 20000, 0b0100, 1, 0x42, 0],
            &[4, 1, 1, 1, 21, 4, 8, 8, 4],
        );
        let res = decode_bitstream(&data, &v, None).unwrap();
        assert_eq!(res.extras.properties.get("eci").map(String::as_str), Some("20000"));
        assert_eq!(res.text, "B");
    }

    #[test]
    fn decodes_kanji_segment_into_byte_segments() {
        let v = Version::new(1);
        let data = bits_to_bytes(&[0b1000, 1, 0, 0], &[4, 8, 13, 4]);
        let res = decode_bitstream(&data, &v, None).unwrap();
        assert_eq!(res.byte_segments, vec![vec![0x81, 0x40]]);
        assert!(!res.text.is_empty());
    }

    #[test]
    fn decodes_hanzi_segment_consuming_subset_field() {
        let v = Version::new(1);
        // subset=1 (GB2312), count=1, value=0.
        let data = bits_to_bytes(&[0b1101, 1, 1, 0, 0], &[4, 4, 8, 13, 4]);
        let res = decode_bitstream(&data, &v, None).unwrap();
        assert_eq!(res.byte_segments, vec![vec![0xA1, 0xA1]]);
    }

    #[test]
    fn byte_segment_defaults_to_latin1_for_high_bytes() {
        let v = Version::new(1);
        // 0xE9 alone is not valid UTF-8; §6 default guess must fall back to ISO-8859-1
        // rather than emitting a replacement character.
        let data = bits_to_bytes(&[0b0100, 1, 0xE9, 0], &[4, 8, 8, 4]);
        let res = decode_bitstream(&data, &v, None).unwrap();
        assert_eq!(res.text, "\u{E9}");
    }

    #[test]
    fn byte_segment_honors_character_set_hint_over_guess() {
        let v = Version::new(1);
        // 0xC3 0xA9 is valid UTF-8 for 'é', so the default guess would pick UTF-8;
        // an explicit ISO-8859-1 hint must override that and decode byte-for-byte.
        let data = bits_to_bytes(&[0b0100, 2, 0xC3, 0xA9, 0], &[4, 8, 8, 8, 4]);
        let res = decode_bitstream(&data, &v, Some("ISO-8859-1")).unwrap();
        assert_eq!(res.text, "\u{C3}\u{A9}");
    }
}
