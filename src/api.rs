// src/api.rs
//
// Высокоуровневый API: единая точка входа для распознавания.
// 1D (EAN-13/UPC-A, Code128) и полный QR (версии 1-40, L/M/Q/H) с
// коррекцией Рид-Соломона.

pub mod multi;

use crate::one_d;
use crate::one_d::DecodeOptions;
use crate::prelude::*;
use crate::qr::{self, format, QrOptions};

/// Опции пайплайна (задаются через Builder).
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    pub enable_ean13_upca: bool,
    pub enable_ean8: bool,
    pub enable_upce: bool,
    pub enable_code128: bool,
    pub enable_code39: bool,
    pub enable_itf: bool,
    pub enable_qr: bool,
    /// Требовать mod-43 контрольный символ для Code 39.
    pub code39_assume_check_digit: bool,
    /// Разрешённые уровни коррекции ошибок для QR. Если пусто — разрешены все.
    pub qr_allowed_ec_levels: Vec<format::EcLevel>,
    /// Принудительный набор символов для QR BYTE-режима (см. `QrOptions::character_set`).
    pub qr_character_set: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            enable_ean13_upca: true,
            enable_ean8: true,
            enable_upce: true,
            enable_code128: true,
            enable_code39: true,
            enable_itf: true,
            enable_qr: true,
            code39_assume_check_digit: false,
            qr_allowed_ec_levels: vec![],
            qr_character_set: None,
        }
    }
}

/// Builder для PipelineOptions.
#[derive(Clone, Debug, Default)]
pub struct PipelineBuilder {
    opts: PipelineOptions,
}

impl PipelineBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn enable_ean13_upca(mut self, v: bool) -> Self {
        self.opts.enable_ean13_upca = v;
        self
    }

    #[inline]
    pub fn enable_ean8(mut self, v: bool) -> Self {
        self.opts.enable_ean8 = v;
        self
    }

    #[inline]
    pub fn enable_upce(mut self, v: bool) -> Self {
        self.opts.enable_upce = v;
        self
    }

    #[inline]
    pub fn enable_code128(mut self, v: bool) -> Self {
        self.opts.enable_code128 = v;
        self
    }

    #[inline]
    pub fn enable_code39(mut self, v: bool) -> Self {
        self.opts.enable_code39 = v;
        self
    }

    #[inline]
    pub fn code39_assume_check_digit(mut self, v: bool) -> Self {
        self.opts.code39_assume_check_digit = v;
        self
    }

    #[inline]
    pub fn enable_itf(mut self, v: bool) -> Self {
        self.opts.enable_itf = v;
        self
    }

    #[inline]
    pub fn enable_qr(mut self, v: bool) -> Self {
        self.opts.enable_qr = v;
        self
    }

    /// Разрешённые уровни EC для QR. Пусто => все уровни.
    #[inline]
    pub fn qr_allowed_levels(mut self, levels: &[format::EcLevel]) -> Self {
        self.opts.qr_allowed_ec_levels = levels.to_vec();
        self
    }

    /// Принудительный набор символов для QR BYTE-режима. `None` => ECI/эвристика.
    #[inline]
    pub fn qr_character_set(mut self, charset: Option<String>) -> Self {
        self.opts.qr_character_set = charset;
        self
    }

    #[inline]
    pub fn build(self) -> Pipeline {
        Pipeline { opts: self.opts }
    }
}

/// Конвейер распознавания.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    opts: PipelineOptions,
}

impl Pipeline {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Совместимость с существующим вызовом из `lib.rs`: вернуть первый найденный символ.
    #[inline]
    pub fn decode_first(&self, img: &LumaImage) -> Option<DecodedSymbol> {
        self.decode_all(img).into_iter().next()
    }

    /// Клон с переопределённым `character_set` для QR BYTE-режима — используется
    /// `api::multi::MultiFormatReader`, который получает `DecodeHints` на каждый вызов,
    /// а не на конструктор, в отличие от остальных `PipelineOptions`.
    #[inline]
    pub(crate) fn with_qr_character_set(&self, charset: Option<String>) -> Self {
        let mut opts = self.opts.clone();
        opts.qr_character_set = charset;
        Self { opts }
    }

    /// Главная функция: распознать всё, что можем, на изображении.
    pub fn decode_all(&self, img: &LumaImage) -> Vec<DecodedSymbol> {
        let mut out: Vec<DecodedSymbol> = Vec::new();

        if self.opts.enable_ean13_upca {
            let opts = DecodeOptions::default();
            let ean = one_d::decode_ean13_upca(img, &opts);
            for b in ean {
                let symbology = if b.format == one_d::BarcodeFormat::UPCA {
                    Symbology::UpcA
                } else {
                    Symbology::Ean13
                };
                out.push(
                    DecodedSymbol::new(symbology, b.text)
                        .with_confidence(0.95)
                        .with_extras(DecodedExtras::new().with("row", b.row.to_string())),
                );
            }
        }

        if self.opts.enable_ean8 {
            let opts = DecodeOptions::default();
            let ean8 = one_d::decode_ean8(img, &opts);
            for b in ean8 {
                out.push(
                    DecodedSymbol::new(Symbology::Ean8, b.text)
                        .with_confidence(0.95)
                        .with_extras(DecodedExtras::new().with("row", b.row.to_string())),
                );
            }
        }

        if self.opts.enable_upce {
            let opts = DecodeOptions::default();
            let upce = one_d::decode_upce(img, &opts);
            for b in upce {
                out.push(
                    DecodedSymbol::new(Symbology::UpcE, b.text)
                        .with_confidence(0.95)
                        .with_extras(DecodedExtras::new().with("row", b.row.to_string())),
                );
            }
        }

        if self.opts.enable_code128 {
            let opts = DecodeOptions::default();
            let c128 = one_d::decode_code128(img, &opts);
            for b in c128 {
                out.push(
                    DecodedSymbol::new(Symbology::Code128, b.text)
                        .with_confidence(0.95)
                        .with_extras(DecodedExtras::new().with("row", b.row.to_string())),
                );
            }
        }

        if self.opts.enable_code39 {
            let opts = DecodeOptions::default();
            let c39 = one_d::decode_code39(img, &opts, self.opts.code39_assume_check_digit);
            for b in c39 {
                out.push(
                    DecodedSymbol::new(Symbology::Code39, b.text)
                        .with_confidence(0.95)
                        .with_extras(DecodedExtras::new().with("row", b.row.to_string())),
                );
            }
        }

        if self.opts.enable_itf {
            let opts = DecodeOptions::default();
            let itf = one_d::decode_itf(img, &opts);
            for b in itf {
                out.push(
                    DecodedSymbol::new(Symbology::Itf, b.text)
                        .with_confidence(0.95)
                        .with_extras(DecodedExtras::new().with("row", b.row.to_string())),
                );
            }
        }

        if self.opts.enable_qr {
            for qr in self.decode_qr_all(img) {
                out.push(qr);
            }
        }

        dedup_by_sym_and_text(out)
    }

    /// Найти все QR-символы на изображении (§4.K/§4.M, `qr::multi`).
    fn decode_qr_all(&self, img: &LumaImage) -> Vec<DecodedSymbol> {
        let qr_opts = QrOptions {
            allowed_ec_levels: self.opts.qr_allowed_ec_levels.clone(),
            character_set: self.opts.qr_character_set.clone(),
            ..QrOptions::default()
        };
        let symbols = qr::find_all_qr_codes(img, &qr_opts);
        for sym in &symbols {
            println!("[qr] OK: text=\"{}\"", sym.text);
        }
        if symbols.is_empty() {
            eprintln!("[qr] not decoded");
        }
        symbols
    }
}

/// Дедупликация по (Symbology, text).
fn dedup_by_sym_and_text(mut items: Vec<DecodedSymbol>) -> Vec<DecodedSymbol> {
    use std::collections::HashSet;
    let mut seen: HashSet<(Symbology, String)> = HashSet::new();
    items.retain(|s| {
        let key = (s.symbology, s.text.clone());
        if seen.contains(&key) {
            false
        } else {
            seen.insert(key);
            true
        }
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::encode::synthesize_qr_v1_from_text;

    #[test]
    fn pipeline_decodes_synthetic_qr() {
        let img = synthesize_qr_v1_from_text("HI", 3, 4);
        let pipeline = Pipeline::new();
        let results = pipeline.decode_all(&img);
        assert!(results.iter().any(|s| s.symbology == Symbology::QR && s.text == "HI"));
    }
}
