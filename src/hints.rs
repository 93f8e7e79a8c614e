// src/hints.rs
//! Карта подсказок вызывающего кода (см. спецификацию §6).
//!
//! В отличие от `PipelineOptions` (внутренние флаги включения конкретных
//! декодеров), `DecodeHints` — это внешний контракт: то, что кодер ZXing
//! передавал бы через `Hashtable<DecodeHintType, Object>`.

use crate::core::types::{Point, Symbology};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Колбэк, вызываемый детектором при обнаружении характерных точек
/// (углы finder/alignment паттернов и т.п.). Однопоточный, синхронный —
/// см. §5 (модель конкурентности): никакого внутреннего состояния гонки.
pub type ResultPointCallback = Rc<dyn Fn(Point)>;

#[derive(Clone, Default)]
pub struct DecodeHints {
    /// Разрешить больше сканов (строк/поворотов/квадрантов) ценой времени.
    pub try_harder: bool,
    /// Если не пусто — ограничивает набор опробуемых символогий.
    pub possible_formats: BTreeSet<Symbology>,
    /// Принудительный набор символов для QR BYTE-режима (см. §6, эвристика charset).
    pub character_set: Option<String>,
    /// Требовать проверку mod-43 для Code 39.
    pub assume_code_39_check_digit: bool,
    /// Допустимые длины результата для 1D символов (пусто = без ограничения).
    pub allowed_lengths: Vec<usize>,
    /// Колбэк для репортинга точек в процессе сканирования.
    pub result_point_callback: Option<ResultPointCallback>,
    /// Рекомендательный флаг «колбэк нужен» (управляет тем, тратим ли мы
    /// усилия на его вызов в горячем пути).
    pub need_result_point_callback: bool,
}

impl std::fmt::Debug for DecodeHints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeHints")
            .field("try_harder", &self.try_harder)
            .field("possible_formats", &self.possible_formats)
            .field("character_set", &self.character_set)
            .field(
                "assume_code_39_check_digit",
                &self.assume_code_39_check_digit,
            )
            .field("allowed_lengths", &self.allowed_lengths)
            .field(
                "result_point_callback",
                &self.result_point_callback.is_some(),
            )
            .field("need_result_point_callback", &self.need_result_point_callback)
            .finish()
    }
}

impl DecodeHints {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn allows(&self, sym: Symbology) -> bool {
        self.possible_formats.is_empty() || self.possible_formats.contains(&sym)
    }

    #[inline]
    pub fn emit_point(&self, p: Point) {
        if let Some(cb) = &self.result_point_callback {
            cb(p);
        }
    }
}
