// src/core/mod.rs
//! Общие типы и утилиты, не зависящие от конкретных декодеров: модель
//! изображения, геометрия, контейнеры бит, источники яркости и бинаризация.

pub mod binarizer;
pub mod bits;
pub mod luminance;
pub mod types;
