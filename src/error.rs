// src/error.rs
//! Таксономия ошибок (см. спецификацию §7).
//!
//! `NotFound` обычно поглощается диспетчером (пробуем следующий ридер/строку/
//! поворот); `FormatError`/`ChecksumError` всплывают к вызывающему коду, если
//! только диспетчер сам не перебирает альтернативы — тогда они тоже
//! трактуются как `NotFound`. `IllegalArgument` всегда фатальна.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReaderError {
    /// Символ не найден на изображении/строке — не фатально на уровне диспетчера.
    NotFound,
    /// Символ найден, но структурно повреждён (биты версии, неизвестный режим, обрыв потока).
    FormatError(&'static str),
    /// Reed-Solomon или mod-N проверка не прошла даже после коррекции.
    ChecksumError,
    /// Некорректные аргументы вызывающего кода (размеры, обрезка вне границ и т.п.).
    IllegalArgument(&'static str),
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::NotFound => write!(f, "symbol not found"),
            ReaderError::FormatError(msg) => write!(f, "format error: {msg}"),
            ReaderError::ChecksumError => write!(f, "checksum error"),
            ReaderError::IllegalArgument(msg) => write!(f, "illegal argument: {msg}"),
        }
    }
}

impl std::error::Error for ReaderError {}

impl ReaderError {
    /// true, если диспетчер должен просто попробовать следующую альтернативу,
    /// а не прокидывать ошибку вызывающему коду.
    #[inline]
    pub fn is_recoverable_in_dispatch(&self) -> bool {
        !matches!(self, ReaderError::IllegalArgument(_))
    }
}

pub type ReaderResult<T> = Result<T, ReaderError>;
