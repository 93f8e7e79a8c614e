//! Базовые примитивы строчного сканирования (§4.J): учёт серии run'ов
//! прямо по пиксельным ширинам и взвешенное сравнение с эталонным
//! паттерном. `ean13`/`code128` используют более быстрый путь —
//! квантование run'ов в целые «модули» перед сравнением (см.
//! `binarize::normalize_modules`); `code39`/`itf` сравнивают сырые
//! пиксельные ширины через эти функции напрямую, без квантования,
//! ближе к оригинальному `recordPattern`/`patternMatchVariance`.

/// Разумный предел на случай вырожденной (полностью шумной) строки.
const MAX_PATTERN: f32 = f32::MAX / 2.0;

/// Считает серию из `counters.len()` run'ов переменного цвета начиная с
/// `start` (цвет в `start` определяется вызывающим кодом через чередование).
/// Возвращает `None`, если строка закончилась раньше, чем заполнились все слоты.
pub fn record_pattern(runs: &[usize], start: usize, counters: &mut [usize]) -> Option<()> {
    if start + counters.len() > runs.len() {
        return None;
    }
    counters.copy_from_slice(&runs[start..start + counters.len()]);
    Some(())
}

/// Средневзвешенное отклонение `counters` от эталона `pattern`, в единицах
/// "эталонного модуля". `f64::MAX`-подобный предел, если `counters` короче
/// эталона по суммарной ширине, либо если какой-то слот выходит за
/// `max_individual_variance · unit_width`.
pub fn pattern_match_variance(counters: &[usize], pattern: &[u8], max_individual_variance: f32) -> f32 {
    debug_assert_eq!(counters.len(), pattern.len());
    let total: usize = counters.iter().sum();
    let pattern_length: usize = pattern.iter().map(|&p| p as usize).sum();
    if total < pattern_length {
        return MAX_PATTERN;
    }
    let unit_bar_width = total as f32 / pattern_length as f32;
    let max_variance = max_individual_variance * unit_bar_width;

    let mut total_variance = 0.0f32;
    for (&c, &p) in counters.iter().zip(pattern.iter()) {
        let scaled = p as f32 * unit_bar_width;
        let variance = (c as f32 - scaled).abs();
        if variance > max_variance {
            return MAX_PATTERN;
        }
        total_variance += variance;
    }
    total_variance / unit_bar_width
}
