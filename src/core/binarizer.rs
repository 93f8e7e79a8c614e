// src/core/binarizer.rs
//! Бинаризаторы 2D-пути (см. спецификация §4.B) и кэширующий `BinaryBitmap`.
//!
//! Для 1D-сканирования строк по-прежнему используются быстрые построчные
//! хелперы из `crate::binarize` (`binarize_row`/`binarize_row_adaptive`) —
//! они не нуждаются в полной матрице. Здесь — матричный путь, нужный
//! детектору QR: глобальная гистограмма и гибридный локальный порог.

use crate::core::bits::{BitArray, BitMatrix};
use crate::core::luminance::LuminanceSource;
use crate::error::{ReaderError, ReaderResult};
use std::cell::RefCell;
use std::rc::Rc;

const LUMINANCE_BUCKETS: usize = 32;
const LUMINANCE_SHIFT: u32 = 3; // 256 / 32 = 8 = 2^3
const MIN_DYNAMIC_RANGE: i32 = 24;
const BLOCK_SIZE: usize = 8;

pub trait Binarizer {
    fn source(&self) -> &dyn LuminanceSource;

    fn black_row(&self, y: usize) -> ReaderResult<BitArray>;
    fn black_matrix(&self) -> ReaderResult<BitMatrix>;
}

fn histogram_of(samples: &[u8]) -> [u32; LUMINANCE_BUCKETS] {
    let mut buckets = [0u32; LUMINANCE_BUCKETS];
    for &s in samples {
        buckets[(s >> LUMINANCE_SHIFT) as usize] += 1;
    }
    buckets
}

/// Находит порог как впадину между двумя самыми высокими пиками
/// гистограммы. Возвращает `NotFound`, если контраст слишком мал.
fn estimate_black_point(buckets: &[u32; LUMINANCE_BUCKETS]) -> ReaderResult<u8> {
    // Самый высокий пик.
    let mut best_bucket = 0usize;
    let mut best_count = 0u32;
    for (i, &c) in buckets.iter().enumerate() {
        if c > best_count {
            best_count = c;
            best_bucket = i;
        }
    }
    // Второй пик, достаточно далёкий от первого, с весом по расстоянию
    // (как в zxing: score = count * distance^2).
    let mut second_bucket = 0usize;
    let mut second_score = 0i64;
    for (i, &c) in buckets.iter().enumerate() {
        let distance = i as i64 - best_bucket as i64;
        let score = distance * distance * c as i64;
        if score > second_score {
            second_score = score;
            second_bucket = i;
        }
    }
    let (first_peak, second_peak) = if best_bucket < second_bucket {
        (best_bucket, second_bucket)
    } else {
        (second_bucket, best_bucket)
    };
    if first_peak == second_peak {
        return Err(ReaderError::NotFound);
    }
    if (second_peak - first_peak) * (256 / LUMINANCE_BUCKETS) < MIN_DYNAMIC_RANGE as usize {
        return Err(ReaderError::NotFound);
    }
    // Впадина (минимум счётчика) между двумя пиками, взвешенная к ближайшему
    // пику при равенстве — берём bucket с минимальным count; при ничьей
    // выбираем ближе к second_peak, как в оригинале.
    let mut best_valley = second_peak - 1;
    let mut best_valley_score = i64::MIN;
    for i in (first_peak + 1)..second_peak {
        let from_first = (i - first_peak) as i64;
        let score = -(buckets[i] as i64) * 1_000 - (from_first - (second_peak - first_peak) as i64 / 2).abs();
        if score > best_valley_score {
            best_valley_score = score;
            best_valley = i;
        }
    }
    Ok(((best_valley as u32) << LUMINANCE_SHIFT) as u8)
}

/// Глобальная 32-бакетная гистограмма (§4.B).
pub struct GlobalHistogramBinarizer<S: LuminanceSource> {
    source: S,
}

impl<S: LuminanceSource> GlobalHistogramBinarizer<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: LuminanceSource> Binarizer for GlobalHistogramBinarizer<S> {
    fn source(&self) -> &dyn LuminanceSource {
        &self.source
    }

    fn black_row(&self, y: usize) -> ReaderResult<BitArray> {
        let mut buf = Vec::new();
        let row = self.source.row(y, &mut buf);
        let hist = histogram_of(&row);
        let threshold = estimate_black_point(&hist)?;
        let mut out = BitArray::new(row.len());
        for (x, &v) in row.iter().enumerate() {
            if v < threshold {
                out.set(x);
            }
        }
        Ok(out)
    }

    fn black_matrix(&self) -> ReaderResult<BitMatrix> {
        // Гистограмма по средней горизонтальной полосе — представительная
        // выборка всей матрицы, без обхода каждого пикселя дважды.
        let h = self.source.height();
        let mid = h / 2;
        let mut buf = Vec::new();
        let row = self.source.row(mid, &mut buf);
        let hist = histogram_of(&row);
        let threshold = estimate_black_point(&hist)?;

        let w = self.source.width();
        let mut out = BitMatrix::new(w, h);
        let mut rowbuf = Vec::new();
        for y in 0..h {
            let row = self.source.row(y, &mut rowbuf);
            for (x, &v) in row.iter().enumerate() {
                if v < threshold {
                    out.set(x, y);
                }
            }
        }
        Ok(out)
    }
}

/// Гибридный локальный порог: блоки 8x8, порог сглаживается по
/// крестообразным соседям (§4.B).
pub struct HybridBinarizer<S: LuminanceSource> {
    source: S,
}

impl<S: LuminanceSource> HybridBinarizer<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    fn block_thresholds(&self) -> (usize, usize, Vec<i32>) {
        let w = self.source.width();
        let h = self.source.height();
        let bw = (w + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let bh = (h + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let mut avg = vec![0i32; bw * bh];
        let mut minv = vec![255i32; bw * bh];
        let mut maxv = vec![0i32; bw * bh];

        let mut rowbuf = Vec::new();
        for y in 0..h {
            let row = self.source.row(y, &mut rowbuf);
            let by = y / BLOCK_SIZE;
            for x in 0..w {
                let bx = x / BLOCK_SIZE;
                let idx = by * bw + bx;
                let v = row[x] as i32;
                avg[idx] += v;
                if v < minv[idx] {
                    minv[idx] = v;
                }
                if v > maxv[idx] {
                    maxv[idx] = v;
                }
            }
        }
        for by in 0..bh {
            for bx in 0..bw {
                let idx = by * bw + bx;
                let cell_w = BLOCK_SIZE.min(w - bx * BLOCK_SIZE);
                let cell_h = BLOCK_SIZE.min(h - by * BLOCK_SIZE);
                let count = (cell_w * cell_h).max(1) as i32;
                avg[idx] /= count;
            }
        }

        // Порог блока: если динамический диапазон мал, используем среднее,
        // если ещё и всё соседство тёмное — фиксированный floor (чтобы не
        // ловить шум на однородно-тёмном фоне как "белое").
        let mut threshold = vec![0i32; bw * bh];
        for by in 0..bh {
            for bx in 0..bw {
                let idx = by * bw + bx;
                let range = maxv[idx] - minv[idx];
                threshold[idx] = if range < MIN_DYNAMIC_RANGE {
                    let neighbours_dark = neighbour_avg(&avg, bw, bh, bx, by) < 80;
                    if neighbours_dark {
                        avg[idx].min(MIN_DYNAMIC_RANGE * 4)
                    } else {
                        avg[idx]
                    }
                } else {
                    avg[idx]
                };
            }
        }

        // Сглаживание: каждый блок усредняется со своим крестом соседей
        // (сам + 4 стороны, пропуская несуществующие).
        let mut smoothed = vec![0i32; bw * bh];
        for by in 0..bh {
            for bx in 0..bw {
                let mut sum = threshold[by * bw + bx];
                let mut cnt = 1;
                if bx > 0 {
                    sum += threshold[by * bw + bx - 1];
                    cnt += 1;
                }
                if bx + 1 < bw {
                    sum += threshold[by * bw + bx + 1];
                    cnt += 1;
                }
                if by > 0 {
                    sum += threshold[(by - 1) * bw + bx];
                    cnt += 1;
                }
                if by + 1 < bh {
                    sum += threshold[(by + 1) * bw + bx];
                    cnt += 1;
                }
                smoothed[by * bw + bx] = sum / cnt;
            }
        }

        (bw, bh, smoothed)
    }
}

fn neighbour_avg(avg: &[i32], bw: usize, bh: usize, bx: usize, by: usize) -> i32 {
    let mut sum = avg[by * bw + bx];
    let mut cnt = 1;
    if bx > 0 {
        sum += avg[by * bw + bx - 1];
        cnt += 1;
    }
    if bx + 1 < bw {
        sum += avg[by * bw + bx + 1];
        cnt += 1;
    }
    if by > 0 {
        sum += avg[(by - 1) * bw + bx];
        cnt += 1;
    }
    if by + 1 < bh {
        sum += avg[(by + 1) * bw + bx];
        cnt += 1;
    }
    sum / cnt
}

impl<S: LuminanceSource> Binarizer for HybridBinarizer<S> {
    fn source(&self) -> &dyn LuminanceSource {
        &self.source
    }

    fn black_row(&self, y: usize) -> ReaderResult<BitArray> {
        // Для одной строки гибридный порог вырождается в порог по своей
        // полосе блоков; для согласованности переиспользуем матрицу.
        let m = self.black_matrix()?;
        let mut out = BitArray::new(m.width());
        for x in 0..m.width() {
            if m.get(x, y) {
                out.set(x);
            }
        }
        Ok(out)
    }

    fn black_matrix(&self) -> ReaderResult<BitMatrix> {
        let w = self.source.width();
        let h = self.source.height();
        if w < BLOCK_SIZE * 2 || h < BLOCK_SIZE * 2 {
            // Слишком маленькое изображение для блочного порога — fallback
            // на глобальную гистограмму.
            return GlobalHistogramBinarizer::new_ref(&self.source as &dyn LuminanceSource).black_matrix();
        }
        let (bw, _bh, thresholds) = self.block_thresholds();
        let mut out = BitMatrix::new(w, h);
        let mut rowbuf = Vec::new();
        for y in 0..h {
            let row = self.source.row(y, &mut rowbuf);
            let by = y / BLOCK_SIZE;
            for x in 0..w {
                let bx = x / BLOCK_SIZE;
                let t = thresholds[by * bw + bx];
                if (row[x] as i32) < t {
                    out.set(x, y);
                }
            }
        }
        Ok(out)
    }
}

// Небольшой хелпер, чтобы HybridBinarizer мог делегировать fallback'у без
// владения вторым экземпляром источника (используется только внутри этого
// модуля, по ссылке).
impl<'s> GlobalHistogramBinarizer<&'s dyn LuminanceSource> {
    fn new_ref(source: &'s dyn LuminanceSource) -> Self {
        Self { source }
    }
}

/// Кэширующая обёртка поверх бинаризатора (§5: "BinaryBitmap кэширует
/// чёрную матрицу и запрошенные строки; поэтому экземпляр небезопасен для
/// конкурентного использования, но дёшев для создания на каждый decode").
/// `RefCell` — однопоточный кэш, что и требуется моделью конкурентности §5.
pub struct BinaryBitmap<B: Binarizer> {
    binarizer: B,
    cached_matrix: RefCell<Option<Rc<BitMatrix>>>,
}

impl<B: Binarizer> BinaryBitmap<B> {
    pub fn new(binarizer: B) -> Self {
        Self {
            binarizer,
            cached_matrix: RefCell::new(None),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.binarizer.source().width()
    }
    #[inline]
    pub fn height(&self) -> usize {
        self.binarizer.source().height()
    }

    pub fn black_row(&self, y: usize) -> ReaderResult<BitArray> {
        self.binarizer.black_row(y)
    }

    /// Возвращает общую (`Rc`) чёрную матрицу, вычисляя её не более одного
    /// раза за время жизни этого `BinaryBitmap`.
    pub fn black_matrix(&self) -> ReaderResult<Rc<BitMatrix>> {
        if let Some(m) = self.cached_matrix.borrow().as_ref() {
            return Ok(m.clone());
        }
        let m = Rc::new(self.binarizer.black_matrix()?);
        *self.cached_matrix.borrow_mut() = Some(m.clone());
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::luminance::BufferLuminanceSource;

    #[test]
    fn checkerboard_binarizes_exactly() {
        // §8: "синтетический 100% чёрно-белый шахматный паттерн -> точная бинаризация".
        let n = 16usize;
        let cell = 4usize;
        let w = n * cell;
        let h = n * cell;
        let mut data = vec![0u8; w * h];
        for y in 0..h {
            for x in 0..w {
                let cx = x / cell;
                let cy = y / cell;
                data[y * w + x] = if (cx + cy) % 2 == 0 { 255 } else { 0 };
            }
        }
        let src = BufferLuminanceSource::new(data, w, h);
        let bin = GlobalHistogramBinarizer::new(src);
        let m = bin.black_matrix().expect("contrast should be detected");
        for y in 0..h {
            for x in 0..w {
                let cx = x / cell;
                let cy = y / cell;
                let expect_black = (cx + cy) % 2 != 0;
                assert_eq!(m.get(x, y), expect_black, "at ({x},{y})");
            }
        }
    }

    #[test]
    fn uniform_midgray_has_no_long_mixed_runs() {
        let w = 64usize;
        let h = 64usize;
        let data = vec![128u8; w * h];
        let src = BufferLuminanceSource::new(data, w, h);
        let bin = HybridBinarizer::new(src);
        // Порог вырождается в равенство average==sample для всех пикселей,
        // дробление на блоки не создаёт длинных смешанных участков внутри
        // одного блока: все пиксели блока либо >= t, либо < t одинаково,
        // так как блок однороден.
        if let Ok(m) = bin.black_matrix() {
            for y in (0..h).step_by(BLOCK_SIZE) {
                for x in (0..w).step_by(BLOCK_SIZE) {
                    let first = m.get(x, y);
                    for dy in 0..BLOCK_SIZE.min(h - y) {
                        for dx in 0..BLOCK_SIZE.min(w - x) {
                            assert_eq!(m.get(x + dx, y + dy), first);
                        }
                    }
                }
            }
        }
    }
}
