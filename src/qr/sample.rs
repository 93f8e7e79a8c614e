// src/qr/sample.rs
//! Семплинг произвольной QR-сетки `D×D` (§4.F) из уже бинаризованного
//! изображения, с использованием проективного преобразования из `qr::perspective`.
//!
//! Идея (как в zxing `GridSampler`/`Detector::createTransform`, и как у
//! `examples/other_examples/.../qr-pro-max/.../symbol.rs`'s
//! `setup_homography`): строим четырёхугольник по трём найденным центрам
//! finder-паттернов (а по возможности уточняем четвёртый угол реальным
//! alignment-паттерном, см. `qr::detector`) и отображаем узлы сетки через
//! него, читая бит из уже посчитанной чёрно-белой матрицы, а не заново
//! усредняя яркость.

use super::finder::PointF;
use super::perspective::PerspectiveTransform;
use crate::core::bits::BitMatrix;
use crate::error::{ReaderError, ReaderResult};

/// Четыре пиксельных угла символа (TL, TR, BR, BL), уже с учётом поправки
/// на alignment-паттерн если он найден.
#[derive(Debug, Clone, Copy)]
pub struct SymbolCorners {
    pub tl: PointF,
    pub tr: PointF,
    pub br: PointF,
    pub bl: PointF,
}

impl SymbolCorners {
    /// Строит углы по трём центрам finder-паттернов. Центр finder'а лежит в
    /// модуле 3.5 от каждого края, поэтому нижний правый угол (где finder'а
    /// нет) оценивается как параллелограмм `TR + BL - TL`; это приближение
    /// заменяется точным alignment-паттерном через `with_br_hint`.
    pub fn from_finders(tl: PointF, tr: PointF, bl: PointF) -> Self {
        let br = PointF {
            x: tr.x + bl.x - tl.x,
            y: tr.y + bl.y - tl.y,
        };
        Self { tl, tr, br, bl }
    }

    /// Заменяет оценённый нижний правый угол точным alignment-центром.
    #[must_use]
    pub fn with_br_hint(mut self, br: PointF) -> Self {
        self.br = br;
        self
    }
}

/// Строит преобразование "координаты сетки в модулях -> координаты
/// изображения в пикселях" для символа размером `dim` модулей, чьи центры
/// finder-паттернов (в модулях 3.5 от каждого края) спроецированы в `corners`.
fn build_transform(dim: usize, corners: SymbolCorners) -> PerspectiveTransform {
    let d = dim as f64;
    let inset = 3.5;
    let src = [
        (inset, inset),
        (d - inset, inset),
        (d - inset, d - inset),
        (inset, d - inset),
    ];
    let dst = [
        (corners.tl.x as f64, corners.tl.y as f64),
        (corners.tr.x as f64, corners.tr.y as f64),
        (corners.br.x as f64, corners.br.y as f64),
        (corners.bl.x as f64, corners.bl.y as f64),
    ];
    PerspectiveTransform::quad_to_quad(src, dst)
}

/// Семплирует символ `dim x dim` модулей из уже бинаризованного изображения.
/// Возвращает ошибку `NotFound`, если хотя бы одна проекция узла сетки
/// вышла за пределы изображения (символ обрезан/искажён сильнее допустимого).
pub fn sample_grid(black: &BitMatrix, dim: usize, corners: SymbolCorners) -> ReaderResult<BitMatrix> {
    let transform = build_transform(dim, corners);
    let mut out = BitMatrix::new(dim, dim);
    for gy in 0..dim {
        for gx in 0..dim {
            let p = transform.transform(gx as f64 + 0.5, gy as f64 + 0.5);
            if p.x < 0.0 || p.y < 0.0 {
                return Err(ReaderError::NotFound);
            }
            let (ix, iy) = (p.x as usize, p.y as usize);
            if ix >= black.width() || iy >= black.height() {
                return Err(ReaderError::NotFound);
            }
            if black.get(ix, iy) {
                out.set(gx, gy);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_aligned_square_samples_identity() {
        // Квадрат 10x10 модулей по 2 пикселя, без перспективы.
        let dim = 10usize;
        let px_per_module = 2.0f32;
        let mut black = BitMatrix::new(dim * 2, dim * 2);
        // Закрашиваем верхний левый модуль (0,0) и модуль (5,5).
        black.set_region(0, 0, 2, 2);
        black.set_region(10, 10, 2, 2);

        let inset = 3.5f32;
        let tl = PointF { x: inset * px_per_module, y: inset * px_per_module };
        let tr = PointF {
            x: (dim as f32 - inset) * px_per_module,
            y: inset * px_per_module,
        };
        let bl = PointF {
            x: inset * px_per_module,
            y: (dim as f32 - inset) * px_per_module,
        };
        let corners = SymbolCorners::from_finders(tl, tr, bl);

        let grid = sample_grid(&black, dim, corners).unwrap();

        assert!(grid.get(0, 0));
        assert!(grid.get(5, 5));
        assert!(!grid.get(9, 0));
    }
}
