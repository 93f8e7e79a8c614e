// src/core/luminance.rs
//! Абстрактный источник яркости (см. спецификация §3, §4.A).
//!
//! `row(y)` и `matrix()` должны быть согласованы (инвариант §3:
//! `row(y)[x] == matrix()[y*W+x]`). Вьюхи `crop`/`invert`/`rotate_ccw` —
//! ленивые обёртки поверх родителя, без копирования пиксельного буфера.
//!
//! Источник в `original_source/` (`GreyscaleRotatedLuminanceSource`) хранит
//! смещение для поворота в двух взаимоисключающих формах между версиями
//! (`dataWidth-1-(y+top)` и `dataWidth-(y+top)`) — вместо копирования
//! сомнительной формулы используем стандартную композицию поворота на 90°
//! против часовой, для которой применение четыре раза алгебраически даёт
//! тождественное отображение (проверяется свойством в §8, см. тесты ниже).

use std::rc::Rc;

pub trait LuminanceSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Яркость пикселя `(x,y)`, 0=чёрный, 255=белый.
    fn get(&self, x: usize, y: usize) -> u8;

    /// Строка `y` целиком. Реализация по умолчанию — через `get`; конкретные
    /// источники (буферные) переопределяют для скорости.
    fn row(&self, y: usize, buf: &mut Vec<u8>) -> Vec<u8> {
        buf.clear();
        buf.reserve(self.width());
        for x in 0..self.width() {
            buf.push(self.get(x, y));
        }
        buf.clone()
    }

    /// Полная матрица, построчно.
    fn matrix(&self) -> Vec<u8> {
        let (w, h) = (self.width(), self.height());
        let mut out = Vec::with_capacity(w * h);
        let mut buf = Vec::new();
        for y in 0..h {
            out.extend_from_slice(&self.row(y, &mut buf));
        }
        out
    }
}

impl<T: LuminanceSource + ?Sized> LuminanceSource for &T {
    #[inline]
    fn width(&self) -> usize {
        (**self).width()
    }
    #[inline]
    fn height(&self) -> usize {
        (**self).height()
    }
    #[inline]
    fn get(&self, x: usize, y: usize) -> u8 {
        (**self).get(x, y)
    }
    fn row(&self, y: usize, buf: &mut Vec<u8>) -> Vec<u8> {
        (**self).row(y, buf)
    }
    fn matrix(&self) -> Vec<u8> {
        (**self).matrix()
    }
}

/// Источник поверх собственного владеемого буфера (корень цепочки вьюх).
#[derive(Clone, Debug)]
pub struct BufferLuminanceSource {
    data: Rc<Vec<u8>>,
    width: usize,
    height: usize,
}

impl BufferLuminanceSource {
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            data: Rc::new(data),
            width,
            height,
        }
    }

    pub fn from_slice(data: &[u8], width: usize, height: usize) -> Self {
        Self::new(data.to_vec(), width, height)
    }
}

impl LuminanceSource for BufferLuminanceSource {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }
    #[inline]
    fn height(&self) -> usize {
        self.height
    }
    #[inline]
    fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
    fn row(&self, y: usize, buf: &mut Vec<u8>) -> Vec<u8> {
        let start = y * self.width;
        buf.clear();
        buf.extend_from_slice(&self.data[start..start + self.width]);
        buf.clone()
    }
}

/// Обрезка до подпрямоугольника `[left, left+w) x [top, top+h)`.
pub struct CroppedLuminanceSource {
    parent: Rc<dyn LuminanceSource>,
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

impl CroppedLuminanceSource {
    pub fn new(parent: Rc<dyn LuminanceSource>, left: usize, top: usize, width: usize, height: usize) -> Self {
        debug_assert!(left + width <= parent.width() && top + height <= parent.height());
        Self {
            parent,
            left,
            top,
            width,
            height,
        }
    }
}

impl LuminanceSource for CroppedLuminanceSource {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }
    #[inline]
    fn height(&self) -> usize {
        self.height
    }
    #[inline]
    fn get(&self, x: usize, y: usize) -> u8 {
        self.parent.get(self.left + x, self.top + y)
    }
}

/// Инверсия яркости: `255 - sample`.
pub struct InvertedLuminanceSource {
    parent: Rc<dyn LuminanceSource>,
}

impl InvertedLuminanceSource {
    pub fn new(parent: Rc<dyn LuminanceSource>) -> Self {
        Self { parent }
    }
}

impl LuminanceSource for InvertedLuminanceSource {
    #[inline]
    fn width(&self) -> usize {
        self.parent.width()
    }
    #[inline]
    fn height(&self) -> usize {
        self.parent.height()
    }
    #[inline]
    fn get(&self, x: usize, y: usize) -> u8 {
        255 - self.parent.get(x, y)
    }
}

/// Поворот на 90° против часовой стрелки. Строка `y` вьюхи — столбец
/// `(W_parent-1-y)` родителя; ширина/высота меняются местами.
pub struct RotatedCcwLuminanceSource {
    parent: Rc<dyn LuminanceSource>,
}

impl RotatedCcwLuminanceSource {
    pub fn new(parent: Rc<dyn LuminanceSource>) -> Self {
        Self { parent }
    }
}

impl LuminanceSource for RotatedCcwLuminanceSource {
    #[inline]
    fn width(&self) -> usize {
        self.parent.height()
    }
    #[inline]
    fn height(&self) -> usize {
        self.parent.width()
    }
    #[inline]
    fn get(&self, x: usize, y: usize) -> u8 {
        let pw = self.parent.width();
        self.parent.get(pw - 1 - y, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_source() -> Rc<dyn LuminanceSource> {
        // 4x3 картинка с уникальным значением в каждой клетке, чтобы
        // геометрические отображения было легко проверить по значению.
        let w = 4usize;
        let h = 3usize;
        let mut data = vec![0u8; w * h];
        for y in 0..h {
            for x in 0..w {
                data[y * w + x] = (y * w + x) as u8;
            }
        }
        Rc::new(BufferLuminanceSource::new(data, w, h))
    }

    #[test]
    fn invert_twice_is_identity() {
        let src = sample_source();
        let inv = InvertedLuminanceSource::new(src.clone());
        let inv2 = InvertedLuminanceSource::new(Rc::new(inv));
        for y in 0..src.height() {
            for x in 0..src.width() {
                assert_eq!(inv2.get(x, y), src.get(x, y));
            }
        }
    }

    #[test]
    fn crop_full_rect_is_identity() {
        let src = sample_source();
        let cropped = CroppedLuminanceSource::new(src.clone(), 0, 0, src.width(), src.height());
        for y in 0..src.height() {
            for x in 0..src.width() {
                assert_eq!(cropped.get(x, y), src.get(x, y));
            }
        }
    }

    #[test]
    fn rotate_ccw_four_times_is_identity() {
        let src = sample_source();
        let r1 = Rc::new(RotatedCcwLuminanceSource::new(src.clone())) as Rc<dyn LuminanceSource>;
        let r2 = Rc::new(RotatedCcwLuminanceSource::new(r1)) as Rc<dyn LuminanceSource>;
        let r3 = Rc::new(RotatedCcwLuminanceSource::new(r2)) as Rc<dyn LuminanceSource>;
        let r4 = RotatedCcwLuminanceSource::new(r3);
        assert_eq!(r4.width(), src.width());
        assert_eq!(r4.height(), src.height());
        for y in 0..src.height() {
            for x in 0..src.width() {
                assert_eq!(r4.get(x, y), src.get(x, y), "at ({x},{y})");
            }
        }
    }
}
