// src/core/bits.rs
//! Упакованные контейнеры бит — `BitArray` (1D) и `BitMatrix` (2D).
//!
//! Хранение словами `u32`, как в `zxing`'s `BitMatrix` (`bitsPerWord =
//! numeric_limits<unsigned int>::digits`, см. `original_source/.../BitMatrix.h`):
//! `offset = x + width*y`, бит `offset % 32` слова `offset / 32`. Биты за
//! концом полезных данных в последнем слове всегда нули (инвариант §3).

const BITS_PER_WORD: usize = 32;

#[inline]
fn word_count(n_bits: usize) -> usize {
    (n_bits + BITS_PER_WORD - 1) / BITS_PER_WORD
}

/// Последовательность из `size` бит, упакованная в `u32`-слова.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitArray {
    bits: Vec<u32>,
    size: usize,
}

impl BitArray {
    #[inline]
    pub fn new(size: usize) -> Self {
        Self {
            bits: vec![0u32; word_count(size)],
            size,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.size);
        (self.bits[i / BITS_PER_WORD] >> (i % BITS_PER_WORD)) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, i: usize) {
        debug_assert!(i < self.size);
        self.bits[i / BITS_PER_WORD] |= 1u32 << (i % BITS_PER_WORD);
    }

    #[inline]
    pub fn flip(&mut self, i: usize) {
        debug_assert!(i < self.size);
        self.bits[i / BITS_PER_WORD] ^= 1u32 << (i % BITS_PER_WORD);
    }

    #[inline]
    pub fn clear(&mut self) {
        for w in self.bits.iter_mut() {
            *w = 0;
        }
    }

    /// Записать 32-битное слово целиком начиная с бита `i` (i кратно 32 в
    /// типичном использовании, но поддерживаются и произвольные сдвиги).
    pub fn set_bulk(&mut self, i: usize, new_bits: u32) {
        debug_assert!(i < self.size || self.size == 0);
        let word_idx = i / BITS_PER_WORD;
        let shift = i % BITS_PER_WORD;
        if shift == 0 {
            if word_idx < self.bits.len() {
                self.bits[word_idx] = new_bits;
            }
            return;
        }
        if word_idx < self.bits.len() {
            self.bits[word_idx] =
                (self.bits[word_idx] & ((1u32 << shift) - 1)) | (new_bits << shift);
        }
        if word_idx + 1 < self.bits.len() {
            self.bits[word_idx + 1] =
                (self.bits[word_idx + 1] & !((1u32 << shift) - 1)) | (new_bits >> (32 - shift));
        }
    }

    /// true, если все биты в `[from, to)` равны `value`.
    pub fn is_range(&self, from: usize, to: usize, value: bool) -> bool {
        if to <= from {
            return true;
        }
        for i in from..to.min(self.size) {
            if self.get(i) != value {
                return false;
            }
        }
        true
    }

    /// Первый установленный бит начиная с `from`, либо `size`, если такого нет.
    pub fn get_next_set(&self, from: usize) -> usize {
        if from >= self.size {
            return self.size;
        }
        let mut i = from;
        // побитово, но можно было бы словами — для наших размеров (<=несколько
        // тысяч бит на кодворд QR) это несущественно.
        while i < self.size {
            if self.get(i) {
                return i;
            }
            i += 1;
        }
        self.size
    }

    /// Первый сброшенный бит начиная с `from`, либо `size`, если такого нет.
    pub fn get_next_unset(&self, from: usize) -> usize {
        if from >= self.size {
            return self.size;
        }
        let mut i = from;
        while i < self.size {
            if !self.get(i) {
                return i;
            }
            i += 1;
        }
        self.size
    }

    pub fn to_vec_bool(&self) -> Vec<bool> {
        (0..self.size).map(|i| self.get(i)).collect()
    }

    pub fn from_bools(bits: &[bool]) -> Self {
        let mut a = Self::new(bits.len());
        for (i, &b) in bits.iter().enumerate() {
            if b {
                a.set(i);
            }
        }
        a
    }
}

/// Квадратная/прямоугольная матрица бит, построчно (x — самый быстрый индекс).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    row_words: usize,
    bits: Vec<u32>,
}

impl BitMatrix {
    pub fn new(width: usize, height: usize) -> Self {
        let row_words = word_count(width);
        Self {
            width,
            height,
            row_words,
            bits: vec![0u32; row_words * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> (usize, usize) {
        let offset = y * self.row_words * BITS_PER_WORD + x;
        (offset / BITS_PER_WORD, offset % BITS_PER_WORD)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        let (w, b) = self.index(x, y);
        (self.bits[w] >> b) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize) {
        debug_assert!(x < self.width && y < self.height);
        let (w, b) = self.index(x, y);
        self.bits[w] |= 1u32 << b;
    }

    #[inline]
    pub fn set_value(&mut self, x: usize, y: usize, v: bool) {
        if v {
            self.set(x, y);
        } else {
            self.clear_bit(x, y);
        }
    }

    #[inline]
    pub fn clear_bit(&mut self, x: usize, y: usize) {
        let (w, b) = self.index(x, y);
        self.bits[w] &= !(1u32 << b);
    }

    #[inline]
    pub fn flip(&mut self, x: usize, y: usize) {
        let (w, b) = self.index(x, y);
        self.bits[w] ^= 1u32 << b;
    }

    pub fn clear(&mut self) {
        for w in self.bits.iter_mut() {
            *w = 0;
        }
    }

    /// Закрасить прямоугольник `[left, left+w) x [top, top+h)`.
    pub fn set_region(&mut self, left: usize, top: usize, w: usize, h: usize) {
        debug_assert!(left + w <= self.width && top + h <= self.height);
        for y in top..top + h {
            for x in left..left + w {
                self.set(x, y);
            }
        }
    }

    /// Извлечь строку `y` в переиспользуемый `BitArray` (обнуляет и
    /// перезаписывает, как в оригинале — не аллоцирует при повторных вызовах
    /// на массиве той же ширины).
    pub fn get_row(&self, y: usize, reusable: &mut BitArray) -> BitArray {
        let mut out = if reusable.len() == self.width {
            std::mem::replace(reusable, BitArray::new(0))
        } else {
            BitArray::new(self.width)
        };
        out.clear();
        for x in 0..self.width {
            if self.get(x, y) {
                out.set(x);
            }
        }
        out
    }

    pub fn from_bool_grid(grid: &[Vec<bool>]) -> Self {
        let height = grid.len();
        let width = if height > 0 { grid[0].len() } else { 0 };
        let mut m = Self::new(width, height);
        for (y, row) in grid.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if v {
                    m.set(x, y);
                }
            }
        }
        m
    }

    pub fn to_bool_grid(&self) -> Vec<Vec<bool>> {
        (0..self.height)
            .map(|y| (0..self.width).map(|x| self.get(x, y)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_array_set_get_roundtrip() {
        let mut a = BitArray::new(70);
        a.set(0);
        a.set(31);
        a.set(32);
        a.set(69);
        assert!(a.get(0) && a.get(31) && a.get(32) && a.get(69));
        assert!(!a.get(1) && !a.get(33));
        a.flip(0);
        assert!(!a.get(0));
    }

    #[test]
    fn bit_array_range_and_next() {
        let mut a = BitArray::new(10);
        a.set(3);
        a.set(4);
        assert!(a.is_range(0, 3, false));
        assert!(a.is_range(3, 5, true));
        assert_eq!(a.get_next_set(0), 3);
        assert_eq!(a.get_next_unset(3), 5);
    }

    #[test]
    fn bit_matrix_set_region_law() {
        // §8: after setRegion(L,T,w,h), get(x,y) = (in-rect) || prior.
        let mut m = BitMatrix::new(20, 20);
        m.set(1, 1);
        m.set_region(5, 5, 4, 3);
        for y in 0..20 {
            for x in 0..20 {
                let in_rect = (5..9).contains(&x) && (5..8).contains(&y);
                let prior = x == 1 && y == 1;
                assert_eq!(m.get(x, y), in_rect || prior, "at ({x},{y})");
            }
        }
    }

    #[test]
    fn bit_matrix_get_row_matches_get() {
        let mut m = BitMatrix::new(40, 5);
        m.set(0, 2);
        m.set(39, 2);
        m.set(17, 2);
        let mut reusable = BitArray::new(0);
        let row = m.get_row(2, &mut reusable);
        for x in 0..40 {
            assert_eq!(row.get(x), m.get(x, 2));
        }
    }
}
