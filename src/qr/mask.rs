// src/qr/mask.rs
//! Восемь масочных формул QR (§4.H.3, GLOSSARY "Mask"). Те же формулы, что
//! `apply_mask` в `examples/nayuki-QR-Code-generator` — стандартные
//! XOR-маски ISO/IEC 18004, не специфичные для конкретной реализации.

/// `true`, если модуль `(x,y)` должен быть инвертирован маской `mask_id` (0..7).
pub fn mask_predicate(mask_id: u8, x: usize, y: usize) -> bool {
    let x = x as i64;
    let y = y as i64;
    match mask_id {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => (x / 3 + y / 2) % 2 == 0,
        5 => (x * y) % 2 + (x * y) % 3 == 0,
        6 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
        7 => ((x + y) % 2 + (x * y) % 3) % 2 == 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_zero_checkerboard() {
        assert!(mask_predicate(0, 0, 0));
        assert!(!mask_predicate(0, 1, 0));
        assert!(mask_predicate(0, 2, 0));
    }

    #[test]
    fn all_masks_defined_for_sample_grid() {
        for m in 0u8..8 {
            for y in 0..10 {
                for x in 0..10 {
                    let _ = mask_predicate(m, x, y);
                }
            }
        }
    }
}
