// src/qr/multi.rs
//! Поиск и декодирование нескольких QR-символов на одном изображении
//! (упрощённый аналог `MultiDetector`/`MultiFinderPatternFinder`, §4.K/§4.M).
//!
//! Полный zxing-алгоритм группирует finder-кандидатов по согласованности
//! модульного размера и геометрии под гомографию. Здесь группировка грубее:
//! кластеры сортируются по "весу" (качеству совпадения), затем жадно
//! разбиваются на тройки, чей треугольник похож на прямоугольный
//! равнобедренный (два катета почти равны, прямой угол в TL) — ровно то, что
//! проверяет `finder::order_finders` геометрией, только здесь это ещё и
//! критерий отбора, а не только сортировки. Каждая принятая тройка
//! удаляется из пула прежде, чем искать следующую, так что один finder не
//! попадает в два символа. Потолок принят как практическая мера (см.
//! DESIGN.md), а не ограничение протокола.

use super::detector::decode_from_finders;
use super::finder::{self, order_finders, PointF};
use super::QrOptions;
use crate::prelude::DecodedSymbol;
use crate::core::types::GrayImage;

/// Максимум кандидатов-троек, которые мы вообще пробуем декодировать —
/// защита от O(n^3) перебора на зашумлённых изображениях с множеством
/// ложных finder-кандидатов.
const MAX_SYMBOLS: usize = 16;

/// Найти и декодировать столько QR-символов, сколько получится, на одном
/// изображении. Возвращает успешно раскодированные символы; кандидаты,
/// прошедшие геометрический отбор, но не прошедшие дальше (плохой формат,
/// RS не сошёлся), тихо отбрасываются — как и при одиночном поиске.
pub fn find_all_qr_codes(img: &GrayImage<'_>, opts: &QrOptions) -> Vec<DecodedSymbol> {
    let mut pool = finder::cluster_finder_candidates(img, opts);
    let mut out = Vec::new();

    while pool.len() >= 3 && out.len() < MAX_SYMBOLS {
        let Some((i, j, k)) = best_triple(&pool) else {
            break;
        };

        let ordered = order_finders([pool[i].0, pool[j].0, pool[k].0]);
        let result = decode_from_finders(img, opts, ordered[0], ordered[1], ordered[2]);

        // Удаляем использованную тройку из пула независимо от исхода
        // декодирования: если геометрия подошла, но биты не сошлись, это
        // либо шум, либо искажённый символ — повторная попытка с той же
        // тройкой её не исправит. Индексы удаляются по убыванию, чтобы
        // более ранние индексы не съехали.
        let mut idxs = [i, j, k];
        idxs.sort_unstable_by(|a, b| b.cmp(a));
        for idx in idxs {
            pool.remove(idx);
        }

        if let Ok(sym) = result {
            out.push(sym);
        }
    }

    out
}

/// Найти индексы тройки кластеров, чья геометрия больше всего похожа на
/// три угла finder-паттернов QR (прямой угол, катеты сопоставимой длины).
/// Перебирает сочетания по убыванию суммарного веса кластеров (лучшие
/// кандидаты сначала).
fn best_triple(pool: &[(PointF, usize)]) -> Option<(usize, usize, usize)> {
    let n = pool.len();
    let mut best: Option<(f32, (usize, usize, usize))> = None;

    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let score = triangle_score(pool[i].0, pool[j].0, pool[k].0);
                let Some(score) = score else { continue };
                let weight = (pool[i].1 + pool[j].1 + pool[k].1) as f32;
                let combined = score - weight * 0.001; // лёгкий тай-брейк в пользу веса
                let better = match best {
                    Some((b, _)) => combined < b,
                    None => true,
                };
                if better {
                    best = Some((combined, (i, j, k)));
                }
            }
        }
    }

    best.map(|(_, idx)| idx)
}

/// Оценка "похожести на finder-угол": чем меньше, тем лучше. `None`, если
/// тройка геометрически совсем не похожа на finder-паттерны (например,
/// почти коллинеарна).
fn triangle_score(a: PointF, b: PointF, c: PointF) -> Option<f32> {
    let d_ab = a.dist2(b).sqrt();
    let d_bc = b.dist2(c).sqrt();
    let d_ac = a.dist2(c).sqrt();

    let sides = [d_ab, d_bc, d_ac];
    let hyp = sides.iter().cloned().fold(f32::MIN, f32::max);
    if hyp <= f32::EPSILON {
        return None;
    }
    let legs_sum: f32 = sides.iter().sum::<f32>() - hyp;

    // Равнобедренный прямоугольный треугольник: катеты равны, гипотенуза ~ катет*sqrt(2).
    let other_two: Vec<f32> = sides.iter().cloned().filter(|&s| s != hyp).collect();
    if other_two.len() != 2 {
        return None;
    }
    let leg_ratio = (other_two[0] - other_two[1]).abs() / legs_sum.max(1.0);
    let hyp_ratio = (hyp - other_two[0] * std::f32::consts::SQRT_2).abs() / hyp;

    Some(leg_ratio + hyp_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::encode::synthesize_qr_v1_from_text;

    #[test]
    fn finds_single_qr_via_multi_path() {
        let img = synthesize_qr_v1_from_text("HI", 3, 4);
        let opts = QrOptions::default();
        let symbols = find_all_qr_codes(&img, &opts);
        assert!(symbols.iter().any(|s| s.text == "HI"));
    }
}
