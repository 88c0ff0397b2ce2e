//! Moving pixels between palettes and canvases.

use crate::color::Rgb;

/// Remaps `pixels` from `src` indices to the nearest color in `dst`.
///
/// Nearest means smallest squared RGB distance; ties go to the lower index.
/// Indices with no entry in `src` are treated as black.
pub fn adapt(pixels: &[u8], src: &[Rgb], dst: &[Rgb]) -> Vec<u8> {
    let nearest = |color: Rgb| -> u8 {
        dst.iter()
            .enumerate()
            .min_by_key(|&(i, &c)| (color.distance_sq(c), i))
            .map_or(0, |(i, _)| i as u8)
    };
    let lut: Vec<u8> = (0..256)
        .map(|i| nearest(src.get(i).copied().unwrap_or(Rgb::BLACK)))
        .collect();
    pixels.iter().map(|&p| lut[p as usize]).collect()
}

/// Draws `src` (`sw` x `sh`) into `dest` (`dw` x `dh`) with its top-left at
/// (`x`, `y`). Anything landing outside `dest` is dropped.
///
/// Drawn cells are stored as `index + 1` so they stay distinguishable from
/// cells the source never touched.
#[allow(clippy::too_many_arguments)]
pub fn composite(dest: &mut [u8], dw: usize, dh: usize, src: &[u8], sw: usize, sh: usize, x: i32, y: i32) {
    // only the overlap is visited, whatever size the source claims
    let visible = |offset: i32, extent: usize, bound: usize| {
        let start = (-(offset as i64)).max(0);
        let end = (extent as i64).min(bound as i64 - offset as i64);
        start.min(end.max(0)) as usize..end.max(0) as usize
    };
    for row in visible(y, sh, dh) {
        let dy = (row as i64 + y as i64) as usize;
        for col in visible(x, sw, dw) {
            let dx = (col as i64 + x as i64) as usize;
            let index = sw.checked_mul(row).and_then(|i| i.checked_add(col));
            let Some(&p) = index.and_then(|i| src.get(i)) else {
                return;
            };
            if let Some(cell) = dest.get_mut(dx + dw * dy) {
                *cell = p.wrapping_add(1);
            }
        }
    }
}
