//! Hand-lettered cartridge labels.

use rand::Rng;

/// 5 columns per glyph, MSB is the top row of 8.
const FONT: [[u8; 5]; 38] = [
    [0x3F, 0x50, 0x90, 0x50, 0x3F], // A
    [0xFF, 0x91, 0x91, 0x91, 0x6E], // B
    [0x7E, 0x81, 0x81, 0x81, 0x42], // C
    [0xFF, 0x81, 0x81, 0x81, 0x7E], // D
    [0xFF, 0x91, 0x91, 0x81, 0x81], // E
    [0xFF, 0x90, 0x90, 0x80, 0x80], // F
    [0x7E, 0x81, 0x91, 0x91, 0x9E], // G
    [0xFF, 0x10, 0x10, 0x10, 0xFF], // H
    [0x81, 0x81, 0xFF, 0x81, 0x81], // I
    [0x02, 0x81, 0x81, 0xFE, 0x80], // J
    [0xFF, 0x10, 0x20, 0x50, 0x8F], // K
    [0xFF, 0x01, 0x01, 0x01, 0x01], // L
    [0xFF, 0x40, 0x20, 0x40, 0xFF], // M
    [0xFF, 0x40, 0x20, 0x10, 0xFF], // N
    [0x7E, 0x81, 0x81, 0x81, 0x7E], // O
    [0xFF, 0x90, 0x90, 0x90, 0x60], // P
    [0x7E, 0x81, 0x85, 0x82, 0x7D], // Q
    [0xFF, 0x90, 0x90, 0x98, 0x67], // R
    [0x62, 0x91, 0x91, 0x91, 0x4E], // S
    [0x80, 0x80, 0xFF, 0x80, 0x80], // T
    [0xFE, 0x01, 0x01, 0x01, 0xFE], // U
    [0xFC, 0x02, 0x01, 0x02, 0xFC], // V
    [0xFF, 0x02, 0x04, 0x02, 0xFF], // W
    [0xC7, 0x28, 0x10, 0x28, 0xC7], // X
    [0xC0, 0x20, 0x1F, 0x20, 0xC0], // Y
    [0x87, 0x89, 0x91, 0xA1, 0xC1], // Z
    [0x7E, 0x81, 0x99, 0x81, 0x7E], // 0
    [0x21, 0x41, 0xFF, 0x01, 0x01], // 1
    [0x43, 0x85, 0x89, 0x91, 0x61], // 2
    [0x82, 0x81, 0xA1, 0xD1, 0x8E], // 3
    [0xF0, 0x10, 0x10, 0xFF, 0x10], // 4
    [0xF2, 0x91, 0x91, 0x91, 0x9E], // 5
    [0x7E, 0x91, 0x91, 0x91, 0x4E], // 6
    [0x80, 0x90, 0x9F, 0xB0, 0xD0], // 7
    [0x6E, 0x91, 0x91, 0x91, 0x6E], // 8
    [0x62, 0x91, 0x91, 0x91, 0x7E], // 9
    [0x00, 0x00, 0x06, 0x06, 0x00], // .
    [0x00, 0x10, 0x10, 0x10, 0x10], // -
];

const ORIGIN_X: i32 = 16;
const ORIGIN_Y: i32 = 32;
const ADVANCE: i32 = 6;
const LINE_HEIGHT: i32 = 9;
/// Columns this close to the right edge are never inked.
const MARGIN: i32 = 16;

const DROPOUT: f64 = 0.05;
const JITTER: f64 = 0.2;

fn glyph(c: char) -> Option<&'static [u8; 5]> {
    let index = match c {
        'A'..='Z' => c as usize - 'A' as usize,
        '0'..='9' => 26 + c as usize - '0' as usize,
        '.' => 36,
        '-' => 37,
        _ => return None,
    };
    Some(&FONT[index])
}

/// Uppercases and swaps anything the font can't draw for `.`.
/// Spaces and newlines survive for layout.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_uppercase)
        .map(|c| match c {
            'A'..='Z' | '0'..='9' | '.' | '-' | ' ' | '\n' => c,
            _ => '.',
        })
        .collect()
}

/// Stamps `text` into a `width` x `height` index buffer using `pen`.
///
/// The pen wanders by a pixel now and then and drops the odd dot, so no two
/// labels come out quite alike. Glyphs running past the margin are clipped,
/// as is anything past the end of a `pixels` shorter than `width * height`.
pub fn print_label<R: Rng>(pixels: &mut [u8], width: usize, height: usize, pen: u8, text: &str, rng: &mut R) {
    let (w, h) = (width as i32, height as i32);
    let (mut cx, mut cy) = (ORIGIN_X, ORIGIN_Y);

    for c in sanitize(text).chars() {
        match c {
            ' ' => cx += ADVANCE,
            '\n' => {
                cx = ORIGIN_X;
                cy += LINE_HEIGHT;
            }
            _ => {
                let Some(columns) = glyph(c) else { continue };
                for (x, column) in columns.iter().enumerate() {
                    for y in 0..8 {
                        let (px, py) = (cx + x as i32, cy + y);
                        if px < 0 || py < 0 || px > w - MARGIN || py >= h {
                            continue;
                        }
                        if rng.gen_bool(DROPOUT) {
                            continue;
                        }
                        if (column >> (7 - y)) & 1 == 0 {
                            continue;
                        }
                        if let Some(cell) = pixels.get_mut(px as usize + width * py as usize) {
                            *cell = pen;
                        }
                    }
                }
                cx += ADVANCE;
            }
        }
        if rng.gen_bool(JITTER) {
            cx += if rng.gen_bool(0.5) { 1 } else { -1 };
        }
        if rng.gen_bool(JITTER) {
            cy += if rng.gen_bool(0.5) { 1 } else { -1 };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn inked(pixels: &[u8], pen: u8) -> usize {
        pixels.iter().filter(|&&p| p == pen).count()
    }

    #[test]
    fn sanitizes_to_the_font() {
        assert_eq!(sanitize("Hello, world!\n2-b"), "HELLO. WORLD.\n2-B");
    }

    #[test]
    fn draws_near_the_origin() {
        let (w, h) = (160, 128);
        let mut pixels = vec![0u8; w * h];
        print_label(&mut pixels, w, h, 1, "TEST", &mut StdRng::seed_from_u64(7));

        let total_bits: usize = "TEST"
            .chars()
            .map(|c| glyph(c).unwrap().iter().map(|b| b.count_ones() as usize).sum::<usize>())
            .sum();
        let n = inked(&pixels, 1);
        assert!(n > total_bits / 2 && n <= total_bits, "{n} of {total_bits}");

        for (i, &p) in pixels.iter().enumerate() {
            if p == 1 {
                let (x, y) = (i % w, i / w);
                assert!((14..=45).contains(&x) && (28..=44).contains(&y), "stray ink at ({x},{y})");
            }
        }
    }

    #[test]
    fn seeded_output_is_repeatable() {
        let mut a = vec![0u8; 64 * 64];
        let mut b = vec![0u8; 64 * 64];
        print_label(&mut a, 64, 64, 3, "octo", &mut StdRng::seed_from_u64(1));
        print_label(&mut b, 64, 64, 3, "octo", &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn clips_instead_of_wrapping() {
        let (w, h) = (48, 40);
        let mut pixels = vec![0u8; w * h];
        print_label(&mut pixels, w, h, 2, "MMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMM", &mut StdRng::seed_from_u64(3));
        assert!(inked(&pixels, 2) > 0);
        for (i, &p) in pixels.iter().enumerate() {
            if p == 2 {
                assert!(i % w <= w - 16);
            }
        }
    }

    #[test]
    fn short_buffers_are_clipped() {
        let (w, h) = (160, 128);
        let mut pixels = vec![0u8; w * 34];
        print_label(&mut pixels, w, h, 1, "TEST\nTEST", &mut StdRng::seed_from_u64(5));
        assert!(inked(&pixels, 1) > 0);
        assert_eq!(pixels.len(), w * 34);
    }

    #[test]
    fn newlines_start_a_lower_row() {
        let (w, h) = (160, 128);
        let mut pixels = vec![0u8; w * h];
        print_label(&mut pixels, w, h, 1, "\n\n\nI", &mut StdRng::seed_from_u64(11));
        let first_row = pixels.iter().position(|&p| p == 1).unwrap() / w;
        assert!(first_row >= 32 + 27 - 4, "row {first_row}");
    }
}
