//! Sheet composition: border cropping, card framing and grid assembly.

use crate::models::ResolvedImage;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// Cards per sheet and per row.
pub const CARDS_PER_SHEET: usize = 9;
const CARDS_PER_ROW: u32 = 3;

// Empirically determined card size == (2.24 inches, 3.24 inches)
const CARD_WIDTH_IN: f64 = 2.24;
const CARD_HEIGHT_IN: f64 = 3.24;

/// A rendered sheet and its output file name.
pub struct ComposedSheet {
    pub name: String,
    pub image: RgbImage,
}

/// Crops the uniform border of a scanned card image.
///
/// The pixel at (0, 0) is assumed to be the background color; a brightened
/// copy is diffed against it, the difference is amplified and thresholded,
/// and the image is cropped to the bounding box of what remains. Noisy or
/// vignetted scans can defeat the corner-pixel assumption.
pub fn crop_border(image: &RgbImage) -> RgbImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let bg = *image.get_pixel(0, 0);
    // (left, top, right, bottom), right/bottom exclusive
    let mut bbox: Option<(u32, u32, u32, u32)> = None;
    for (x, y, px) in image.enumerate_pixels() {
        let mut content = 0u32;
        for c in 0..3 {
            let bright = (2 * px[c] as u32).min(255);
            let diff = bright.abs_diff(bg[c] as u32);
            content += (2 * diff).saturating_sub(100).min(255);
        }
        if content > 0 {
            bbox = Some(match bbox {
                None => (x, y, x + 1, y + 1),
                Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x + 1), b.max(y + 1)),
            });
        }
    }
    match bbox {
        Some((l, t, r, b)) => imageops::crop_imm(image, l, t, r - l, b - t).to_image(),
        None => image.clone(),
    }
}

/// Scales (width, height) to fit within the bounds, preserving aspect
/// ratio; the smaller scaling factor wins. Degenerate zero dimensions
/// are clamped against the bounds without scaling.
pub fn scale_to_fit(width: f64, height: f64, bounds_width: f64, bounds_height: f64) -> (f64, f64) {
    if width <= 0.0 {
        return (width, height.min(bounds_height));
    }
    if height <= 0.0 {
        return (width.min(bounds_width), height);
    }
    let scale = (bounds_width / width).min(bounds_height / height);
    (width * scale, height * scale)
}

/// Scales a cropped card to the sheet's inner size when needed.
fn fit_card(card: RgbImage, inner_width: u32, inner_height: u32) -> RgbImage {
    if card.width() == inner_width && card.height() == inner_height {
        return card;
    }
    let (new_width, new_height) = scale_to_fit(
        card.width() as f64,
        card.height() as f64,
        inner_width as f64,
        inner_height as f64,
    );
    let (new_width, new_height) = (new_width.ceil() as u32, new_height.ceil() as u32);
    if new_width != card.width() && new_height != card.height() {
        imageops::resize(&card, new_width, new_height, FilterType::Lanczos3)
    } else {
        card
    }
}

/// Lays the resolved images out on sheets of up to nine bordered cards.
///
/// Sheets are filled in input order and sized independently: the inner
/// card size is the largest cropped width/height on that sheet, and the
/// border is a percentage of the inner width, split floor/ceil so the
/// outer size stays integral.
pub fn compose_sheets(images: &[ResolvedImage], margin_percent: f64) -> Vec<ComposedSheet> {
    let mut sheets = Vec::new();
    for (sheet_index, batch) in images.chunks(CARDS_PER_SHEET).enumerate() {
        let cropped: Vec<RgbImage> = batch.iter().map(|r| crop_border(&r.image)).collect();
        let inner_width = cropped.iter().map(|i| i.width()).max().unwrap_or(0);
        let inner_height = cropped.iter().map(|i| i.height()).max().unwrap_or(0);

        let border = (inner_width as f64 * (margin_percent / 100.0) * 2.0).round() / 2.0;
        let border_leading = border.floor() as u32;
        let border_trailing = border.ceil() as u32;
        let outer_width = inner_width + border_leading + border_trailing;
        let outer_height = inner_height + border_leading + border_trailing;

        let card_count = batch.len() as u32;
        let sheet_width = outer_width * card_count.min(CARDS_PER_ROW);
        let sheet_height = outer_height * card_count.div_ceil(CARDS_PER_ROW);

        let dpi = (inner_width as f64 / CARD_WIDTH_IN).min(inner_height as f64 / CARD_HEIGHT_IN);
        let name = format!("Sheet{:02}_{:.2}dpi.png", sheet_index + 1, dpi);

        let mut sheet = RgbImage::from_pixel(sheet_width, sheet_height, Rgb([255, 255, 255]));
        for (i, card) in cropped.into_iter().enumerate() {
            let card = fit_card(card, inner_width, inner_height);
            let mut framed = RgbImage::from_pixel(outer_width, outer_height, Rgb([0, 0, 0]));
            let card_x = border_leading.max((outer_width - card.width()) / 2);
            let card_y = border_leading.max((outer_height - card.height()) / 2);
            imageops::replace(&mut framed, &card, card_x as i64, card_y as i64);

            let i = i as u32;
            let outer_x = outer_width * (i % CARDS_PER_ROW);
            let outer_y = outer_height * (i / CARDS_PER_ROW);
            imageops::replace(&mut sheet, &framed, outer_x as i64, outer_y as i64);
        }

        sheets.push(ComposedSheet { name, image: sheet });
    }
    sheets
}
