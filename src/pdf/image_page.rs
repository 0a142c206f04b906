use pdf_writer::{Name, Str};

use crate::fonts::{Fonts, to_winansi_bytes};

use super::builder::{CONTENT_WIDTH, MARGIN, PAGE_HEIGHT, ReportBuilder};

const TITLE_BAND: f32 = 30.0;
const TITLE_FONT_SIZE: f32 = 13.0;

/// Scale pixel dimensions to fit inside `max_w` x `max_h` without changing
/// the aspect ratio. Never scales up past the box.
pub(super) fn fit_dimensions(img_w: u32, img_h: u32, max_w: f32, max_h: f32) -> (f32, f32) {
    let scale = (max_w / img_w as f32).min(max_h / img_h as f32);
    (img_w as f32 * scale, img_h as f32 * scale)
}

/// One dedicated page per captured screenshot: title near the top, the image
/// scaled and centered in the remaining content box.
pub(super) fn compose_image_page(
    builder: &mut ReportBuilder,
    fonts: &Fonts,
    title: &str,
    resource_name: &str,
    img_w: u32,
    img_h: u32,
) {
    builder.new_page();
    let top = builder.y();
    let content = builder.page();

    content
        .begin_text()
        .set_font(Name(fonts.bold.pdf_name.as_bytes()), TITLE_FONT_SIZE)
        .next_line(MARGIN, top - TITLE_FONT_SIZE)
        .show(Str(&to_winansi_bytes(title)))
        .end_text();

    let avail_h = PAGE_HEIGHT - 2.0 * MARGIN - TITLE_BAND;
    let (draw_w, draw_h) = fit_dimensions(img_w, img_h, CONTENT_WIDTH, avail_h);

    // Centered horizontally, anchored just below the title band.
    let x = MARGIN + (CONTENT_WIDTH - draw_w) / 2.0;
    let y_bottom = top - TITLE_BAND - draw_h;

    content.save_state();
    content.transform([draw_w, 0.0, 0.0, draw_h, x, y_bottom]);
    content.x_object(Name(resource_name.as_bytes()));
    content.restore_state();

    builder.advance(TITLE_BAND + draw_h);
}
