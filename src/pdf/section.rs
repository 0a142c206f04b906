use pdf_writer::{Content, Name, Str};

use crate::fonts::{Fonts, to_winansi_bytes};
use crate::model::{PLACEHOLDER, SectionSpec};

use super::builder::{CONTENT_WIDTH, MARGIN, ReportBuilder, ROW_HEIGHT};

const BANNER_HEIGHT: f32 = 32.0;
const HEADER_HEIGHT: f32 = 24.0;
const LABEL_COLUMN_WIDTH: f32 = 180.0;
const CELL_PADDING: f32 = 6.0;
const TABLE_GAP: f32 = 14.0;

// Dashboard accent blue, white title text on top of it.
const HEADER_FILL: [f32; 3] = [0.15, 0.29, 0.47];
const ROW_BORDER: [f32; 3] = [0.65, 0.65, 0.65];

const HEADER_FONT_SIZE: f32 = 11.0;
const ROW_FONT_SIZE: f32 = 9.0;

/// Report title banner at the top of the first page.
pub(super) fn draw_title_banner(builder: &mut ReportBuilder, fonts: &Fonts, application_id: &str) {
    let y0 = builder.y();
    let content = builder.page();

    content.set_fill_rgb(HEADER_FILL[0], HEADER_FILL[1], HEADER_FILL[2]);
    content.rect(MARGIN, y0 - BANNER_HEIGHT, CONTENT_WIDTH, BANNER_HEIGHT);
    content.fill_nonzero();

    let title = "Scholarship Application Report";
    let title_size = 15.0;
    let title_x = MARGIN + (CONTENT_WIDTH - fonts.bold.text_width(title, title_size)) / 2.0;
    content.set_fill_rgb(1.0, 1.0, 1.0);
    content
        .begin_text()
        .set_font(Name(fonts.bold.pdf_name.as_bytes()), title_size)
        .next_line(title_x, y0 - BANNER_HEIGHT + 10.0)
        .show(Str(&to_winansi_bytes(title)))
        .end_text();
    content.set_fill_gray(0.0);
    builder.advance(BANNER_HEIGHT);

    let subtitle = format!("Application {application_id}");
    let sub_x = MARGIN + (CONTENT_WIDTH - fonts.regular.text_width(&subtitle, 10.0)) / 2.0;
    let y1 = builder.y();
    builder
        .page()
        .begin_text()
        .set_font(Name(fonts.regular.pdf_name.as_bytes()), 10.0)
        .next_line(sub_x, y1 - 12.0)
        .show(Str(&to_winansi_bytes(&subtitle)))
        .end_text();
    builder.advance(16.0 + TABLE_GAP);
}

/// One titled section: header bar plus the bordered label/value table.
pub(super) fn draw_section(builder: &mut ReportBuilder, fonts: &Fonts, spec: &SectionSpec) {
    draw_section_header(builder, fonts, spec.title);
    draw_table(builder, fonts, &spec.rows);
}

fn draw_section_header(builder: &mut ReportBuilder, fonts: &Fonts, title: &str) {
    // Reserve two row units so a header never sits alone at a page bottom.
    builder.ensure_space(2);
    let y0 = builder.y();
    let content = builder.page();

    content.set_fill_rgb(HEADER_FILL[0], HEADER_FILL[1], HEADER_FILL[2]);
    content.rect(MARGIN, y0 - HEADER_HEIGHT, CONTENT_WIDTH, HEADER_HEIGHT);
    content.fill_nonzero();

    content.set_fill_rgb(1.0, 1.0, 1.0);
    content
        .begin_text()
        .set_font(Name(fonts.bold.pdf_name.as_bytes()), HEADER_FONT_SIZE)
        .next_line(MARGIN + CELL_PADDING, y0 - HEADER_HEIGHT + 8.0)
        .show(Str(&to_winansi_bytes(title)))
        .end_text();
    content.set_fill_gray(0.0);

    builder.advance(HEADER_HEIGHT);
}

fn draw_table(builder: &mut ReportBuilder, fonts: &Fonts, rows: &[(&str, Option<String>)]) {
    let mut segment_top = builder.y();

    for (label, value) in rows {
        // A table may split mid-table; the outer border closes per segment.
        if !builder.fits(1) {
            let bottom = builder.y();
            stroke_outer_border(builder.page(), segment_top, bottom);
            builder.ensure_space(1);
            segment_top = builder.y();
        }
        draw_row(builder, fonts, label, value.as_deref());
    }

    let bottom = builder.y();
    stroke_outer_border(builder.page(), segment_top, bottom);
    builder.advance(TABLE_GAP);
}

fn draw_row(builder: &mut ReportBuilder, fonts: &Fonts, label: &str, value: Option<&str>) {
    let y0 = builder.y();
    let content = builder.page();
    let baseline = y0 - ROW_HEIGHT + 5.5;

    content.set_line_width(0.5);
    content.set_stroke_rgb(ROW_BORDER[0], ROW_BORDER[1], ROW_BORDER[2]);
    content.rect(MARGIN, y0 - ROW_HEIGHT, CONTENT_WIDTH, ROW_HEIGHT);
    content.stroke();

    // Divider between the label column and the value column.
    content.move_to(MARGIN + LABEL_COLUMN_WIDTH, y0);
    content.line_to(MARGIN + LABEL_COLUMN_WIDTH, y0 - ROW_HEIGHT);
    content.stroke();

    let label_text = fonts.bold.fit_text(
        label,
        ROW_FONT_SIZE,
        LABEL_COLUMN_WIDTH - 2.0 * CELL_PADDING,
    );
    content
        .begin_text()
        .set_font(Name(fonts.bold.pdf_name.as_bytes()), ROW_FONT_SIZE)
        .next_line(MARGIN + CELL_PADDING, baseline)
        .show(Str(&to_winansi_bytes(&label_text)))
        .end_text();

    let value_text = fonts.regular.fit_text(
        value.unwrap_or(PLACEHOLDER),
        ROW_FONT_SIZE,
        CONTENT_WIDTH - LABEL_COLUMN_WIDTH - 2.0 * CELL_PADDING,
    );
    content
        .begin_text()
        .set_font(Name(fonts.regular.pdf_name.as_bytes()), ROW_FONT_SIZE)
        .next_line(MARGIN + LABEL_COLUMN_WIDTH + CELL_PADDING, baseline)
        .show(Str(&to_winansi_bytes(&value_text)))
        .end_text();

    builder.advance(ROW_HEIGHT);
}

/// Heavier border around one on-page segment of a table.
fn stroke_outer_border(content: &mut Content, top: f32, bottom: f32) {
    if top - bottom < 1.0 {
        return;
    }
    content.save_state();
    content.set_line_width(1.2);
    content.set_stroke_rgb(0.2, 0.2, 0.2);
    content.rect(MARGIN, bottom, CONTENT_WIDTH, top - bottom);
    content.stroke();
    content.restore_state();
}
