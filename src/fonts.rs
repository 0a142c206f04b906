use pdf_writer::{Name, Pdf, Ref};

/// A registered base-14 font: PDF resource name plus approximate widths for
/// layout (column fitting, centering, right-aligned footers).
pub(crate) struct FontEntry {
    pub(crate) pdf_name: &'static str,
    pub(crate) font_ref: Ref,
    widths_1000: Vec<f32>,
}

impl FontEntry {
    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| {
                let byte = char_to_winansi(ch);
                if byte >= 32 {
                    self.widths_1000[(byte - 32) as usize]
                } else {
                    0.0
                }
            })
            .sum::<f32>()
            * font_size
            / 1000.0
    }

    /// Truncate `text` so it fits within `max_width`, appending "..." when
    /// anything was cut. Keeps table rows from bleeding into the border.
    pub(crate) fn fit_text(&self, text: &str, font_size: f32, max_width: f32) -> String {
        if self.text_width(text, font_size) <= max_width {
            return text.to_string();
        }
        let ellipsis_w = self.text_width("...", font_size);
        let mut out = String::new();
        let mut used = 0.0;
        for ch in text.chars() {
            let w = self.text_width(&ch.to_string(), font_size);
            if used + w + ellipsis_w > max_width {
                break;
            }
            used += w;
            out.push(ch);
        }
        out.push_str("...");
        out
    }
}

/// Both fonts used by the summary pages.
pub(crate) struct Fonts {
    pub(crate) regular: FontEntry,
    pub(crate) bold: FontEntry,
}

/// Register Helvetica and Helvetica-Bold as non-embedded Type1 fonts with
/// WinAnsi encoding. Viewers are required to supply the base-14 set, so no
/// font program is shipped in the file.
pub(crate) fn register_base_fonts(pdf: &mut Pdf, alloc: &mut impl FnMut() -> Ref) -> Fonts {
    let regular_ref = alloc();
    pdf.type1_font(regular_ref)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let bold_ref = alloc();
    pdf.type1_font(bold_ref)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    Fonts {
        regular: FontEntry {
            pdf_name: "F1",
            font_ref: regular_ref,
            widths_1000: helvetica_widths(false),
        },
        bold: FontEntry {
            pdf_name: "F2",
            font_ref: bold_ref,
            widths_1000: helvetica_widths(true),
        },
    }
}

/// Width of `text` in points when set in Helvetica. For overlay streams on
/// merged pages, where no `FontEntry` exists.
pub(crate) fn helvetica_text_width(text: &str, font_size: f32) -> f32 {
    let widths = helvetica_widths(false);
    text.chars()
        .map(|ch| {
            let byte = char_to_winansi(ch);
            if byte >= 32 { widths[(byte - 32) as usize] } else { 0.0 }
        })
        .sum::<f32>()
        * font_size
        / 1000.0
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths(bold: bool) -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J (narrow uppercase)
            77 => if bold { 889.0 } else { 833.0 }, // M (wide)
            65..=90 => if bold { 722.0 } else { 667.0 }, // uppercase A-Z (average)
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
            109 | 119 => if bold { 889.0 } else { 833.0 }, // m w (wide)
            97..=122 => if bold { 611.0 } else { 556.0 }, // lowercase a-z (average)
            _ => 556.0,
        })
        .collect()
}

/// Map a char to its WinAnsi byte, 0 when unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x2026 => 0x85,
        _ => 0,
    }
}

/// Encode text as WinAnsi bytes for a content-stream string. Unmappable
/// chars become '?' rather than corrupting the stream.
pub(crate) fn to_winansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let b = char_to_winansi(c);
            if b >= 32 { b } else { b'?' }
        })
        .collect()
}
