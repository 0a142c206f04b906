mod copier;

use std::time::Instant;

use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::error::Error;
use crate::fonts::helvetica_text_width;

/// Resource name under which the overlay font is injected into each page.
/// Prefixed to stay clear of names the merged uploads may already use.
const OVERLAY_FONT: &str = "RptF0";

const FOOTER_FONT_SIZE: f32 = 9.0;
const FOOTER_BASELINE: f32 = 30.0;
const FOOTER_RIGHT_MARGIN: f32 = 50.0;

const TITLE_FONT_SIZE: f32 = 11.0;
const TITLE_TOP_OFFSET: f32 = 30.0;
const TITLE_LEFT_MARGIN: f32 = 50.0;

/// One fetched applicant document, ready to merge.
pub(crate) struct Attachment {
    pub(crate) title: String,
    pub(crate) bytes: Vec<u8>,
}

/// Second stage of report assembly: re-parse the rendered base document,
/// append each fetched upload, then stamp "i of N" on every page. Footers
/// come last because N is unknown until all merges have settled.
pub(crate) fn finalize(base: Vec<u8>, attachments: &[Attachment]) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let mut doc = Document::load_mem(&base)
        .map_err(|e| Error::Pdf(format!("re-parsing rendered document: {e}")))?;
    let font_id = add_overlay_font(&mut doc);

    let mut merged = 0;
    for att in attachments {
        match append_attachment(&mut doc, att, font_id) {
            Ok(()) => merged += 1,
            Err(e) => log::warn!("skipping document \"{}\": {e}", att.title),
        }
    }

    stamp_page_footers(&mut doc, font_id)?;

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    log::info!(
        "Compose: merged {merged}/{} documents, {} pages, {:.1}ms",
        attachments.len(),
        doc.get_pages().len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(out)
}

/// Non-embedded Helvetica for footers and title stamps. One object serves
/// every page that ends up referencing [`OVERLAY_FONT`].
fn add_overlay_font(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    })
}

fn append_attachment(doc: &mut Document, att: &Attachment, font_id: ObjectId) -> Result<(), Error> {
    let source = Document::load_mem(&att.bytes)
        .map_err(|e| Error::Pdf(format!("unreadable document: {e}")))?;
    let new_ids = copier::append_pages(doc, &source)?;

    // Label the first merged page so a reader knows which upload starts here.
    if let Some(first) = new_ids.first() {
        let mb = media_box(doc, *first);
        let stream = format!(
            "q\n0.15 0.29 0.47 rg\nBT\n/{OVERLAY_FONT} {TITLE_FONT_SIZE} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\nQ\n",
            mb[0] + TITLE_LEFT_MARGIN,
            mb[3] - TITLE_TOP_OFFSET,
            escape_pdf_text(&att.title),
        );
        ensure_page_font(doc, *first, font_id)?;
        append_page_content(doc, *first, stream.into_bytes())?;
    }

    Ok(())
}

fn stamp_page_footers(doc: &mut Document, font_id: ObjectId) -> Result<(), Error> {
    let pages = doc.get_pages();
    let total = pages.len();

    for (number, page_id) in pages {
        let text = format!("{number} of {total}");
        let mb = media_box(doc, page_id);
        let x = mb[2] - FOOTER_RIGHT_MARGIN - helvetica_text_width(&text, FOOTER_FONT_SIZE);
        let stream = format!(
            "q\n0.4 g\nBT\n/{OVERLAY_FONT} {FOOTER_FONT_SIZE} Tf\n{x:.2} {:.2} Td\n({text}) Tj\nET\nQ\n",
            mb[1] + FOOTER_BASELINE,
        );
        ensure_page_font(doc, page_id, font_id)?;
        append_page_content(doc, page_id, stream.into_bytes())?;
    }

    Ok(())
}

/// Resolve a page's MediaBox, following an indirect box or the Pages chain.
/// Falls back to US Letter when the document never declares one.
fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    fn walk(doc: &Document, obj: &Object, depth: usize) -> Option<[f32; 4]> {
        if depth == 0 {
            return None;
        }
        let dict = obj.as_dict().ok()?;
        if let Ok(raw) = dict.get(b"MediaBox") {
            let arr = match raw {
                Object::Array(arr) => Some(arr),
                Object::Reference(id) => match doc.get_object(*id) {
                    Ok(Object::Array(arr)) => Some(arr),
                    _ => None,
                },
                _ => None,
            };
            if let Some(arr) = arr
                && arr.len() == 4
            {
                let values: Vec<f32> = arr
                    .iter()
                    .filter_map(|o| match o {
                        Object::Integer(i) => Some(*i as f32),
                        Object::Real(r) => Some(*r),
                        _ => None,
                    })
                    .collect();
                if let [a, b, c, d] = values[..] {
                    return Some([a, b, c, d]);
                }
            }
        }
        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent")
            && let Ok(parent) = doc.get_object(*parent_id)
        {
            return walk(doc, parent, depth - 1);
        }
        None
    }

    doc.get_object(page_id)
        .ok()
        .and_then(|obj| walk(doc, obj, 10))
        .unwrap_or([0.0, 0.0, 612.0, 792.0])
}

/// Where the overlay font entry has to be written for a given page. Resolved
/// read-only first so the mutation below needs only one live borrow.
enum FontSlot {
    FontDict(ObjectId),
    ResourcesDict(ObjectId),
    PageInline,
}

/// Make [`OVERLAY_FONT`] resolvable from a page, whatever shape its
/// Resources take. Merged uploads may share referenced resource dictionaries
/// or carry them inline; our own pages always inline them.
fn ensure_page_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<(), Error> {
    let slot = {
        let page = doc.get_object(page_id)?.as_dict()?;
        match page.get(b"Resources") {
            Ok(Object::Reference(res_id)) => {
                let res = doc.get_object(*res_id)?.as_dict()?;
                match res.get(b"Font") {
                    Ok(Object::Reference(f_id)) => FontSlot::FontDict(*f_id),
                    _ => FontSlot::ResourcesDict(*res_id),
                }
            }
            Ok(Object::Dictionary(res)) => match res.get(b"Font") {
                Ok(Object::Reference(f_id)) => FontSlot::FontDict(*f_id),
                _ => FontSlot::PageInline,
            },
            _ => FontSlot::PageInline,
        }
    };

    match slot {
        FontSlot::FontDict(f_id) => {
            doc.get_object_mut(f_id)?
                .as_dict_mut()?
                .set(OVERLAY_FONT, Object::Reference(font_id));
        }
        FontSlot::ResourcesDict(res_id) => {
            let res = doc.get_object_mut(res_id)?.as_dict_mut()?;
            match res.get_mut(b"Font") {
                Ok(Object::Dictionary(fonts)) => {
                    fonts.set(OVERLAY_FONT, Object::Reference(font_id));
                }
                _ => res.set(
                    "Font",
                    dictionary! { OVERLAY_FONT => Object::Reference(font_id) },
                ),
            }
        }
        FontSlot::PageInline => {
            let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
            match page.get_mut(b"Resources") {
                Ok(Object::Dictionary(res)) => match res.get_mut(b"Font") {
                    Ok(Object::Dictionary(fonts)) => {
                        fonts.set(OVERLAY_FONT, Object::Reference(font_id));
                    }
                    _ => res.set(
                        "Font",
                        dictionary! { OVERLAY_FONT => Object::Reference(font_id) },
                    ),
                },
                _ => page.set(
                    "Resources",
                    dictionary! {
                        "Font" => dictionary! { OVERLAY_FONT => Object::Reference(font_id) },
                    },
                ),
            }
        }
    }

    Ok(())
}

/// Append an overlay stream after a page's existing content so it draws on
/// top of whatever the page already shows.
fn append_page_content(doc: &mut Document, page_id: ObjectId, content: Vec<u8>) -> Result<(), Error> {
    let stream_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, content)));
    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;

    match page.get(b"Contents").ok().cloned() {
        Some(Object::Reference(existing)) => {
            page.set(
                "Contents",
                Object::Array(vec![
                    Object::Reference(existing),
                    Object::Reference(stream_id),
                ]),
            );
        }
        Some(Object::Array(mut arr)) => {
            arr.push(Object::Reference(stream_id));
            page.set("Contents", Object::Array(arr));
        }
        _ => page.set("Contents", Object::Reference(stream_id)),
    }

    Ok(())
}

/// Escape the characters that delimit a literal string in a content stream.
fn escape_pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}
