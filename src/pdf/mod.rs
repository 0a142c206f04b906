mod builder;
mod image_page;
mod section;

use std::time::Instant;

use pdf_writer::{Filter, Name, Pdf, Rect, Ref};

use crate::error::Error;
use crate::fonts::register_base_fonts;
use crate::model::{ApplicationData, CapturedImage};

use builder::{PAGE_HEIGHT, PAGE_WIDTH, ReportBuilder};

struct EmbeddedImage {
    pdf_name: String,
    xobj_ref: Ref,
    pixel_width: u32,
    pixel_height: u32,
}

/// Render the base report: title banner, the six summary sections, then one
/// page per captured screenshot. External documents and page footers are
/// applied afterwards by the compose stage, once the final page count exists.
pub(crate) fn render_summary(
    application_id: &str,
    data: &ApplicationData,
    images: &[CapturedImage],
) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let mut pdf = Pdf::new();
    let mut next_id = 1;
    let mut alloc = || {
        let id = Ref::new(next_id);
        next_id += 1;
        id
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let fonts = register_base_fonts(&mut pdf, &mut alloc);

    // Phase 1: embed screenshots as image XObjects.
    let mut embedded: Vec<(EmbeddedImage, &'static str)> = Vec::new();
    for (idx, img) in images.iter().enumerate() {
        let e = embed_png(&mut pdf, &mut alloc, &img.data, idx)?;
        embedded.push((e, img.title));
    }
    let t_images = t0.elapsed();

    // Phase 2: lay out content streams.
    let mut builder = ReportBuilder::new();
    section::draw_title_banner(&mut builder, &fonts, application_id);
    for spec in data.summary_sections() {
        section::draw_section(&mut builder, &fonts, &spec);
    }
    for (img, title) in &embedded {
        image_page::compose_image_page(
            &mut builder,
            &fonts,
            title,
            &img.pdf_name,
            img.pixel_width,
            img.pixel_height,
        );
    }
    let t_layout = t0.elapsed();

    // Phase 3: allocate page and content IDs now that page count is known.
    let contents = builder.into_pages();
    let n = contents.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in contents.into_iter().enumerate() {
        pdf.stream(content_ids[i], &c.finish());
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut font_dict = resources.fonts();
            font_dict.pair(Name(fonts.regular.pdf_name.as_bytes()), fonts.regular.font_ref);
            font_dict.pair(Name(fonts.bold.pdf_name.as_bytes()), fonts.bold.font_ref);
        }
        if !embedded.is_empty() {
            let mut xobjects = resources.x_objects();
            for (img, _) in &embedded {
                xobjects.pair(Name(img.pdf_name.as_bytes()), img.xobj_ref);
            }
        }
    }

    let t_assembly = t0.elapsed();
    log::info!(
        "Summary render: images={:.1}ms, layout={:.1}ms, assembly={:.1}ms, pages={n}",
        t_images.as_secs_f64() * 1000.0,
        (t_layout - t_images).as_secs_f64() * 1000.0,
        (t_assembly - t_layout).as_secs_f64() * 1000.0,
    );

    Ok(pdf.finish())
}

/// Decode a PNG screenshot and write it as a FlateDecode RGB XObject, with a
/// DeviceGray SMask when the source carries transparency.
fn embed_png(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    data: &[u8],
    index: usize,
) -> Result<EmbeddedImage, Error> {
    let decoded = image::load_from_memory(data)
        .map_err(|e| Error::Image(format!("captured image {}: {e}", index + 1)))?;
    let rgba = decoded.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w as i32);
        mask.height(h as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let xobj_ref = alloc();
    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w as i32);
    xobj.height(h as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }

    Ok(EmbeddedImage {
        pdf_name: format!("Im{}", index + 1),
        xobj_ref,
        pixel_width: w,
        pixel_height: h,
    })
}
