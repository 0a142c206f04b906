mod compose;
mod error;
mod fonts;
mod model;
mod pdf;
pub mod storage;

#[cfg(feature = "server")]
pub mod server;

pub use error::Error;
pub use model::{
    ApplicationData, CapturedImages, DocumentList, ExternalDocumentRef, ReportRequest,
    SectionSpec,
};

use std::time::Instant;

use storage::ObjectStore;

/// Assemble the full PDF report for one scholarship application.
///
/// Three phases: render the summary document (sections plus screenshot
/// pages), fetch the applicant's uploads from object storage, then merge and
/// stamp page footers. Missing or unreadable uploads are skipped with a
/// warning; the report is still produced from whatever was available.
pub fn assemble_report(
    request: &ReportRequest,
    store: &dyn ObjectStore,
    documents: &DocumentList,
) -> Result<Vec<u8>, Error> {
    if request.application_id.trim().is_empty() {
        return Err(Error::InvalidInput("applicationId must not be empty".to_string()));
    }

    let t0 = Instant::now();

    let images = request.images.decode()?;
    let base = pdf::render_summary(&request.application_id, &request.data, &images)?;
    let t_render = t0.elapsed();

    let mut attachments = Vec::new();
    for doc_ref in documents.refs(&request.application_id) {
        match store.get_object(&doc_ref.storage_key) {
            Ok(Some(bytes)) => attachments.push(compose::Attachment {
                title: doc_ref.display_title,
                bytes,
            }),
            Ok(None) => {
                log::warn!(
                    "document not found, skipping: {} ({})",
                    doc_ref.display_title,
                    doc_ref.storage_key
                );
            }
            Err(e) => {
                log::warn!(
                    "fetch failed, skipping: {} ({}): {e}",
                    doc_ref.display_title,
                    doc_ref.storage_key
                );
            }
        }
    }
    let t_fetch = t0.elapsed();

    let bytes = compose::finalize(base, &attachments)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, fetch={:.1}ms, compose={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_fetch - t_render).as_secs_f64() * 1000.0,
        (t_total - t_fetch).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(bytes)
}
