mod common;

use common::{MemoryStore, dummy_pdf, page_text, png_data_url, storage_key};
use grant_report::{
    ApplicationData, CapturedImages, DocumentList, Error, ReportRequest, assemble_report,
};
use lopdf::Document;

fn request(application_id: &str) -> ReportRequest {
    ReportRequest {
        application_id: application_id.to_string(),
        data: ApplicationData {
            full_name: Some("Asha Rao".to_string()),
            email: Some("asha@example.com".to_string()),
            application_status: Some("submitted".to_string()),
            total_score: Some(87.5),
            ..Default::default()
        },
        images: CapturedImages::default(),
    }
}

fn base_page_count(application_id: &str) -> usize {
    let bytes = assemble_report(
        &request(application_id),
        &MemoryStore::empty(),
        &DocumentList::default(),
    )
    .unwrap();
    Document::load_mem(&bytes).unwrap().get_pages().len()
}

#[test]
fn report_renders_with_no_documents_available() {
    let bytes = assemble_report(
        &request("APP123"),
        &MemoryStore::empty(),
        &DocumentList::default(),
    )
    .unwrap();
    assert!(bytes.starts_with(b"%PDF-"));

    let doc = Document::load_mem(&bytes).unwrap();
    let total = doc.get_pages().len();
    assert!(total >= 1);

    let first = page_text(&doc, 1);
    // Present values render, absent ones fall back to the placeholder.
    assert!(first.contains("(Asha Rao) Tj"));
    assert!(first.contains("(N/A) Tj"));
    assert!(first.contains("(Scholarship Application Report) Tj"));
    assert!(first.contains(&format!("(1 of {total}) Tj")));
}

#[test]
fn available_documents_are_merged_in_order() {
    let store = MemoryStore::empty()
        .with(&storage_key("APP123", "form16"), dummy_pdf(2, "Form16 Page"))
        .with(
            &storage_key("APP123", "graduation"),
            dummy_pdf(1, "Graduation Page"),
        );
    let bytes = assemble_report(&request("APP123"), &store, &DocumentList::default()).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    let base = base_page_count("APP123");
    let total = doc.get_pages().len();
    assert_eq!(total, base + 3);

    // Form 16 comes first in the document list, graduation last.
    let first_merged = page_text(&doc, (base + 1) as u32);
    assert!(first_merged.contains("Form16 Page 1"));
    assert!(first_merged.contains("(Form 16) Tj"));
    let last = page_text(&doc, total as u32);
    assert!(last.contains("Graduation Page 1"));
    assert!(last.contains("(Graduation Marksheet) Tj"));
}

#[test]
fn footers_count_the_final_document() {
    let store =
        MemoryStore::empty().with(&storage_key("APP77", "form16"), dummy_pdf(3, "Upload"));
    let bytes = assemble_report(&request("APP77"), &store, &DocumentList::default()).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    let total = doc.get_pages().len();
    for i in 1..=total {
        assert!(
            page_text(&doc, i as u32).contains(&format!("({i} of {total}) Tj")),
            "page {i} footer missing or wrong"
        );
    }
}

#[test]
fn corrupt_stored_document_is_skipped() {
    let store = MemoryStore::empty()
        .with(&storage_key("APP123", "form16"), b"garbage bytes".to_vec())
        .with(
            &storage_key("APP123", "caste_certificate"),
            dummy_pdf(1, "Certificate"),
        );
    let bytes = assemble_report(&request("APP123"), &store, &DocumentList::default()).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    let base = base_page_count("APP123");
    assert_eq!(doc.get_pages().len(), base + 1);
    let merged = page_text(&doc, (base + 1) as u32);
    assert!(merged.contains("(Caste Certificate) Tj"));
}

#[test]
fn captured_images_add_dedicated_pages() {
    let mut req = request("APP123");
    req.images = CapturedImages {
        personal: Some(png_data_url(640, 480)),
        documents: None,
        source: None,
        recommendations: Some(png_data_url(300, 900)),
    };
    let bytes =
        assemble_report(&req, &MemoryStore::empty(), &DocumentList::default()).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    let base = base_page_count("APP123");
    let total = doc.get_pages().len();
    assert_eq!(total, base + 2);
    assert!(page_text(&doc, (total - 1) as u32).contains("(Personal Details) Tj"));
    assert!(page_text(&doc, total as u32).contains("(Recommendations) Tj"));
}

#[test]
fn undecodable_image_aborts_assembly() {
    let mut req = request("APP123");
    req.images.personal = Some("data:image/png;base64,%%%not-base64%%%".to_string());
    let err = assemble_report(&req, &MemoryStore::empty(), &DocumentList::default()).unwrap_err();
    assert!(matches!(err, Error::Image(_)));
}

#[test]
fn blank_application_id_is_invalid_input() {
    let err = assemble_report(
        &request("   "),
        &MemoryStore::empty(),
        &DocumentList::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn offer_letter_is_merged_when_configured() {
    let store = MemoryStore::empty().with(
        &storage_key("APP123", "offer_letter"),
        dummy_pdf(1, "Offer"),
    );
    let documents = DocumentList::default().with_offer_letter();
    let bytes = assemble_report(&request("APP123"), &store, &documents).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();

    let base = base_page_count("APP123");
    let total = doc.get_pages().len();
    assert_eq!(total, base + 1);
    assert!(page_text(&doc, total as u32).contains("(Offer Letter) Tj"));
}
