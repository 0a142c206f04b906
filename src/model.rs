use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use crate::error::Error;

/// Display string substituted for absent values. Rows are never dropped;
/// the summary tables keep a fixed row schema per section.
pub const PLACEHOLDER: &str = "N/A";

/// Body of a report-generation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub application_id: String,
    pub data: ApplicationData,
    #[serde(default)]
    pub images: CapturedImages,
}

/// The application record as submitted by the dashboard. Every field is
/// optional; absence renders as [`PLACEHOLDER`] rather than failing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationData {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub application_status: Option<String>,
    pub submitted_at: Option<String>,
    /// Eligibility blob from the verification engine. Usually a JSON string
    /// wrapping a [`VerificationSummary`]; tolerated in any shape.
    pub validation_result: Option<serde_json::Value>,
    pub academic_score: Option<f64>,
    pub income_score: Option<f64>,
    pub document_score: Option<f64>,
    pub total_score: Option<f64>,
    pub recommendation_details: Option<RecommendationDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationDetails {
    pub recommended_by: Option<String>,
    pub designation: Option<String>,
    pub remarks: Option<String>,
    pub recommended_amount: Option<f64>,
    pub status: Option<String>,
}

/// Per-document eligibility flags parsed out of `validation_result`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationSummary {
    pub form16_verified: Option<bool>,
    pub caste_certificate_verified: Option<bool>,
    pub marksheet_10th_verified: Option<bool>,
    pub marksheet_12th_verified: Option<bool>,
    pub graduation_verified: Option<bool>,
    pub overall_eligible: Option<bool>,
}

/// Screenshot slots captured by the dashboard, each a
/// `data:image/png;base64,...` URL. All optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapturedImages {
    pub personal: Option<String>,
    pub documents: Option<String>,
    pub source: Option<String>,
    pub recommendations: Option<String>,
}

/// A decoded screenshot ready for embedding: page title plus raw PNG bytes.
pub struct CapturedImage {
    pub title: &'static str,
    pub data: Vec<u8>,
}

/// One titled block of label/value rows in the summary portion of the report.
pub struct SectionSpec {
    pub title: &'static str,
    pub rows: Vec<(&'static str, Option<String>)>,
}

/// One applicant-uploaded PDF in object storage.
#[derive(Debug, Clone)]
pub struct ExternalDocumentRef {
    pub storage_key: String,
    pub display_title: String,
}

/// The fixed, ordered set of applicant documents merged into each report.
/// The order is a documented contract of the report's visual structure.
#[derive(Debug, Clone)]
pub struct DocumentList {
    entries: Vec<DocumentEntry>,
}

#[derive(Debug, Clone)]
struct DocumentEntry {
    doc_type: &'static str,
    file_name: &'static str,
    title: &'static str,
}

impl Default for DocumentList {
    fn default() -> Self {
        let entry = |doc_type, file_name, title| DocumentEntry {
            doc_type,
            file_name,
            title,
        };
        DocumentList {
            entries: vec![
                entry("form16", "form16.pdf", "Form 16"),
                entry("caste_certificate", "caste_certificate.pdf", "Caste Certificate"),
                entry("marksheet_10th", "marksheet_10th.pdf", "10th Marksheet"),
                entry("marksheet_12th", "marksheet_12th.pdf", "12th Marksheet"),
                entry("graduation", "graduation.pdf", "Graduation Marksheet"),
            ],
        }
    }
}

impl DocumentList {
    /// Opt in the offer letter attachment, which is not yet required for
    /// standard applications.
    pub fn with_offer_letter(mut self) -> Self {
        self.entries.push(DocumentEntry {
            doc_type: "offer_letter",
            file_name: "offer_letter.pdf",
            title: "Offer Letter",
        });
        self
    }

    /// Storage references for one application, in merge order.
    pub fn refs(&self, application_id: &str) -> Vec<ExternalDocumentRef> {
        self.entries
            .iter()
            .map(|e| ExternalDocumentRef {
                storage_key: format!(
                    "submission_files/{}/documents/{}/{}",
                    application_id, e.doc_type, e.file_name
                ),
                display_title: e.title.to_string(),
            })
            .collect()
    }
}

impl CapturedImages {
    /// Decode the present slots, preserving the fixed slot order. An absent
    /// or empty slot is skipped; a slot that is present but undecodable is an
    /// error (the caller aborts the report).
    pub fn decode(&self) -> Result<Vec<CapturedImage>, Error> {
        let slots: [(&'static str, &Option<String>); 4] = [
            ("Personal Details", &self.personal),
            ("Document Validation", &self.documents),
            ("Verification by Source", &self.source),
            ("Recommendations", &self.recommendations),
        ];
        let mut decoded = Vec::new();
        for (title, slot) in slots {
            let Some(url) = slot else { continue };
            if url.is_empty() {
                continue;
            }
            decoded.push(CapturedImage {
                title,
                data: decode_data_url(url)?,
            });
        }
        Ok(decoded)
    }
}

/// Extract the payload of a `data:<mime>;base64,...` URL.
fn decode_data_url(url: &str) -> Result<Vec<u8>, Error> {
    let payload = match url.split_once("base64,") {
        Some((_, payload)) => payload,
        // Bare base64 without the data-URL prefix is accepted too.
        None if !url.starts_with("data:") => url,
        None => {
            return Err(Error::Image("data URL is not base64-encoded".into()));
        }
    };
    BASE64
        .decode(payload.trim())
        .map_err(|e| Error::Image(format!("invalid base64 image payload: {e}")))
}

fn eligibility_label(flag: bool) -> String {
    if flag { "Eligible" } else { "Not Eligible" }.to_string()
}

fn score_label(score: Option<f64>) -> Option<String> {
    score.map(|s| format!("{s:.1}"))
}

impl ApplicationData {
    /// Normalize the record into the fixed list of summary sections. All
    /// missing-field handling lives here; the renderer only ever sees
    /// `(label, Option<value>)` rows.
    pub fn summary_sections(&self) -> Vec<SectionSpec> {
        let verification = self.verification_summary();
        let recommendation = self.recommendation_details.clone().unwrap_or_default();

        vec![
            SectionSpec {
                title: "Applicant Details",
                rows: vec![
                    ("Full Name", self.full_name.clone()),
                    ("Email", self.email.clone()),
                    ("Phone", self.phone.clone()),
                    ("Date of Birth", self.date_of_birth.clone()),
                    ("Gender", self.gender.clone()),
                    ("Category", self.category.clone()),
                ],
            },
            SectionSpec {
                title: "Address & Contact",
                rows: vec![
                    ("Address", self.address_line.clone()),
                    ("City", self.city.clone()),
                    ("State", self.state.clone()),
                    ("PIN Code", self.pincode.clone()),
                ],
            },
            SectionSpec {
                title: "Application Status",
                rows: vec![
                    ("Status", self.application_status.clone()),
                    ("Submitted On", self.submitted_at.clone()),
                ],
            },
            SectionSpec {
                title: "Document Verification Summary",
                rows: vec![
                    ("Form 16", verification.form16_verified.map(eligibility_label)),
                    (
                        "Caste Certificate",
                        verification.caste_certificate_verified.map(eligibility_label),
                    ),
                    (
                        "10th Marksheet",
                        verification.marksheet_10th_verified.map(eligibility_label),
                    ),
                    (
                        "12th Marksheet",
                        verification.marksheet_12th_verified.map(eligibility_label),
                    ),
                    (
                        "Graduation Marksheet",
                        verification.graduation_verified.map(eligibility_label),
                    ),
                    ("Overall", verification.overall_eligible.map(eligibility_label)),
                ],
            },
            SectionSpec {
                title: "Score Breakdown",
                rows: vec![
                    ("Academic Score", score_label(self.academic_score)),
                    ("Income Score", score_label(self.income_score)),
                    ("Document Score", score_label(self.document_score)),
                    ("Total Score", score_label(self.total_score)),
                ],
            },
            SectionSpec {
                title: "Recommendation",
                rows: vec![
                    ("Recommended By", recommendation.recommended_by),
                    ("Designation", recommendation.designation),
                    ("Remarks", recommendation.remarks),
                    (
                        "Recommended Amount",
                        recommendation.recommended_amount.map(|a| format!("{a:.2}")),
                    ),
                    ("Status", recommendation.status),
                ],
            },
        ]
    }

    /// Parse the nested eligibility blob. Upstream encodes it as a JSON
    /// string inside the record; a plain object is accepted as well. Any
    /// parse failure yields the empty summary (every row renders as N/A).
    fn verification_summary(&self) -> VerificationSummary {
        let parsed = match &self.validation_result {
            Some(serde_json::Value::String(raw)) => serde_json::from_str(raw),
            Some(value @ serde_json::Value::Object(_)) => serde_json::from_value(value.clone()),
            _ => return VerificationSummary::default(),
        };
        parsed.unwrap_or_else(|e| {
            log::debug!("unparseable validation_result, rendering empty summary: {e}");
            VerificationSummary::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_decodes_payload() {
        let url = format!("data:image/png;base64,{}", BASE64.encode(b"fake-png"));
        assert_eq!(decode_data_url(&url).unwrap(), b"fake-png");
    }

    #[test]
    fn bare_base64_is_accepted() {
        let url = BASE64.encode(b"pixels");
        assert_eq!(decode_data_url(&url).unwrap(), b"pixels");
    }

    #[test]
    fn non_base64_data_url_is_rejected() {
        assert!(matches!(
            decode_data_url("data:image/png,rawbytes"),
            Err(Error::Image(_))
        ));
    }

    #[test]
    fn empty_record_keeps_full_row_schema() {
        let sections = ApplicationData::default().summary_sections();
        assert_eq!(sections.len(), 6);
        // Every row survives with an absent value; nothing is dropped.
        for section in &sections {
            assert!(!section.rows.is_empty());
            for (_, value) in &section.rows {
                assert!(value.is_none());
            }
        }
    }

    #[test]
    fn verification_blob_as_json_string() {
        let data = ApplicationData {
            validation_result: Some(serde_json::Value::String(
                r#"{"form16_verified": true, "overall_eligible": false}"#.into(),
            )),
            ..Default::default()
        };
        let sections = data.summary_sections();
        let verification = &sections[3];
        assert_eq!(verification.rows[0].1.as_deref(), Some("Eligible"));
        assert_eq!(verification.rows[5].1.as_deref(), Some("Not Eligible"));
        // Flags absent from the blob still render as placeholders.
        assert!(verification.rows[1].1.is_none());
    }

    #[test]
    fn malformed_verification_blob_renders_empty() {
        let data = ApplicationData {
            validation_result: Some(serde_json::Value::String("{not json".into())),
            ..Default::default()
        };
        let sections = data.summary_sections();
        assert!(sections[3].rows.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn document_refs_follow_key_pattern_in_order() {
        let refs = DocumentList::default().refs("APP123");
        assert_eq!(refs.len(), 5);
        assert_eq!(
            refs[0].storage_key,
            "submission_files/APP123/documents/form16/form16.pdf"
        );
        assert_eq!(refs[1].display_title, "Caste Certificate");
        assert_eq!(refs[4].storage_key.split('/').nth(3), Some("graduation"));

        let with_offer = DocumentList::default().with_offer_letter().refs("APP123");
        assert_eq!(with_offer.len(), 6);
        assert_eq!(with_offer[5].display_title, "Offer Letter");
    }

    #[test]
    fn request_deserializes_camel_case_envelope() {
        let request: ReportRequest = serde_json::from_str(
            r#"{
                "applicationId": "APP123",
                "data": {
                    "full_name": "Asha Rao",
                    "application_status": "submitted",
                    "validation_result": null,
                    "recommendation_details": null
                },
                "images": {}
            }"#,
        )
        .unwrap();
        assert_eq!(request.application_id, "APP123");
        assert_eq!(request.data.full_name.as_deref(), Some("Asha Rao"));
        assert!(request.data.recommendation_details.is_none());
        assert!(request.images.personal.is_none());
    }

    #[test]
    fn absent_slots_decode_to_nothing() {
        assert!(CapturedImages::default().decode().unwrap().is_empty());

        let images = CapturedImages {
            documents: Some(String::new()),
            ..Default::default()
        };
        assert!(images.decode().unwrap().is_empty());
    }

    #[test]
    fn slot_order_is_fixed() {
        let payload = format!("data:image/png;base64,{}", BASE64.encode(b"x"));
        let images = CapturedImages {
            personal: None,
            documents: Some(payload.clone()),
            source: None,
            recommendations: Some(payload),
        };
        let decoded = images.decode().unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].title, "Document Validation");
        assert_eq!(decoded[1].title, "Recommendations");
    }
}
