//! PDF rendering for inspection reports and chain-of-custody documents.
//!
//! Layout is deliberately plain: builtin Helvetica, a labeled line per field,
//! and the integrity digest both as hex text and as a QR code linking to the
//! public verification endpoint. The QR is drawn directly as filled modules,
//! no raster image pipeline involved.

use chrono::{DateTime, Utc};
use printpdf::{
    path::{PaintMode, WindingOrder},
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};
use qrcode::{Color as QrColor, QrCode};

use crate::error::ApiError;
use crate::models::{Inspection, Photo, Report};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 7.0;
const QR_SIZE_MM: f32 = 40.0;

/// Everything the renderer needs, resolved by the caller so this module
/// stays free of repository access.
pub struct ReportData {
    pub inspection: Inspection,
    pub facility_name: String,
    pub carrier_name: String,
    pub inspector_name: String,
    pub photos: Vec<Photo>,
    pub digest: String,
    pub verify_url: String,
    pub report_uuid: String,
    pub generated_at: DateTime<Utc>,
}

struct Page {
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    cursor_y: f32,
}

impl Page {
    fn heading(&mut self, text: &str) {
        self.layer
            .use_text(text, 16.0, Mm(MARGIN_MM), Mm(self.cursor_y), &self.font_bold);
        self.cursor_y -= LINE_HEIGHT_MM * 1.6;
    }

    fn section(&mut self, text: &str) {
        self.cursor_y -= LINE_HEIGHT_MM * 0.5;
        self.layer
            .use_text(text, 12.0, Mm(MARGIN_MM), Mm(self.cursor_y), &self.font_bold);
        self.cursor_y -= LINE_HEIGHT_MM;
    }

    fn field(&mut self, label: &str, value: &str) {
        self.layer.use_text(
            format!("{label}:"),
            10.0,
            Mm(MARGIN_MM),
            Mm(self.cursor_y),
            &self.font_bold,
        );
        self.layer
            .use_text(value, 10.0, Mm(MARGIN_MM + 45.0), Mm(self.cursor_y), &self.font);
        self.cursor_y -= LINE_HEIGHT_MM;
    }

    fn line(&mut self, text: &str, size: f32) {
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.cursor_y), &self.font);
        self.cursor_y -= LINE_HEIGHT_MM * 0.85;
    }
}

/// Render the inspection report PDF and return its bytes.
pub fn render_inspection_report(data: &ReportData) -> Result<Vec<u8>, ApiError> {
    let (doc, page_idx, layer_idx) = PdfDocument::new(
        format!("Inspection report {}", data.inspection.code),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "report",
    );
    let font = builtin_font(&doc, BuiltinFont::Helvetica)?;
    let font_bold = builtin_font(&doc, BuiltinFont::HelveticaBold)?;

    let mut page = Page {
        layer: doc.get_page(page_idx).get_layer(layer_idx),
        font,
        font_bold,
        cursor_y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    page.heading("Container Inspection Report");
    page.field("Report reference", &data.report_uuid);
    page.field("Generated", &format_ts(data.generated_at));

    page.section("Inspection");
    page.field("Code", &data.inspection.code);
    page.field("Container", &data.inspection.container_number);
    page.field("Facility", &data.facility_name);
    page.field("Carrier", &data.carrier_name);
    page.field("Inspector", &data.inspector_name);
    page.field("Status", data.inspection.status.as_str());
    page.field("Inspected at", &format_ts(data.inspection.inspected_at));
    if let Some(temperature) = data.inspection.temperature_c {
        page.field("Temperature", &format!("{temperature:.1} C"));
    }
    if let Some(observations) = data.inspection.observations.as_deref() {
        if !observations.is_empty() {
            page.field("Observations", observations);
        }
    }

    page.section(&format!("Evidence ({} photos)", data.photos.len()));
    for photo in &data.photos {
        let taken = photo
            .taken_at
            .map(format_ts)
            .unwrap_or_else(|| "-".to_string());
        let hash = photo.content_hash.as_deref().unwrap_or("-");
        page.line(
            &format!("#{} {} taken {} sha256 {}", photo.seq, photo.mime_type, taken, hash),
            8.0,
        );
    }

    page.section("Integrity");
    page.line("SHA-256 digest of this inspection and its evidence:", 9.0);
    let (head, tail) = data.digest.split_at(data.digest.len().min(32));
    page.line(head, 9.0);
    if !tail.is_empty() {
        page.line(tail, 9.0);
    }
    page.line("Scan the code to verify this report has not been altered:", 9.0);

    page.cursor_y -= QR_SIZE_MM + LINE_HEIGHT_MM;
    draw_qr(&page.layer, &data.verify_url, MARGIN_MM, page.cursor_y)?;

    doc.save_to_bytes()
        .map_err(|err| ApiError::internal(format!("PDF rendering failed: {err}")))
}

/// Render the admin chain-of-custody document: identification, integrity
/// record and the per-photo hash table.
pub fn render_custody_report(data: &ReportData, report: &Report) -> Result<Vec<u8>, ApiError> {
    let (doc, page_idx, layer_idx) = PdfDocument::new(
        format!("Chain of custody {}", report.report_uuid),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "custody",
    );
    let font = builtin_font(&doc, BuiltinFont::Helvetica)?;
    let font_bold = builtin_font(&doc, BuiltinFont::HelveticaBold)?;

    let mut page = Page {
        layer: doc.get_page(page_idx).get_layer(layer_idx),
        font,
        font_bold,
        cursor_y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    page.heading("Chain of Custody Record");
    page.field("Report reference", &report.report_uuid.to_string());
    page.field("Report created", &format_ts(report.created_at));
    page.field("Inspection code", &data.inspection.code);
    page.field("Container", &data.inspection.container_number);
    page.field("Inspector", &data.inspector_name);
    page.field("Status", data.inspection.status.as_str());

    page.section("Recorded integrity digest");
    let (head, tail) = report.hash_global.split_at(report.hash_global.len().min(32));
    page.line(head, 9.0);
    if !tail.is_empty() {
        page.line(tail, 9.0);
    }

    page.section("Evidence hashes");
    for photo in &data.photos {
        let hash = photo.content_hash.as_deref().unwrap_or("-");
        page.line(&format!("#{}  {}  {}", photo.seq, photo.file_path, hash), 8.0);
    }

    doc.save_to_bytes()
        .map_err(|err| ApiError::internal(format!("PDF rendering failed: {err}")))
}

fn builtin_font(
    doc: &printpdf::PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, ApiError> {
    doc.add_builtin_font(font)
        .map_err(|err| ApiError::internal(format!("PDF font setup failed: {err}")))
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Draw the QR symbol for `data` as filled squares with its lower-left
/// corner at (x, y).
fn draw_qr(layer: &PdfLayerReference, data: &str, x: f32, y: f32) -> Result<(), ApiError> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|err| ApiError::internal(format!("QR encoding failed: {err}")))?;
    let width = code.width();
    let colors = code.to_colors();
    let module_mm = QR_SIZE_MM / width as f32;

    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    for row in 0..width {
        for col in 0..width {
            if colors[row * width + col] != QrColor::Dark {
                continue;
            }
            // QR rows count from the top, PDF coordinates from the bottom
            let left = x + col as f32 * module_mm;
            let bottom = y + (width - 1 - row) as f32 * module_mm;
            let rect = Rect::new(
                Mm(left),
                Mm(bottom),
                Mm(left + module_mm),
                Mm(bottom + module_mm),
            )
            .with_mode(PaintMode::Fill)
            .with_winding(WindingOrder::NonZero);
            layer.add_rect(rect);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InspectionStatus;
    use chrono::TimeZone;

    fn sample_data() -> ReportData {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        ReportData {
            inspection: Inspection {
                id: 1,
                code: "INS_1000".to_string(),
                container_number: "ABCD1234567".to_string(),
                facility_id: 1,
                carrier_id: 1,
                inspector_id: 1,
                temperature_c: Some(4.5),
                observations: Some("Seals intact".to_string()),
                signature_path: None,
                status: InspectionStatus::Pending,
                inspected_at: ts,
                created_at: ts,
                updated_at: ts,
            },
            facility_name: "Plant North".to_string(),
            carrier_name: "Oceanic".to_string(),
            inspector_name: "Ana Diaz".to_string(),
            photos: vec![Photo {
                id: 1,
                inspection_id: 1,
                file_path: "captures/1/photo_1.jpg".to_string(),
                mime_type: "image/jpeg".to_string(),
                content_hash: Some("aa".repeat(32)),
                seq: 1,
                taken_at: Some(ts),
                created_at: ts,
            }],
            digest: "ab".repeat(32),
            verify_url: "http://localhost:8000/api/verify/1/abababab".to_string(),
            report_uuid: "3f0b6f0e-0000-0000-0000-000000000000".to_string(),
            generated_at: ts,
        }
    }

    #[test]
    fn test_render_inspection_report_produces_pdf() {
        let bytes = render_inspection_report(&sample_data()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_render_custody_report_produces_pdf() {
        let data = sample_data();
        let ts = data.generated_at;
        let report = Report {
            id: 1,
            report_uuid: uuid::Uuid::new_v4(),
            inspection_id: 1,
            file_path: "reports/1.pdf".to_string(),
            hash_global: "ab".repeat(32),
            created_at: ts,
        };
        let bytes = render_custody_report(&data, &report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_handles_empty_evidence_list() {
        let mut data = sample_data();
        data.photos.clear();
        let bytes = render_inspection_report(&data).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
