//! PDF export of an archived checklist.
//!
//! Fixed A4 layout drawn with the standard Helvetica faces (no embedded
//! fonts). Geometry is expressed in millimetres from the top-left corner and
//! converted to PDF user space when operations are emitted.

use chrono::{DateTime, FixedOffset, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

use crate::record::ChecklistRecord;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 10.0;
/// Space kept free above the bottom edge before breaking to a new page.
const BREAK_MARGIN: f32 = 20.0;
/// Horizontal text padding inside a cell.
const CELL_PAD: f32 = 1.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

const TITLE: &str = "CHECKLISTE CHARIOT URGENCE";
const LOCK_LINE: &str = "Tiroirs verrouillés par la clé";
const KEY_LINE: &str = "Clé et paire de ciseaux attachés au chariot (Ziplock)";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("pdf encoding failed: {0}")]
    Pdf(String),
}

/// Rendering parameters that do not belong to the record itself.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Subtitle under the title (service and hospital).
    pub unit_name: String,
    /// Offset used to print wall-clock times.
    pub utc_offset: FixedOffset,
    /// Time printed on the "generated on" line.
    pub generated_at: DateTime<Utc>,
}

/// `Checklist_YYYYMMDD.pdf`, or `Archive_Checklist_YYYYMMDD.pdf` when re-exported.
pub fn report_file_name(record: &ChecklistRecord, archive: bool, offset: FixedOffset) -> String {
    let day = record.at.with_timezone(&offset).format("%Y%m%d");
    if archive {
        format!("Archive_Checklist_{day}.pdf")
    } else {
        format!("Checklist_{day}.pdf")
    }
}

/// Render the checklist report.
pub fn render_pdf(record: &ChecklistRecord, opts: &ReportOptions) -> Result<Vec<u8>, ReportError> {
    let mut w = Writer::new(opts.unit_name.clone());
    w.add_page();

    let done_at = record
        .at
        .with_timezone(&opts.utc_offset)
        .format("%d/%m/%Y à %H:%M");
    w.set_font(Face::Regular, 12.0);
    w.multi_cell(
        0.0,
        10.0,
        &format!(
            "La checkliste de Chariot d'Urgence RME a été faite le {done_at} par l'utilisateur {}.\nStatut : VALIDÉE (Conforme)",
            record.operator
        ),
        Align::Center,
    );
    w.ln(10.0);

    table_header(&mut w);

    w.set_font(Face::Regular, 9.0);
    for entry in &record.entries {
        if w.needs_break(8.0) {
            w.add_page();
            table_header(&mut w);
            w.set_font(Face::Regular, 9.0);
        }
        w.cell(90.0, 8.0, &entry.name, true, Align::Left, None);
        w.cell(30.0, 8.0, &entry.drawer.label(), true, Align::Center, None);
        w.cell(30.0, 8.0, &entry.allotment.to_string(), true, Align::Center, None);
        w.cell(30.0, 8.0, "[X] OK", true, Align::Center, None);
        w.ln(8.0);
    }

    w.set_font(Face::Bold, 9.0);
    let grey = Some((240, 240, 240));
    for (line, confirmed) in [(LOCK_LINE, record.drawers_locked), (KEY_LINE, record.key_attached)] {
        if w.needs_break(8.0) {
            w.add_page();
            w.set_font(Face::Bold, 9.0);
        }
        w.cell(150.0, 8.0, line, true, Align::Left, grey);
        w.cell(30.0, 8.0, if confirmed { "[X] OUI" } else { "[ ] NON" }, true, Align::Center, grey);
        w.ln(8.0);
    }

    w.ln(10.0);
    if w.needs_break(10.0) {
        w.add_page();
    }
    w.set_font(Face::Bold, 9.0);
    let generated = opts
        .generated_at
        .with_timezone(&opts.utc_offset)
        .format("%d/%m/%Y %H:%M");
    w.cell(0.0, 10.0, &format!("Checkliste générée le {generated}"), false, Align::Right, None);
    w.ln(10.0);

    w.finish()
}

fn table_header(w: &mut Writer) {
    let blue = Some((200, 220, 255));
    w.set_font(Face::Bold, 10.0);
    w.cell(90.0, 10.0, "Matériel", true, Align::Center, blue);
    w.cell(30.0, 10.0, "Tiroir", true, Align::Center, blue);
    w.cell(30.0, 10.0, "Dotation", true, Align::Center, blue);
    w.cell(30.0, 10.0, "État", true, Align::Center, blue);
    w.ln(10.0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
    Italic,
}

impl Face {
    fn resource(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
            Face::Italic => "F3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

/// Cursor-based page writer: cells flow left to right, `ln` moves down.
struct Writer {
    unit_name: String,
    pages: Vec<Vec<Operation>>,
    x: f32,
    y: f32,
    face: Face,
    size: f32,
}

impl Writer {
    fn new(unit_name: String) -> Self {
        Self {
            unit_name,
            pages: Vec::new(),
            x: MARGIN,
            y: MARGIN,
            face: Face::Regular,
            size: 12.0,
        }
    }

    fn add_page(&mut self) {
        if !self.pages.is_empty() {
            self.footer();
        }
        self.pages.push(Vec::new());
        self.x = MARGIN;
        self.y = MARGIN;

        let (face, size) = (self.face, self.size);
        self.set_font(Face::Bold, 15.0);
        self.cell(0.0, 10.0, TITLE, false, Align::Center, None);
        self.ln(10.0);
        self.set_font(Face::Italic, 10.0);
        let unit = self.unit_name.clone();
        self.cell(0.0, 10.0, &unit, false, Align::Center, None);
        self.ln(10.0);
        self.ln(20.0);
        self.set_font(face, size);
    }

    fn footer(&mut self) {
        let page_no = self.pages.len();
        let (x, y, face, size) = (self.x, self.y, self.face, self.size);
        self.x = MARGIN;
        self.y = PAGE_H - 15.0;
        self.set_font(Face::Italic, 8.0);
        self.cell(0.0, 10.0, &format!("Page {page_no}"), false, Align::Center, None);
        self.x = x;
        self.y = y;
        self.set_font(face, size);
    }

    fn needs_break(&self, h: f32) -> bool {
        self.y + h > PAGE_H - BREAK_MARGIN
    }

    fn set_font(&mut self, face: Face, size: f32) {
        self.face = face;
        self.size = size;
    }

    fn ln(&mut self, h: f32) {
        self.x = MARGIN;
        self.y += h;
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Draw one cell at the cursor and advance horizontally.
    /// A width of zero extends the cell to the right margin.
    fn cell(&mut self, w: f32, h: f32, text: &str, border: bool, align: Align, fill: Option<(u8, u8, u8)>) {
        let w = if w <= 0.0 { PAGE_W - MARGIN - self.x } else { w };
        let (x, y) = (self.x, self.y);

        if fill.is_some() || border {
            let ops = self.ops_for_rect(x, y, w, h, fill, border);
            self.ops().extend(ops);
        }

        if !text.is_empty() {
            let tw = text_width_mm(text, self.face, self.size);
            let tx = match align {
                Align::Left => x + CELL_PAD,
                Align::Center => x + (w - tw) / 2.0,
                Align::Right => x + w - CELL_PAD - tw,
            };
            // Vertically centred baseline, as the classic FPDF cell does.
            let ty = y + 0.5 * h + 0.3 * (self.size / PT_PER_MM);
            let (face, size) = (self.face, self.size);
            self.ops().extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(face.resource().as_bytes().to_vec()), real(size)]),
                Operation::new("Td", vec![real(tx * PT_PER_MM), real((PAGE_H - ty) * PT_PER_MM)]),
                Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
                Operation::new("ET", vec![]),
            ]);
        }

        self.x += w;
    }

    fn ops_for_rect(&self, x: f32, y: f32, w: f32, h: f32, fill: Option<(u8, u8, u8)>, border: bool) -> Vec<Operation> {
        let mut ops = Vec::with_capacity(4);
        if let Some((r, g, b)) = fill {
            ops.push(Operation::new(
                "rg",
                vec![
                    real(f32::from(r) / 255.0),
                    real(f32::from(g) / 255.0),
                    real(f32::from(b) / 255.0),
                ],
            ));
        }
        ops.push(Operation::new(
            "re",
            vec![
                real(x * PT_PER_MM),
                real((PAGE_H - y) * PT_PER_MM),
                real(w * PT_PER_MM),
                real(-h * PT_PER_MM),
            ],
        ));
        let paint = match (fill.is_some(), border) {
            (true, true) => "B",
            (true, false) => "f",
            _ => "S",
        };
        ops.push(Operation::new(paint, vec![]));
        if fill.is_some() {
            // Text is drawn with the fill colour; reset it to black.
            ops.push(Operation::new("g", vec![real(0.0)]));
        }
        ops
    }

    /// Word-wrapped paragraph; explicit newlines start a new line.
    fn multi_cell(&mut self, w: f32, h: f32, text: &str, align: Align) {
        let w = if w <= 0.0 { PAGE_W - MARGIN - self.x } else { w };
        let max = w - 2.0 * CELL_PAD;
        for paragraph in text.split('\n') {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if line.is_empty() {
                    word.to_string()
                } else {
                    format!("{line} {word}")
                };
                if !line.is_empty() && text_width_mm(&candidate, self.face, self.size) > max {
                    self.cell(w, h, &line, false, align, None);
                    self.ln(h);
                    line = word.to_string();
                } else {
                    line = candidate;
                }
            }
            self.cell(w, h, &line, false, align, None);
            self.ln(h);
        }
    }

    fn finish(mut self) -> Result<Vec<u8>, ReportError> {
        self.footer();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font = |base: &str| {
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base,
                "Encoding" => "WinAnsiEncoding",
            }
        };
        let regular = doc.add_object(font("Helvetica"));
        let bold = doc.add_object(font("Helvetica-Bold"));
        let italic = doc.add_object(font("Helvetica-Oblique"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
                "F3" => italic,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations };
            let encoded = content.encode().map_err(|e| ReportError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                real(0.0),
                real(0.0),
                real(PAGE_W * PT_PER_MM),
                real(PAGE_H * PT_PER_MM),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).map_err(|e| ReportError::Pdf(e.to_string()))?;
        Ok(out)
    }
}

fn real(v: f32) -> Object {
    Object::Real(v.into())
}

/// Encode to WinAnsi; characters outside Latin-1 become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Helvetica advance widths (1/1000 em) for printable ASCII, 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {..~
];

fn char_width(c: char, face: Face) -> f32 {
    let base = match u32::from(c) {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => 556,
    };
    // Bold runs slightly wider; good enough for centring.
    let scale = if face == Face::Bold { 1.06 } else { 1.0 };
    f32::from(base) * scale
}

fn text_width_mm(text: &str, face: Face, size: f32) -> f32 {
    let units: f32 = text.chars().map(|c| char_width(c, face)).sum();
    units * size / 1000.0 / PT_PER_MM
}

#[cfg(test)]
mod tests {
    use super::*;
    use chariot_core::ChecklistId;
    use chariot_inventory::{Drawer, InventoryItem};
    use chrono::TimeZone;

    fn record(n: usize) -> ChecklistRecord {
        let items: Vec<InventoryItem> = (0..n)
            .map(|i| InventoryItem {
                id: format!("I{i:03}").parse().unwrap(),
                name: format!("Matériel {i}"),
                category: None,
                drawer: Drawer::Drawer((i % 5 + 1) as u8),
                stock: 2,
                allotment: 2,
            })
            .collect();
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 8, 30, 0).unwrap();
        ChecklistRecord::validated(ChecklistId::new(), at, "Sara Idrissi", &items)
    }

    fn opts() -> ReportOptions {
        ReportOptions {
            unit_name: "Service Réanimation Mère-Enfant".to_string(),
            utc_offset: FixedOffset::east_opt(3600).unwrap(),
            generated_at: Utc.with_ymd_and_hms(2026, 3, 14, 8, 45, 0).unwrap(),
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn renders_a_loadable_single_page_pdf() {
        let bytes = render_pdf(&record(3), &opts()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert!(contains(&bytes, TITLE.as_bytes()));
        // Wall-clock time uses the configured offset.
        assert!(contains(&bytes, b"14/03/2026"));
        assert!(contains(&bytes, b"09:30"));
        assert!(contains(&bytes, b"[X] OUI"));
    }

    #[test]
    fn long_inventories_span_several_pages() {
        let bytes = render_pdf(&record(80), &opts()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 3);
        assert!(contains(&bytes, b"Page 3"));
    }

    #[test]
    fn non_latin1_characters_are_replaced() {
        assert_eq!(win_ansi("é✓"), vec![0xE9, b'?']);
    }

    #[test]
    fn file_names_use_local_day() {
        let rec = record(1);
        let offset = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(report_file_name(&rec, false, offset), "Checklist_20260314.pdf");
        assert_eq!(report_file_name(&rec, true, offset), "Archive_Checklist_20260314.pdf");
    }
}
