//! One-page A4 PDF of the preview.

use std::fmt;

use chrono::NaiveDate;
use printpdf::{BuiltinFont, Mm, PdfDocument};

use super::form::DATE_FORMAT;
use super::preview::{ADDRESSEE, AGENDA_INTRO, COMMITTEE_LINE, Preview, SIGNER_TITLE, SUBJECT};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const RIGHT_COLUMN: f32 = 105.0;
const SIGNATURE_COLUMN: f32 = 115.0;
const AGENDA_INDENT: f32 = 6.0;

const PT_TO_MM: f32 = 0.3528;
// Times Roman averages roughly half an em per glyph.
const AVG_GLYPH_EM: f32 = 0.5;
const LEADING: f32 = 1.4;
const FONT_SIZES: [f32; 5] = [11.0, 10.0, 9.0, 8.0, 7.0];

/// What Windows-1252 places in 0x80..=0x9F. The built-in fonts are written
/// in WinAnsi, which covers these plus printable Latin-1.
const WIN_ANSI_EXTRAS: &str = "\u{20ac}\u{201a}\u{192}\u{201e}\u{2026}\u{2020}\u{2021}\u{2c6}\u{2030}\u{160}\u{2039}\u{152}\u{17d}\u{2018}\u{2019}\u{201c}\u{201d}\u{2022}\u{2013}\u{2014}\u{2dc}\u{2122}\u{161}\u{203a}\u{153}\u{17e}\u{178}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Export renders the preview, so the draft must be showing it.
    NotPreviewing,
    /// A character the built-in PDF fonts cannot draw.
    UnsupportedChar(char),
    /// Still overflows the page at the smallest font size.
    TooLong { lines: usize, room: usize },
    Render(String),
}

impl ExportError {
    pub fn notice(&self) -> &'static str {
        match self {
            ExportError::NotPreviewing => "Passa all'anteprima prima di scaricare il PDF",
            ExportError::UnsupportedChar(_) => "Il documento contiene caratteri non supportati nel PDF",
            ExportError::TooLong { .. } => "Il documento non entra in una pagina, accorcia l'ordine del giorno",
            ExportError::Render(_) => "Errore durante la generazione del PDF",
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::NotPreviewing => write!(f, "export requires preview mode"),
            ExportError::UnsupportedChar(c) => write!(f, "character {c:?} (U+{:04X}) has no WinAnsi code", *c as u32),
            ExportError::TooLong { lines, room } => {
                write!(f, "letter needs {lines} lines, the page holds {room}")
            }
            ExportError::Render(e) => write!(f, "PDF rendering failed: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

pub trait DocumentExporter: Send + Sync {
    fn export(&self, preview: &Preview, date: NaiveDate) -> Result<ExportedFile, ExportError>;
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("Richiesta_Assemblea_{}.pdf", date.format(DATE_FORMAT))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub indent: f32,
    pub bold: bool,
}

impl Line {
    fn regular(text: impl Into<String>, indent: f32) -> Self {
        Self { text: text.into(), indent, bold: false }
    }

    fn bold(text: impl Into<String>, indent: f32) -> Self {
        Self { text: text.into(), indent, bold: true }
    }

    fn blank() -> Self {
        Self::regular("", 0.0)
    }
}

fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * LEADING
}

fn columns(size: f32, width: f32) -> usize {
    let glyph = size * PT_TO_MM * AVG_GLYPH_EM;
    ((width / glyph).floor() as usize).max(10)
}

/// Greedy word wrap; words longer than a line (signatures) are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let split = word
                .char_indices()
                .nth(width)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }
        let len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = len;
        } else if current_len + 1 + len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + len;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_len = len;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn push_wrapped(lines: &mut Vec<Line>, text: &str, cols: usize, indent: f32) {
    lines.extend(wrap(text, cols).into_iter().map(|t| Line::regular(t, indent)));
}

/// Lines of the letter at the given font size, top to bottom.
pub fn layout(preview: &Preview, header: &str, size: f32) -> Vec<Line> {
    let width = PAGE_WIDTH - 2.0 * MARGIN;
    let cols = columns(size, width);
    let agenda_cols = columns(size, width - AGENDA_INDENT);

    let mut lines = Vec::new();
    if !header.trim().is_empty() {
        lines.push(Line::bold(header.trim(), 0.0));
    }
    lines.push(Line::regular(ADDRESSEE, RIGHT_COLUMN));
    lines.push(Line::blank());
    lines.push(Line::bold(format!("Oggetto: {SUBJECT}"), 0.0));
    lines.push(Line::blank());
    push_wrapped(&mut lines, &preview.requester_sentence(), cols, 0.0);
    lines.push(Line::blank());
    lines.push(Line::regular(COMMITTEE_LINE, 0.0));
    lines.push(Line::blank());
    push_wrapped(&mut lines, &preview.request_sentence(), cols, 0.0);
    lines.push(Line::blank());
    lines.push(Line::regular(AGENDA_INTRO, 0.0));
    for item in &preview.agenda_lines {
        push_wrapped(&mut lines, item, agenda_cols, AGENDA_INDENT);
    }
    lines.push(Line::blank());
    lines.push(Line::blank());
    lines.push(Line::regular(SIGNER_TITLE, SIGNATURE_COLUMN));
    lines.push(Line::blank());
    lines.push(Line::regular("_________________________", SIGNATURE_COLUMN));
    lines.push(Line::regular(preview.signer.clone(), SIGNATURE_COLUMN));
    lines
}

/// Picks the largest font size at which the letter fits on one page.
pub fn fit_to_page(preview: &Preview, header: &str) -> Result<(f32, Vec<Line>), ExportError> {
    let usable = PAGE_HEIGHT - 2.0 * MARGIN;
    for size in FONT_SIZES {
        let lines = layout(preview, header, size);
        if lines.len() as f32 * line_height(size) <= usable {
            return Ok((size, lines));
        }
    }

    let size = FONT_SIZES[FONT_SIZES.len() - 1];
    Err(ExportError::TooLong {
        lines: layout(preview, header, size).len(),
        room: (usable / line_height(size)).floor() as usize,
    })
}

fn win_ansi_encodable(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{a0}'..='\u{ff}') || WIN_ANSI_EXTRAS.contains(c)
}

/// Fails on the first character the built-in fonts would silently drop.
pub fn check_encodable(lines: &[Line]) -> Result<(), ExportError> {
    match lines.iter().flat_map(|l| l.text.chars()).find(|c| !win_ansi_encodable(*c)) {
        Some(c) => Err(ExportError::UnsupportedChar(c)),
        None => Ok(()),
    }
}

/// Lays the preview out with the built-in Times faces.
#[derive(Debug, Clone)]
pub struct PdfExporter {
    header: String,
}

impl PdfExporter {
    pub fn new(header: impl Into<String>) -> Self {
        Self { header: header.into() }
    }

    fn render(&self, title: &str, size: f32, lines: &[Line]) -> Result<Vec<u8>, ExportError> {
        let render_err = |e: printpdf::Error| ExportError::Render(format!("{e:?}"));

        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "preview");
        let regular = doc.add_builtin_font(BuiltinFont::TimesRoman).map_err(render_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::TimesBold).map_err(render_err)?;
        let canvas = doc.get_page(page).get_layer(layer);

        let step = line_height(size);
        let mut baseline = PAGE_HEIGHT - MARGIN - size * PT_TO_MM;
        for line in lines {
            if !line.text.is_empty() {
                let font = if line.bold { &bold } else { &regular };
                canvas.use_text(line.text.as_str(), size, Mm(MARGIN + line.indent), Mm(baseline), font);
            }
            baseline -= step;
        }

        doc.save_to_bytes().map_err(render_err)
    }
}

impl DocumentExporter for PdfExporter {
    fn export(&self, preview: &Preview, date: NaiveDate) -> Result<ExportedFile, ExportError> {
        let filename = export_filename(date);
        let (size, lines) = fit_to_page(preview, &self.header)?;
        check_encodable(&lines)?;
        let bytes = self.render(&filename, size, &lines)?;
        log::info!("Exported {filename} ({} bytes, {size}pt)", bytes.len());
        Ok(ExportedFile {
            filename,
            content_type: PDF_CONTENT_TYPE,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::form::AssemblyRequest;
    use crate::wallet::Signature;

    fn preview(signed: bool) -> Preview {
        let mut form = AssemblyRequest::new(NaiveDate::from_ymd_opt(2025, 5, 10).unwrap());
        form.representative_name = "Anna Bianchi".to_string();
        let sig = Signature::parse(&format!("0x{}", "ab".repeat(65))).unwrap();
        Preview::new(&form, signed.then_some(&sig))
    }

    #[test]
    fn filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        assert_eq!(export_filename(date), "Richiesta_Assemblea_2025-05-10.pdf");
    }

    #[test]
    fn wrap_splits_long_words() {
        let lines = wrap(&"a".repeat(25), 10);
        assert_eq!(lines, vec!["a".repeat(10), "a".repeat(10), "a".repeat(5)]);
    }

    #[test]
    fn wrap_keeps_words_together() {
        assert_eq!(wrap("uno due tre quattro", 8), vec!["uno due", "tre", "quattro"]);
        assert_eq!(wrap("", 8), vec![String::new()]);
    }

    #[test]
    fn signed_letter_fits_at_full_size() {
        let (size, lines) = fit_to_page(&preview(true), "Liceo Galilei").unwrap();
        assert_eq!(size, 11.0);
        assert!(lines.iter().any(|l| l.text.contains("abab")));
        assert_eq!(lines.last().map(|l| l.text.as_str()), Some("Anna Bianchi"));
    }

    #[test]
    fn long_agenda_shrinks_the_font() {
        let mut p = preview(false);
        p.agenda_lines = (1..=45).map(|n| format!("{n}. Punto")).collect();
        let (size, _) = fit_to_page(&p, "").unwrap();
        assert!(size < 11.0);
    }

    #[test]
    fn overflowing_agenda_is_refused() {
        let mut p = preview(true);
        p.agenda_lines = (1..=200).map(|n| format!("{n}. x")).collect();
        match fit_to_page(&p, "Liceo Galilei") {
            Err(ExportError::TooLong { lines, room }) => assert!(lines > room),
            other => panic!("expected TooLong, got {other:?}"),
        }
        let result = PdfExporter::new("").export(&p, NaiveDate::from_ymd_opt(2025, 5, 10).unwrap());
        assert!(matches!(result, Err(ExportError::TooLong { .. })));
    }

    #[test]
    fn italian_and_typographic_text_is_encodable() {
        let lines = vec![
            Line::regular("Niccolò Bàrberi, attività più c’è “così” \u{2026} 5\u{20ac} \u{2013} ok", 0.0),
        ];
        assert_eq!(check_encodable(&lines), Ok(()));
    }

    #[test]
    fn name_outside_win_ansi_is_refused() {
        let mut p = preview(false);
        p.representative = "\u{141}ukasz \u{106}wik".to_string();
        let result = PdfExporter::new("Liceo Galilei")
            .export(&p, NaiveDate::from_ymd_opt(2025, 5, 10).unwrap());
        assert_eq!(result, Err(ExportError::UnsupportedChar('\u{141}')));
        assert_eq!(
            result.unwrap_err().notice(),
            "Il documento contiene caratteri non supportati nel PDF"
        );
    }

    #[test]
    fn exporter_produces_a_pdf() {
        let file = PdfExporter::new("Liceo Galilei")
            .export(&preview(true), NaiveDate::from_ymd_opt(2025, 5, 10).unwrap())
            .unwrap();
        assert_eq!(file.content_type, "application/pdf");
        assert!(file.bytes.starts_with(b"%PDF"));
    }
}
