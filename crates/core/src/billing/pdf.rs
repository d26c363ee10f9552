//! Minimal PDF writer.
//!
//! Emits an uncompressed PDF 1.4 document using the standard Helvetica
//! fonts, so no font embedding is needed. Text is encoded as WinAnsi;
//! characters outside that code page are replaced with `?`.

use std::fmt::Write as _;

/// US Letter, in points.
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Objects shared by every page: catalog, page tree and the two fonts.
const SHARED_OBJECTS: usize = 4;

/// Drawing operations for one page.
#[derive(Debug, Default, Clone)]
pub struct PdfPage {
    content: String,
}

impl PdfPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws `text` with its baseline starting at (`x`, `y`).
    pub fn text(&mut self, x: f32, y: f32, size: f32, bold: bool, text: &str) -> &mut Self {
        let font = if bold { "F2" } else { "F1" };
        let _ = writeln!(
            self.content,
            "BT /{} {} Tf {} {} Td ({}) Tj ET",
            font,
            fmt_num(size),
            fmt_num(x),
            fmt_num(y),
            escape_text(text)
        );
        self
    }

    /// Draws `text` so that it ends at `right`. Widths are approximated.
    pub fn text_right(&mut self, right: f32, y: f32, size: f32, bold: bool, text: &str) -> &mut Self {
        let x = right - approx_width(text, size);
        self.text(x, y, size, bold, text)
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> &mut Self {
        let _ = writeln!(
            self.content,
            "0.5 w {} {} m {} {} l S",
            fmt_num(x1),
            fmt_num(y1),
            fmt_num(x2),
            fmt_num(y2)
        );
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Serializes this page alone into a complete PDF file.
    pub fn render(&self) -> Vec<u8> {
        render_pages(std::slice::from_ref(self))
    }
}

/// Serializes `pages` into one PDF file, in order.
///
/// Object layout: 1 catalog, 2 page tree, 3 and 4 fonts, then a page object
/// followed by its content stream for each page.
pub fn render_pages(pages: &[PdfPage]) -> Vec<u8> {
    let page_object = |index: usize| SHARED_OBJECTS + 1 + index * 2;
    let kids = (0..pages.len())
        .map(|index| format!("{} 0 R", page_object(index)))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    for (index, page) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            fmt_num(PAGE_WIDTH),
            fmt_num(PAGE_HEIGHT),
            page_object(index) + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            page.content.len(),
            page.content
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{}\nendobj\n", index + 1, body);
    }

    let xref_offset = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(out, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    );
    out.into_bytes()
}

/// Breaks `text` into lines no wider than `width` points at `size`.
/// Words longer than a whole line are split.
pub fn wrap_text(text: &str, width: f32, size: f32) -> Vec<String> {
    let max_chars = ((width / (size * AVG_GLYPH_WIDTH)).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..max_chars).collect());
        }
        if word.is_empty() {
            continue;
        }
        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.len();
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// WinAnsi code for characters above ASCII.
fn win_ansi(ch: char) -> Option<u8> {
    let code = match ch {
        '\u{00A0}'..='\u{00FF}' => return u8::try_from(u32::from(ch)).ok(),
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Escapes a string literal body. Non-ASCII WinAnsi characters are written
/// as octal escapes so the content stream stays 7-bit.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            ' '..='~' => escaped.push(ch),
            '\t' => escaped.push(' '),
            _ => match win_ansi(ch) {
                Some(code) => {
                    let _ = write!(escaped, "\\{:03o}", code);
                }
                None => escaped.push('?'),
            },
        }
    }
    escaped
}

fn approx_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH
}

fn fmt_num(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_delimiters() {
        assert_eq!(escape_text(r"a(b)c\d"), r"a\(b\)c\\d");
    }

    #[test]
    fn latin_text_uses_win_ansi_codes() {
        assert_eq!(escape_text("José Ruiz"), r"Jos\351 Ruiz");
        assert_eq!(escape_text("Zoë"), r"Zo\353");
        assert_eq!(escape_text("\u{20AC}5 \u{201C}ok\u{201D}"), r"\2005 \223ok\224");
    }

    #[test]
    fn characters_outside_win_ansi_become_question_marks() {
        assert_eq!(escape_text("Łukasz 李"), "?ukasz ?");
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let mut page = PdfPage::new();
        page.text(72.0, 720.0, 12.0, false, "Hello");
        let bytes = page.render();
        let pdf = String::from_utf8(bytes).unwrap();

        assert!(pdf.starts_with("%PDF-1.4\n"));
        assert!(pdf.ends_with("%%EOF\n"));

        let xref_at: usize = pdf
            .lines()
            .skip_while(|l| *l != "startxref")
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert!(pdf[xref_at..].starts_with("xref\n0 7\n"));

        let entries: Vec<usize> = pdf[xref_at..]
            .lines()
            .skip(3)
            .take(6)
            .map(|l| l[..10].parse().unwrap())
            .collect();
        for (index, offset) in entries.into_iter().enumerate() {
            assert!(pdf[offset..].starts_with(&format!("{} 0 obj", index + 1)));
        }
    }

    #[test]
    fn pages_are_listed_in_order() {
        let mut first = PdfPage::new();
        first.text(72.0, 720.0, 12.0, false, "one");
        let mut second = PdfPage::new();
        second.text(72.0, 720.0, 12.0, false, "two");

        let pdf = String::from_utf8(render_pages(&[first, second])).unwrap();

        assert!(pdf.contains("/Kids [5 0 R 7 0 R] /Count 2"));
        assert!(pdf.contains("/Contents 6 0 R"));
        assert!(pdf.contains("/Contents 8 0 R"));
        assert!(pdf.find("(one) Tj").unwrap() < pdf.find("(two) Tj").unwrap());
        assert!(pdf.contains("xref\n0 9\n"));
    }

    #[test]
    fn stream_length_matches_content() {
        let mut page = PdfPage::new();
        page.text(72.0, 700.0, 10.5, true, "Total").line(72.0, 690.0, 540.0, 690.0);
        let pdf = String::from_utf8(page.render()).unwrap();
        let expected = format!("<< /Length {} >>", page.content().len());
        assert!(pdf.contains(&expected));
        assert!(page.content().contains("/F2 10.50 Tf"));
    }

    #[test]
    fn wraps_on_word_boundaries() {
        // 50pt at size 10 fits 10 characters.
        assert_eq!(
            wrap_text("Monthly tuition fee", 50.0, 10.0),
            vec!["Monthly", "tuition", "fee"]
        );
        assert_eq!(wrap_text("Lunch fee", 50.0, 10.0), vec!["Lunch fee"]);
        assert_eq!(
            wrap_text("Supercalifragilistic", 50.0, 10.0),
            vec!["Supercalif", "ragilistic"]
        );
        assert_eq!(wrap_text("", 50.0, 10.0), vec![""]);
    }
}
