//! Lays out a [Report] as an A4 PDF document.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

use crate::report::model::{COLUMN_HEADERS, REPORT_TITLE, Report};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const ROW_HEIGHT: f32 = 20.0;
const CELL_PADDING: f32 = 4.0;

const TITLE_FONT_SIZE: f32 = 16.0;
const FONT_SIZE: f32 = 12.0;
const TABLE_FONT_SIZE: f32 = 10.0;

const COLUMN_WIDTHS: [f32; 6] = [85.0, 85.0, 71.0, 71.0, 71.0, 71.0];
const COLUMN_ALIGNMENT: [Align; 6] = [
    Align::Left,
    Align::Left,
    Align::Right,
    Align::Right,
    Align::Right,
    Align::Right,
];

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

/// Render `report` and return the bytes of the PDF file.
///
/// The table continues on as many pages as needed, repeating the header row
/// at the top of each page.
pub fn render_report(report: &Report) -> Vec<u8> {
    let mut writer = ReportWriter::new();
    let mut page = writer.new_page();
    let mut y = PAGE_HEIGHT - MARGIN - TITLE_FONT_SIZE;

    page.content.set_fill_rgb(0.0, 0.2, 0.4);
    draw_text_centered(
        &mut page.content,
        BOLD_FONT,
        TITLE_FONT_SIZE,
        y,
        REPORT_TITLE,
    );
    page.content.set_fill_rgb(0.0, 0.0, 0.0);

    y -= 24.0;
    draw_text_centered(
        &mut page.content,
        REGULAR_FONT,
        FONT_SIZE,
        y,
        &report.customer_line(),
    );

    y -= 28.0 + ROW_HEIGHT;
    draw_header_row(&mut page.content, y);

    for row in &report.rows {
        if y - ROW_HEIGHT < MARGIN {
            writer.finish_page(page);
            page = writer.new_page();
            y = PAGE_HEIGHT - MARGIN - ROW_HEIGHT;
            draw_header_row(&mut page.content, y);
        }

        y -= ROW_HEIGHT;
        draw_row(
            &mut page.content,
            y,
            &row.cells(),
            TABLE_FONT_SIZE,
            &COLUMN_ALIGNMENT,
        );
    }

    let summary_lines = report.summary_lines();
    let summary_height = 14.0 + ROW_HEIGHT * summary_lines.len() as f32;

    if y - summary_height < MARGIN {
        writer.finish_page(page);
        page = writer.new_page();
        y = PAGE_HEIGHT - MARGIN;
    }

    y -= 14.0;

    for line in &summary_lines {
        y -= ROW_HEIGHT;
        draw_text(
            &mut page.content,
            BOLD_FONT,
            FONT_SIZE,
            table_left(),
            y + 6.0,
            line,
        );
    }

    writer.finish_page(page);
    writer.finish()
}

/// A page that is being drawn.
struct Page {
    content: Content,
    content_id: Ref,
    number: usize,
}

/// Keeps track of the objects of the PDF document.
struct ReportWriter {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    page_refs: Vec<Ref>,
    next_id: i32,
    regular_font_id: Ref,
    bold_font_id: Ref,
}

impl ReportWriter {
    fn new() -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let regular_font_id = Ref::new(3);
        let bold_font_id = Ref::new(4);

        pdf.type1_font(regular_font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_font_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            page_refs: Vec::new(),
            next_id: 5,
            regular_font_id,
            bold_font_id,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn new_page(&mut self) -> Page {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();

        self.page_refs.push(page_id);

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .contents(content_id);

        let mut resources = page.resources();
        let mut fonts = resources.fonts();
        fonts.pair(REGULAR_FONT, self.regular_font_id);
        fonts.pair(BOLD_FONT, self.bold_font_id);

        Page {
            content: Content::new(),
            content_id,
            number: self.page_refs.len(),
        }
    }

    /// Add the page number to the footer and write the page's content stream.
    fn finish_page(&mut self, mut page: Page) {
        let label = format!("Page {}", page.number);
        let x = PAGE_WIDTH - MARGIN - text_width(&label, TABLE_FONT_SIZE);
        draw_text(
            &mut page.content,
            REGULAR_FONT,
            TABLE_FONT_SIZE,
            x,
            MARGIN - 30.0,
            &label,
        );

        self.pdf.stream(page.content_id, &page.content.finish());
    }

    fn finish(mut self) -> Vec<u8> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);

        let mut pages = self.pdf.pages(self.pages_id);
        pages.count(self.page_refs.len() as i32);
        pages.kids(self.page_refs.clone());
        drop(pages);

        self.pdf.finish()
    }
}

fn table_left() -> f32 {
    (PAGE_WIDTH - COLUMN_WIDTHS.iter().sum::<f32>()) / 2.0
}

fn draw_header_row(content: &mut Content, y: f32) {
    content.save_state();
    content.set_fill_rgb(200.0 / 255.0, 220.0 / 255.0, 1.0);
    content.rect(table_left(), y, COLUMN_WIDTHS.iter().sum(), ROW_HEIGHT);
    content.fill_nonzero();
    content.restore_state();

    draw_row(
        content,
        y,
        &COLUMN_HEADERS,
        TABLE_FONT_SIZE,
        &[Align::Center; 6],
    );
}

fn draw_row(
    content: &mut Content,
    y: f32,
    cells: &[&str; 6],
    font_size: f32,
    align: &[Align; 6],
) {
    let mut x = table_left();

    for ((text, width), align) in cells.iter().zip(COLUMN_WIDTHS).zip(align) {
        let text_x = match align {
            Align::Left => x + CELL_PADDING,
            Align::Center => x + (width - text_width(text, font_size)) / 2.0,
            Align::Right => x + width - CELL_PADDING - text_width(text, font_size),
        };

        draw_text(content, REGULAR_FONT, font_size, text_x, y + 6.0, text);
        draw_cell_border(content, x, y, width, ROW_HEIGHT);

        x += width;
    }
}

fn draw_cell_border(content: &mut Content, x: f32, y: f32, width: f32, height: f32) {
    content.save_state();
    content.set_stroke_rgb(0.0, 0.0, 0.0);
    content.rect(x, y, width, height);
    content.stroke();
    content.restore_state();
}

fn draw_text_centered(content: &mut Content, font: Name, size: f32, y: f32, text: &str) {
    let x = (PAGE_WIDTH - text_width(text, size)) / 2.0;
    draw_text(content, font, size, x, y, text);
}

fn draw_text(content: &mut Content, font: Name, size: f32, x: f32, y: f32, text: &str) {
    let encoded = encode_text(text);

    content.begin_text();
    content.set_font(font, size);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
    content.show(Str(&encoded));
    content.end_text();
}

/// Encode `text` for the WinAnsi encoded standard fonts.
///
/// Printable ASCII and the Latin-1 letters and symbols (U+00A0 to U+00FF)
/// have the same code in WinAnsi, anything else is drawn as '?'.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(byte @ (b' '..=b'~' | 0xA0..=0xFF)) => byte,
            _ => b'?',
        })
        .collect()
}

/// Approximate width of `text` in Helvetica at `size` points.
fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(glyph_width).sum();

    units as f32 * size / 1000.0
}

/// Helvetica advance widths in thousandths of an em.
fn glyph_width(c: char) -> u32 {
    match c {
        '0'..='9' => 556,
        '.' | ',' | ':' | ' ' | '/' | 'i' | 'j' | 'l' | 'I' => 278,
        '-' | 'r' | '(' | ')' => 333,
        'f' | 't' => 278,
        'm' => 833,
        'w' | 'M' => 833,
        'W' => 944,
        'A'..='Z' => 667,
        _ => 556,
    }
}
