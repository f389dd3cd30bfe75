use crate::config::CurrencySettings;
use crate::currency::format_ascii;
use crate::error::AppError;
use crate::models::ExportRequest;
use crate::render::{column_headers, table_rows, SymbolSet, REPORT_TITLE};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_X: f32 = 15.0;
const ROW_HEIGHT: f32 = 10.0;
const CELL_PADDING: f32 = 2.0;
const FONT_SIZE: f32 = 10.0;
const COLUMN_WIDTHS: [f32; 3] = [80.0, 50.0, 50.0];
/// A row may not extend below this line; the footer sits underneath.
const BOTTOM_LIMIT: f32 = 20.0;

const BLACK: (u8, u8, u8) = (0, 0, 0);
const WHITE: (u8, u8, u8) = (255, 255, 255);
const ACCENT: (u8, u8, u8) = (16, 185, 129);

/// Approximate Helvetica advance width in millimetres.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * 0.3528
}

fn fit(text: &str, width: f32, size: f32) -> String {
    let available = width - 2.0 * CELL_PADDING;
    if text_width(text, size) <= available {
        return text.to_string();
    }
    let max_chars = (available / (size * 0.5 * 0.3528)) as usize;
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn rgb(color: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(color.0) / 255.0,
        f32::from(color.1) / 255.0,
        f32::from(color.2) / 255.0,
        None,
    ))
}

fn rect_points(x: f32, y: f32, w: f32, h: f32) -> Vec<(Point, bool)> {
    vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y + h)), false),
        (Point::new(Mm(x), Mm(y + h)), false),
    ]
}

fn pdf_err(e: printpdf::Error) -> AppError {
    AppError::Export(format!("pdf: {e}"))
}

#[derive(Clone, Copy)]
enum FontKind {
    Regular,
    Bold,
    Italic,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, kind: FontKind) -> &IndirectFontRef {
        match kind {
            FontKind::Regular => &self.regular,
            FontKind::Bold => &self.bold,
            FontKind::Italic => &self.italic,
        }
    }
}

/// Lays out the report top to bottom, starting a new page when the next row
/// would run into the footer.
struct PageWriter {
    doc: PdfDocumentReference,
    fonts: Fonts,
    layer: PdfLayerReference,
    headers: [String; 3],
    page_no: usize,
    y: f32,
}

impl PageWriter {
    fn new(headers: [String; 3]) -> Result<Self, AppError> {
        let (doc, page, layer) =
            PdfDocument::new(REPORT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?,
            italic: doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(pdf_err)?,
        };
        let layer = doc.get_page(page).get_layer(layer);

        let mut writer = Self {
            doc,
            fonts,
            layer,
            headers,
            page_no: 1,
            y: PAGE_HEIGHT,
        };
        writer.decorate_page();
        Ok(writer)
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32, kind: FontKind, color: (u8, u8, u8)) {
        self.layer.set_fill_color(rgb(color));
        self.layer
            .use_text(text, size, Mm(x), Mm(y), self.fonts.get(kind));
    }

    fn decorate_page(&mut self) {
        let x = (PAGE_WIDTH - text_width(REPORT_TITLE, 16.0)) / 2.0;
        self.text(REPORT_TITLE, 16.0, x, PAGE_HEIGHT - 20.0, FontKind::Bold, BLACK);

        let footer = format!("Page {}", self.page_no);
        let x = (PAGE_WIDTH - text_width(&footer, 8.0)) / 2.0;
        self.text(&footer, 8.0, x, 10.0, FontKind::Italic, BLACK);

        self.y = PAGE_HEIGHT - 35.0;
    }

    fn new_page(&mut self) {
        self.page_no += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.page_no),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.decorate_page();
    }

    fn line(&mut self, text: &str, size: f32, kind: FontKind, color: (u8, u8, u8)) {
        self.text(text, size, MARGIN_X, self.y, kind, color);
        self.y -= ROW_HEIGHT;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn header_row(&mut self) {
        let headers = self.headers.clone();
        self.draw_row([&headers[0], &headers[1], &headers[2]], true);
    }

    fn data_row(&mut self, cells: [&str; 3]) {
        if self.y - ROW_HEIGHT < BOTTOM_LIMIT {
            self.new_page();
            self.header_row();
        }
        self.draw_row(cells, false);
    }

    fn draw_row(&mut self, cells: [&str; 3], header: bool) {
        let bottom = self.y - ROW_HEIGHT;
        let mut x = MARGIN_X;

        self.layer.set_outline_color(rgb(BLACK));
        self.layer.set_outline_thickness(0.5);

        for (idx, (cell, width)) in cells.into_iter().zip(COLUMN_WIDTHS).enumerate() {
            if header {
                self.layer.set_fill_color(rgb(ACCENT));
                self.layer.add_polygon(Polygon {
                    rings: vec![rect_points(x, bottom, width, ROW_HEIGHT)],
                    mode: PaintMode::FillStroke,
                    winding_order: WindingOrder::NonZero,
                });
            } else {
                self.layer.add_line(Line {
                    points: rect_points(x, bottom, width, ROW_HEIGHT),
                    is_closed: true,
                });
            }

            let content = fit(cell, width, FONT_SIZE);
            let content_width = text_width(&content, FONT_SIZE);
            let text_x = match (header, idx) {
                (true, _) => x + (width - content_width) / 2.0,
                (false, 0) => x + CELL_PADDING,
                (false, _) => x + width - CELL_PADDING - content_width,
            };
            let (kind, color) = if header {
                (FontKind::Bold, WHITE)
            } else {
                (FontKind::Regular, BLACK)
            };
            self.text(&content, FONT_SIZE, text_x, bottom + 3.5, kind, color);

            x += width;
        }

        self.y = bottom;
    }

    fn finish(self) -> Result<(Vec<u8>, usize), AppError> {
        let pages = self.page_no;
        let bytes = self.doc.save_to_bytes().map_err(pdf_err)?;
        Ok((bytes, pages))
    }
}

fn write_document(
    request: &ExportRequest,
    currency: &CurrencySettings,
) -> Result<(Vec<u8>, usize), AppError> {
    let mut writer = PageWriter::new(column_headers(currency))?;

    writer.line(
        &format!("Date: {} to {}", request.range.start, request.range.end),
        12.0,
        FontKind::Bold,
        BLACK,
    );
    writer.line(
        &format!("Total: {}", format_ascii(request.total_secondary, &currency.secondary)),
        14.0,
        FontKind::Bold,
        ACCENT,
    );
    writer.gap(5.0);

    writer.header_row();
    for row in table_rows(&request.line_items, currency, SymbolSet::Ascii) {
        writer.data_row([&row.service, &row.primary, &row.secondary]);
    }

    writer.finish()
}

/// A4 report: title and page footer on every page, date and total banner,
/// bordered table whose header row repeats after each page break.
pub fn render_document(
    request: &ExportRequest,
    currency: &CurrencySettings,
) -> Result<Vec<u8>, AppError> {
    write_document(request, currency).map(|(bytes, _)| bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostLineItem, DateRange};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn request(rows: usize) -> ExportRequest {
        ExportRequest {
            line_items: (0..rows)
                .map(|i| CostLineItem {
                    service: format!("Service {i}"),
                    amount_primary: dec!(1.50),
                    amount_secondary: dec!(124.50),
                })
                .collect(),
            range: DateRange {
                start: NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
                end: NaiveDate::from_ymd_opt(2024, 3, 31).expect("date"),
            },
            total_secondary: dec!(124.50) * rust_decimal::Decimal::from(rows as u64),
        }
    }

    #[test]
    fn short_report_fits_on_one_page() {
        let (bytes, pages) =
            write_document(&request(3), &CurrencySettings::default()).expect("pdf");
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(pages, 1);
    }

    #[test]
    fn long_report_paginates() {
        let (_, pages) =
            write_document(&request(60), &CurrencySettings::default()).expect("pdf");
        assert!(pages >= 3, "expected at least 3 pages, got {pages}");
    }

    #[test]
    fn fit_truncates_long_service_names() {
        let long = "Amazon Elastic Container Service for Kubernetes Fargate Compute";
        let fitted = fit(long, COLUMN_WIDTHS[0], FONT_SIZE);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, FONT_SIZE) <= COLUMN_WIDTHS[0]);
        assert_eq!(fit("AWS Lambda", COLUMN_WIDTHS[0], FONT_SIZE), "AWS Lambda");
    }
}
