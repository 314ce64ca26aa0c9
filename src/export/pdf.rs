use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_decimal::Decimal;

use crate::error::AppError;
use crate::money::format_brl;
use crate::quote::{Quote, QuoteTotals};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;
/// Lowest baseline before the footer area
const MIN_Y: f32 = 30.0;

// Column x positions: item, qty, unit price, subtotal
const COLUMNS: [f32; 4] = [MARGIN, 110.0, 135.0, 165.0];

fn export_err(e: printpdf::Error) -> AppError {
    AppError::ExportError(format!("PDF rendering failed: {}", e))
}

struct Cursor<'a> {
    layer: &'a PdfLayerReference,
    y: f32,
}

impl Cursor<'_> {
    fn text(&self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn advance(&mut self, lines: f32) {
        self.y -= LINE_HEIGHT * lines;
    }
}

/// Render a quote as a one-page A4 PDF.
///
/// Items that do not fit on the page are folded into a single
/// "+ N itens" line so the totals always show.
pub fn quote_pdf(business: &str, quote: &Quote, totals: &QuoteTotals) -> Result<Vec<u8>, AppError> {
    let title = format!("Orçamento - {}", business);
    let (doc, page, layer) =
        PdfDocument::new(title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Orçamento");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(export_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(export_err)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut cursor = Cursor {
        layer: &layer,
        y: PAGE_HEIGHT - MARGIN,
    };

    cursor.text(&title, 18.0, MARGIN, &bold);
    cursor.advance(2.0);

    if !quote.client_name.trim().is_empty() {
        cursor.text(&format!("Cliente: {}", quote.client_name.trim()), 11.0, MARGIN, &regular);
        cursor.advance(1.0);
    }
    if !quote.phone.trim().is_empty() {
        cursor.text(&format!("Telefone: {}", quote.phone.trim()), 11.0, MARGIN, &regular);
        cursor.advance(1.0);
    }
    cursor.text(
        &format!("Data: {}", quote.date.format("%d/%m/%Y")),
        11.0,
        MARGIN,
        &regular,
    );
    cursor.advance(2.0);

    for (header, x) in ["Item", "Qtd.", "Unitário", "Subtotal"].iter().zip(COLUMNS) {
        cursor.text(header, 11.0, x, &bold);
    }
    cursor.advance(1.5);

    // keep room for up to five summary lines below the table
    let last_item_y = MIN_Y + LINE_HEIGHT * 6.0;
    for (i, item) in quote.items.iter().enumerate() {
        if cursor.y < last_item_y {
            let remaining = quote.items.len() - i;
            cursor.text(&format!("+ {} itens", remaining), 10.0, MARGIN, &regular);
            cursor.advance(1.0);
            break;
        }

        let cells = [
            item.product.clone(),
            item.quantity.normalize().to_string(),
            format_brl(item.unit_price),
            format_brl(item.subtotal()),
        ];
        for (cell, x) in cells.iter().zip(COLUMNS) {
            cursor.text(cell, 10.0, x, &regular);
        }
        cursor.advance(1.0);
    }
    cursor.advance(1.0);

    let mut summary = vec![("Subtotal", totals.items_subtotal)];
    if totals.packaging_fee > Decimal::ZERO {
        summary.push(("Embalagem", totals.packaging_fee));
    }
    if totals.delivery_fee > Decimal::ZERO {
        summary.push(("Entrega", totals.delivery_fee));
    }
    if totals.payment_fee > Decimal::ZERO {
        summary.push(("Taxa financeira", totals.payment_fee));
    }
    for (label, value) in summary {
        cursor.text(label, 11.0, COLUMNS[2], &regular);
        cursor.text(&format_brl(value), 11.0, COLUMNS[3], &regular);
        cursor.advance(1.0);
    }

    cursor.text("TOTAL", 13.0, COLUMNS[2], &bold);
    cursor.text(&format_brl(totals.total), 13.0, COLUMNS[3], &bold);

    doc.save_to_bytes().map_err(export_err)
}
