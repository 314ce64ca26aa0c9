//! Plain-text summaries for pasting into a messaging app.
//!
//! `*bold*` markers follow WhatsApp formatting.

use rust_decimal::Decimal;
use std::fmt::Write;

use crate::money::format_brl;
use crate::pricing::CostBreakdown;
use crate::quote::{Quote, QuoteTotals};

const SEPARATOR: &str = "------------------------------";

pub fn quote_text(business: &str, quote: &Quote, totals: &QuoteTotals) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "*Orçamento - {}*", business);
    if !quote.client_name.trim().is_empty() {
        let _ = writeln!(out, "Cliente: {}", quote.client_name.trim());
    }
    if !quote.phone.trim().is_empty() {
        let _ = writeln!(out, "Telefone: {}", quote.phone.trim());
    }
    let _ = writeln!(out, "Data: {}", quote.date.format("%d/%m/%Y"));
    let _ = writeln!(out, "{}", SEPARATOR);

    for item in &quote.items {
        let _ = writeln!(
            out,
            "{}x {} - {} = {}",
            item.quantity.normalize(),
            item.product,
            format_brl(item.unit_price),
            format_brl(item.subtotal())
        );
    }

    let _ = writeln!(out, "{}", SEPARATOR);
    let _ = writeln!(out, "Subtotal: {}", format_brl(totals.items_subtotal));
    if totals.packaging_fee > Decimal::ZERO {
        let _ = writeln!(out, "Embalagem: {}", format_brl(totals.packaging_fee));
    }
    if totals.delivery_fee > Decimal::ZERO {
        let _ = writeln!(
            out,
            "Entrega ({} km): {}",
            quote.distance_km.normalize(),
            format_brl(totals.delivery_fee)
        );
    }
    if totals.payment_fee > Decimal::ZERO {
        let _ = writeln!(
            out,
            "Taxa ({}): {}",
            totals.payment_method,
            format_brl(totals.payment_fee)
        );
    }
    let _ = write!(out, "*Total: {}*", format_brl(totals.total));

    out
}

/// Summary of a single priced product
pub fn breakdown_text(product: &str, breakdown: &CostBreakdown) -> String {
    let mut out = String::new();

    let product = if product.trim().is_empty() {
        "Produto"
    } else {
        product.trim()
    };

    let _ = writeln!(out, "*{}*", product);
    let _ = writeln!(out, "Preço de venda: {}", format_brl(breakdown.sale_price));
    if breakdown.delivery_fee > Decimal::ZERO {
        let _ = writeln!(out, "Entrega: {}", format_brl(breakdown.delivery_fee));
    }
    if breakdown.payment_fee > Decimal::ZERO {
        let _ = writeln!(
            out,
            "Taxa ({}): {}",
            breakdown.payment_method,
            format_brl(breakdown.payment_fee)
        );
    }
    let _ = writeln!(out, "*Total: {}*", format_brl(breakdown.final_price));
    let _ = write!(
        out,
        "Margem: {}% | Lucro: {}",
        breakdown.margin_pct.normalize(),
        format_brl(breakdown.profit)
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::DeliveryRates;
    use crate::payment::PaymentMethod;
    use crate::pricing::PaymentFeeBase;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn quote() -> Quote {
        let mut quote = Quote::new("Maria", "(11) 98888-7777", NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        quote.add_item("Bolo de Cenoura", dec!(1), dec!(80)).unwrap();
        quote.add_item("Brigadeiro", dec!(50), dec!(2.50)).unwrap();
        quote
    }

    #[test]
    fn test_quote_text_layout() {
        let mut quote = quote();
        quote.distance_km = dec!(10);
        let totals = quote.totals(
            &DeliveryRates::new(dec!(5), dec!(2)),
            &PaymentMethod {
                name: "credito".to_string(),
                fee_pct: dec!(5),
            },
            PaymentFeeBase::SaleAndDelivery,
        )
        .unwrap();

        let text = quote_text("Doceria da Ana", &quote, &totals);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "*Orçamento - Doceria da Ana*");
        assert_eq!(lines[1], "Cliente: Maria");
        assert_eq!(lines[2], "Telefone: (11) 98888-7777");
        assert_eq!(lines[3], "Data: 19/10/2026");
        assert_eq!(lines[5], "1x Bolo de Cenoura - R$ 80.00 = R$ 80.00");
        assert_eq!(lines[6], "50x Brigadeiro - R$ 2.50 = R$ 125.00");
        assert!(text.contains("Subtotal: R$ 205.00"));
        assert!(text.contains("Entrega (10 km): R$ 10.00"));
        // (205 + 10) * 5%
        assert!(text.contains("Taxa (credito): R$ 10.75"));
        assert!(text.ends_with("*Total: R$ 225.75*"));
        assert!(!text.contains("Embalagem"));
    }

    #[test]
    fn test_quote_text_omits_zero_surcharges() {
        let quote = quote();
        let totals = quote.totals(
            &DeliveryRates::default(),
            &PaymentMethod {
                name: "pix".to_string(),
                fee_pct: Decimal::ZERO,
            },
            PaymentFeeBase::SaleAndDelivery,
        )
        .unwrap();

        let text = quote_text("Doceria", &quote, &totals);
        assert!(!text.contains("Entrega"));
        assert!(!text.contains("Taxa"));
        assert!(text.ends_with("*Total: R$ 205.00*"));
    }
}
