//! Sales report extractors: delimited exports and receipt text

use chrono::NaiveDate;
use regex::Regex;

use crate::ingest::{column_index, csv_reader};
use crate::traits::SaleExtractor;
use crate::types::*;
use crate::utils::normalize::{normalize_label, parse_amount};

/// Reads the tabular sales export (CLIENTE / FORMA DE PGTO / VALOR BRUTO).
///
/// Header names are matched after label normalization, so `Cliente` and
/// `CLIENTE` are the same column. Rows without a customer or payment
/// method are skipped.
#[derive(Debug, Clone, Default)]
pub struct SalesCsvExtractor;

impl SalesCsvExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl SaleExtractor for SalesCsvExtractor {
    fn extract_sales(&self, raw: &str) -> IngestResult<Vec<Sale>> {
        let mut reader = csv_reader(raw);
        let headers = reader.headers()?.clone();

        let customer_col = column_index(&headers, &["CLIENTE"]).ok_or_else(|| {
            IngestError::Validation("Sales export has no CLIENTE column".to_string())
        })?;
        let method_col = column_index(&headers, &["FORMA DE PGTO", "FORMA DE PAGAMENTO"])
            .ok_or_else(|| {
                IngestError::Validation("Sales export has no FORMA DE PGTO column".to_string())
            })?;
        let amount_col = column_index(&headers, &["VALOR BRUTO"]);

        let mut sales = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let customer = record.get(customer_col).unwrap_or("").trim();
            let method = normalize_label(record.get(method_col).unwrap_or(""));
            if customer.is_empty() || method.is_empty() {
                tracing::debug!(row = row + 1, "skipping sales row without customer or method");
                continue;
            }

            let value = amount_col.and_then(|col| record.get(col)).unwrap_or("0");
            match Sale::new(customer, &method, parse_amount(value)) {
                Ok(sale) => sales.push(sale),
                Err(err) => tracing::warn!(row = row + 1, error = %err, "skipping sales row"),
            }
        }

        Ok(sales)
    }
}

/// Reads receipt blocks from the text layer of the sales report PDF.
///
/// Each block looks like
/// `Recibo 00001234 MARIA SILVA 123.456.789-00 05/03/2024 PIX Pago R$ 150,00`
/// where the tax id is a CPF or CNPJ.
#[derive(Debug, Clone)]
pub struct ReceiptTextExtractor {
    receipt: Regex,
}

impl ReceiptTextExtractor {
    pub fn new() -> Self {
        let receipt = Regex::new(concat!(
            r"Recibo\s+(?P<id>\d{8})\s+",
            r"(?P<customer>.*?)\s+",
            r"[\d./-]{14,18}\s+",
            r"(?P<date>\d{2}/\d{2}/\d{4})\s+",
            r"(?P<method>.*?)\s+",
            r"Pago\s+R\$\s+(?P<amount>[\d.,]+)"
        ))
        .expect("receipt pattern is valid");
        Self { receipt }
    }
}

impl Default for ReceiptTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SaleExtractor for ReceiptTextExtractor {
    fn extract_sales(&self, raw: &str) -> IngestResult<Vec<Sale>> {
        // Page text arrives in arbitrary line breaks; blocks may span them
        let flattened = raw.split_whitespace().collect::<Vec<_>>().join(" ");

        let mut sales = Vec::new();
        for caps in self.receipt.captures_iter(&flattened) {
            let sale = Sale::new(
                &caps["customer"],
                &caps["method"],
                parse_amount(&caps["amount"]),
            );
            match sale {
                Ok(sale) => {
                    let mut sale = sale.with_document_id(caps["id"].to_string());
                    if let Ok(date) = NaiveDate::parse_from_str(&caps["date"], "%d/%m/%Y") {
                        sale = sale.with_date(date);
                    }
                    sales.push(sale);
                }
                Err(err) => {
                    tracing::warn!(
                        receipt = &caps["id"],
                        error = %err,
                        "ignoring malformed receipt"
                    )
                }
            }
        }

        if sales.is_empty() {
            return Err(IngestError::NoSalesFound(
                "receipt text (the report layout may have changed)".to_string(),
            ));
        }

        Ok(sales)
    }
}
