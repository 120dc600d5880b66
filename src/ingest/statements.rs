//! Bank statement extractors: delimited exports and bank-specific text layouts

use regex::Regex;

use crate::ingest::{column_index, csv_reader};
use crate::traits::StatementExtractor;
use crate::types::*;
use crate::utils::normalize::parse_amount;

/// Reads a delimited statement export with a description and a credit column
#[derive(Debug, Clone, Default)]
pub struct StatementCsvExtractor;

impl StatementCsvExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl StatementExtractor for StatementCsvExtractor {
    fn extract_statement(&self, raw: &str) -> IngestResult<Vec<StatementLine>> {
        let mut reader = csv_reader(raw);
        let headers = reader.headers()?.clone();

        let description_col = column_index(
            &headers,
            &["HISTÓRICO", "HISTORICO", "DESCRICAO", "DESCRIÇÃO", "LANÇAMENTO", "LANCAMENTO"],
        );
        let value_col = column_index(&headers, &["VALOR"]);
        let credit_col = column_index(&headers, &["CRÉDITO", "CREDITO"]);
        if value_col.is_none() && credit_col.is_none() {
            return Err(IngestError::Validation(
                "Statement export has no VALOR or CRÉDITO column".to_string(),
            ));
        }

        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record?;
            let description = description_col
                .and_then(|col| record.get(col))
                .unwrap_or("")
                .trim()
                .to_string();
            // Exports with both columns leave VALOR blank on some credit rows
            let cell = |col: Option<usize>| {
                col.and_then(|col| record.get(col))
                    .filter(|value| !value.trim().is_empty())
            };
            let value = cell(value_col).or_else(|| cell(credit_col)).unwrap_or("0");
            let amount = parse_amount(value);
            lines.push(StatementLine::new(description, amount));
        }

        Ok(lines)
    }
}

/// Line-oriented statement text parser.
///
/// Nothing is read until a line matches the `header` pattern; after that,
/// every line matching `line` yields a statement line. The line pattern
/// must define `desc` and `amount` named groups.
#[derive(Debug, Clone)]
pub struct TextLayoutExtractor {
    name: String,
    header: Regex,
    line: Regex,
}

impl TextLayoutExtractor {
    /// Build a layout from its header and line patterns
    pub fn new(name: &str, header: &str, line: &str) -> IngestResult<Self> {
        let line = Regex::new(line)?;
        let names: Vec<&str> = line.capture_names().flatten().collect();
        if !names.contains(&"desc") || !names.contains(&"amount") {
            return Err(IngestError::Validation(format!(
                "Layout '{name}' line pattern needs `desc` and `amount` groups"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            header: Regex::new(header)?,
            line,
        })
    }

    /// PagBank account statement:
    /// `05/03/2024  Vendas - Cartão de Crédito  R$ 150,00`
    pub fn pagbank() -> Self {
        Self::new(
            "pagbank",
            r"(?i)\bDATA\s+DESCRI[ÇC][ÃA]O\s+VALOR\b",
            concat!(
                r"^\s*(?P<date>\d{2}/\d{2}/\d{4})\s+",
                r"(?P<desc>.+?)\s+",
                r"(?P<amount>-?\s*R\$\s*-?[\d.]+,\d{2})\s*$"
            ),
        )
        .expect("built-in PagBank layout is valid")
    }

    /// Itaú account statement, with an optional running balance column:
    /// `05/03  PIX TRANSF MARIA S  150,00  1.350,00`
    pub fn itau() -> Self {
        Self::new(
            "itau",
            r"(?i)\bLAN[ÇC]AMENTOS\b",
            concat!(
                r"^\s*(?P<date>\d{2}/\d{2}(?:/\d{4})?)\s+",
                r"(?P<desc>.+?)\s+",
                r"(?P<amount>-?[\d.]+,\d{2}-?)",
                r"(?:\s+-?[\d.]+,\d{2}-?)?\s*$"
            ),
        )
        .expect("built-in Itaú layout is valid")
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl StatementExtractor for TextLayoutExtractor {
    fn extract_statement(&self, raw: &str) -> IngestResult<Vec<StatementLine>> {
        let mut in_section = false;
        let mut lines = Vec::new();

        for text_line in raw.lines() {
            if !in_section {
                in_section = self.header.is_match(text_line);
                continue;
            }

            if let Some(caps) = self.line.captures(text_line) {
                let mut amount = parse_amount(&caps["amount"]);
                // Itaú prints debits with a trailing minus
                if caps["amount"].trim_end().ends_with('-') {
                    amount = -amount.abs();
                }
                lines.push(StatementLine::new(caps["desc"].trim().to_string(), amount));
            }
        }

        if !in_section {
            tracing::warn!(layout = %self.name, "statement header not found");
        }

        Ok(lines)
    }
}
