//! Ingestion of sales reports and bank statements into canonical records
//!
//! Ingestion failures are blocking: a run never starts on an empty sales
//! report or on a statement set where any source failed to load.

pub mod classify;
pub mod sales;
pub mod statements;

pub use classify::*;
pub use sales::*;
pub use statements::*;

use std::collections::HashMap;

use crate::reconciliation::StatementPools;
use crate::traits::*;
use crate::types::*;
use crate::utils::normalize::normalize_label;

/// Orchestrates classification and extraction of source documents
pub struct Ingestor {
    classifier: Box<dyn SourceClassifier>,
    sales_csv: Box<dyn SaleExtractor>,
    sales_text: Box<dyn SaleExtractor>,
    statement_csv: Box<dyn StatementExtractor>,
    statement_layouts: HashMap<BankId, Box<dyn StatementExtractor>>,
}

impl Ingestor {
    /// Create an ingestor with the filename classifier and built-in extractors
    pub fn new() -> Self {
        let mut statement_layouts: HashMap<BankId, Box<dyn StatementExtractor>> = HashMap::new();
        statement_layouts.insert(BankId::Pagbank, Box::new(TextLayoutExtractor::pagbank()));
        statement_layouts.insert(BankId::Itau, Box::new(TextLayoutExtractor::itau()));

        Self {
            classifier: Box::new(FilenameClassifier),
            sales_csv: Box::new(SalesCsvExtractor::new()),
            sales_text: Box::new(ReceiptTextExtractor::new()),
            statement_csv: Box::new(StatementCsvExtractor::new()),
            statement_layouts,
        }
    }

    /// Replace the source classifier
    pub fn with_classifier(mut self, classifier: Box<dyn SourceClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Register (or replace) the text layout used for a bank's statements
    pub fn with_statement_layout(
        mut self,
        bank_id: BankId,
        extractor: Box<dyn StatementExtractor>,
    ) -> Self {
        self.statement_layouts.insert(bank_id, extractor);
        self
    }

    /// Replace the sales extractor used for a media type
    pub fn with_sales_extractor(
        mut self,
        media_type: MediaType,
        extractor: Box<dyn SaleExtractor>,
    ) -> IngestResult<Self> {
        match media_type {
            MediaType::Csv => self.sales_csv = extractor,
            MediaType::PdfText => self.sales_text = extractor,
            MediaType::Other => {
                return Err(IngestError::UnsupportedFormat(
                    "cannot register a sales extractor for unknown media".to_string(),
                ))
            }
        }
        Ok(self)
    }

    /// Load the sales report. An empty report is an error.
    pub async fn load_sales(&self, source: &dyn DocumentSource) -> IngestResult<Vec<Sale>> {
        let extractor = match source.media_type() {
            MediaType::Csv => &self.sales_csv,
            MediaType::PdfText => &self.sales_text,
            MediaType::Other => {
                return Err(IngestError::UnsupportedFormat(source.name().to_string()))
            }
        };

        let text = source.read_text().await?;
        let sales = extractor.extract_sales(&text)?;
        if sales.is_empty() {
            return Err(IngestError::NoSalesFound(source.name().to_string()));
        }

        tracing::info!(source = source.name(), count = sales.len(), "loaded sales");
        Ok(sales)
    }

    /// Load every statement source, in input order.
    ///
    /// Sources with no extractor for their bank and media type are skipped
    /// with a warning; any read or extraction failure aborts the load.
    pub async fn load_statements(
        &self,
        sources: &[Box<dyn DocumentSource>],
    ) -> IngestResult<Vec<StatementBatch>> {
        let mut batches = Vec::with_capacity(sources.len());

        for source in sources {
            let media_type = source.media_type();
            let bank_id = self.classifier.classify(source.name(), media_type);

            let Some(extractor) = self.statement_extractor(bank_id, media_type) else {
                tracing::warn!(
                    source = source.name(),
                    bank = %bank_id,
                    ?media_type,
                    "no extractor for statement source, ignoring"
                );
                continue;
            };

            let text = source.read_text().await?;
            let lines = extractor.extract_statement(&text)?;
            tracing::info!(
                source = source.name(),
                bank = %bank_id,
                lines = lines.len(),
                "loaded statement"
            );
            batches.push(StatementBatch::new(bank_id, source.name().to_string(), lines));
        }

        Ok(batches)
    }

    /// Load every statement source and aggregate them into bank pools
    pub async fn load_pools(
        &self,
        sources: &[Box<dyn DocumentSource>],
    ) -> IngestResult<StatementPools> {
        let batches = self.load_statements(sources).await?;
        Ok(StatementPools::aggregate(batches))
    }

    fn statement_extractor(
        &self,
        bank_id: BankId,
        media_type: MediaType,
    ) -> Option<&dyn StatementExtractor> {
        match media_type {
            MediaType::Csv => Some(self.statement_csv.as_ref()),
            MediaType::PdfText => self.statement_layouts.get(&bank_id).map(|e| e.as_ref()),
            MediaType::Other => None,
        }
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

/// CSV reader that sniffs `;` versus `,` from the header line
pub(crate) fn csv_reader(raw: &str) -> csv::Reader<&[u8]> {
    let header = raw.lines().next().unwrap_or("");
    let delimiter = if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    };

    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes())
}

/// Position of the first header matching any of `names` after label normalization
pub(crate) fn column_index(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| names.contains(&normalize_label(header).as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_source::MemoryDocument;
    use async_trait::async_trait;

    struct BrokenDocument;

    #[async_trait]
    impl DocumentSource for BrokenDocument {
        fn name(&self) -> &str {
            "bb_broken.csv"
        }

        fn media_type(&self) -> MediaType {
            MediaType::Csv
        }

        async fn read_text(&self) -> IngestResult<String> {
            Err(IngestError::Source("disk unplugged".to_string()))
        }
    }

    #[tokio::test]
    async fn test_load_sales_by_media_type() {
        let ingestor = Ingestor::new();

        let csv = MemoryDocument::from_named(
            "vendas.csv",
            "CLIENTE;FORMA DE PGTO;VALOR BRUTO\nAna;PIX;10,00\n",
        );
        assert_eq!(ingestor.load_sales(&csv).await.unwrap().len(), 1);

        let text = MemoryDocument::from_named(
            "vendas.pdf",
            "Recibo 00000001 ANA 123.456.789-00 01/03/2024 PIX Pago R$ 10,00",
        );
        assert_eq!(ingestor.load_sales(&text).await.unwrap().len(), 1);

        let other = MemoryDocument::from_named("vendas.xlsx", "");
        assert!(matches!(
            ingestor.load_sales(&other).await,
            Err(IngestError::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_refund_rows_are_counted_in_the_run() {
        let ingestor = Ingestor::new();
        let report = MemoryDocument::from_named(
            "vendas.csv",
            "CLIENTE;FORMA DE PGTO;VALOR BRUTO\nAna;PIX;10,00\nEstorno;PIX;-10,00\n",
        );
        let sales = ingestor.load_sales(&report).await.unwrap();

        let sources =
            vec![MemoryDocument::from_named("bb.csv", "historico;valor\nPIX;10,00\n").boxed()];
        let mut pools = ingestor.load_pools(&sources).await.unwrap();
        let result = crate::ReconciliationEngine::new().reconcile(&sales, &mut pools);

        assert_eq!(result.total_sales(), 2);
        assert_eq!(result.matched_sales().len(), 1);
        assert_eq!(result.unmatched_sales()[0].sale.customer(), "Estorno");
    }

    struct PipeSalesExtractor;

    impl SaleExtractor for PipeSalesExtractor {
        fn extract_sales(&self, raw: &str) -> IngestResult<Vec<Sale>> {
            raw.lines()
                .filter_map(|line| {
                    let mut fields = line.split('|');
                    Some((fields.next()?, fields.next()?, fields.next()?))
                })
                .map(|(customer, method, amount)| {
                    Sale::new(customer, method, crate::parse_amount(amount))
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn test_custom_sales_extractor() {
        let ingestor = Ingestor::new()
            .with_sales_extractor(MediaType::PdfText, Box::new(PipeSalesExtractor))
            .unwrap();
        let report = MemoryDocument::new(
            "fechamento".to_string(),
            MediaType::PdfText,
            "Ana|pix|10,00\nJosé|dinheiro|25,50\n".to_string(),
        );

        let sales = ingestor.load_sales(&report).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[1].payment_method(), "DINHEIRO");

        assert!(matches!(
            Ingestor::new().with_sales_extractor(MediaType::Other, Box::new(PipeSalesExtractor)),
            Err(IngestError::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_sales_report_is_blocking() {
        let ingestor = Ingestor::new();
        let csv =
            MemoryDocument::from_named("vendas.csv", "CLIENTE;FORMA DE PGTO;VALOR BRUTO\n");
        assert!(matches!(
            ingestor.load_sales(&csv).await,
            Err(IngestError::NoSalesFound(_))
        ));
    }

    #[tokio::test]
    async fn test_load_statements_classifies_and_skips() {
        let ingestor = Ingestor::new();
        let sources = vec![
            MemoryDocument::from_named("bb_marco.csv", "historico;valor\nPIX;10,00\n").boxed(),
            MemoryDocument::from_named("caixa.pdf", "anything").boxed(),
            MemoryDocument::from_named("extrato.csv", "descricao;valor\nTED;5,00\n").boxed(),
            MemoryDocument::from_named("itau.ofx", "<OFX>").boxed(),
            MemoryDocument::from_named(
                "itau_marco.pdf",
                "Lançamentos\n05/03 REDE VISA 20,00\n",
            )
            .boxed(),
        ];

        let batches = ingestor.load_statements(&sources).await.unwrap();

        let banks: Vec<BankId> = batches.iter().map(|b| b.bank_id).collect();
        assert_eq!(banks, vec![BankId::Bb, BankId::Unknown, BankId::Itau]);
        assert_eq!(batches[2].lines[0].description, "REDE VISA");
    }

    #[tokio::test]
    async fn test_failed_source_aborts_load() {
        let ingestor = Ingestor::new();
        let sources: Vec<Box<dyn DocumentSource>> = vec![
            MemoryDocument::from_named("bb.csv", "historico;valor\nPIX;10,00\n").boxed(),
            Box::new(BrokenDocument),
        ];

        assert!(matches!(
            ingestor.load_statements(&sources).await,
            Err(IngestError::Source(_))
        ));
    }

    #[tokio::test]
    async fn test_custom_classifier_and_layout() {
        let layout = TextLayoutExtractor::new(
            "caixa",
            r"EXTRATO CAIXA",
            r"^(?P<desc>.+?)\s+(?P<amount>[\d.]+,\d{2})$",
        )
        .unwrap();
        let ingestor = Ingestor::new()
            .with_classifier(Box::new(|_: &str, _: MediaType| BankId::Caixa))
            .with_statement_layout(BankId::Caixa, Box::new(layout));

        let sources = vec![
            MemoryDocument::from_named("loja.txt", "EXTRATO CAIXA\nDEPOSITO 50,00\n").boxed(),
        ];
        let pools = ingestor.load_pools(&sources).await.unwrap();

        let caixa = pools.get(BankId::Caixa).unwrap();
        assert_eq!(caixa.len(), 1);
        assert_eq!(caixa.entries()[0].description, "DEPOSITO");
    }
}
