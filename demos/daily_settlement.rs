//! Daily settlement example: sales report against four bank statements

use reconciliation_core::utils::MemoryDocument;
use reconciliation_core::{DocumentSource, Ingestor, ReconciliationEngine};

const SALES_REPORT: &str = "\
Relatório de Vendas - 05/03/2024
Recibo 00001201 MARIA DA SILVA 123.456.789-00 05/03/2024 PIX Pago R$ 150,00
Recibo 00001202 MERCADINHO BOM PRECO LTDA 12.345.678/0001-90 05/03/2024 \
Cartão de Crédito Pago R$ 1.280,40
Recibo 00001203 JOSE PEREIRA 987.654.321-00 05/03/2024 Dinheiro Pago R$ 62,00
Recibo 00001204 ANA COSTA 111.222.333-44 05/03/2024 Débito Pago R$ 89,90
Recibo 00001205 PADARIA CENTRAL 98.765.432/0001-10 05/03/2024 PIX CNPJ Pago R$ 410,00
";

fn statements() -> Vec<Box<dyn DocumentSource>> {
    vec![
        MemoryDocument::from_named(
            "movimentacoes_marco.csv",
            "Data;Histórico;Valor\n\
             05/03/2024;PIX RECEBIDO MARIA D SILVA;150,00\n\
             05/03/2024;TARIFA;-12,00\n",
        )
        .boxed(),
        MemoryDocument::from_named(
            "caixa_marco.csv",
            "Data;Descricao;Valor\n05/03/2024;DEPOSITO DINHEIRO;62,00\n",
        )
        .boxed(),
        MemoryDocument::from_named(
            "extrato_pagbank_marco.pdf",
            "Extrato PagBank\nData Descrição Valor\n\
             05/03/2024 Vendas - Cartão de Crédito R$ 1.280,40\n\
             05/03/2024 Vendas - Débito R$ 33,00\n",
        )
        .boxed(),
        MemoryDocument::from_named(
            "extrato_itau_marco.pdf",
            "Lançamentos\n05/03 REDE MAESTRO 89,90 1.089,90\n",
        )
        .boxed(),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(true).init();

    println!("🧾 Reconciliation Core - Daily Settlement Example\n");

    let ingestor = Ingestor::new();
    let report = MemoryDocument::from_named("relatorio_vendas.pdf", SALES_REPORT);
    let sales = ingestor.load_sales(&report).await?;
    let mut pools = ingestor.load_pools(&statements()).await?;

    let engine = ReconciliationEngine::new();

    println!("📋 Routing table:");
    for (method, banks) in engine.routing().entries() {
        let banks: Vec<&str> = banks.iter().map(|b| b.code()).collect();
        println!("  {method:<20} -> {}", banks.join(", "));
    }
    println!();

    let result = engine.reconcile(&sales, &mut pools);
    let summary = result.summary();

    if summary.is_fully_reconciled {
        println!("✅ All {} sales were reconciled.\n", summary.total_sales);
    } else {
        println!(
            "⚠️  {} of {} sales were reconciled.\n",
            summary.matched_count, summary.total_sales
        );
    }

    println!("💰 Matched sales:");
    for matched in result.matched_sales() {
        println!(
            "  {:<28} {:<20} R$ {:>10} {}",
            matched.sale.customer(),
            matched.sale.payment_method(),
            matched.sale.amount(),
            matched.bank_id.display_name()
        );
    }

    println!("\n❌ Sales without a credit:");
    for unmatched in result.unmatched_sales() {
        let searched: Vec<&str> = unmatched
            .searched_banks
            .iter()
            .map(|b| b.display_name())
            .collect();
        let searched = if searched.is_empty() {
            "N/A".to_string()
        } else {
            searched.join(" or ")
        };
        println!(
            "  {:<28} {:<20} R$ {:>10} searched: {}",
            unmatched.sale.customer(),
            unmatched.sale.payment_method(),
            unmatched.sale.amount(),
            searched
        );
    }

    println!("\n❓ Unidentified credits:");
    for credit in result.unidentified_credits() {
        println!(
            "  {:<16} {:<32} R$ {:>10}",
            credit.bank_id.display_name(),
            credit.description,
            credit.amount
        );
    }

    println!(
        "\nTotals: matched R$ {}, unmatched R$ {}, unidentified R$ {}",
        summary.matched_amount, summary.unmatched_amount, summary.unidentified_amount
    );

    Ok(())
}
