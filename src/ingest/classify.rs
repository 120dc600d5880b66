//! Attribution of statement sources to banks

use std::path::Path;

use crate::traits::SourceClassifier;
use crate::types::*;

/// Classifies a statement by substrings of its file name.
///
/// A weak heuristic; swap in another [`SourceClassifier`] (or a closure)
/// when sources are tagged explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameClassifier;

impl SourceClassifier for FilenameClassifier {
    fn classify(&self, name: &str, _media_type: MediaType) -> BankId {
        let file_name = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name)
            .to_lowercase();

        if file_name.contains("pagbank") {
            BankId::Pagbank
        } else if file_name.contains("movimentacoes") || file_name.starts_with("bb") {
            BankId::Bb
        } else if file_name.contains("itau") || file_name.contains("itaú") {
            BankId::Itau
        } else if file_name.contains("caixa") {
            BankId::Caixa
        } else if file_name.contains("santander") {
            BankId::Santander
        } else {
            BankId::Unknown
        }
    }
}

impl<F> SourceClassifier for F
where
    F: Fn(&str, MediaType) -> BankId + Send + Sync,
{
    fn classify(&self, name: &str, media_type: MediaType) -> BankId {
        self(name, media_type)
    }
}
