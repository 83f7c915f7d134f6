// ============================================================================
// Conversion de devises
// ============================================================================
// Calcule montant × (taux[to] / taux[from]) à partir d'une RateTable
//
// CONCEPTS RUST :
// 1. Option chaining avec ? : retourne None dès qu'un taux manque
// 2. Formatage avec précision : {:.4}
// ============================================================================

use crate::models::RateTable;

/// Nombre de décimales affichées pour le montant converti
pub const CONVERTED_DECIMALS: usize = 4;

/// Demande de conversion (valeur dérivée, jamais persistée)
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    /// Montant à convertir (>= 0)
    pub amount: f64,

    /// Devise source (ex: "USD")
    pub from: String,

    /// Devise cible (ex: "EUR")
    pub to: String,
}

impl ConversionRequest {
    pub fn new(amount: f64, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            amount,
            from: from.into(),
            to: to.into(),
        }
    }

    /// Convertit le montant avec les taux de la table
    ///
    /// Retourne None si l'un des deux taux est absent ou n'est pas un
    /// nombre fini strictement positif (un taux nul est traité comme inconnu)
    pub fn convert(&self, rates: &RateTable) -> Option<f64> {
        let from_rate = usable_rate(rates, &self.from)?;
        let to_rate = usable_rate(rates, &self.to)?;
        Some(self.amount * (to_rate / from_rate))
    }

    /// Convertit et formate le résultat (4 décimales)
    pub fn convert_formatted(&self, rates: &RateTable) -> Option<String> {
        self.convert(rates).map(format_converted)
    }
}

fn usable_rate(rates: &RateTable, code: &str) -> Option<f64> {
    rates
        .rate(code)
        .filter(|rate| rate.is_finite() && *rate > 0.0)
}

/// Formate un montant converti avec exactement 4 décimales
///
/// Exemple : 9.0 -> "9.0000"
pub fn format_converted(value: f64) -> String {
    format!("{:.*}", CONVERTED_DECIMALS, value)
}

// ============================================================================
// Tests
// ============================================================================
