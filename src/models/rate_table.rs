// ============================================================================
// Structure : RateTable
// ============================================================================
// Table des taux de change, tous exprimés par rapport à une devise de base
// (USD pour l'API exchangerate-api)
//
// CONCEPTS RUST :
// 1. BTreeMap : map triée par clé (les codes sortent dans l'ordre alphabétique)
// 2. Option<DateTime<Utc>> : date de mise à jour facultative
// 3. Immutabilité : la table est construite une fois puis seulement lue
// ============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Taux de change relatifs à une devise de base
///
/// Invariant : le taux de la devise de base vaut 1
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateTable {
    /// Devise de base (ex: "USD")
    pub base: String,

    /// Date de dernière mise à jour annoncée par le fournisseur
    pub updated_at: Option<DateTime<Utc>>,

    /// Code devise -> taux
    /// CONCEPT RUST : BTreeMap vs HashMap
    /// - BTreeMap garde les clés triées
    /// - Les sélecteurs du formulaire affichent donc les codes dans l'ordre
    rates: BTreeMap<String, f64>,
}

impl RateTable {
    /// Crée une table à partir de paires (code, taux)
    ///
    /// CONCEPT RUST : IntoIterator générique
    /// - Accepte Vec, HashMap, tableaux, etc.
    pub fn from_rates<I, K>(base: impl Into<String>, rates: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            base: base.into(),
            updated_at: None,
            rates: rates.into_iter().map(|(code, rate)| (code.into(), rate)).collect(),
        }
    }

    /// Définit la date de mise à jour (builder)
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Retourne le taux d'une devise (None si inconnue)
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Vérifie si une devise est présente
    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Itère sur les codes devises, triés
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    /// Nombre de devises
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Vérifie si la table est vide
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rate_lookup() {
        let table = RateTable::from_rates("USD", [("USD", 1.0), ("EUR", 0.9)]);

        assert_eq!(table.rate("USD"), Some(1.0));
        assert_eq!(table.rate("EUR"), Some(0.9));
        assert_eq!(table.rate("GBP"), None);
        assert!(table.contains("EUR"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_codes_are_sorted() {
        let table = RateTable::from_rates(
            "USD",
            [("USD", 1.0), ("EUR", 0.9), ("AUD", 1.5), ("JPY", 150.0)],
        );

        let codes: Vec<&str> = table.codes().collect();
        assert_eq!(codes, vec!["AUD", "EUR", "JPY", "USD"]);
    }

    #[test]
    fn test_empty_table() {
        let table = RateTable::from_rates("USD", Vec::<(String, f64)>::new());
        assert!(table.is_empty());
        assert_eq!(table.codes().count(), 0);
        assert!(table.updated_at.is_none());
    }

    #[test]
    fn test_duplicate_code_keeps_last_rate() {
        let table = RateTable::from_rates("USD", [("EUR", 0.9), ("EUR", 0.95)]);
        assert_eq!(table.rate("EUR"), Some(0.95));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_with_updated_at() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 1).unwrap();
        let table = RateTable::from_rates("USD", [("USD", 1.0)]).with_updated_at(ts);
        assert_eq!(table.updated_at, Some(ts));
    }
}
