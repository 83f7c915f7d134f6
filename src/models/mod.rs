// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod rate_table; // Table des taux de change (fichier rate_table.rs)
pub mod conversion; // Calcul de conversion (fichier conversion.rs)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazyfx::models::rate_table::RateTable;
// On peut faire : use lazyfx::models::RateTable;
pub use rate_table::RateTable;
pub use conversion::{format_converted, ConversionRequest, CONVERTED_DECIMALS};
