// ============================================================================
// LazyFX - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // API des taux de change
pub mod models;    // Structures de données
pub mod config;    // Arguments de ligne de commande
pub mod app;       // État du formulaire
pub mod ui;        // Interface utilisateur
