// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events; // Gestion des événements clavier
pub mod form;   // Rendu du formulaire de conversion

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use form::render;
