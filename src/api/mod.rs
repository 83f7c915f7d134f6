// ============================================================================
// Module : api
// ============================================================================
// Ce module contient le client API qui récupère les taux de change
// depuis exchangerate-api.com
// ============================================================================

pub mod exchange_rate;  // Client API des taux de change

// Re-export des fonctions principales
pub use exchange_rate::{fetch_rates, DEFAULT_API_URL};
