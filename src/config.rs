// ============================================================================
// Configuration de l'application
// ============================================================================
// Arguments de ligne de commande (clap) et valeurs par défaut du formulaire
//
// CONCEPTS RUST :
// 1. #[derive(Parser)] : clap génère le parsing à partir de la struct
// 2. value_parser : validation des arguments au moment du parsing
// 3. From<Cli> : conversion vers la configuration de l'application
// ============================================================================

use std::path::PathBuf;

use clap::Parser;

use crate::api::DEFAULT_API_URL;

/// Devise source affichée au démarrage
pub const DEFAULT_FROM_CURRENCY: &str = "USD";

/// Devise cible affichée au démarrage
pub const DEFAULT_TO_CURRENCY: &str = "EUR";

/// Montant affiché au démarrage
pub const DEFAULT_AMOUNT: &str = "1";

/// Convertisseur de devises dans le terminal
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// URL de l'API des taux de change (réponse JSON avec un objet "rates")
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Devise source initiale
    #[arg(long, default_value = DEFAULT_FROM_CURRENCY, value_parser = parse_currency_code)]
    pub from: String,

    /// Devise cible initiale
    #[arg(long, default_value = DEFAULT_TO_CURRENCY, value_parser = parse_currency_code)]
    pub to: String,

    /// Montant initial (nombre positif ou nul)
    #[arg(long, default_value = DEFAULT_AMOUNT, value_parser = parse_amount)]
    pub amount: String,

    /// Active les logs de debug
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration résolue de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            from: DEFAULT_FROM_CURRENCY.to_string(),
            to: DEFAULT_TO_CURRENCY.to_string(),
            amount: DEFAULT_AMOUNT.to_string(),
            verbose: false,
        }
    }
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        Self {
            api_url: cli.api_url,
            from: cli.from,
            to: cli.to,
            amount: cli.amount,
            verbose: cli.verbose,
        }
    }
}

impl AppConfig {
    /// Répertoire des logs
    ///
    /// - Linux/WSL : ~/.local/share/lazyfx/logs
    /// - macOS : ~/Library/Application Support/lazyfx/logs
    /// - Windows : C:\Users\<user>\AppData\Local\lazyfx\logs
    /// - Repli : ./logs
    pub fn log_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("lazyfx").join("logs"))
            .unwrap_or_else(|| PathBuf::from("./logs"))
    }

    /// Filtre de logs par défaut (remplacé par RUST_LOG s'il est défini)
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "lazyfx=debug,info"
        } else {
            "lazyfx=info,warn"
        }
    }
}

/// Valide un code devise : 3 lettres ASCII, mis en majuscules
fn parse_currency_code(value: &str) -> Result<String, String> {
    let code = value.trim().to_ascii_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(format!("code devise invalide : '{}' (3 lettres attendues)", value))
    }
}

/// Valide un montant : nombre décimal positif ou nul, sans signe ni exposant
///
/// Le texte est conservé tel quel, c'est lui qui est affiché dans le champ
fn parse_amount(value: &str) -> Result<String, String> {
    let amount = value.trim();
    let well_formed = !amount.is_empty()
        && amount.chars().all(|c| c.is_ascii_digit() || c == '.')
        && amount.matches('.').count() <= 1
        && amount != ".";
    if well_formed {
        Ok(amount.to_string())
    } else {
        Err(format!("montant invalide : '{}'", value))
    }
}

// ============================================================================
// Tests
// ============================================================================
