// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global du formulaire de conversion
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Recalcul réactif : chaque modification d'une entrée appelle recompute()
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Le rendu lit depuis App
// - Toutes les modifications passent par les méthodes de App
// - Garantit que le montant converti suit toujours les entrées
// ============================================================================

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::models::{ConversionRequest, RateTable};

/// Longueur maximale du champ montant
const MAX_AMOUNT_LEN: usize = 18;

// ============================================================================
// Enum : LoadState
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Trois états mutuellement exclusifs
// - Failed porte le message à afficher à la place du formulaire
// ============================================================================

/// État du chargement des taux
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Requête en cours : affiche "Loading rates..."
    Loading,

    /// Échec réseau ou parsing : affiche le message, jamais le formulaire
    Failed(String),

    /// Taux disponibles : affiche le formulaire
    Ready,
}

/// Champ du formulaire qui a le focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    From,
    To,
    Amount,
}

impl Field {
    /// Champ suivant (Tab) : From → To → Amount → From
    pub fn next(self) -> Self {
        match self {
            Field::From => Field::To,
            Field::To => Field::Amount,
            Field::Amount => Field::From,
        }
    }

    /// Champ précédent (Shift-Tab)
    pub fn previous(self) -> Self {
        match self {
            Field::From => Field::Amount,
            Field::To => Field::From,
            Field::Amount => Field::To,
        }
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Loading / Failed / Ready
    pub load_state: LoadState,

    /// Taux récupérés au démarrage (vide tant que non chargés)
    pub rates: RateTable,

    /// Codes proposés par les deux sélecteurs (triés)
    pub currencies: Vec<String>,

    /// Devise source sélectionnée
    pub from_currency: String,

    /// Devise cible sélectionnée
    pub to_currency: String,

    /// Texte brut du champ montant
    /// CONCEPT : on garde le texte (ex: "12.") pour l'affichage,
    /// la valeur numérique est dérivée avec amount()
    pub amount_input: String,

    /// Dernier montant converti, formaté avec 4 décimales
    /// - None : aucune conversion encore possible
    /// - Reste inchangé si un taux manque (pas de reset)
    pub converted_amount: Option<String>,

    /// Champ actif
    pub focus: Field,

    /// Two-step quit (voir request_quit)
    pub confirm_quit: bool,
}

impl App {
    /// Crée une App avec les valeurs par défaut (USD → EUR, montant 1)
    pub fn new() -> Self {
        Self::with_config(&AppConfig::default())
    }

    /// Crée une App avec les valeurs initiales de la configuration
    pub fn with_config(config: &AppConfig) -> Self {
        Self {
            running: true,
            load_state: LoadState::Loading,
            rates: RateTable::default(),
            currencies: Vec::new(),
            from_currency: config.from.clone(),
            to_currency: config.to.clone(),
            amount_input: config.amount.clone(),
            converted_amount: None,
            focus: Field::From,
            confirm_quit: false,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Demande la confirmation de quitter
    ///
    /// CONCEPT : Two-step quit pattern
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression de 'q' : quit réel
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Chargement des taux
    // ========================================================================

    /// Vérifie si les taux sont en cours de chargement
    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    /// Vérifie si le formulaire peut être affiché
    pub fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    /// Message d'erreur si le chargement a échoué
    pub fn error_message(&self) -> Option<&str> {
        match &self.load_state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Installe les taux récupérés et passe en état Ready
    ///
    /// Les devises initiales sont conservées même si elles sont absentes
    /// de la table (la conversion reste alors indisponible)
    pub fn apply_rates(&mut self, rates: RateTable) {
        self.currencies = rates.codes().map(str::to_string).collect();
        self.rates = rates;
        self.load_state = LoadState::Ready;

        for code in [&self.from_currency, &self.to_currency] {
            if !self.rates.contains(code) {
                warn!(currency = %code, "Initial currency not offered by the provider");
            }
        }

        info!(currencies = self.currencies.len(), "Exchange rates applied");
        self.recompute();
    }

    /// Enregistre l'échec du chargement
    pub fn fail_loading(&mut self, message: impl Into<String>) {
        self.load_state = LoadState::Failed(message.into());
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Montant numérique dérivé du champ (vide ou "." → 0)
    pub fn amount(&self) -> f64 {
        self.amount_input.parse().unwrap_or(0.0)
    }

    /// Demande de conversion correspondant aux entrées actuelles
    pub fn conversion_request(&self) -> ConversionRequest {
        ConversionRequest::new(self.amount(), &self.from_currency, &self.to_currency)
    }

    /// Recalcule le montant converti
    ///
    /// Appelé après chaque changement de montant, de devise ou de taux.
    /// Si un des deux taux est inconnu, la valeur précédente est conservée.
    pub fn recompute(&mut self) {
        match self.conversion_request().convert_formatted(&self.rates) {
            Some(converted) => {
                debug!(
                    amount = %self.amount_input,
                    from = %self.from_currency,
                    to = %self.to_currency,
                    converted = %converted,
                    "Conversion recomputed"
                );
                self.converted_amount = Some(converted);
            }
            None => {
                debug!(from = %self.from_currency, to = %self.to_currency, "Missing rate, keeping previous result");
            }
        }
    }

    /// Ligne de résultat : "{montant} {from} = {converti} {to}"
    pub fn result_line(&self) -> String {
        format!(
            "{} {} = {} {}",
            self.amount_input,
            self.from_currency,
            self.converted_amount.as_deref().unwrap_or("N/A"),
            self.to_currency
        )
    }

    // ========================================================================
    // Navigation dans le formulaire
    // ========================================================================

    /// Passe au champ suivant
    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// Passe au champ précédent
    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Sélectionne la devise suivante dans le sélecteur actif
    pub fn select_next(&mut self) {
        self.step_selection(true);
    }

    /// Sélectionne la devise précédente dans le sélecteur actif
    pub fn select_previous(&mut self) {
        self.step_selection(false);
    }

    /// Avance ou recule dans la liste des devises, avec bouclage
    ///
    /// CONCEPT RUST : Arithmétique modulaire
    /// - (i + 1) % len : après le dernier, revient au premier
    /// - (i + len - 1) % len : avant le premier, revient au dernier
    /// - Devise absente de la liste : repart du premier code
    fn step_selection(&mut self, forward: bool) {
        let len = self.currencies.len();
        if len == 0 {
            return;
        }

        let current = match self.focus {
            Field::From => &self.from_currency,
            Field::To => &self.to_currency,
            Field::Amount => return,
        };

        let index = match self.currencies.iter().position(|code| code == current) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };

        let code = self.currencies[index].clone();
        match self.focus {
            Field::From => self.set_from_currency(code),
            Field::To => self.set_to_currency(code),
            Field::Amount => {}
        }
    }

    /// Change la devise source et recalcule
    pub fn set_from_currency(&mut self, code: impl Into<String>) {
        self.from_currency = code.into();
        self.recompute();
    }

    /// Change la devise cible et recalcule
    pub fn set_to_currency(&mut self, code: impl Into<String>) {
        self.to_currency = code.into();
        self.recompute();
    }

    /// Position (1-based) de la devise dans la liste, pour l'affichage
    pub fn currency_position(&self, code: &str) -> Option<usize> {
        self.currencies.iter().position(|c| c == code).map(|i| i + 1)
    }

    // ========================================================================
    // Saisie du montant
    // ========================================================================

    /// Ajoute un caractère au montant
    ///
    /// Accepte les chiffres et un seul point décimal : un montant négatif
    /// ou non numérique ne peut pas être saisi.
    /// Retourne true si le caractère a été accepté.
    pub fn append_amount_char(&mut self, c: char) -> bool {
        let accepted = self.amount_input.len() < MAX_AMOUNT_LEN
            && (c.is_ascii_digit() || (c == '.' && !self.amount_input.contains('.')));

        if accepted {
            self.amount_input.push(c);
            self.recompute();
        }
        accepted
    }

    /// Supprime le dernier caractère du montant
    pub fn backspace_amount(&mut self) {
        if self.amount_input.pop().is_some() {
            self.recompute();
        }
    }

    /// Remplace le montant (texte brut, déjà validé)
    pub fn set_amount_input(&mut self, amount: impl Into<String>) {
        self.amount_input = amount.into();
        self.recompute();
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rates() -> RateTable {
        RateTable::from_rates("USD", [("USD", 1.0), ("EUR", 0.9), ("GBP", 0.8)])
    }

    fn ready_app() -> App {
        let mut app = App::new();
        app.apply_rates(sample_rates());
        app
    }

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert!(app.is_loading());
        assert_eq!(app.from_currency, "USD");
        assert_eq!(app.to_currency, "EUR");
        assert_eq!(app.amount_input, "1");
        assert!(app.converted_amount.is_none());
        assert_eq!(app.focus, Field::From);
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::new();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_apply_rates_computes_initial_conversion() {
        let app = ready_app();
        assert!(app.is_ready());
        assert_eq!(app.currencies, vec!["EUR", "GBP", "USD"]);
        assert_eq!(app.converted_amount.as_deref(), Some("0.9000"));
        assert_eq!(app.result_line(), "1 USD = 0.9000 EUR");
    }

    #[test]
    fn test_ten_usd_to_eur() {
        let mut app = ready_app();
        app.set_amount_input("10");
        assert_eq!(app.converted_amount.as_deref(), Some("9.0000"));
    }

    #[test]
    fn test_zero_amount() {
        let mut app = ready_app();
        app.set_amount_input("0");
        assert_eq!(app.converted_amount.as_deref(), Some("0.0000"));

        // Champ vide : compte pour 0
        app.set_amount_input("");
        assert_eq!(app.amount(), 0.0);
        assert_eq!(app.converted_amount.as_deref(), Some("0.0000"));
    }

    #[test]
    fn test_fail_loading() {
        let mut app = App::new();
        app.fail_loading("Failed to fetch exchange rates");
        assert!(!app.is_loading());
        assert!(!app.is_ready());
        assert_eq!(app.error_message(), Some("Failed to fetch exchange rates"));
    }

    #[test]
    fn test_missing_rate_keeps_previous_result() {
        let mut app = ready_app();
        assert_eq!(app.converted_amount.as_deref(), Some("0.9000"));

        app.set_to_currency("JPY");
        assert_eq!(app.converted_amount.as_deref(), Some("0.9000"));
        assert_eq!(app.result_line(), "1 USD = 0.9000 JPY");
    }

    #[test]
    fn test_unknown_initial_currency() {
        let config = AppConfig {
            from: "CHF".to_string(),
            ..AppConfig::default()
        };
        let mut app = App::with_config(&config);
        app.apply_rates(sample_rates());

        assert_eq!(app.from_currency, "CHF");
        assert!(app.converted_amount.is_none());
        assert_eq!(app.result_line(), "1 CHF = N/A EUR");

        // Le sélecteur repart du premier code
        app.select_next();
        assert_eq!(app.from_currency, "EUR");
        assert_eq!(app.converted_amount.as_deref(), Some("1.0000"));
    }

    #[test]
    fn test_selection_wraps_around() {
        let mut app = ready_app();
        assert_eq!(app.focus, Field::From);

        // USD est le dernier : suivant → EUR
        app.select_next();
        assert_eq!(app.from_currency, "EUR");
        app.select_previous();
        assert_eq!(app.from_currency, "USD");
        app.select_previous();
        assert_eq!(app.from_currency, "GBP");
    }

    #[test]
    fn test_selection_recomputes() {
        let mut app = ready_app();
        app.set_amount_input("10");

        app.focus_next();
        assert_eq!(app.focus, Field::To);
        app.select_next(); // EUR → GBP
        assert_eq!(app.to_currency, "GBP");
        assert_eq!(app.converted_amount.as_deref(), Some("8.0000"));

        app.focus_previous();
        app.select_previous(); // USD → GBP
        assert_eq!(app.from_currency, "GBP");
        assert_eq!(app.converted_amount.as_deref(), Some("10.0000"));
    }

    #[test]
    fn test_selection_ignored_on_amount_field() {
        let mut app = ready_app();
        app.focus = Field::Amount;
        app.select_next();
        assert_eq!(app.from_currency, "USD");
        assert_eq!(app.to_currency, "EUR");
    }

    #[test]
    fn test_selection_without_currencies() {
        let mut app = App::new();
        app.apply_rates(RateTable::from_rates("USD", Vec::<(String, f64)>::new()));
        app.select_next();
        assert_eq!(app.from_currency, "USD");
        assert!(app.converted_amount.is_none());
    }

    #[test]
    fn test_focus_cycle() {
        let mut app = App::new();
        app.focus_next();
        app.focus_next();
        assert_eq!(app.focus, Field::Amount);
        app.focus_next();
        assert_eq!(app.focus, Field::From);
        app.focus_previous();
        assert_eq!(app.focus, Field::Amount);
    }

    #[test]
    fn test_amount_input() {
        let mut app = ready_app();
        app.set_amount_input("");

        assert!(app.append_amount_char('1'));
        assert!(app.append_amount_char('2'));
        assert!(app.append_amount_char('.'));
        assert!(!app.append_amount_char('.'));
        assert!(!app.append_amount_char('-'));
        assert!(!app.append_amount_char('e'));
        assert!(app.append_amount_char('5'));
        assert_eq!(app.amount_input, "12.5");
        assert_eq!(app.converted_amount.as_deref(), Some("11.2500"));

        app.backspace_amount();
        assert_eq!(app.amount_input, "12.");
        assert_eq!(app.amount(), 12.0);
        assert_eq!(app.converted_amount.as_deref(), Some("10.8000"));
    }

    #[test]
    fn test_amount_max_length() {
        let mut app = App::new();
        app.set_amount_input("");
        for _ in 0..MAX_AMOUNT_LEN {
            assert!(app.append_amount_char('9'));
        }
        assert!(!app.append_amount_char('9'));
        assert_eq!(app.amount_input.len(), MAX_AMOUNT_LEN);
    }

    #[test]
    fn test_currency_position() {
        let app = ready_app();
        assert_eq!(app.currency_position("EUR"), Some(1));
        assert_eq!(app.currency_position("USD"), Some(3));
        assert_eq!(app.currency_position("JPY"), None);
    }
}
