// ============================================================================
// LazyFX - Convertisseur de devises dans le terminal
// ============================================================================
// Programme TUI : récupère les taux de change au démarrage puis convertit
// en direct un montant entre deux devises choisies
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Worker thread : l'appel API tourne hors du thread UI
// 4. Channels : le worker renvoie le résultat via mpsc
// ============================================================================

use std::io;
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use lazyfx::api::fetch_rates;
use lazyfx::app::{App, Field};
use lazyfx::config::{AppConfig, Cli};
use lazyfx::models::RateTable;
use lazyfx::ui::{events::EventHandler, render, Event};

// ============================================================================
// AppResult : résultat renvoyé par le worker
// ============================================================================

/// Résultat du chargement des taux, envoyé par le worker au thread UI
#[derive(Debug)]
enum AppResult {
    /// Taux récupérés avec succès
    RatesLoaded(RateTable),

    /// Échec réseau ou parsing, message prêt à afficher
    LoadError(String),
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans AppConfig::log_dir(), par exemple
/// ~/.local/share/lazyfx/logs/lazyfx.log sous Linux.
///
/// # Utilisation
/// ```bash
/// # Contrôler le niveau de log
/// RUST_LOG=debug lazyfx
/// RUST_LOG=lazyfx=trace lazyfx
/// ```
fn init_logging(config: &AppConfig) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = AppConfig::log_dir();

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazyfx.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // Worker et UI tournent sur deux threads
                .with_line_number(true),
        )
        .with(
            // RUST_LOG a priorité, sinon filtre selon --verbose
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = AppConfig::from(Cli::parse());

    // Logging avant tout le reste ; en cas d'échec on continue sans logs
    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(api_url = %config.api_url, from = %config.from, to = %config.to, "LazyFX starting up");

    // Le fetch démarre tout de suite : l'écran "Loading rates..." s'affiche
    // pendant que la requête est en vol
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();
    spawn_rate_fetcher(config.api_url.clone(), result_tx);

    let mut app = App::with_config(&config);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    let restored = restore_terminal(&mut terminal);

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    exit_result(result, restored)
}

/// Combine le résultat de la boucle et celui de la restauration du terminal
///
/// L'erreur de la boucle a priorité : un échec de restauration est loggé
/// et ne la masque jamais
fn exit_result(result: Result<()>, restored: Result<()>) -> Result<()> {
    match (result, restored) {
        (Err(e), Err(restore_error)) => {
            error!(error = ?restore_error, "Failed to restore terminal");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), restored) => restored,
    }
}

// ============================================================================
// Worker : chargement des taux
// ============================================================================
// CONCEPT RUST : Thread + async runtime
// - std::thread::spawn() : crée un thread OS
// - tokio::runtime::Runtime : runtime async dans ce thread
// - Une seule requête par exécution : pas de retry, pas d'annulation
// ============================================================================

/// Lance le chargement des taux en arrière-plan
///
/// # Arguments
/// * `url` - URL de l'API des taux
/// * `result_tx` - Sender pour renvoyer le résultat au thread UI
fn spawn_rate_fetcher(url: String, result_tx: mpsc::Sender<AppResult>) {
    std::thread::spawn(move || {
        info!(url = %url, "Worker fetching exchange rates");

        let result = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime.block_on(fetch_rates(&url)),
            Err(e) => Err(anyhow::Error::new(e).context("Échec de la création du runtime tokio")),
        };

        let message = match result {
            Ok(rates) => AppResult::RatesLoaded(rates),
            Err(e) => {
                error!(error = ?e, "Failed to fetch exchange rates");
                // {:#} : affiche toute la chaîne de contexte sur une ligne
                AppResult::LoadError(format!("{:#}", e))
            }
        };

        if result_tx.send(message).is_err() {
            debug!("UI closed before the rates arrived");
        }
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Lire le résultat du worker (non bloquant)
//   1. Dessiner l'interface (render)
//   2. Traiter les événements (input)
// ============================================================================

/// Exécute la boucle principale de l'application
///
/// Le thread UI est le seul propriétaire de App : pas de Mutex,
/// le worker ne communique que par le channel
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // ========================================
        // 0. RÉSULTATS : Traite le résultat du worker
        // ========================================
        match result_rx.try_recv() {
            Ok(result) => apply_result(app, result),
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                // Normal une fois le résultat reçu ; anormal si on attend encore
                if app.is_loading() {
                    error!("Rate fetch worker stopped without a result");
                    app.fail_loading("Failed to fetch exchange rates");
                }
            }
        }

        // ========================================
        // 1. RENDER : Dessine l'interface
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 2. INPUT : Traite les événements
        // ========================================
        match events.next() {
            Ok(event) => handle_event(app, event),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

/// Applique le résultat du worker à l'état de l'application
fn apply_result(app: &mut App, result: AppResult) {
    match result {
        AppResult::RatesLoaded(rates) => {
            info!(currencies = rates.len(), "Exchange rates loaded");
            app.apply_rates(rates);
        }
        AppResult::LoadError(message) => {
            error!(error = %message, "Showing rate loading error");
            app.fail_loading(message);
        }
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Le formulaire ne réagit qu'en état Ready
/// - Aucune de ces actions ne relance d'appel réseau : seul recompute()
///   est appelé
fn handle_event(app: &mut App, event: Event) {
    use lazyfx::ui::events::{
        get_char_from_event, is_amount_char_event, is_backspace_event, is_down_event,
        is_interrupt_event, is_next_field_event, is_previous_field_event, is_quit_event,
        is_up_event,
    };

    match event {
        Event::Key(_) if is_interrupt_event(&event) => {
            info!("User interrupted");
            app.quit();
        }

        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // Loading / Failed : seul quit est actif
        Event::Key(_) if !app.is_ready() => {
            app.cancel_quit();
        }

        Event::Key(_) if is_next_field_event(&event) => {
            app.cancel_quit();
            app.focus_next();
            debug!(focus = ?app.focus, "User moved to next field");
        }
        Event::Key(_) if is_previous_field_event(&event) => {
            app.cancel_quit();
            app.focus_previous();
            debug!(focus = ?app.focus, "User moved to previous field");
        }

        // Sélecteurs : ↑ devise précédente, ↓ devise suivante
        Event::Key(_) if is_up_event(&event) && app.focus != Field::Amount => {
            app.cancel_quit();
            app.select_previous();
            info!(from = %app.from_currency, to = %app.to_currency, "User changed currency");
        }
        Event::Key(_) if is_down_event(&event) && app.focus != Field::Amount => {
            app.cancel_quit();
            app.select_next();
            info!(from = %app.from_currency, to = %app.to_currency, "User changed currency");
        }

        // Champ montant
        Event::Key(_) if is_amount_char_event(&event) && app.focus == Field::Amount => {
            app.cancel_quit();
            if let Some(c) = get_char_from_event(&event) {
                if !app.append_amount_char(c) {
                    debug!(char = %c, "Amount character rejected");
                }
            }
        }
        Event::Key(_) if is_backspace_event(&event) && app.focus == Field::Amount => {
            app.cancel_quit();
            app.backspace_amount();
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation de quit
            app.cancel_quit();
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
///
/// Si l'écran alternatif ou le terminal ratatui échoue, le raw mode est
/// désactivé avant de propager l'erreur
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;
    open_terminal().map_err(leave_raw_mode)
}

/// Ouvre l'écran alternatif et crée le terminal ratatui
fn open_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Échec de l'ouverture de l'écran alternatif")?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Échec de la création du terminal")
}

/// Désactive le raw mode après un échec de setup et retourne l'erreur d'origine
fn leave_raw_mode(error: anyhow::Error) -> anyhow::Error {
    if let Err(e) = disable_raw_mode() {
        warn!(error = ?e, "Failed to disable raw mode after setup error");
    }
    error
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
