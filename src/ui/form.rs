// ============================================================================
// Form - Rendu du formulaire de conversion
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// Trois rendus mutuellement exclusifs, selon app.load_state :
// - Loading : texte d'attente
// - Failed : message d'erreur (le formulaire n'est jamais dessiné)
// - Ready : sélecteurs From / To, champ montant, ligne de résultat
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Field, LoadState};

/// Texte affiché pendant le chargement des taux
pub const LOADING_TEXT: &str = "Loading rates...";

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le compilateur garantit l'exhaustivité (tous les états gérés)
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);

    match &app.load_state {
        LoadState::Loading => render_message(
            frame,
            chunks[1],
            LOADING_TEXT,
            Style::default().fg(Color::Gray),
        ),
        LoadState::Failed(message) => render_message(
            frame,
            chunks[1],
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        LoadState::Ready => render_form(frame, app, chunks[1]),
    }

    render_footer(frame, app, chunks[2]);
}

/// Crée le layout principal (header, content, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header : 3 lignes
            Constraint::Min(0),     // Content : tout le reste
            Constraint::Length(3),  // Footer : 3 lignes
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header
// ============================================================================

/// Dessine le header : titre, devise de base et date des taux
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" LazyFX ")
        .title_alignment(Alignment::Center);

    let mut spans = vec![Span::styled(
        "Currency Converter",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )];

    if app.is_ready() {
        let mut info = format!("  base {}", app.rates.base);
        if let Some(updated_at) = app.rates.updated_at {
            info.push_str(&format!(", rates of {}", updated_at.format("%Y-%m-%d")));
        }
        spans.push(Span::styled(info, Style::default().fg(Color::Gray)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Loading / Failed
// ============================================================================

/// Dessine un message centré à la place du formulaire
///
/// Le message est replié sur plusieurs lignes : une chaîne d'erreur {:#}
/// dépasse souvent la largeur du terminal
fn render_message(frame: &mut Frame, area: Rect, message: &str, style: Style) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), style)),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Ready : formulaire
// ============================================================================

/// Dessine le formulaire : sélecteurs, montant, résultat
fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // From / To
            Constraint::Length(3), // Amount
            Constraint::Length(3), // Résultat
            Constraint::Min(0),
        ])
        .split(area);

    let selectors = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    render_selector(frame, app, Field::From, selectors[0]);
    render_selector(frame, app, Field::To, selectors[1]);
    render_amount(frame, app, rows[1]);
    render_result(frame, app, rows[2]);
}

/// Bordure jaune pour le champ actif, cyan sinon
fn field_block(title: &'static str, focused: bool) -> Block<'static> {
    let color = if focused { Color::Yellow } else { Color::Cyan };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

/// Dessine un sélecteur de devise : "< EUR >  (12/160)"
fn render_selector(frame: &mut Frame, app: &App, field: Field, area: Rect) {
    let (title, code) = match field {
        Field::From => (" From ", app.from_currency.as_str()),
        _ => (" To ", app.to_currency.as_str()),
    };
    let focused = app.focus == field;

    let position = app
        .currency_position(code)
        .map(|p| format!("  ({}/{})", p, app.currencies.len()))
        .unwrap_or_else(|| "  (unavailable)".to_string());

    let arrow_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let line = Line::from(vec![
        Span::styled("< ", arrow_style),
        Span::styled(
            code.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" >", arrow_style),
        Span::styled(position, Style::default().fg(Color::Gray)),
    ]);

    let paragraph = Paragraph::new(line)
        .block(field_block(title, focused))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Dessine le champ montant, avec curseur s'il est actif
fn render_amount(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Field::Amount;

    let mut spans = vec![Span::styled(
        app.amount_input.clone(),
        Style::default().fg(Color::White),
    )];
    if focused {
        spans.push(Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(field_block(" Amount ", focused))
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

/// Dessine la ligne de résultat
fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let paragraph = Paragraph::new(Line::from(Span::styled(
        app.result_line(),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )))
    .block(block)
    .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

/// Dessine le footer avec les raccourcis clavier
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if app.is_ready() {
        Line::from(vec![
            Span::styled("[q]", key_style),
            Span::raw(" Quit  "),
            Span::styled("[Tab]", key_style),
            Span::raw(" Field  "),
            Span::styled("[↑↓ / j k]", key_style),
            Span::raw(" Currency  "),
            Span::styled("[0-9 .]", key_style),
            Span::raw(" Amount"),
        ])
    } else {
        Line::from(vec![Span::styled("[q]", key_style), Span::raw(" Quit")])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RateTable;
    use ratatui::{backend::TestBackend, Terminal};

    /// Dessine l'app dans un terminal de test et retourne le texte affiché
    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn ready_app() -> App {
        let mut app = App::new();
        app.apply_rates(RateTable::from_rates("USD", [("USD", 1.0), ("EUR", 0.9)]));
        app
    }

    #[test]
    fn test_render_loading() {
        let screen = draw(&App::new());
        assert!(screen.contains(LOADING_TEXT));
        assert!(!screen.contains("Amount"));
    }

    #[test]
    fn test_render_error_never_shows_form() {
        let mut app = App::new();
        app.fail_loading("Failed to fetch exchange rates (HTTP 503)");

        let screen = draw(&app);
        assert!(screen.contains("Failed to fetch exchange rates (HTTP 503)"));
        assert!(!screen.contains("From"));
        assert!(!screen.contains("Amount"));
        assert!(!screen.contains(LOADING_TEXT));
    }

    #[test]
    fn test_render_long_error_is_wrapped() {
        let message = "Failed to fetch exchange rates: error sending request for url \
                       (http://127.0.0.1:1/v4/latest/USD): error trying to connect: \
                       tcp connect error: Connection refused";
        assert!(message.len() > 80);

        let mut app = App::new();
        app.fail_loading(message);

        let screen = draw(&app);
        assert!(screen.contains("Failed to fetch exchange rates"));
        assert!(screen.contains("Connection refused"));
    }

    #[test]
    fn test_render_ready_form() {
        let mut app = ready_app();
        app.set_amount_input("10");

        let screen = draw(&app);
        assert!(screen.contains("From"));
        assert!(screen.contains("To"));
        assert!(screen.contains("Amount"));
        assert!(screen.contains("10 USD = 9.0000 EUR"));
        assert!(screen.contains("base USD"));
        assert!(!screen.contains(LOADING_TEXT));
    }

    #[test]
    fn test_render_unavailable_currency() {
        let mut app = ready_app();
        app.set_to_currency("JPY");

        let screen = draw(&app);
        assert!(screen.contains("(unavailable)"));
    }

    #[test]
    fn test_render_quit_confirmation() {
        let mut app = ready_app();
        app.request_quit();

        let screen = draw(&app);
        assert!(screen.contains("[q]"));
        assert!(screen.contains("quitter"));
    }
}
