// ============================================================================
// API Client : taux de change (exchangerate-api.com)
// ============================================================================
// Récupère un instantané des taux de change, relatifs à une devise de base
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Result<T, E> : gestion d'erreurs avec contexte
// 3. Serde : désérialisation JSON automatique
// ============================================================================

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::models::RateTable;

/// URL par défaut : taux relatifs à l'USD
pub const DEFAULT_API_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

/// Devise de base supposée si la réponse ne l'indique pas
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

// ============================================================================
// Structure pour parser la réponse JSON
// ============================================================================
// Exemple de réponse :
// {
//   "base": "USD",
//   "date": "2024-05-01",
//   "time_last_updated": 1714521601,
//   "rates": { "USD": 1, "EUR": 0.934, ... }
// }
//
// Seul "rates" est obligatoire, le reste est décoratif.
// Les valeurs de "rates" sont lues en serde_json::Value : une entrée null ou
// non numérique est ignorée au lieu de faire échouer tout le document
// ============================================================================

/// Réponse de l'API des taux de change
#[derive(Debug, Deserialize)]
struct RatesResponse {
    base: Option<String>,
    time_last_updated: Option<i64>,
    rates: HashMap<String, serde_json::Value>,
}

// ============================================================================
// Fonctions publiques de l'API
// ============================================================================

/// Récupère la table des taux depuis l'URL donnée
///
/// Une seule requête GET, sans retry ni timeout.
///
/// # Erreurs
/// * statut HTTP hors 2xx : "Failed to fetch exchange rates (HTTP ...)"
/// * erreur réseau ou JSON invalide : erreur avec contexte
///
/// # Exemple
/// let rates = fetch_rates(DEFAULT_API_URL).await?;
/// println!("{} devises", rates.len());
#[instrument]
pub async fn fetch_rates(url: &str) -> Result<RateTable> {
    debug!("Creating HTTP client");
    let client = reqwest::Client::builder()
        .user_agent(concat!("lazyfx/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Échec de la création du client HTTP")?;

    debug!("Sending HTTP request to exchange rate provider");
    let response = client
        .get(url)
        .send()
        .await
        .context("Failed to fetch exchange rates")?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    // Vérifie que la réponse est un succès HTTP (200-299)
    if !status.is_success() {
        error!(status = %status, "Exchange rate provider returned error status");
        anyhow::bail!("Failed to fetch exchange rates (HTTP {})", status);
    }

    let text = response
        .text()
        .await
        .context("Failed to fetch exchange rates")?;

    // CONCEPT RUST : Serde deserialization
    // - serde_json::from_str désérialise le texte vers RatesResponse
    // - Vérifie que la structure JSON contient bien "rates"
    debug!(bytes = text.len(), "Parsing JSON response");
    let body: RatesResponse = serde_json::from_str(&text)
        .map_err(|e| {
            warn!(bytes = text.len(), error = %e, "Invalid rates document");
            e
        })
        .context("Échec du parsing JSON de la réponse des taux")?;

    let table = into_rate_table(body);
    info!(currencies = table.len(), base = %table.base, "Successfully fetched exchange rates");
    Ok(table)
}

/// Convertit la réponse brute en RateTable
///
/// CONCEPT RUST : Ownership
/// - body est "moved" : on récupère ses Strings sans copie
fn into_rate_table(body: RatesResponse) -> RateTable {
    let base = body
        .base
        .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string());

    if body.rates.is_empty() {
        warn!("Provider returned an empty rate table");
    } else if body
        .rates
        .get(&base)
        .and_then(serde_json::Value::as_f64)
        .is_some_and(|rate| rate != 1.0)
    {
        warn!(base = %base, "Base currency rate is not 1");
    }

    // CONCEPT RUST : filter_map
    // - Garde les valeurs numériques, écarte les autres en les loggant
    let rates: Vec<(String, f64)> = body
        .rates
        .into_iter()
        .filter_map(|(code, value)| match value.as_f64() {
            Some(rate) => Some((code, rate)),
            None => {
                warn!(currency = %code, value = %value, "Skipping non-numeric rate");
                None
            }
        })
        .collect();

    let mut table = RateTable::from_rates(base, rates);

    // Timestamp Unix -> DateTime<Utc> (ignoré s'il est hors limites)
    if let Some(updated_at) = body.time_last_updated.and_then(|ts| DateTime::from_timestamp(ts, 0)) {
        table = table.with_updated_at(updated_at);
    }

    table
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/USD"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn rates_url(server: &MockServer) -> String {
        format!("{}/v4/latest/USD", server.uri())
    }

    #[tokio::test]
    async fn test_fetch_rates_success() {
        let body = r#"{
            "provider": "https://www.exchangerate-api.com",
            "base": "USD",
            "date": "2024-05-01",
            "time_last_updated": 1714521601,
            "rates": { "USD": 1, "EUR": 0.9, "JPY": 157.5 }
        }"#;
        let server = create_mock_server(200, body).await;

        let table = fetch_rates(&rates_url(&server)).await.expect("fetch should succeed");

        assert_eq!(table.base, "USD");
        assert_eq!(table.rate("USD"), Some(1.0));
        assert_eq!(table.rate("EUR"), Some(0.9));
        assert_eq!(table.codes().collect::<Vec<_>>(), vec!["EUR", "JPY", "USD"]);
        assert_eq!(
            table.updated_at.map(|d| d.timestamp()),
            Some(1714521601)
        );
    }

    #[tokio::test]
    async fn test_fetch_rates_only_rates_field() {
        let server = create_mock_server(200, r#"{ "rates": { "USD": 1, "EUR": 0.9 } }"#).await;

        let table = fetch_rates(&rates_url(&server)).await.expect("fetch should succeed");

        assert_eq!(table.base, "USD");
        assert!(table.updated_at.is_none());
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_rates_empty_rates() {
        let server = create_mock_server(200, r#"{ "base": "USD", "rates": {} }"#).await;

        let table = fetch_rates(&rates_url(&server)).await.expect("fetch should succeed");
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rates_skips_non_numeric_rates() {
        let body = r#"{
            "base": "USD",
            "rates": { "USD": 1, "EUR": 0.9, "XAU": null, "BAD": "n/a", "OBJ": {} }
        }"#;
        let server = create_mock_server(200, body).await;

        let table = fetch_rates(&rates_url(&server)).await.expect("fetch should succeed");

        assert_eq!(table.codes().collect::<Vec<_>>(), vec!["EUR", "USD"]);
        assert_eq!(table.rate("EUR"), Some(0.9));
        assert!(!table.contains("XAU"));
        assert!(!table.contains("BAD"));
    }

    #[tokio::test]
    async fn test_fetch_rates_http_error() {
        let server = create_mock_server(500, "internal error").await;

        let err = fetch_rates(&rates_url(&server)).await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to fetch exchange rates"), "{message}");
        assert!(message.contains("500"), "{message}");
    }

    #[tokio::test]
    async fn test_fetch_rates_not_found() {
        let server = MockServer::start().await;

        // Aucun mock monté : wiremock répond 404
        let err = fetch_rates(&rates_url(&server)).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_rates_invalid_json() {
        let server = create_mock_server(200, r#"{ "result": "error" }"#).await;

        let result = fetch_rates(&rates_url(&server)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_rates_transport_error() {
        // Port fermé : la connexion échoue avant toute réponse HTTP
        let err = fetch_rates("http://127.0.0.1:1/v4/latest/USD").await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to fetch exchange rates"));
    }

    #[test]
    fn test_into_rate_table_defaults_base() {
        let body = RatesResponse {
            base: None,
            time_last_updated: None,
            rates: HashMap::from([("EUR".to_string(), serde_json::json!(0.9))]),
        };

        let table = into_rate_table(body);
        assert_eq!(table.base, DEFAULT_BASE_CURRENCY);
        assert_eq!(table.rate("EUR"), Some(0.9));
    }
}
