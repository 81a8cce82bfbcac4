use crate::TOKEN_VAR;
use closing_common::api::{self, ErrorBody};
use closing_common::cli::constants::*;
use closing_common::cli::helpers::*;
use closing_common::report::{ItemOutcome, Outcome, SettlementReport};
use closing_common::types::Transaction;
use closing_common::validation::is_valid_token;
use reqwest::{Client, RequestBuilder, Response, Url};
use std::error::Error;
use std::io::ErrorKind;

/// The two services the CLI talks to, and the caller's token.
struct Session {
    client: Client,
    ledger_url: Url,
    settlement_url: Url,
    token: Option<String>,
}

impl Session {
    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

pub async fn main_loop(
    ledger_url: Url,
    settlement_url: Url,
    token: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let session = Session {
        client: Client::new(),
        ledger_url,
        settlement_url,
        token,
    };

    loop {
        let line = match read_from_stdin(PROMPT) {
            Ok(Some(line)) => line,
            Ok(None) => continue,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        };

        let words = line.split_whitespace().collect::<Vec<_>>();
        let cmd = words[0].to_lowercase();

        let result = match cmd.as_str() {
            HELP | "h" => {
                help();
                Ok(())
            }
            PENDING | "p" => print_pending(&session).await,
            SHOW | "s" => show(&words, &session).await,
            RECONCILE | "r" => reconcile(&words, &session).await,
            SETTLE | "t" => settle(&session).await,
            LAST | "l" => print_last_report(&session).await,
            QUIT | "q" => break,
            _ => {
                println!("Unrecognized command; try `help`.");
                Ok(())
            }
        };

        // A service being down shouldn't end the session.
        if let Err(err) = result {
            eprintln!("[ERROR] {}", err);
        }
    }

    Ok(())
}

/// **Get base URL**
///
/// Tries to create a URL from the provided argument.
///
/// - If the provided argument is the `None` variant,
///   returns `default` as the base URL.
/// - If it's a `String`, tries to parse it into URL.
///   - If it's a valid URL string, returns it as URL.
///   - If it's a malformed URL string, returns `default`.
///
/// The path always ends with a slash, so that relative paths
/// join onto it instead of replacing its last segment.
///
/// # Errors
/// - `default` itself is not a valid URL.
pub fn get_base_url(base_url: Option<String>, default: &str) -> Result<Url, Box<dyn Error>> {
    let parsed = match base_url {
        Some(base_url) => Url::parse(&base_url)
            .map_err(|_| {
                println!("Provided base URL could not be parsed; using default: {default}");
            })
            .ok(),
        None => {
            println!("No base URL provided; using default: {default}");
            None
        }
    };

    let mut url = match parsed {
        Some(url) => url,
        None => Url::parse(default)?,
    };

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// **Reads the bearer token from the environment**
///
/// A blank token is reported and ignored.
pub fn token_from_env() -> Option<String> {
    let token = std::env::var(TOKEN_VAR).ok()?;

    if let Some(msg) = is_valid_token(&token) {
        eprintln!("[ERROR] {TOKEN_VAR}: {msg}");
        return None;
    }

    Some(token.trim().to_string())
}

/// Prints the error body of a failed response, as nicely as it can.
async fn print_error(response: Response) -> Result<(), Box<dyn Error>> {
    let status = response.status();
    let text = response.text().await?;

    match error_message(&text) {
        Some(msg) => eprintln!("[ERROR] {status}: {msg}"),
        None => eprintln!("[ERROR] {status}: \"{text}\""),
    }

    Ok(())
}

fn error_message(text: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(text)
        .ok()
        .map(|body| body.error.message)
}

fn format_transaction(tx: &Transaction) -> String {
    format!(
        "#{:<6} {:>14} {} {}",
        tx.id,
        tx.amount.to_string(),
        tx.currency.as_str(),
        tx.status
    )
}

fn format_outcome(item: &ItemOutcome) -> String {
    match &item.outcome {
        Outcome::Reconciled => format!("#{:<6} reconciled", item.id),
        Outcome::Failed { reason } => format!("#{:<6} FAILED: {}", item.id, reason),
        Outcome::Skipped { reason } => format!("#{:<6} skipped: {}", item.id, reason),
    }
}

fn format_report(report: &SettlementReport) -> String {
    let finished = report
        .finished_at
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        format!("Run {}", report.run_id),
        format!("Started:  {}", report.started_at.to_rfc3339()),
        format!("Finished: {}", finished),
        format!("Result:   {}", report.summary()),
    ];
    lines.extend(report.outcomes.iter().map(format_outcome));

    lines.join("\n")
}

/// **Print all pending transactions, in the ledger's order**
async fn print_pending(session: &Session) -> Result<(), Box<dyn Error>> {
    let url = session.ledger_url.join(api::PENDING_PATH)?;
    log::debug!("GET {}", url);
    let response = session.with_token(session.client.get(url)).send().await?;

    if response.status().is_success() {
        let pending: Vec<Transaction> = response.json().await?;
        if pending.is_empty() {
            println!("No pending transactions.");
        }
        for tx in &pending {
            println!("{}", format_transaction(tx));
        }
    } else {
        print_error(response).await?;
    }

    Ok(())
}

/// **Print a single transaction, whatever its status**
async fn show(words: &[&str], session: &Session) -> Result<(), Box<dyn Error>> {
    let Some(id) = id_argument(words, &format!("The show command: {SHOW} <id>")) else {
        return Ok(());
    };

    let url = session.ledger_url.join(&api::transaction_path(id))?;
    log::debug!("GET {}", url);
    let response = session.with_token(session.client.get(url)).send().await?;

    if response.status().is_success() {
        let tx: Transaction = response.json().await?;
        println!("{}", format_transaction(&tx));
    } else {
        print_error(response).await?;
    }

    Ok(())
}

/// **Reconcile a single transaction by hand**
///
/// # Errors
/// Printed, not returned:
/// - The transaction doesn't exist, `404`;
/// - It is not pending any more, `409`;
/// - The token is missing or lacks the capability, `401`/`403`.
async fn reconcile(words: &[&str], session: &Session) -> Result<(), Box<dyn Error>> {
    let Some(id) = id_argument(words, &format!("The reconcile command: {RECONCILE} <id>")) else {
        return Ok(());
    };

    let url = session.ledger_url.join(&api::reconcile_path(id))?;
    log::debug!("POST {}", url);
    let response = session.with_token(session.client.post(url)).send().await?;

    if response.status().is_success() {
        println!("Transaction {id} reconciled.");
    } else {
        print_error(response).await?;
    }

    Ok(())
}

/// **Trigger a settlement run and print its summary**
async fn settle(session: &Session) -> Result<(), Box<dyn Error>> {
    let url = session.settlement_url.join(api::TRIGGER_PATH)?;
    log::debug!("POST {}", url);
    let response = session.client.post(url).send().await?;

    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        println!("{text}");
    } else {
        eprintln!("[ERROR] {status}: \"{text}\"");
    }

    Ok(())
}

/// **Print the report of the most recent settlement run**
async fn print_last_report(session: &Session) -> Result<(), Box<dyn Error>> {
    let url = session.settlement_url.join(api::LAST_REPORT_PATH)?;
    log::debug!("GET {}", url);
    let response = session.client.get(url).send().await?;

    if response.status().is_success() {
        let report: SettlementReport = response.json().await?;
        println!("{}", format_report(&report));
    } else {
        print_error(response).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_LEDGER_URL, DEFAULT_SETTLEMENT_URL};
    use closing_common::types::TransactionStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn test_get_base_url_none() {
        let base_url = get_base_url(None, DEFAULT_LEDGER_URL).unwrap();
        assert_eq!(DEFAULT_LEDGER_URL, base_url.as_str());
    }

    #[test]
    fn test_get_base_url_valid() {
        let base_url = get_base_url(
            Some("http://10.0.0.7:9000".to_string()),
            DEFAULT_SETTLEMENT_URL,
        )
        .unwrap();
        assert_eq!("http://10.0.0.7:9000/", base_url.as_str());

        let base_url =
            get_base_url(Some("http://ledger.local/api".to_string()), DEFAULT_LEDGER_URL).unwrap();
        assert_eq!("http://ledger.local/api/", base_url.as_str());
    }

    #[test]
    fn test_get_base_url_malformed() {
        let base_url = get_base_url(Some("no scheme here".to_string()), DEFAULT_SETTLEMENT_URL)
            .unwrap();
        assert_eq!(DEFAULT_SETTLEMENT_URL, base_url.as_str());
    }

    #[test]
    fn test_get_base_url_bad_default() {
        assert!(get_base_url(None, "not a url").is_err());
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error":{"code":409,"message":"Transaction 1 is RECONCILED, expected PENDING","type":"invalid_state"}}"#;
        assert_eq!(
            Some("Transaction 1 is RECONCILED, expected PENDING".to_string()),
            error_message(body)
        );
        assert_eq!(None, error_message("Settlement already in progress."));
    }

    #[test]
    fn test_format_transaction() {
        let mut tx = Transaction::new(2, dec!(3200.50), "BRL".parse().unwrap());
        assert_eq!("#2             3200.50 BRL PENDING", format_transaction(&tx));

        tx.status = TransactionStatus::Reconciled;
        assert!(format_transaction(&tx).ends_with("BRL RECONCILED"));
    }

    #[test]
    fn test_format_report() {
        let mut report = SettlementReport::start();
        report.record(1, Outcome::Reconciled);
        report.record(
            2,
            Outcome::Failed {
                reason: "timed out".to_string(),
            },
        );

        let text = format_report(&report);
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(format!("Run {}", report.run_id), lines[0]);
        assert_eq!("Finished: -", lines[2]);
        assert_eq!("Result:   1 reconciled, 1 failed, 0 skipped of 2", lines[3]);
        assert_eq!("#1      reconciled", lines[4]);
        assert_eq!("#2      FAILED: timed out", lines[5]);
    }
}
