use log::{error, info};
use oauth_session::oauth::ProviderKind;
use service::{config::Config, logging::Logger, AppState};
use std::error::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        std::process::exit(1);
    }

    info!("Starting OAuth login...");

    let registry = match service::init_registry(&config) {
        Ok(registry) => registry,
        Err(e) => {
            error!("Failed to configure OAuth providers: {e}");
            std::process::exit(1);
        }
    };

    let origin_uri = match Url::parse(config.origin_uri()) {
        Ok(uri) => uri,
        Err(e) => {
            error!("Invalid origin URI [{}]: {e}", config.origin_uri());
            std::process::exit(1);
        }
    };

    // Registry kinds are sorted, so Google wins when both are enabled
    let Some(kind) = registry.kinds().into_iter().next() else {
        error!("No OAuth provider is registered");
        std::process::exit(1);
    };

    let app_state = AppState::new(config, registry);
    if let Err(e) = login(&app_state, kind, &origin_uri).await {
        error!("Login with {kind} failed: {e}");
        std::process::exit(1);
    }
}

async fn login(app_state: &AppState, kind: ProviderKind, origin_uri: &Url) -> Result<(), BoxError> {
    let started = app_state.begin_authentication(kind, origin_uri).await?;
    let temporary_token = started.session.token().to_string();
    let consent_uri = started
        .redirect_uri
        .ok_or("provider returned no consent page")?;

    println!("Open this URL in a browser and approve access:\n\n{consent_uri}\n");
    println!("Then paste the full URL you were redirected to:");

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    let callback = Url::parse(line.trim())?;
    let (code, state) = callback_params(&callback)?;

    let finished = app_state
        .complete_authentication(kind, &temporary_token, &code, &state)
        .await?;
    let completed = finished
        .session
        .as_completed()
        .ok_or("provider did not complete the session")?;

    info!(
        "Authenticated {} user, session valid until {}",
        kind,
        completed.expires_at().to_rfc3339()
    );
    println!("Authenticated user: {}", completed.user_identifier());
    if let Some(redirect_uri) = finished.redirect_uri {
        println!("Redirect to: {redirect_uri}");
    }

    Ok(())
}

/// Extracts `code` and `state` from a provider callback URL.
fn callback_params(callback: &Url) -> Result<(String, String), BoxError> {
    let mut code = None;
    let mut state = None;
    for (name, value) in callback.query_pairs() {
        match name.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Err(format!("provider denied access: {value}").into()),
            _ => {}
        }
    }

    match (code, state) {
        (Some(code), Some(state)) => Ok((code, state)),
        _ => Err("callback URL must carry code and state parameters".into()),
    }
}
