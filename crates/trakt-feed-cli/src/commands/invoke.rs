use super::{build_auth, build_router, configured, load_config, load_credentials, normalize_options};
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use std::collections::HashMap;
use trakt_feed_config::{Config, PathManager};
use trakt_feed_sources::{InvokeOutput, Manifest, WidgetHost};

pub fn run_schema(output: &Output) -> Result<()> {
    let manifest = serde_json::to_value(Manifest::trakt())?;
    match output.format() {
        // The manifest is the payload, so it is printed as JSON in every mode
        OutputFormat::Human => println!("{}", serde_json::to_string_pretty(&manifest)?),
        OutputFormat::Json | OutputFormat::JsonPretty => output.json(&manifest),
    }
    Ok(())
}

pub async fn run_invoke(function: &str, pairs: &[String], output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;

    let mut params = parse_params(pairs)?;
    let stored_token = load_credentials(&path_manager)?.valid_trakt_access_token().cloned();
    apply_config_defaults(&mut params, &config, stored_token);

    let manifest = Manifest::trakt();
    let router = build_router(&config, normalize_options(&config));
    let auth = build_auth(&config);
    let host = WidgetHost::new(&manifest, &router, &auth);

    match host.invoke(function, &params).await {
        Ok(InvokeOutput::Items(items)) => output.items(&items),
        Ok(InvokeOutput::Records(records)) => output.records(&records),
        Err(e) => {
            let known: Vec<&str> = manifest.modules.iter().map(|m| m.function_name.as_str()).collect();
            return Err(color_eyre::eyre::eyre!("{} (available: {})", e, known.join(", ")));
        }
    }
    Ok(())
}

/// `key=value` pairs; the value may itself contain '='
fn parse_params(pairs: &[String]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| color_eyre::eyre::eyre!("Invalid parameter '{}', expected key=value", pair))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(color_eyre::eyre::eyre!("Invalid parameter '{}', empty key", pair));
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Fill parameters a host would normally collect from its settings form
fn apply_config_defaults(params: &mut HashMap<String, String>, config: &Config, stored_token: Option<String>) {
    let defaults = [
        ("client_id", configured(&config.trakt.client_id)),
        ("client_secret", configured(&config.trakt.client_secret)),
        ("user_name", config.trakt.user_name.clone()),
        ("oauth_token", stored_token),
    ];
    for (key, value) in defaults {
        if let Some(value) = value {
            params.entry(key.to_string()).or_insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params() {
        let params = parse_params(&[
            "status=watchlist".to_string(),
            "user_name= sean ".to_string(),
            "auth_code=a=b".to_string(),
        ])
        .unwrap();
        assert_eq!(params["status"], "watchlist");
        assert_eq!(params["user_name"], " sean ");
        assert_eq!(params["auth_code"], "a=b");

        assert!(parse_params(&["status".to_string()]).is_err());
        assert!(parse_params(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_explicit_params_win_over_config() {
        let mut config = Config::default();
        config.trakt.client_id = "configured-id".to_string();
        config.trakt.user_name = Some("sean".to_string());

        let mut params = parse_params(&["client_id=explicit-id".to_string()]).unwrap();
        apply_config_defaults(&mut params, &config, Some("stored-token".to_string()));

        assert_eq!(params["client_id"], "explicit-id");
        assert_eq!(params["user_name"], "sean");
        assert_eq!(params["oauth_token"], "stored-token");
        assert!(!params.contains_key("client_secret"));
    }
}
