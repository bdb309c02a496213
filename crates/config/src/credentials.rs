// API token resolution
//
// Checks in order:
// 1. Environment variable (STOCKSYNC_API_TOKEN, for CI/headless)
// 2. `auth.token` in settings.json

use std::env;

use crate::settings::Settings;

pub const TOKEN_ENV_VAR: &str = "STOCKSYNC_API_TOKEN";

/// Source of an API token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    Settings,
    None,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSource::Environment => "environment",
            TokenSource::Settings => "settings",
            TokenSource::None => "none",
        }
    }
}

/// Result of token lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLookup {
    pub token: Option<String>,
    pub source: TokenSource,
}

pub fn resolve_api_token(settings: &Settings) -> TokenLookup {
    resolve(env::var(TOKEN_ENV_VAR).ok(), settings)
}

fn resolve(env_value: Option<String>, settings: &Settings) -> TokenLookup {
    if let Some(token) = env_value.filter(|t| !t.trim().is_empty()) {
        return TokenLookup {
            token: Some(token),
            source: TokenSource::Environment,
        };
    }

    if let Some(token) = settings.auth_token.as_ref().filter(|t| !t.trim().is_empty()) {
        return TokenLookup {
            token: Some(token.clone()),
            source: TokenSource::Settings,
        };
    }

    TokenLookup {
        token: None,
        source: TokenSource::None,
    }
}
