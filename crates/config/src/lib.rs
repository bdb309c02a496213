// Configuration loading

pub mod credentials;
pub mod settings;

pub use credentials::{resolve_api_token, TokenLookup, TokenSource, TOKEN_ENV_VAR};
pub use settings::Settings;
