use secrecy::SecretString;

/// Connection settings shared by every action.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub server_url: String,
    pub token: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self {
            server_url: matches
                .get_one::<String>("server-url")
                .map_or_else(|| "http://localhost:4005".to_string(), ToString::to_string),
            token: matches
                .get_one::<String>("token")
                .map(|token| SecretString::from(token.to_string())),
        }
    }
}
