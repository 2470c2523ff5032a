use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("respaldo-console")
        .about("Administration console for the Respaldo backup manager")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("server-url")
                .short('s')
                .long("server-url")
                .help("Base URL of the backup-manager server")
                .default_value("http://localhost:4005")
                .env("RESPALDO_CONSOLE_SERVER_URL")
                .global(true),
        )
        .arg(
            Arg::new("token")
                .short('t')
                .long("token")
                .help("Bearer token issued by a previous login")
                .env("RESPALDO_CONSOLE_TOKEN")
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("RESPALDO_CONSOLE_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Authenticate and print the issued token")
                .arg(Arg::new("email").help("Login email").required(true))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Password; prompted when omitted"),
                ),
        )
        .subcommand(
            Command::new("signup")
                .about("First-run bootstrap: create the initial ADMIN account")
                .arg(Arg::new("email").help("Login email").required(true))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Password; prompted when omitted"),
                ),
        )
        .subcommand(Command::new("whoami").about("Show the identity behind the current token"))
        .subcommand(Command::new("passwd").about("Change your own password and sign out"))
        .subcommand(
            Command::new("users")
                .about("Administer the user directory (ADMIN only)")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List every account"))
                .subcommand(
                    Command::new("create")
                        .about("Provision a MANAGER account")
                        .arg(Arg::new("email").help("Login email").required(true))
                        .arg(
                            Arg::new("password")
                                .long("password")
                                .help("Password; prompted when omitted"),
                        ),
                )
                .subcommand(
                    Command::new("block")
                        .about("Block an account")
                        .arg(Arg::new("id").help("User id").required(true)),
                )
                .subcommand(
                    Command::new("unblock")
                        .about("Unblock an account")
                        .arg(Arg::new("id").help("User id").required(true)),
                )
                .subcommand(
                    Command::new("reset-password")
                        .about("Set a replacement password for an account")
                        .arg(Arg::new("id").help("User id").required(true))
                        .arg(
                            Arg::new("password")
                                .long("password")
                                .help("Replacement password; prompted when omitted"),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "respaldo-console");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Administration console for the Respaldo backup manager"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_server_url_and_token_flags() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "respaldo-console",
            "--server-url",
            "https://backups.example.com",
            "--token",
            "token-abc",
            "whoami",
        ]);

        assert_eq!(
            matches
                .get_one::<String>("server-url")
                .map(|s| s.to_string()),
            Some("https://backups.example.com".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("token").map(|s| s.to_string()),
            Some("token-abc".to_string())
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                (
                    "RESPALDO_CONSOLE_SERVER_URL",
                    Some("https://backups.example.com"),
                ),
                ("RESPALDO_CONSOLE_TOKEN", Some("token-abc")),
                ("RESPALDO_CONSOLE_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["respaldo-console", "whoami"]);
                assert_eq!(
                    matches
                        .get_one::<String>("server-url")
                        .map(|s| s.to_string()),
                    Some("https://backups.example.com".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("token").map(|s| s.to_string()),
                    Some("token-abc".to_string())
                );
                assert_eq!(matches.get_one::<u8>("verbosity").map(|s| *s), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("RESPALDO_CONSOLE_LOG_LEVEL", Some(level))], || {
                let command = new();
                let matches = command.get_matches_from(vec!["respaldo-console", "whoami"]);
                assert_eq!(
                    matches.get_one::<u8>("verbosity").map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }

    #[test]
    fn test_users_create_subcommand() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "respaldo-console",
            "users",
            "create",
            "carol@example.com",
            "--password",
            "secret-pass",
        ]);

        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, "users");
        let (name, create_matches) = sub_matches.subcommand().unwrap();
        assert_eq!(name, "create");
        assert_eq!(
            create_matches
                .get_one::<String>("email")
                .map(|s| s.to_string()),
            Some("carol@example.com".to_string())
        );
    }

    #[test]
    fn test_default_server_url() {
        temp_env::with_vars([("RESPALDO_CONSOLE_SERVER_URL", None::<String>)], || {
            let command = new();
            let matches = command.get_matches_from(vec!["respaldo-console", "whoami"]);
            assert_eq!(
                matches
                    .get_one::<String>("server-url")
                    .map(|s| s.to_string()),
                Some("http://localhost:4005".to_string())
            );
        });
    }
}
