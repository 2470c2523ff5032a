use crate::cli::actions::Action;
use anyhow::{anyhow, Context, Result};
use uuid::Uuid;

fn email_of(matches: &clap::ArgMatches) -> Result<String> {
    matches
        .get_one::<String>("email")
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("missing required argument: email"))
}

fn password_of(matches: &clap::ArgMatches) -> Option<String> {
    matches.get_one::<String>("password").map(ToString::to_string)
}

fn id_of(matches: &clap::ArgMatches) -> Result<Uuid> {
    matches
        .get_one::<String>("id")
        .ok_or_else(|| anyhow!("missing required argument: id"))?
        .parse()
        .context("id is not a valid UUID")
}

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some(("login", sub)) => Ok(Action::Login {
            email: email_of(sub)?,
            password: password_of(sub),
        }),
        Some(("signup", sub)) => Ok(Action::SignUp {
            email: email_of(sub)?,
            password: password_of(sub),
        }),
        Some(("whoami", _)) => Ok(Action::Whoami),
        Some(("passwd", _)) => Ok(Action::Passwd),
        Some(("users", users)) => match users.subcommand() {
            Some(("list", _)) => Ok(Action::UsersList),
            Some(("create", sub)) => Ok(Action::UsersCreate {
                email: email_of(sub)?,
                password: password_of(sub),
            }),
            Some(("block", sub)) => Ok(Action::UsersBlock { id: id_of(sub)? }),
            Some(("unblock", sub)) => Ok(Action::UsersUnblock { id: id_of(sub)? }),
            Some(("reset-password", sub)) => Ok(Action::UsersResetPassword {
                id: id_of(sub)?,
                password: password_of(sub),
            }),
            _ => Err(anyhow!("unknown users subcommand")),
        },
        _ => Err(anyhow!("unknown subcommand")),
    }
}
