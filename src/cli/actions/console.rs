//! Drive the console workflows from the terminal.

use crate::access::{capabilities_for, default_section_for};
use crate::api::types::UserStatus;
use crate::api::UsersApi;
use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::notify::Notifier;
use crate::session::SessionStore;
use crate::workflows::{self, password::PasswordChange, users_admin::UsersAdmin};
use anyhow::{anyhow, Result};
use std::io::{self, Write};
use std::sync::Arc;
use uuid::Uuid;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Notification sink for a terminal session.
struct StdNotifier;

impl Notifier for StdNotifier {
    fn success(&self, message: &str) {
        println!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

fn api(globals: &GlobalArgs) -> Result<Arc<UsersApi>> {
    let api = UsersApi::new(USER_AGENT, &globals.server_url)?;
    if let Some(token) = &globals.token {
        api.set_token(token.clone());
    }
    Ok(Arc::new(api))
}

/// Read one line from the terminal; passwords are captured here, out of
/// band of the workflow that submits them.
fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn password_or_prompt(password: Option<String>, label: &str) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => prompt(label),
    }
}

/// Handle the parsed action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let api = api(globals)?;
    let store = SessionStore::new();
    let notifier: Arc<dyn Notifier> = Arc::new(StdNotifier);

    match action {
        Action::Login { email, password } => {
            let password = password_or_prompt(password, "Password")?;
            let outcome = workflows::login(&api, &store, &email, &password).await?;
            println!(
                "Signed in as {} ({}), landing on {:?}",
                outcome.user.email,
                outcome.user.role.as_str(),
                default_section_for(outcome.user.role)
            );
            println!("export RESPALDO_CONSOLE_TOKEN={}", outcome.token);
            Ok(())
        }
        Action::SignUp { email, password } => {
            if api.is_any_user_exist().await? {
                return Err(anyhow!(
                    "an account already exists; ask the administrator to provision one"
                ));
            }
            let password = password_or_prompt(password, "Password")?;
            api.sign_up(&email, &password).await?;
            println!("Administrator account created, you can now log in");
            Ok(())
        }
        Action::Whoami => {
            let user = workflows::hydrate(&api, &store).await?;
            println!("{} ({})", user.email, user.role.as_str());
            for section in capabilities_for(user.role) {
                println!("  {section:?}");
            }
            Ok(())
        }
        Action::Passwd => {
            let mut workflow =
                PasswordChange::new(Arc::clone(&api), store.clone(), Arc::clone(&notifier));
            workflow.current_password = prompt("Current password")?;
            workflow.new_password = prompt("New password")?;
            workflow.confirm_password = prompt("Confirm new password")?;
            workflow.submit().await;
            Ok(())
        }
        Action::UsersList => {
            let mut workflow = admin(&api, &store, &notifier);
            workflow.refresh().await;
            for user in workflow.users() {
                println!(
                    "{}  {}  {}  {}  {}",
                    user.id,
                    user.email,
                    user.role.as_str(),
                    user.status.as_str(),
                    user.created_at.to_rfc3339()
                );
            }
            Ok(())
        }
        Action::UsersCreate { email, password } => {
            let password = password_or_prompt(password, "Password")?;
            let mut workflow = admin(&api, &store, &notifier);
            workflow.open_create_panel();
            if let Some(draft) = workflow.draft_mut() {
                draft.email = email;
                draft.password = password;
            }
            workflow.create_user().await;
            Ok(())
        }
        Action::UsersBlock { id } => set_status(&api, &store, &notifier, id, UserStatus::Blocked).await,
        Action::UsersUnblock { id } => {
            set_status(&api, &store, &notifier, id, UserStatus::Active).await
        }
        Action::UsersResetPassword { id, password } => {
            let password = password_or_prompt(password, "Replacement password")?;
            let mut workflow = admin(&api, &store, &notifier);
            workflow.reset_password(id, &password).await;
            Ok(())
        }
    }
}

fn admin(api: &Arc<UsersApi>, store: &SessionStore, notifier: &Arc<dyn Notifier>) -> UsersAdmin {
    UsersAdmin::new(Arc::clone(api), store.clone(), Arc::clone(notifier))
}

/// Load the listing, then toggle the one row whose current status differs
/// from the requested one.
async fn set_status(
    api: &Arc<UsersApi>,
    store: &SessionStore,
    notifier: &Arc<dyn Notifier>,
    id: Uuid,
    target: UserStatus,
) -> Result<()> {
    let mut workflow = admin(api, store, notifier);
    workflow.refresh().await;

    let Some(row) = workflow.users().iter().find(|user| user.id == id) else {
        return Err(anyhow!("no user with id {id}"));
    };
    if row.status == target {
        println!("{} is already {}", row.email, target.as_str());
        return Ok(());
    }

    workflow.toggle_status(id).await;
    Ok(())
}
