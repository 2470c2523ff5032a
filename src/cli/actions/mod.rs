pub mod console;

use uuid::Uuid;

/// Parsed CLI action.
#[derive(Debug)]
pub enum Action {
    Login { email: String, password: Option<String> },
    SignUp { email: String, password: Option<String> },
    Whoami,
    Passwd,
    UsersList,
    UsersCreate { email: String, password: Option<String> },
    UsersBlock { id: Uuid },
    UsersUnblock { id: Uuid },
    UsersResetPassword { id: Uuid, password: Option<String> },
}
