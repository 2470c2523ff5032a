//! Client-side session and access-control layer of the Respaldo
//! administration console.
//!
//! The crate owns who is considered logged in, which sections a role may
//! reach, the administrator user-directory workflow and the self-service
//! password change. Rendering, toasts and the rest of the surface are
//! external collaborators behind small seams.

pub mod access;
pub mod api;
pub mod cli;
pub mod notify;
pub mod session;
pub mod workflows;
