pub mod auth;

pub mod forms;

pub mod submissions;

pub use auth::configure_auth_routes;
pub use forms::configure_forms_routes;
pub use submissions::configure_submissions_routes;
