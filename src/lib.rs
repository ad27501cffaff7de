// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the seeding subcommands.
//
// Module responsibilities:
// - `api`: Encapsulates HTTP interactions with the Revolori server
//   (account creation, login) including the admin-to-user basic-auth
//   fallback.
// - `commands`: Implements the subcommand flows and delegates requests
//   to `api`.
//
// Keeping this separation makes it easier to test the API logic against
// a mock server without going through argument parsing.
pub mod api;
pub mod commands;
