//! # Game engine
//!
//! Everything needed to run a round of "name that song" for one user:
//!
//! - [`text`] normalizes titles into guessable words
//! - [`GuessState`] tracks which words of the current title are still hidden
//!   and renders the masked title
//! - [`PlaybackQueue`] holds the shuffled tracks and the timer of the one
//!   playing
//! - [`GameSession`] ties a user's selection, queue, guess state and token
//!   together and drives the streaming service
//! - [`GameSessionRegistry`] maps users to their sessions
//!
//! Sessions are shared as `Arc<GameSession>` and are safe to use from
//! concurrent requests; each serializes its own operations.

mod guess;
mod queue;
mod registry;
mod session;
pub mod text;

pub use guess::{GuessOutcome, GuessState};
pub use queue::PlaybackQueue;
pub use registry::{GameSessionRegistry, Identity};
pub use session::GameSession;
