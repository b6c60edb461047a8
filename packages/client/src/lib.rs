//! TypeFast terminal client.
//!
//! The [`coordinator::RoomCoordinator`] owns the state of the current room
//! (membership, chat, race) and talks to peers through a
//! [`channel::RoomChannel`]. Keystrokes are turned into progress by
//! [`race::RaceTyping`]; solo tests run in [`solo::SoloTest`].

pub mod api;
pub mod channel;
pub mod coordinator;
pub mod error;
pub mod formatter;
pub mod race;
pub mod runner;
pub mod solo;
pub mod ui;
pub mod words;
