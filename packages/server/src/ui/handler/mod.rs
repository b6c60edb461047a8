//! Request handlers.

mod http;
mod websocket;

pub use http::{
    create_room, debug_topic_presence, delete_room, get_leaderboard, get_room_detail, get_rooms,
    health_check, submit_result,
};
pub use websocket::websocket_handler;
