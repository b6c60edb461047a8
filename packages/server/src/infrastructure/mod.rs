//! Infrastructure 層
//!
//! ドメイン層の port（trait）の具体的な実装と、HTTP の DTO を提供します。

pub mod dto;
pub mod message_pusher;
pub mod repository;
