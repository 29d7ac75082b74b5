pub mod backend;
pub mod chat;
pub mod client;
pub mod constants;
pub mod controller;
pub mod error;
pub mod form;
pub mod llm_interaction;
pub mod mailto;
pub mod opportunity;
pub mod web_server;
