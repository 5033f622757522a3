pub mod command;
pub mod data;
pub mod endpoints;
pub mod helpers;
