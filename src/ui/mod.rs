pub mod command;
pub mod console;
