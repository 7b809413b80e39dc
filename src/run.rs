mod cli;
mod console;
mod telegram;

pub(crate) use cli::{as_cli, print_usage};
