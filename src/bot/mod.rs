pub(crate) mod commands;
pub(crate) mod dialogue;
pub(crate) mod reply;
pub(crate) mod session;
pub(crate) mod util;
pub(crate) mod validate;

pub(crate) use dialogue::Controller;
pub(crate) use reply::{Keyboard, Reply};
