mod common;
mod root;
mod run;
mod schema;
mod token;

pub(crate) use common::{load_config, log_level};
pub(crate) use root::get_args;
