pub use crate::actions::run;
pub use crate::args::get_args as args;

pub(crate) mod actions;
pub(crate) mod args;
pub(crate) mod dry_run;
