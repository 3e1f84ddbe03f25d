mod identity;
mod time;

pub use self::{identity::*, time::*};
