mod roster;

pub use roster::{Member, Roster, RosterError};
