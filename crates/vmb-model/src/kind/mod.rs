mod switch;
pub use switch::SwitchKind;

mod generation;
pub use generation::Generation;
