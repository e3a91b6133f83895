/// Host keys that frontends forward to an [`App`](crate::app::App).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    A,
    S,
    X,
    Z,
    Return,
    Escape,
    None,
}
