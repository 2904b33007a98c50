/// Host-side key identifiers.
///
/// Frontends translate their own input events into this enum; each console
/// core maps the subset it cares about onto its button matrix.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    X,
    Y,
    Z,
    S,
    L,
    R,
    Enter,
    Space,
    Escape,
}
