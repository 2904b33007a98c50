use crate::key::Key;

/// Common driving surface for a console core.
///
/// A host loads a ROM, then repeatedly calls [`run`](Console::run) with the
/// wall-clock time that has passed and feeds input events through
/// [`handle_key`](Console::handle_key). Video and audio are not part of this
/// trait; they are collaborator hooks installed on the core's bus.
pub trait Console {
    /// Restore the documented initial register and bus state.
    fn reset(&mut self);

    /// Execute for roughly `ms` milliseconds of emulated time.
    fn run(&mut self, ms: u32);

    /// Feed a key press/release event into the console's input matrix.
    fn handle_key(&mut self, key: Key, pressed: bool);
}
