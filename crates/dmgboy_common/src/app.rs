use crate::key::Key;

/// A machine that a frontend can drive one video frame at a time.
pub trait App {
    fn init(&mut self);
    /// Advance one frame and write it into `screen` as packed RGB24.
    fn update(&mut self, screen: &mut [u8]);
    fn handle_key_event(&mut self, key: Key, is_down: bool);
    fn should_exit(&self) -> bool;
    fn exit(&mut self);

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn scale(&self) -> u32;
    fn title(&self) -> String;
}

/// Lets a frontend borrow an app and hand it back to the caller afterwards.
impl<T: App + ?Sized> App for &mut T {
    fn init(&mut self) {
        (**self).init()
    }

    fn update(&mut self, screen: &mut [u8]) {
        (**self).update(screen)
    }

    fn handle_key_event(&mut self, key: Key, is_down: bool) {
        (**self).handle_key_event(key, is_down)
    }

    fn should_exit(&self) -> bool {
        (**self).should_exit()
    }

    fn exit(&mut self) {
        (**self).exit()
    }

    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn scale(&self) -> u32 {
        (**self).scale()
    }

    fn title(&self) -> String {
        (**self).title()
    }
}
