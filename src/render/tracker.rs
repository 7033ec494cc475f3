// Pixel tracker for object picking

use glam::UVec2;

use crate::scene::ObjectId;

/// Records which object last wrote a watched pixel during a draw pass.
///
/// Picking is a two-slot handshake with one frame of latency:
/// the input step arms the tracker for the coming draw pass, the drawer
/// reports writes while it runs, and the next frame's input step takes the
/// result with [`PixelTracker::take_found`], which always clears it.
#[derive(Debug, Clone, Default)]
pub struct PixelTracker {
    watched_pixel: UVec2,
    armed: bool,
    current_object: Option<ObjectId>,
    found_object: Option<ObjectId>,
}

impl PixelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `(x, y)` during the next draw pass.
    pub fn arm(&mut self, x: u32, y: u32) {
        self.watched_pixel = UVec2::new(x, y);
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn current_object(&self) -> Option<ObjectId> {
        self.current_object
    }

    /// Peek at the result without consuming it.
    pub fn found_object(&self) -> Option<ObjectId> {
        self.found_object
    }

    /// Consumes the result of the last armed pass, leaving the slot empty.
    pub fn take_found(&mut self) -> Option<ObjectId> {
        self.found_object.take()
    }

    pub(crate) fn begin_object(&mut self, id: ObjectId) {
        self.current_object = Some(id);
    }

    pub(crate) fn end_object(&mut self) {
        self.current_object = None;
    }

    /// Called for every color/depth write that passed the depth test.
    pub(crate) fn record_write(&mut self, x: u32, y: u32) {
        if !self.armed || self.watched_pixel != UVec2::new(x, y) {
            return;
        }
        if let Some(id) = self.current_object {
            self.found_object = Some(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disarmed_writes_are_ignored() {
        let mut tracker = PixelTracker::new();
        tracker.begin_object(ObjectId(1));
        tracker.record_write(0, 0);
        assert_eq!(tracker.found_object(), None);
    }

    #[test]
    fn last_writer_wins() {
        let mut tracker = PixelTracker::new();
        tracker.arm(3, 4);

        tracker.begin_object(ObjectId(1));
        tracker.record_write(3, 4);
        tracker.end_object();

        tracker.begin_object(ObjectId(2));
        tracker.record_write(2, 4);
        tracker.end_object();
        assert_eq!(tracker.found_object(), Some(ObjectId(1)));

        tracker.begin_object(ObjectId(3));
        tracker.record_write(3, 4);
        tracker.end_object();
        assert_eq!(tracker.found_object(), Some(ObjectId(3)));
    }

    #[test]
    fn writes_outside_an_object_draw_are_not_attributed() {
        let mut tracker = PixelTracker::new();
        tracker.arm(0, 0);
        tracker.begin_object(ObjectId(5));
        tracker.end_object();
        tracker.record_write(0, 0);
        assert_eq!(tracker.found_object(), None);
        assert_eq!(tracker.current_object(), None);
    }

    #[test]
    fn take_found_clears_the_slot() {
        let mut tracker = PixelTracker::new();
        tracker.arm(1, 1);
        tracker.begin_object(ObjectId(9));
        tracker.record_write(1, 1);
        tracker.end_object();

        assert_eq!(tracker.take_found(), Some(ObjectId(9)));
        assert_eq!(tracker.take_found(), None);
    }
}
