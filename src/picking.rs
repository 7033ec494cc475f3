// Selection driven by the pixel tracker

use crate::render::PixelTracker;
use crate::scene::{ObjectId, ObjectSet};

/// The currently selected object, if any.
///
/// Selection is shown through opacity: the selected object is faded, every
/// other object stays at full opacity. The drawer never looks at this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<ObjectId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Takes the result of the last draw pass out of `tracker`.
    ///
    /// A hit becomes the new selection. A miss leaves the selection alone.
    /// The tracker's slot is empty afterwards either way.
    pub fn consume_pick(
        &mut self,
        tracker: &mut PixelTracker,
        objects: &mut ObjectSet,
        selected_opacity: f32,
    ) -> Option<ObjectId> {
        let found = tracker.take_found()?;
        self.select(found, objects, selected_opacity)
            .then_some(found)
    }

    /// Selects `id`, restoring the previous selection's opacity. Unknown ids are ignored.
    pub fn select(&mut self, id: ObjectId, objects: &mut ObjectSet, selected_opacity: f32) -> bool {
        if objects.get(id).is_none() {
            log::warn!("pick hit object {} which is no longer in the scene", id);
            return false;
        }

        self.clear_opacity(objects);
        if let Some(object) = objects.get_mut(id) {
            object.opacity = selected_opacity;
        }
        self.selected = Some(id);
        log::info!("selected object {}", id);
        true
    }

    pub fn deselect(&mut self, objects: &mut ObjectSet) {
        self.clear_opacity(objects);
        if let Some(id) = self.selected.take() {
            log::info!("deselected object {}", id);
        }
    }

    fn clear_opacity(&self, objects: &mut ObjectSet) {
        if let Some(object) = self.selected.and_then(|id| objects.get_mut(id)) {
            object.opacity = 1.0;
        }
    }
}
