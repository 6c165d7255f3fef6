//! Document model: ordered scene objects plus the current selection.

use crate::error::{EngineError, EngineResult};
use crate::geometry::union_bounds;
use crate::shapes::{ObjectId, ObjectPatch, SceneObject};
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Offset applied to duplicated objects.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// Objects in z-order (back to front) and the ids currently selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    objects: Vec<SceneObject>,
    selected_ids: Vec<ObjectId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects back to front. The last one is drawn on top.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn selected_ids(&self) -> &[ObjectId] {
        &self.selected_ids
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Z-index of an object.
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Ordinal used in the default name of the next created object.
    pub fn next_ordinal(&self) -> usize {
        self.objects.len() + 1
    }

    /// Append an object on top and make it the sole selection.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        if self.get(id).is_some() {
            log::warn!("Replacing object {} that was added twice", id);
            self.objects.retain(|o| o.id != id);
        }
        self.objects.push(object);
        self.selected_ids = vec![id];
        id
    }

    /// Shallow-merge `patch` into an object. Returns false for an unknown id.
    pub fn update(&mut self, id: ObjectId, patch: &ObjectPatch) -> bool {
        match self.get_mut(id) {
            Some(object) => {
                patch.apply(object);
                true
            }
            None => {
                log::debug!("Update for unknown object {} ignored", id);
                false
            }
        }
    }

    /// Remove objects and prune them from the selection. Returns how many were removed.
    pub fn delete(&mut self, ids: &[ObjectId]) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !ids.contains(&o.id));
        self.selected_ids.retain(|id| !ids.contains(id));
        before - self.objects.len()
    }

    /// Move the object at `from` so it ends up at index `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> EngineResult<()> {
        let len = self.objects.len();
        for index in [from, to] {
            if index >= len {
                return Err(EngineError::IndexOutOfRange { index, len });
            }
        }
        let object = self.objects.remove(from);
        self.objects.insert(to, object);
        Ok(())
    }

    /// Replace the selection. Unknown and repeated ids are dropped.
    pub fn select(&mut self, ids: &[ObjectId]) {
        let mut selection = Vec::with_capacity(ids.len());
        for &id in ids {
            if self.get(id).is_some() && !selection.contains(&id) {
                selection.push(id);
            }
        }
        self.selected_ids = selection;
    }

    /// Add or remove a single object from the selection.
    pub fn toggle_selection(&mut self, id: ObjectId) {
        if let Some(pos) = self.selected_ids.iter().position(|&s| s == id) {
            self.selected_ids.remove(pos);
        } else if self.get(id).is_some() {
            self.selected_ids.push(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_ids.clear();
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selected_ids.contains(&id)
    }

    /// Selected objects in z-order.
    pub fn selected_objects(&self) -> Vec<&SceneObject> {
        self.objects
            .iter()
            .filter(|o| self.selected_ids.contains(&o.id))
            .collect()
    }

    /// Bring an object to the front (topmost).
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        self.move_to(id, |len, _| len - 1)
    }

    /// Send an object to the back (bottommost).
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        self.move_to(id, |_, _| 0)
    }

    /// Move an object one layer towards the front.
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        self.move_to(id, |len, pos| (pos + 1).min(len - 1))
    }

    /// Move an object one layer towards the back.
    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        self.move_to(id, |_, pos| pos.saturating_sub(1))
    }

    /// Returns true if the object actually moved.
    fn move_to(&mut self, id: ObjectId, target: impl FnOnce(usize, usize) -> usize) -> bool {
        let Some(pos) = self.index_of(id) else {
            return false;
        };
        let to = target(self.objects.len(), pos);
        if to == pos {
            return false;
        }
        self.reorder(pos, to).is_ok()
    }

    /// Copy an object as `"{name} Copy"`, offset and placed on top. The copy becomes the selection.
    pub fn duplicate(&mut self, id: ObjectId) -> Option<ObjectId> {
        let mut copy = self.get(id)?.duplicate();
        copy.name = format!("{} Copy", copy.name);
        copy.geometry.x += DUPLICATE_OFFSET.x;
        copy.geometry.y += DUPLICATE_OFFSET.y;
        Some(self.add(copy))
    }

    /// Union of every object's world bounds.
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(&self.objects)
    }

    /// Union of the selected objects' world bounds.
    pub fn selection_bounds(&self) -> Option<Rect> {
        union_bounds(self.selected_objects())
    }

    /// Clone of the object list for the history log.
    pub fn snapshot(&self) -> Vec<SceneObject> {
        self.objects.clone()
    }

    /// Replace every object with a snapshot and clear the selection.
    pub fn restore(&mut self, snapshot: &[SceneObject]) {
        self.objects = snapshot.to_vec();
        self.selected_ids.clear();
    }
}
