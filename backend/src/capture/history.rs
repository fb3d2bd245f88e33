/// Undo/redo stacks of immutable snapshots.
///
/// The top of the undo stack is the current state; an empty undo stack means
/// the blank state. Pushing a new snapshot invalidates everything that was
/// undone before it.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: T) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
    }

    /// Moves the current snapshot onto the redo stack. Returns false on an empty history.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                self.redo_stack.push(snapshot);
                true
            }
            None => false,
        }
    }

    /// Restores the most recently undone snapshot. Returns false when nothing was undone.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(snapshot) => {
                self.undo_stack.push(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.undo_stack.last()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn depth(&self) -> (usize, usize) {
        (self.undo_stack.len(), self.redo_stack.len())
    }
}
