use core::fmt;

/// Handle of a registered change listener, used to unsubscribe.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Box<dyn FnMut(&T)>;

/// A mutable value box that tracks a dirty bit and fans out change events.
///
/// The dirty bit is set on every write that changes the value and stays set
/// until a consumer calls [`clean`](DirtyProperty::clean). Several
/// consumers may poll the flag per frame, and the one that owns the
/// reaction clears it.
///
/// Listeners fire synchronously, in registration order, before
/// [`set`](DirtyProperty::set) returns. They receive the new value by
/// reference; re-entrant reads go through that argument. Listener lists are
/// scoped to the owning property instance; there is no global registry.
pub struct DirtyProperty<T> {
    value: T,
    dirty: bool,
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_listener: u64,
}

impl<T: fmt::Debug> fmt::Debug for DirtyProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirtyProperty")
            .field("value", &self.value)
            .field("dirty", &self.dirty)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T> DirtyProperty<T> {
    /// Creates a clean property holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value,
            dirty: false,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag. Called by the consumer that reacted to the
    /// change; reads report not-dirty until the next differing write.
    #[inline]
    pub fn clean(&mut self) {
        self.dirty = false;
    }

    /// Registers a change listener; returns the id used to unsubscribe.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` when the id was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let Some(i) = self.listeners.iter().position(|(lid, _)| *lid == id) else {
            return false;
        };
        self.listeners.remove(i);
        true
    }
}

impl<T: PartialEq> DirtyProperty<T> {
    /// Stores `value` if it differs from the current one, marking the
    /// property dirty and firing listeners before returning. Writes of an
    /// equal value are ignored entirely.
    pub fn set(&mut self, value: T) {
        if self.value == value {
            return;
        }
        self.value = value;
        self.dirty = true;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.value);
        }
    }
}
