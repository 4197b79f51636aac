//! Hook Store
//!
//! Per-fiber persistent state cells for component functions. A component
//! reaches its cells only through the [`Scope`] the scheduler hands it
//! during invocation, which makes out-of-context use unrepresentable.
//!
//! # Positional identity
//!
//! Cells are keyed by call order: the Nth `use_state` call in one render
//! maps to the Nth cell recorded on the fiber's alternate. A differing
//! call count between generations would silently misalign unrelated
//! cells, so the scheduler verifies the count after every invocation and
//! surfaces [`RenderError::HookMisuse`] on mismatch.
//!
//! # Update queue
//!
//! A [`Setter`] never mutates state synchronously. It enqueues a pending
//! updater on the cell and flags the renderer, which starts a fresh render
//! request. All queued updaters fold into the value, in enqueue order, the
//! next time the fiber's position is evaluated — before the component
//! function runs.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::error::RenderError;

/// Pending functional update against a cell's value.
type Updater = Box<dyn FnOnce(&dyn Any) -> Box<dyn Any>>;

/// One persistent state slot.
struct HookCell {
    value: Box<dyn Any>,
    queue: Vec<Updater>,
}

/// Handle to a state cell, carried on a component fiber.
///
/// Cloning shares the cell: the next generation's fiber and every setter
/// created from the cell all point at the same storage.
#[derive(Clone)]
pub(crate) struct Hook {
    cell: Rc<RefCell<HookCell>>,
}

/// Ordered state cells of one component fiber.
pub(crate) type HookList = SmallVec<[Hook; 4]>;

/// The stateful-value primitive's access point, alive only for the
/// duration of one component invocation.
pub struct Scope {
    /// Cells recorded by the previous generation at this position, if any.
    prev: Option<HookList>,
    /// Cells recorded by this invocation, in call order.
    hooks: HookList,
    /// Shared flag that schedules a fresh render request.
    invalidate: Rc<Cell<bool>>,
}

impl Scope {
    pub(crate) fn new(prev: Option<HookList>, invalidate: Rc<Cell<bool>>) -> Self {
        Self {
            prev,
            hooks: HookList::new(),
            invalidate,
        }
    }

    /// Read (or initialize) the next positional state cell.
    ///
    /// Pending updates queued since the last evaluation fold into the
    /// value first, in enqueue order. Returns the folded value and a
    /// [`Setter`] for scheduling further updates.
    ///
    /// Fails with [`RenderError::HookMisuse`] if the cell at this position
    /// was created with a different value type.
    pub fn use_state<T, F>(&mut self, init: F) -> Result<(T, Setter<T>), RenderError>
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        let index = self.hooks.len();
        let cell = match self.prev.as_ref().and_then(|prev| prev.get(index)) {
            Some(hook) => Rc::clone(&hook.cell),
            None => Rc::new(RefCell::new(HookCell {
                value: Box::new(init()),
                queue: Vec::new(),
            })),
        };

        {
            let mut state = cell.borrow_mut();
            let pending = std::mem::take(&mut state.queue);
            for update in pending {
                let next = update(state.value.as_ref());
                state.value = next;
            }
        }

        let value = cell
            .borrow()
            .value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| {
                RenderError::HookMisuse(format!(
                    "state cell {index} holds a different type than requested"
                ))
            })?;

        self.hooks.push(Hook {
            cell: Rc::clone(&cell),
        });

        Ok((
            value,
            Setter {
                cell,
                invalidate: Rc::clone(&self.invalidate),
                _marker: PhantomData,
            },
        ))
    }

    /// Surrender the recorded cells, verifying the call count against the
    /// previous generation.
    pub(crate) fn finish(self) -> Result<HookList, RenderError> {
        if let Some(prev) = &self.prev {
            if self.hooks.len() != prev.len() {
                return Err(RenderError::HookMisuse(format!(
                    "component used {} state cells, previous render used {}",
                    self.hooks.len(),
                    prev.len()
                )));
            }
        }
        Ok(self.hooks)
    }
}

/// Updater handle for one state cell.
///
/// Usable from anywhere (typically an event handler); updates are queued
/// and applied at the next evaluation of the owning fiber's position.
pub struct Setter<T> {
    cell: Rc<RefCell<HookCell>>,
    invalidate: Rc<Cell<bool>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Setter<T> {
    /// Queue a functional update and schedule a render request.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T + 'static,
    {
        self.cell.borrow_mut().queue.push(Box::new(move |value| {
            let value = value
                .downcast_ref::<T>()
                .expect("state cell holds the setter's value type");
            Box::new(f(value))
        }));
        self.invalidate.set(true);
    }

    /// Queue a replacement value and schedule a render request.
    pub fn set(&self, value: T) {
        self.update(move |_| value);
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            invalidate: Rc::clone(&self.invalidate),
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag() -> Rc<Cell<bool>> {
        Rc::new(Cell::new(false))
    }

    #[test]
    fn first_evaluation_initializes_the_cell() {
        let mut scope = Scope::new(None, flag());
        let (value, _setter) = scope.use_state(|| 41i64).unwrap();
        assert_eq!(value, 41);
        assert_eq!(scope.finish().unwrap().len(), 1);
    }

    #[test]
    fn queued_updates_fold_in_enqueue_order() {
        let mut scope = Scope::new(None, flag());
        let (_, setter) = scope.use_state(|| 10i64).unwrap();
        let hooks = scope.finish().unwrap();

        setter.update(|v| v + 1);
        setter.update(|v| v * 2);
        setter.set(100);
        setter.update(|v| v - 1);

        let mut next = Scope::new(Some(hooks), flag());
        let (value, _) = next.use_state(|| 0i64).unwrap();
        assert_eq!(value, 99);
    }

    #[test]
    fn setter_raises_the_invalidation_flag() {
        let invalidate = flag();
        let mut scope = Scope::new(None, Rc::clone(&invalidate));
        let (_, setter) = scope.use_state(|| 0i64).unwrap();
        assert!(!invalidate.get());

        setter.update(|v| v + 1);
        assert!(invalidate.get());
    }

    #[test]
    fn call_count_mismatch_is_detected() {
        let mut scope = Scope::new(None, flag());
        scope.use_state(|| 1i64).unwrap();
        scope.use_state(|| 2i64).unwrap();
        let hooks = scope.finish().unwrap();

        let mut next = Scope::new(Some(hooks), flag());
        next.use_state(|| 1i64).unwrap();
        assert!(matches!(
            next.finish(),
            Err(RenderError::HookMisuse(_))
        ));
    }

    #[test]
    fn value_type_mismatch_is_detected() {
        let mut scope = Scope::new(None, flag());
        scope.use_state(|| 1i64).unwrap();
        let hooks = scope.finish().unwrap();

        let mut next = Scope::new(Some(hooks), flag());
        let result = next.use_state::<String, _>(String::new);
        assert!(matches!(result, Err(RenderError::HookMisuse(_))));
    }

    #[test]
    fn cells_are_shared_across_generations() {
        let mut scope = Scope::new(None, flag());
        let (_, first_setter) = scope.use_state(|| 0i64).unwrap();
        let hooks = scope.finish().unwrap();

        let mut next = Scope::new(Some(hooks), flag());
        let (_, _) = next.use_state(|| 0i64).unwrap();
        let hooks = next.finish().unwrap();

        // A setter from generation one still reaches the live cell.
        first_setter.set(5);

        let mut third = Scope::new(Some(hooks), flag());
        let (value, _) = third.use_state(|| 0i64).unwrap();
        assert_eq!(value, 5);
    }
}
