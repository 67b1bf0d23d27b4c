//! Reactive Cells
//!
//! Small observable-value toolkit backing the wallet store:
//! - [`Atom`]: a writable cell that notifies listeners when its value changes
//! - [`Computed`]: a derived cell re-evaluated from its inputs
//! - [`ReadOnly`]: a read-only view of an [`Atom`] handed out to consumers
//! - [`Subscription`]: RAII handle, dropping it removes the listener
//!
//! Notifications are queued per thread and delivered breadth-first: a value
//! set from inside a listener is delivered after the notification currently
//! being delivered. [`batch`] defers every notification raised inside the
//! closure until it returns, so listeners never observe a half-applied update.

mod subscription;

pub use subscription::Subscription;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;
type Job = Box<dyn FnOnce()>;

thread_local! {
    static PENDING: RefCell<Option<VecDeque<Job>>> = const { RefCell::new(None) };
}

/// Lock a mutex, recovering the data if a listener panicked while holding it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ResetQueue;

impl Drop for ResetQueue {
    fn drop(&mut self) {
        PENDING.with(|pending| *pending.borrow_mut() = None);
    }
}

/// Run `f`, delivering the notifications it raises only once it returns.
///
/// Nested calls join the outermost batch.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    let outermost = PENDING.with(|pending| {
        let mut pending = pending.borrow_mut();
        if pending.is_some() {
            false
        } else {
            *pending = Some(VecDeque::new());
            true
        }
    });
    if !outermost {
        return f();
    }

    let _reset = ResetQueue;
    let result = f();
    while let Some(job) =
        PENDING.with(|pending| pending.borrow_mut().as_mut().and_then(VecDeque::pop_front))
    {
        job();
    }
    result
}

fn enqueue(job: Job) {
    batch(|| {
        PENDING.with(|pending| {
            if let Some(queue) = pending.borrow_mut().as_mut() {
                queue.push_back(job);
            }
        })
    });
}

// =========================================================================
// Readable
// =========================================================================

/// Common read side of every cell
pub trait Readable {
    type Value;

    /// Current value
    fn get(&self) -> Self::Value;

    /// Call `listener` on every future change
    fn listen<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Self::Value) + Send + Sync + 'static;

    /// Call `listener` now with the current value, then on every change
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Self::Value) + Send + Sync + 'static,
    {
        listener(&self.get());
        self.listen(listener)
    }
}

/// Type-erased change source, used to declare the inputs of a [`Computed`]
pub trait Source: Send + Sync {
    fn watch(&self, on_change: Arc<dyn Fn() + Send + Sync>) -> Subscription;
}

impl<R> Source for R
where
    R: Readable + Send + Sync,
    R::Value: 'static,
{
    fn watch(&self, on_change: Arc<dyn Fn() + Send + Sync>) -> Subscription {
        self.listen(move |_| on_change())
    }
}

// =========================================================================
// Atom
// =========================================================================

struct AtomInner<T> {
    value: Mutex<T>,
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_id: AtomicU64,
    changed: Notify,
}

/// Writable observable cell
pub struct Atom<T> {
    inner: Arc<AtomInner<T>>,
}

impl<T> Clone for Atom<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Atom<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(AtomInner {
                value: Mutex::new(value),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                changed: Notify::new(),
            }),
        }
    }

    /// Store `value` and notify listeners if it differs from the current one
    pub fn set(&self, value: T) {
        {
            let mut current = lock(&self.inner.value);
            if *current == value {
                return;
            }
            *current = value.clone();
        }
        self.inner.changed.notify_waiters();

        let listeners: Vec<Listener<T>> = lock(&self.inner.listeners)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        if listeners.is_empty() {
            return;
        }
        enqueue(Box::new(move || {
            for listener in &listeners {
                listener(&value);
            }
        }));
    }

    /// Read-only view sharing this cell
    pub fn read_only(&self) -> ReadOnly<T> {
        ReadOnly { atom: self.clone() }
    }

    /// Derived cell computed from this one
    pub fn map<U, F>(&self, f: F) -> Computed<U>
    where
        U: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        Computed::new(&[self], move || f(&source.get()))
    }

    /// Wait until the value satisfies `predicate` and return it
    pub async fn wait_for(&self, predicate: impl Fn(&T) -> bool) -> T {
        loop {
            let changed = self.inner.changed.notified();
            let value = self.get();
            if predicate(&value) {
                return value;
            }
            changed.await;
        }
    }
}

impl<T> Readable for Atom<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    type Value = T;

    fn get(&self) -> T {
        lock(&self.inner.value).clone()
    }

    fn listen<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push((id, Arc::new(listener)));

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            let Some(inner) = weak.upgrade() else { return };
            let removed = {
                let mut listeners = lock(&inner.listeners);
                listeners
                    .iter()
                    .position(|(listener_id, _)| *listener_id == id)
                    .map(|index| listeners.remove(index))
            };
            drop(removed);
        })
    }
}

impl<T> fmt::Debug for Atom<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Atom").field(&*lock(&self.inner.value)).finish()
    }
}

// =========================================================================
// ReadOnly
// =========================================================================

/// Read-only view of an [`Atom`]
pub struct ReadOnly<T> {
    atom: Atom<T>,
}

impl<T> Clone for ReadOnly<T> {
    fn clone(&self) -> Self {
        Self {
            atom: self.atom.clone(),
        }
    }
}

impl<T> ReadOnly<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub async fn wait_for(&self, predicate: impl Fn(&T) -> bool) -> T {
        self.atom.wait_for(predicate).await
    }
}

impl<T> Readable for ReadOnly<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    type Value = T;

    fn get(&self) -> T {
        self.atom.get()
    }

    fn listen<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.atom.listen(listener)
    }
}

impl<T> fmt::Debug for ReadOnly<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadOnly")
            .field(&*lock(&self.atom.inner.value))
            .finish()
    }
}

// =========================================================================
// Computed
// =========================================================================

/// Derived cell.
///
/// `get` always evaluates the function against the current inputs; listeners
/// are notified when an input change yields a different value.
pub struct Computed<T> {
    cache: Atom<T>,
    compute: Arc<dyn Fn() -> T + Send + Sync>,
    _sources: Arc<Vec<Subscription>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            compute: self.compute.clone(),
            _sources: self._sources.clone(),
        }
    }
}

impl<T> Computed<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Derive a cell from `sources`; `compute` reads them itself
    pub fn new<F>(sources: &[&dyn Source], compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let compute: Arc<dyn Fn() -> T + Send + Sync> = Arc::new(compute);
        let cache = Atom::new(compute());
        let subscriptions = sources
            .iter()
            .map(|source| {
                let cache = cache.clone();
                let compute = compute.clone();
                source.watch(Arc::new(move || cache.set(compute())))
            })
            .collect();

        Self {
            cache,
            compute,
            _sources: Arc::new(subscriptions),
        }
    }

    pub async fn wait_for(&self, predicate: impl Fn(&T) -> bool) -> T {
        loop {
            let changed = self.cache.inner.changed.notified();
            let value = self.get();
            if predicate(&value) {
                return value;
            }
            changed.await;
        }
    }
}

impl<T> Readable for Computed<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    type Value = T;

    fn get(&self) -> T {
        (self.compute)()
    }

    fn listen<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.cache.listen(listener)
    }
}

impl<T> fmt::Debug for Computed<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Computed").field(&(self.compute)()).finish()
    }
}
