use std::sync::Arc;

use parking_lot::RwLock;

pub type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

pub trait ReadExecutor<T: ?Sized> {
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R;
}

impl<T> ReadExecutor<T> for Atomic<T> {
    #[inline]
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let read_guard = self.read();
        f(&*read_guard)
    }
}

pub trait WriteExecutor<T: ?Sized> {
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

impl<T> WriteExecutor<T> for Atomic<T> {
    #[inline]
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        // parking_lot locks are not reentrant, never call back into the same Atomic from `f`
        let mut write_guard = self.write();
        f(&mut *write_guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic() {
        let atomic_value = atomic(5);
        assert_eq!(*atomic_value.read(), 5);
    }

    #[test]
    fn test_read_with() {
        let atomic_value = atomic(vec![1, 2, 3]);
        let result = atomic_value.read_with(|value| value.len());
        assert_eq!(result, 3);
    }

    #[test]
    fn test_write_with() {
        let atomic_value = atomic(5);
        let previous = atomic_value.write_with(|value| std::mem::replace(value, 10));
        assert_eq!(previous, 5);
        assert_eq!(*atomic_value.read(), 10);
    }

    #[test]
    fn test_clones_share_state() {
        let first = atomic(0);
        let second = first.clone();
        second.write_with(|value| *value += 1);
        assert_eq!(first.read_with(|value| *value), 1);
    }
}
