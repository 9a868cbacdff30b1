use std::any::Any;
use std::fmt;

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};

use crate::error::CopyError;
use crate::reflect::{assign_cloned, ChannelValue, Reflect, ReflectMut, ReflectRef};

/// Error type for channel operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChanError {
    #[error("operation on a null channel")]
    Null,
    #[error("channel is full")]
    Full,
    #[error("channel is empty")]
    Empty,
    #[error("channel is disconnected")]
    Disconnected,
}

/// A nullable channel handle that can both send and receive.
///
/// Clones share the same queue. A deep copy produces a new, empty channel with
/// the same capacity.
pub struct Chan<T> {
    inner: Option<(Sender<T>, Receiver<T>)>,
}

impl<T> Chan<T> {
    /// A channel holding at most `capacity` queued values. Zero capacity makes
    /// every send wait for a matching receive.
    pub fn bounded(capacity: usize) -> Self {
        Chan {
            inner: Some(crossbeam_channel::bounded(capacity)),
        }
    }

    pub fn unbounded() -> Self {
        Chan {
            inner: Some(crossbeam_channel::unbounded()),
        }
    }

    pub fn null() -> Self {
        Chan { inner: None }
    }

    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// Buffer capacity; `None` for unbounded and null channels.
    pub fn capacity(&self) -> Option<usize> {
        self.inner.as_ref().and_then(|(tx, _)| tx.capacity())
    }

    /// Number of queued values.
    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |(tx, _)| tx.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends, blocking while the buffer is full.
    pub fn send(&self, value: T) -> Result<(), ChanError> {
        let (tx, _) = self.inner.as_ref().ok_or(ChanError::Null)?;
        tx.send(value).map_err(|_| ChanError::Disconnected)
    }

    pub fn try_send(&self, value: T) -> Result<(), ChanError> {
        let (tx, _) = self.inner.as_ref().ok_or(ChanError::Null)?;
        tx.try_send(value).map_err(|e| match e {
            TrySendError::Full(_) => ChanError::Full,
            TrySendError::Disconnected(_) => ChanError::Disconnected,
        })
    }

    /// Receives, blocking until a value is available.
    pub fn recv(&self) -> Result<T, ChanError> {
        let (_, rx) = self.inner.as_ref().ok_or(ChanError::Null)?;
        rx.recv().map_err(|_| ChanError::Disconnected)
    }

    pub fn try_recv(&self) -> Result<T, ChanError> {
        let (_, rx) = self.inner.as_ref().ok_or(ChanError::Null)?;
        rx.try_recv().map_err(|e| match e {
            TryRecvError::Empty => ChanError::Empty,
            TryRecvError::Disconnected => ChanError::Disconnected,
        })
    }

    /// True if both handles refer to the same queue.
    pub fn same_channel(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (Some((a, _)), Some((b, _))) => a.same_channel(b),
            _ => false,
        }
    }
}

impl<T> Clone for Chan<T> {
    fn clone(&self) -> Self {
        Chan {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Chan<T> {
    fn default() -> Self {
        Chan::null()
    }
}

impl<T> fmt::Debug for Chan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            None => f.write_str("Chan(null)"),
            Some((tx, _)) => f
                .debug_struct("Chan")
                .field("capacity", &tx.capacity())
                .field("len", &tx.len())
                .finish(),
        }
    }
}

impl<T: 'static> Reflect for Chan<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Channel(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Channel(self)
    }

    fn clone_value(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn new_zeroed(&self) -> Box<dyn Reflect> {
        Box::new(Chan::<T>::null())
    }

    fn assign(&mut self, source: &dyn Reflect) -> Result<(), CopyError> {
        assign_cloned(self, source)
    }
}

impl<T: 'static> ChannelValue for Chan<T> {
    fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    fn capacity(&self) -> Option<usize> {
        Chan::capacity(self)
    }

    fn make(&mut self, capacity: Option<usize>) {
        *self = match capacity {
            Some(capacity) => Chan::bounded(capacity),
            None => Chan::unbounded(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_channel_rejects_traffic() {
        let chan: Chan<u8> = Chan::null();
        assert!(chan.is_null());
        assert_eq!(chan.capacity(), None);
        assert_eq!(chan.try_send(1), Err(ChanError::Null));
        assert_eq!(chan.try_recv(), Err(ChanError::Null));
    }

    #[test]
    fn bounded_channel_fills_up() {
        let chan = Chan::bounded(2);
        assert_eq!(chan.capacity(), Some(2));
        chan.try_send("a").unwrap();
        chan.try_send("b").unwrap();
        assert_eq!(chan.try_send("c"), Err(ChanError::Full));
        assert_eq!(chan.len(), 2);
        assert_eq!(chan.recv(), Ok("a"));
        assert_eq!(chan.try_recv(), Ok("b"));
        assert_eq!(chan.try_recv(), Err(ChanError::Empty));
    }

    #[test]
    fn clones_share_queue() {
        let a = Chan::unbounded();
        let b = a.clone();
        assert!(a.same_channel(&b));
        a.send(10u32).unwrap();
        assert_eq!(b.try_recv(), Ok(10));
    }

    #[test]
    fn make_creates_fresh_channel() {
        let source = Chan::bounded(4);
        source.send(1u8).unwrap();

        let mut target: Chan<u8> = Chan::null();
        ChannelValue::make(&mut target, ChannelValue::capacity(&source));
        assert_eq!(target.capacity(), Some(4));
        assert!(target.is_empty());
        assert!(!target.same_channel(&source));

        ChannelValue::make(&mut target, None);
        assert_eq!(target.capacity(), None);
    }
}
