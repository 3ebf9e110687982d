//! Reusable record buffers
//!
//! Every builder borrows its buffer from a [`BufferPool`] and gives it back
//! when it is dropped, so steady-state logging does not allocate. Buffers
//! are sorted into power-of-two capacity classes; a request is served from
//! the smallest class that is large enough.
//!
//! A buffer is owned by exactly one [`PooledBuf`] at a time. The handle is
//! not `Clone`, and releasing happens in `Drop`, so a buffer cannot be used
//! after it went back to the pool.

use crossbeam::queue::SegQueue;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// Capacity of the smallest class, and the default record buffer size.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;

/// Number of capacity classes: 8 KiB up to 1 MiB.
const CLASS_COUNT: usize = 8;

/// Free buffers kept per class. Releases beyond this are dropped.
const MAX_IDLE_PER_CLASS: usize = 1024;

/// Metrics for buffer pool monitoring
#[derive(Debug, Default)]
pub struct BufferPoolMetrics {
    /// Acquisitions served from an idle buffer
    pub hits: AtomicU64,

    /// Acquisitions that had to allocate
    pub misses: AtomicU64,

    /// Buffers returned to a free list
    pub returns: AtomicU64,

    /// Buffers dropped on release (too small, too large, or class full)
    pub drops: AtomicU64,
}

impl BufferPoolMetrics {
    pub const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            returns: AtomicU64::new(0),
            drops: AtomicU64::new(0),
        }
    }

    /// Get snapshot of metrics
    pub fn snapshot(&self) -> PoolMetricsSnapshot {
        PoolMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of buffer pool metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub returns: u64,
    pub drops: u64,
}

impl PoolMetricsSnapshot {
    /// Fraction of acquisitions served without allocating (1.0 when idle)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            1.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Unbounded-in-spirit cache of idle byte buffers, keyed by capacity class.
pub struct BufferPool {
    classes: [SegQueue<Vec<u8>>; CLASS_COUNT],
    metrics: BufferPoolMetrics,
}

impl BufferPool {
    pub fn new() -> Self {
        Self {
            classes: std::array::from_fn(|_| SegQueue::new()),
            metrics: BufferPoolMetrics::new(),
        }
    }

    /// The process-wide pool shared by every builder.
    pub fn global() -> &'static BufferPool {
        static GLOBAL: OnceLock<BufferPool> = OnceLock::new();
        GLOBAL.get_or_init(BufferPool::new)
    }

    /// Capacity of class `index`.
    #[inline]
    fn class_capacity(index: usize) -> usize {
        DEFAULT_BUFFER_CAPACITY << index
    }

    /// Smallest class whose buffers hold at least `min_capacity` bytes.
    fn class_for_request(min_capacity: usize) -> Option<usize> {
        (0..CLASS_COUNT).find(|&i| Self::class_capacity(i) >= min_capacity)
    }

    /// Largest class a buffer of `capacity` bytes can serve.
    fn class_for_release(capacity: usize) -> Option<usize> {
        (0..CLASS_COUNT)
            .rev()
            .find(|&i| Self::class_capacity(i) <= capacity)
    }

    /// Take an empty buffer with room for at least `min_capacity` bytes.
    ///
    /// The returned buffer always has length zero, whatever it held before.
    pub fn acquire(&self, min_capacity: usize) -> PooledBuf<'_> {
        let class = Self::class_for_request(min_capacity);
        let reused = class.and_then(|c| self.classes[c].pop());
        let buf = match reused {
            Some(mut buf) => {
                self.metrics.hits.fetch_add(1, Ordering::Relaxed);
                buf.clear();
                buf
            }
            None => {
                self.metrics.misses.fetch_add(1, Ordering::Relaxed);
                let capacity = class.map_or(min_capacity, Self::class_capacity);
                Vec::with_capacity(capacity)
            }
        };
        PooledBuf { buf, pool: self }
    }

    /// Take an empty buffer of the default record size.
    #[inline]
    pub fn acquire_default(&self) -> PooledBuf<'_> {
        self.acquire(DEFAULT_BUFFER_CAPACITY)
    }

    fn release(&self, buf: Vec<u8>) {
        if buf.capacity() == 0 {
            return;
        }
        // Buffers that grew past the largest class are not kept around.
        let too_large = buf.capacity() > Self::class_capacity(CLASS_COUNT - 1) * 2;
        match Self::class_for_release(buf.capacity()) {
            Some(class) if !too_large && self.classes[class].len() < MAX_IDLE_PER_CLASS => {
                self.classes[class].push(buf);
                self.metrics.returns.fetch_add(1, Ordering::Relaxed);
            }
            _ => {
                self.metrics.drops.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of idle buffers across all classes
    pub fn available(&self) -> usize {
        self.classes.iter().map(SegQueue::len).sum()
    }

    pub fn metrics(&self) -> &BufferPoolMetrics {
        &self.metrics
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive handle on a pooled buffer; returns it to its pool on drop.
pub struct PooledBuf<'p> {
    buf: Vec<u8>,
    pool: &'p BufferPool,
}

impl PooledBuf<'_> {
    /// Keep the buffer, detaching it from the pool.
    pub fn into_inner(mut self) -> Vec<u8> {
        // The empty replacement has no capacity and is not pooled.
        std::mem::take(&mut self.buf)
    }
}

impl Deref for PooledBuf<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuf<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuf<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

impl std::fmt::Debug for PooledBuf<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuf")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_acquire_from_empty_pool_allocates() {
        let pool = BufferPool::new();
        let buf = pool.acquire_default();
        assert!(buf.capacity() >= DEFAULT_BUFFER_CAPACITY);
        assert!(buf.is_empty());

        let snapshot = pool.metrics().snapshot();
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.hits, 0);
    }

    #[test]
    fn test_drop_returns_buffer() {
        let pool = BufferPool::new();
        {
            let _buf = pool.acquire_default();
            assert_eq!(pool.available(), 0);
        }
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.metrics().snapshot().returns, 1);
    }

    #[test]
    fn test_reacquired_buffer_is_empty() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.acquire_default();
            buf.extend_from_slice(b"leftover bytes from a previous record");
        }
        let buf = pool.acquire_default();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= DEFAULT_BUFFER_CAPACITY);
        assert_eq!(pool.metrics().snapshot().hits, 1);
    }

    #[test]
    fn test_capacity_classes() {
        let pool = BufferPool::new();
        let big = pool.acquire(20_000);
        assert!(big.capacity() >= 32 * 1024);
        drop(big);

        // A default-size request must not be served by the larger class.
        let small = pool.acquire_default();
        assert_eq!(pool.metrics().snapshot().hits, 0);
        drop(small);

        let big_again = pool.acquire(20_000);
        assert_eq!(pool.metrics().snapshot().hits, 1);
        drop(big_again);
    }

    #[test]
    fn test_grown_buffer_moves_up_a_class() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.acquire_default();
            buf.reserve(3 * DEFAULT_BUFFER_CAPACITY);
        }
        let buf = pool.acquire(2 * DEFAULT_BUFFER_CAPACITY);
        assert_eq!(pool.metrics().snapshot().hits, 1);
        assert!(buf.capacity() >= 2 * DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn test_small_request_uses_smallest_class() {
        let pool = BufferPool::new();
        let buf = pool.acquire(16);
        assert!(buf.capacity() >= DEFAULT_BUFFER_CAPACITY);
        drop(buf);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_into_inner_detaches() {
        let pool = BufferPool::new();
        let detached = pool.acquire_default().into_inner();
        assert!(detached.capacity() >= DEFAULT_BUFFER_CAPACITY);
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.metrics().snapshot().drops, 0);
    }

    #[test]
    fn test_oversized_request_not_pooled() {
        let pool = BufferPool::new();
        let huge = pool.acquire(64 * 1024 * 1024);
        assert!(huge.capacity() >= 64 * 1024 * 1024);
        drop(huge);
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.metrics().snapshot().drops, 1);
    }

    #[test]
    fn test_hit_rate() {
        let snapshot = PoolMetricsSnapshot::default();
        assert_eq!(snapshot.hit_rate(), 1.0);

        let snapshot = PoolMetricsSnapshot {
            hits: 3,
            misses: 1,
            returns: 0,
            drops: 0,
        };
        assert!((snapshot.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_concurrent_exclusive_access() {
        let pool = Arc::new(BufferPool::new());
        let mut handles = Vec::new();

        for t in 0..8u8 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                for _ in 0..500 {
                    let mut buf = pool.acquire_default();
                    assert!(buf.is_empty());
                    buf.extend_from_slice(&[t; 64]);
                    assert!(buf.iter().all(|&b| b == t));
                }
            }));
        }

        for handle in handles {
            handle.join().expect("worker panicked");
        }
        assert!(pool.available() <= 8);
    }
}
