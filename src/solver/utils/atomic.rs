// f64 with atomic load and store, stored through its bit pattern
use std::sync::atomic::AtomicU64;
pub(crate) use std::sync::atomic::Ordering;

#[derive(Debug)]
pub(crate) struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub(crate) fn new(v: f64) -> Self {
        Self {
            bits: AtomicU64::new(v.to_bits()),
        }
    }

    pub(crate) fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.bits.load(order))
    }

    pub(crate) fn store(&self, v: f64, order: Ordering) {
        self.bits.store(v.to_bits(), order)
    }
}

#[test]
fn test_atomic_f64() {
    let a = AtomicF64::new(1e30);
    assert_eq!(a.load(Ordering::Relaxed), 1e30);
    a.store(-0.5, Ordering::Relaxed);
    assert_eq!(a.load(Ordering::Relaxed), -0.5);
}
