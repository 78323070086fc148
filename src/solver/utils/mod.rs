//! Internal utility functions and helpers.

use std::collections::TryReserveError;

pub(crate) mod atomic;
pub(crate) mod infbounds;

// a drop-in replacement for the julia "findall" function,
// which serves as a vectorized version of the std::iter::position
// returning indices of *all* elements satisfying a predicate

pub(crate) trait PositionAll<T>: Iterator<Item = T> {
    fn position_all<F>(&mut self, predicate: F) -> Vec<usize>
    where
        F: FnMut(&T) -> bool;
}

impl<T, I> PositionAll<T> for I
where
    I: Iterator<Item = T>,
{
    fn position_all<F>(&mut self, mut f: F) -> Vec<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.enumerate()
            .filter(|(_, item)| f(item))
            .map(|(index, _)| index)
            .collect::<Vec<_>>()
    }
}

// Allocates a vector of length n filled with `value`, reporting
// exhaustion as an error rather than aborting.
pub(crate) fn try_alloc_vec<T: Clone>(value: T, n: usize) -> Result<Vec<T>, TryReserveError> {
    let mut v = Vec::new();
    v.try_reserve_exact(n)?;
    v.resize(n, value);
    Ok(v)
}

// -------------
// testing

#[test]
fn test_position_all() {
    let test = [3, 1, 0, 5, 9];
    let idx = test.iter().position_all(|&v| *v > 2);
    assert_eq!(idx, vec![0, 3, 4]);

    let idx = test.iter().position_all(|&v| *v == 2);
    assert_eq!(idx, Vec::<usize>::new());
}

#[test]
fn test_try_alloc_vec() {
    let v = try_alloc_vec(1.5, 4).unwrap();
    assert_eq!(v, vec![1.5; 4]);
    assert!(try_alloc_vec(0u64, usize::MAX / 2).is_err());
}
