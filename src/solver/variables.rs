use super::utils::try_alloc_vec;
use crate::algebra::*;
use std::collections::TryReserveError;

/// ADMM iterates in scaled space, along with the work vectors used by
/// each iteration.
#[derive(Debug, Clone)]
pub(crate) struct Variables<T> {
    pub x: Vec<T>,
    pub z: Vec<T>,
    pub y: Vec<T>,
    pub x_prev: Vec<T>,
    pub z_prev: Vec<T>,
    // KKT solution [x̃; ν] and right hand side
    pub xtilde_nu: Vec<T>,
    pub rhs: Vec<T>,
    pub ztilde: Vec<T>,
    // successive differences, used for infeasibility detection
    pub delta_x: Vec<T>,
    pub delta_y: Vec<T>,
}

impl<T> Variables<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            x: try_alloc_vec(T::zero(), n)?,
            z: try_alloc_vec(T::zero(), m)?,
            y: try_alloc_vec(T::zero(), m)?,
            x_prev: try_alloc_vec(T::zero(), n)?,
            z_prev: try_alloc_vec(T::zero(), m)?,
            xtilde_nu: try_alloc_vec(T::zero(), n + m)?,
            rhs: try_alloc_vec(T::zero(), n + m)?,
            ztilde: try_alloc_vec(T::zero(), m)?,
            delta_x: try_alloc_vec(T::zero(), n)?,
            delta_y: try_alloc_vec(T::zero(), m)?,
        })
    }

    pub fn cold_start(&mut self) {
        self.x.set(T::zero());
        self.z.set(T::zero());
        self.y.set(T::zero());
    }

    pub fn n(&self) -> usize {
        self.x.len()
    }

    pub fn m(&self) -> usize {
        self.z.len()
    }
}
