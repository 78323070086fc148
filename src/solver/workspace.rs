#![allow(non_snake_case)]

use super::engine::Engine;
use super::errors::{DataValidationError, SolverError};
use super::info::SolveInfo;
use super::settings::Settings;
use super::solution::Solution;
use super::status::{SolverStatus, WorkspaceState};
use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use std::io::Write;

/// Partial update of the vector data.  Fields left as `None` keep their
/// current values.

#[derive(Debug, Clone, Copy)]
pub struct ProblemUpdate<'a, T> {
    pub q: Option<&'a [T]>,
    pub l: Option<&'a [T]>,
    pub u: Option<&'a [T]>,
}

impl<'a, T> Default for ProblemUpdate<'a, T> {
    fn default() -> Self {
        Self {
            q: None,
            l: None,
            u: None,
        }
    }
}

/// New values for the stored entries of a matrix.
///
/// With `indices = None` the values replace every stored entry, in
/// storage order.  Otherwise `values[i]` is written to stored position
/// `indices[i]`.  Storage order is column-major over the upper triangle
/// for P, with row indices sorted within each column.

#[derive(Debug, Clone, Copy)]
pub struct MatrixUpdate<'a, T> {
    pub values: &'a [T],
    pub indices: Option<&'a [usize]>,
}

impl<'a, T> MatrixUpdate<'a, T> {
    /// Replaces every stored entry
    pub fn full(values: &'a [T]) -> Self {
        Self {
            values,
            indices: None,
        }
    }

    /// Replaces the stored entries at the given positions
    pub fn partial(values: &'a [T], indices: &'a [usize]) -> Self {
        Self {
            values,
            indices: Some(indices),
        }
    }

    fn as_tuple(&self) -> (&'a [T], Option<&'a [usize]>) {
        (self.values, self.indices)
    }
}

/// Solver workspace for a single QP.
///
/// Created by [`setup`](Workspace::setup), after which the problem data
/// may be updated and re-solved any number of times.  After
/// [`cleanup`](Workspace::cleanup) all resources are released and every
/// further call returns [`SolverError::WorkspaceNotInit`].

pub struct Workspace<T: FloatT = f64> {
    engine: Option<Box<Engine<T>>>,
    stream: PrintTarget,
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    /// Validates the problem data and settings, scales the problem and
    /// factors the KKT system.
    ///
    /// `P` must be symmetric and may be given in full or upper triangular
    /// form.  Only its upper triangle is used.
    pub fn setup(
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        q: &[T],
        l: &[T],
        u: &[T],
        settings: Settings<T>,
    ) -> Result<Self, SolverError> {
        let engine = Engine::new(P, A, q, l, u, settings).map_err(|e| {
            log::info!("setup failed: {}", e);
            e
        })?;
        Ok(Self {
            engine: Some(Box::new(engine)),
            stream: PrintTarget::default(),
        })
    }

    fn engine(&self) -> Result<&Engine<T>, SolverError> {
        self.engine.as_deref().ok_or(SolverError::WorkspaceNotInit)
    }

    fn engine_mut(&mut self) -> Result<&mut Engine<T>, SolverError> {
        self.engine.as_deref_mut().ok_or(SolverError::WorkspaceNotInit)
    }

    /// Runs the solver and returns the solution in the units of the
    /// original problem
    pub fn solve(&mut self) -> Result<&Solution<T>, SolverError> {
        let engine = self
            .engine
            .as_deref_mut()
            .ok_or(SolverError::WorkspaceNotInit)?;

        if let Err(e) = engine.solve(&mut self.stream) {
            engine.state = WorkspaceState::Ready;
            return Err(e);
        }
        Ok(&engine.solution)
    }

    // ---------------------------------
    // data updates
    // ---------------------------------

    /// Updates any of the linear cost and the bounds.  A new lower bound
    /// is validated against the current upper bound and vice versa.
    pub fn update(&mut self, update: &ProblemUpdate<T>) -> Result<(), SolverError> {
        self.engine_mut()?
            .update_data(update.q, update.l, update.u)
    }

    pub fn update_lin_cost(&mut self, q: &[T]) -> Result<(), SolverError> {
        self.engine_mut()?.update_data(Some(q), None, None)
    }

    pub fn update_bounds(&mut self, l: &[T], u: &[T]) -> Result<(), SolverError> {
        self.engine_mut()?.update_data(None, Some(l), Some(u))
    }

    pub fn update_lower_bound(&mut self, l: &[T]) -> Result<(), SolverError> {
        self.engine_mut()?.update_data(None, Some(l), None)
    }

    pub fn update_upper_bound(&mut self, u: &[T]) -> Result<(), SolverError> {
        self.engine_mut()?.update_data(None, None, Some(u))
    }

    /// Updates values of P and/or A.  The sparsity patterns are unchanged.
    pub fn update_matrices(
        &mut self,
        P: Option<MatrixUpdate<T>>,
        A: Option<MatrixUpdate<T>>,
    ) -> Result<(), SolverError> {
        let Px = P.as_ref().map(MatrixUpdate::as_tuple);
        let Ax = A.as_ref().map(MatrixUpdate::as_tuple);
        self.engine_mut()?.update_matrices(Px, Ax)
    }

    pub fn update_P(&mut self, values: &[T], indices: Option<&[usize]>) -> Result<(), SolverError> {
        self.update_matrices(Some(MatrixUpdate { values, indices }), None)
    }

    pub fn update_A(&mut self, values: &[T], indices: Option<&[usize]>) -> Result<(), SolverError> {
        self.update_matrices(None, Some(MatrixUpdate { values, indices }))
    }

    /// Sets the starting point of the next solve from unscaled primal
    /// and/or dual values.  The next solve starts here even if
    /// `warm_start` is disabled in the settings.
    pub fn warm_start(&mut self, x: Option<&[T]>, y: Option<&[T]>) -> Result<(), SolverError> {
        let engine = self.engine_mut()?;
        let (n, m) = (engine.data.n, engine.data.m);

        for (v, len, name) in [(x, n, "x"), (y, m, "y")] {
            if let Some(v) = v {
                if v.len() != len {
                    return Err(DataValidationError::IncompatibleDimension(name).into());
                }
                if !v.is_finite() {
                    return Err(DataValidationError::NotFinite(name).into());
                }
            }
        }
        engine.warm_start(x, y);
        Ok(())
    }

    /// Releases all resources.  Every later call, including a second
    /// cleanup, returns [`SolverError::WorkspaceNotInit`].
    pub fn cleanup(&mut self) -> Result<(), SolverError> {
        match self.engine.take() {
            Some(_) => {
                log::info!("workspace cleaned up");
                if let Err(e) = self.stream.flush() {
                    log::warn!("failed to flush solver output: {}", e);
                }
                Ok(())
            }
            None => Err(SolverError::WorkspaceNotInit),
        }
    }

    // ---------------------------------
    // accessors
    // ---------------------------------

    /// Solution of the most recent solve
    pub fn solution(&self) -> Result<&Solution<T>, SolverError> {
        Ok(&self.engine()?.solution)
    }

    pub fn info(&self) -> Result<&SolveInfo<T>, SolverError> {
        Ok(&self.engine()?.info)
    }

    pub fn settings(&self) -> Result<&Settings<T>, SolverError> {
        Ok(&self.engine()?.settings)
    }

    pub fn state(&self) -> WorkspaceState {
        self.engine
            .as_ref()
            .map_or(WorkspaceState::Cleaned, |e| e.state)
    }

    pub fn status(&self) -> Result<SolverStatus, SolverError> {
        Ok(self.engine()?.info.status)
    }

    /// Current scalar penalty parameter
    pub fn rho(&self) -> Result<T, SolverError> {
        Ok(self.engine()?.rho.rho)
    }
}

impl<T> ConfigurablePrintTarget for Workspace<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn print_to_sink(&mut self) {
        self.stream.print_to_sink()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}
