#![allow(non_snake_case)]
use crate::algebra::*;

// scaling factors outside this range are limited before use
pub(crate) const MIN_SCALING: f64 = 1e-4;
pub(crate) const MAX_SCALING: f64 = 1e4;

// ---------------
// equilibration data
// ---------------

/// Data from the Ruiz equilibration procedure.
///
/// The scaled problem has data `P̃ = cDPD`, `q̃ = cDq`, `Ã = EAD` and
/// bounds `l̃ = El`, `ũ = Eu`.
#[derive(Debug, Clone)]
pub struct Scaling<T> {
    /// Vector of variable scaling terms
    pub d: Vec<T>,
    /// Vector of inverse variable scaling terms
    pub dinv: Vec<T>,
    /// Vector of constraint scaling terms
    pub e: Vec<T>,
    /// Vector of inverse constraint scaling terms
    pub einv: Vec<T>,
    /// overall scaling for objective function
    pub c: T,
    /// inverse of the objective scaling
    pub cinv: T,
}

impl<T> Scaling<T>
where
    T: FloatT,
{
    /// identity scaling for a problem with n variables and m constraints
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            d: vec![T::one(); n],
            dinv: vec![T::one(); n],
            e: vec![T::one(); m],
            einv: vec![T::one(); m],
            c: T::one(),
            cinv: T::one(),
        }
    }

    /// Computes Ruiz scaling over `passes` iterations and applies it in
    /// place to the problem data.  The bounds are scaled once at the end.
    /// Any scaling already held is discarded.
    pub(crate) fn equilibrate(
        &mut self,
        P: &mut CscMatrix<T>,
        A: &mut CscMatrix<T>,
        q: &mut [T],
        l: &mut [T],
        u: &mut [T],
        passes: u32,
    ) {
        let (d, e) = (&mut self.d, &mut self.e);
        d.set(T::one());
        e.set(T::one());
        self.c = T::one();

        // use the inverse scalings as work vectors
        let dwork = &mut self.dinv;
        let ework = &mut self.einv;

        for _ in 0..passes {
            kkt_col_norms(P, A, dwork, ework);

            dwork.scalarop(limit_scaling);
            ework.scalarop(limit_scaling);

            dwork.rsqrt();
            ework.rsqrt();

            P.lrscale(dwork, dwork);
            A.lrscale(ework, dwork);
            q.hadamard(dwork);

            d.hadamard(dwork);
            e.hadamard(ework);

            // cost scaling from the mean column norm of the newly
            // scaled P and the size of q
            P.col_norms_sym(dwork);
            let mean_col_norm_P = dwork.mean();
            let inf_norm_q = limit_scaling(q.norm_inf());

            let scale_cost = limit_scaling(T::max(mean_col_norm_P, inf_norm_q));
            let ctmp = T::recip(scale_cost);

            P.scale(ctmp);
            q.scale(ctmp);
            self.c *= ctmp;
        }

        l.hadamard(e);
        u.hadamard(e);

        self.dinv.scalarop_from(T::recip, d);
        self.einv.scalarop_from(T::recip, e);
        self.cinv = T::recip(self.c);
    }

    // --------------------------------------
    // conversions between scaled and unscaled iterates
    // --------------------------------------

    /// x̃ = D⁻¹x
    pub fn scale_x(&self, xs: &mut [T], x: &[T]) {
        xs.copy_from(x).hadamard(&self.dinv);
    }

    /// ỹ = cE⁻¹y
    pub fn scale_y(&self, ys: &mut [T], y: &[T]) {
        ys.copy_from(y).hadamard(&self.einv).scale(self.c);
    }

    /// z̃ = Ez
    pub fn scale_z(&self, zs: &mut [T], z: &[T]) {
        zs.copy_from(z).hadamard(&self.e);
    }

    /// x = Dx̃
    pub fn unscale_x(&self, x: &mut [T], xs: &[T]) {
        x.copy_from(xs).hadamard(&self.d);
    }

    /// y = Eỹ/c
    pub fn unscale_y(&self, y: &mut [T], ys: &[T]) {
        y.copy_from(ys).hadamard(&self.e).scale(self.cinv);
    }

    /// z = E⁻¹z̃
    pub fn unscale_z(&self, z: &mut [T], zs: &[T]) {
        z.copy_from(zs).hadamard(&self.einv);
    }
}

// column norms of the KKT matrix [P A'; A 0]
fn kkt_col_norms<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    norm_LHS: &mut [T],
    norm_RHS: &mut [T],
) {
    P.col_norms_sym(norm_LHS); // P can be triu
    A.col_norms_no_reset(norm_LHS); // incrementally from P norms
    A.row_norms(norm_RHS); // same as column norms of A'
}

fn limit_scaling<T: FloatT>(s: T) -> T {
    s.clip(
        MIN_SCALING.as_T(),
        MAX_SCALING.as_T(),
        T::one(),
        MAX_SCALING.as_T(),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_data() -> (CscMatrix<f64>, CscMatrix<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![400., 1., 0.02]);
        let A = CscMatrix::from(&[
            [1., 1.], //
            [100., 0.], //
            [0., 0.001], //
        ]);
        let q = vec![10., -0.1];
        let l = vec![1., 0., -1e30];
        let u = vec![1., 70., 0.7];
        (P, A, q, l, u)
    }

    #[test]
    fn test_equilibrate_identity_when_disabled() {
        let (mut P, mut A, mut q, mut l, mut u) = test_data();
        let (P0, A0, q0) = (P.clone(), A.clone(), q.clone());

        let mut scaling = Scaling::new(2, 3);
        scaling.equilibrate(&mut P, &mut A, &mut q, &mut l, &mut u, 0);

        assert_eq!(P, P0);
        assert_eq!(A, A0);
        assert_eq!(q, q0);
        assert_eq!(scaling.c, 1.);
        assert!(scaling.d.iter().all(|&d| d == 1.));
    }

    #[test]
    fn test_equilibrate_applies_scaling() {
        let (mut P, mut A, mut q, mut l, mut u) = test_data();
        let (P0, A0, q0, l0, u0) = (P.clone(), A.clone(), q.clone(), l.clone(), u.clone());

        let mut scaling = Scaling::new(2, 3);
        scaling.equilibrate(&mut P, &mut A, &mut q, &mut l, &mut u, 10);

        // scaled data equals cDPD, EAD, cDq, El, Eu
        let mut Pchk = P0.clone();
        Pchk.lrscale(&scaling.d, &scaling.d);
        Pchk.scale(scaling.c);
        assert!(Pchk.nzval.norm_inf_diff(&P.nzval) <= 1e-10 * P.nzval.norm_inf());

        let mut Achk = A0.clone();
        Achk.lrscale(&scaling.e, &scaling.d);
        assert!(Achk.nzval.norm_inf_diff(&A.nzval) <= 1e-10 * A.nzval.norm_inf());

        let mut qchk = q0.clone();
        qchk.hadamard(&scaling.d).scale(scaling.c);
        assert!(qchk.norm_inf_diff(&q) <= 1e-10 * q.norm_inf());

        for i in 0..3 {
            assert_eq!(l[i], l0[i] * scaling.e[i]);
            assert_eq!(u[i], u0[i] * scaling.e[i]);
        }

        // the column norms of the scaled KKT matrix are better balanced
        let (mut dn, mut en) = (vec![0.; 2], vec![0.; 3]);
        kkt_col_norms(&P0, &A0, &mut dn, &mut en);
        let before = dn.iter().chain(&en).fold(0f64, |a, &b| a.max(b))
            / dn.iter().chain(&en).fold(f64::INFINITY, |a, &b| a.min(b));

        let mut Pc = P.clone();
        Pc.scale(scaling.cinv);
        kkt_col_norms(&Pc, &A, &mut dn, &mut en);
        let after = dn.iter().chain(&en).fold(0f64, |a, &b| a.max(b))
            / dn.iter().chain(&en).fold(f64::INFINITY, |a, &b| a.min(b));
        assert!(after < before);
    }

    #[test]
    fn test_equilibrate_deterministic() {
        let (mut P1, mut A1, mut q1, mut l1, mut u1) = test_data();
        let (mut P2, mut A2, mut q2, mut l2, mut u2) = test_data();

        let mut s1 = Scaling::new(2, 3);
        let mut s2 = Scaling::new(2, 3);
        s1.equilibrate(&mut P1, &mut A1, &mut q1, &mut l1, &mut u1, 10);
        s2.equilibrate(&mut P2, &mut A2, &mut q2, &mut l2, &mut u2, 10);

        assert_eq!(P1, P2);
        assert_eq!(A1, A2);
        assert_eq!(s1.d, s2.d);
        assert_eq!(s1.e, s2.e);
        assert_eq!(s1.c, s2.c);
    }

    #[test]
    fn test_unscale_scale_roundtrip() {
        let (mut P, mut A, mut q, mut l, mut u) = test_data();
        let mut scaling = Scaling::new(2, 3);
        scaling.equilibrate(&mut P, &mut A, &mut q, &mut l, &mut u, 10);

        let x = [0.3, -0.7];
        let y = [-2.5, 0., 1e-3];
        let z = [1., 0.3, 0.7];

        let (mut xs, mut ys, mut zs) = ([0.; 2], [0.; 3], [0.; 3]);
        let (mut xr, mut yr, mut zr) = ([0.; 2], [0.; 3], [0.; 3]);

        scaling.scale_x(&mut xs, &x);
        scaling.scale_y(&mut ys, &y);
        scaling.scale_z(&mut zs, &z);
        scaling.unscale_x(&mut xr, &xs);
        scaling.unscale_y(&mut yr, &ys);
        scaling.unscale_z(&mut zr, &zs);

        assert!(xr.norm_inf_diff(&x) <= 1e-14);
        assert!(yr.norm_inf_diff(&y) <= 1e-14);
        assert!(zr.norm_inf_diff(&z) <= 1e-14);
    }
}
