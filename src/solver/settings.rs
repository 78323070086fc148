use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Linear system backend used in each ADMM iteration

#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LinsysSolver {
    /// sparse quasidefinite LDL factorization of the full KKT system
    #[default]
    Direct,
    /// preconditioned conjugate gradient on the reduced KKT system
    Indirect,
}

impl LinsysSolver {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinsysSolver::Direct => "direct",
            LinsysSolver::Indirect => "indirect",
        }
    }
}

impl std::fmt::Display for LinsysSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// An error attributable to one of the fields
    #[error("bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
}

/// Solver settings.
///
/// Construct with [`SettingsBuilder`], which validates each field at build
/// time, or start from `Settings::default()` and overwrite fields directly.
/// Settings are copied into a workspace at setup and are read-only after
/// that.

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings<T: FloatT> {
    ///ADMM penalty parameter (initial value when adaptive)
    #[builder(default = "(0.1).as_T()")]
    pub rho: T,

    ///regularization added to P in the KKT system
    #[builder(default = "(1e-6).as_T()")]
    pub sigma: T,

    ///number of Ruiz equilibration passes (0 disables scaling)
    #[builder(default = "10")]
    pub scaling: u32,

    ///enable adaptive rho updates
    #[builder(default = "true")]
    pub adaptive_rho: bool,

    ///iterations between adaptive rho updates (0 selects automatically)
    #[builder(default = "0")]
    pub adaptive_rho_interval: u32,

    ///refactor only when the rho estimate differs by more than this factor
    #[builder(default = "(5.0).as_T()")]
    pub adaptive_rho_tolerance: T,

    ///maximum number of iterations
    #[builder(default = "4000")]
    pub max_iter: u32,

    ///absolute convergence tolerance
    #[builder(default = "(1e-3).as_T()")]
    pub eps_abs: T,

    ///relative convergence tolerance
    #[builder(default = "(1e-3).as_T()")]
    pub eps_rel: T,

    ///primal infeasibility tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub eps_prim_inf: T,

    ///dual infeasibility tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub eps_dual_inf: T,

    ///relaxation parameter
    #[builder(default = "(1.6).as_T()")]
    pub alpha: T,

    ///linear system backend
    #[builder(default = "LinsysSolver::Direct")]
    pub linsys_solver: LinsysSolver,

    ///regularization used in the polishing step
    #[builder(default = "(1e-6).as_T()")]
    pub delta: T,

    ///enable solution polishing
    #[builder(default = "false")]
    pub polish: bool,

    ///iterative refinement passes in the polishing step
    #[builder(default = "3")]
    pub polish_refine_iter: u32,

    ///verbose printing
    #[builder(default = "true")]
    pub verbose: bool,

    ///evaluate termination criteria on the scaled problem
    #[builder(default = "false")]
    pub scaled_termination: bool,

    ///iterations between termination checks (0 disables periodic checks)
    #[builder(default = "25")]
    pub check_termination: u32,

    ///start each solve from the previous iterate
    #[builder(default = "true")]
    pub warm_start: bool,

    ///maximum solve time in seconds (0 means unbounded)
    #[builder(default = "0.0")]
    pub time_limit: f64,

    ///maximum conjugate gradient iterations per solve (indirect backend)
    #[builder(default = "100")]
    pub cg_max_iter: u32,

    ///relative conjugate gradient tolerance (indirect backend)
    #[builder(default = "(1e-7).as_T()")]
    pub cg_tol: T,
}

impl<T> Default for Settings<T>
where
    T: FloatT,
{
    fn default() -> Settings<T> {
        SettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> Settings<T>
where
    T: FloatT,
{
    /// Checks that every field holds a legal value
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_positive(self.rho, "rho")?;
        validate_positive(self.sigma, "sigma")?;
        validate_rho_tolerance(self.adaptive_rho_tolerance)?;
        validate_nonzero(self.max_iter, "max_iter")?;
        validate_nonnegative(self.eps_abs, "eps_abs")?;
        validate_nonnegative(self.eps_rel, "eps_rel")?;
        validate_eps_pair(self.eps_abs, self.eps_rel)?;
        validate_positive(self.eps_prim_inf, "eps_prim_inf")?;
        validate_positive(self.eps_dual_inf, "eps_dual_inf")?;
        validate_alpha(self.alpha)?;
        validate_positive(self.delta, "delta")?;
        validate_time_limit(self.time_limit)?;
        validate_nonzero(self.cg_max_iter, "cg_max_iter")?;
        validate_positive(self.cg_tol, "cg_tol")?;
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for SettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        SettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> SettingsBuilder<T>
where
    T: FloatT,
{
    /// check every field that has been explicitly set
    pub fn validate(&self) -> Result<(), SettingsError> {
        macro_rules! check {
            ($field:ident, $f:expr) => {
                if let Some(v) = self.$field {
                    $f(v)?;
                }
            };
        }

        check!(rho, |v| validate_positive(v, "rho"));
        check!(sigma, |v| validate_positive(v, "sigma"));
        check!(adaptive_rho_tolerance, validate_rho_tolerance);
        check!(max_iter, |v| validate_nonzero(v, "max_iter"));
        check!(eps_abs, |v| validate_nonnegative(v, "eps_abs"));
        check!(eps_rel, |v| validate_nonnegative(v, "eps_rel"));
        check!(eps_prim_inf, |v| validate_positive(v, "eps_prim_inf"));
        check!(eps_dual_inf, |v| validate_positive(v, "eps_dual_inf"));
        check!(alpha, validate_alpha);
        check!(delta, |v| validate_positive(v, "delta"));
        check!(time_limit, validate_time_limit);
        check!(cg_max_iter, |v| validate_nonzero(v, "cg_max_iter"));
        check!(cg_tol, |v| validate_positive(v, "cg_tol"));

        // an unset tolerance takes a nonzero default
        if let (Some(eps_abs), Some(eps_rel)) = (self.eps_abs, self.eps_rel) {
            validate_eps_pair(eps_abs, eps_rel)?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_positive<T: FloatT>(v: T, field: &'static str) -> Result<(), SettingsError> {
    if v.is_finite() && v > T::zero() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn validate_nonnegative<T: FloatT>(v: T, field: &'static str) -> Result<(), SettingsError> {
    if v.is_finite() && v >= T::zero() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn validate_nonzero(v: u32, field: &'static str) -> Result<(), SettingsError> {
    if v > 0 {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn validate_eps_pair<T: FloatT>(eps_abs: T, eps_rel: T) -> Result<(), SettingsError> {
    if eps_abs == T::zero() && eps_rel == T::zero() {
        Err(SettingsError::BadFieldValue("eps_abs"))
    } else {
        Ok(())
    }
}

fn validate_alpha<T: FloatT>(alpha: T) -> Result<(), SettingsError> {
    if alpha > T::zero() && alpha < (2.0).as_T() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("alpha"))
    }
}

fn validate_rho_tolerance<T: FloatT>(tol: T) -> Result<(), SettingsError> {
    if tol.is_finite() && tol >= T::one() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("adaptive_rho_tolerance"))
    }
}

fn validate_time_limit(time_limit: f64) -> Result<(), SettingsError> {
    if time_limit.is_finite() && time_limit >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("time_limit"))
    }
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::<f64>::default();
    assert_eq!(settings.rho, 0.1);
    assert_eq!(settings.sigma, 1e-6);
    assert_eq!(settings.max_iter, 4000);
    assert_eq!(settings.eps_abs, 1e-3);
    assert_eq!(settings.eps_rel, 1e-3);
    assert_eq!(settings.eps_prim_inf, 1e-4);
    assert_eq!(settings.eps_dual_inf, 1e-4);
    assert_eq!(settings.alpha, 1.6);
    assert_eq!(settings.linsys_solver, LinsysSolver::Direct);
    assert_eq!(settings.delta, 1e-6);
    assert!(!settings.polish);
    assert_eq!(settings.polish_refine_iter, 3);
    assert!(settings.verbose);
    assert!(!settings.scaled_termination);
    assert_eq!(settings.check_termination, 25);
    assert!(settings.warm_start);
    assert_eq!(settings.time_limit, 0.0);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_settings_validate() {
    // fail on out of range values
    assert!(SettingsBuilder::<f64>::default().rho(0.).build().is_err());
    assert!(SettingsBuilder::<f64>::default().sigma(-1.).build().is_err());
    assert!(SettingsBuilder::<f64>::default().max_iter(0).build().is_err());
    assert!(SettingsBuilder::<f64>::default().alpha(2.).build().is_err());
    assert!(SettingsBuilder::<f64>::default().alpha(0.).build().is_err());
    assert!(SettingsBuilder::<f64>::default().eps_abs(-1e-3).build().is_err());
    assert!(SettingsBuilder::<f64>::default().eps_prim_inf(0.).build().is_err());
    assert!(SettingsBuilder::<f64>::default().eps_dual_inf(f64::NAN).build().is_err());
    assert!(SettingsBuilder::<f64>::default().time_limit(-1.).build().is_err());
    assert!(SettingsBuilder::<f64>::default()
        .adaptive_rho_tolerance(0.5)
        .build()
        .is_err());
    assert!(SettingsBuilder::<f64>::default()
        .eps_abs(0.)
        .eps_rel(0.)
        .build()
        .is_err());

    // one zero tolerance is fine
    assert!(SettingsBuilder::<f64>::default().eps_abs(0.).build().is_ok());

    // directly construct bad Settings and manually check
    let settings = Settings::<f64> {
        delta: 0.,
        ..Settings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue("delta"))
    );
}

#[cfg(feature = "serde")]
#[test]
fn test_settings_serde() {
    let settings = SettingsBuilder::<f64>::default()
        .rho(0.5)
        .linsys_solver(LinsysSolver::Indirect)
        .build()
        .unwrap();

    let json = serde_json::to_string(&settings).unwrap();
    let back: Settings<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);

    // missing fields take their defaults
    let partial: Settings<f64> = serde_json::from_str(r#"{"max_iter": 17}"#).unwrap();
    assert_eq!(partial.max_iter, 17);
    assert_eq!(partial.rho, 0.1);
}
