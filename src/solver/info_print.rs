use super::info::SolveInfo;
use super::problemdata::ProblemData;
use super::settings::Settings;
use super::status::PolishStatus;
use crate::algebra::*;
use crate::io::PrintTarget;
use std::io::Write;
use std::time::Duration;

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

const RULE: &str = "------------------------------------------------------------------";

pub(crate) fn print_configuration<T: FloatT>(
    out: &mut PrintTarget,
    settings: &Settings<T>,
    data: &ProblemData<T>,
    linsys_name: &str,
) -> std::io::Result<()> {
    if !settings.verbose {
        return std::io::Result::Ok(());
    }

    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "        splitqp v{}  -  operator splitting QP solver",
        crate::VERSION
    )?;
    writeln!(out, "{RULE}")?;

    writeln!(out, "problem:")?;
    writeln!(out, "  variables     = {}", data.n)?;
    writeln!(out, "  constraints   = {}", data.m)?;
    writeln!(out, "  nnz(P)        = {}", data.P.nnz())?;
    writeln!(out, "  nnz(A)        = {}", data.A.nnz())?;
    writeln!(out,)?;

    let set = settings;
    writeln!(out, "settings:")?;
    writeln!(
        out,
        "  linear system: {}, precision: {} bit",
        linsys_name,
        _get_precision_string::<T>()
    )?;

    let time_lim_str = {
        if set.time_limit == 0.0 {
            "none".to_string()
        } else {
            format!("{:?}", Duration::from_secs_f64(set.time_limit))
        }
    };
    writeln!(
        out,
        "  max iter = {}, time limit = {}, check every {}",
        set.max_iter, time_lim_str, set.check_termination
    )?;
    writeln!(
        out,
        "  eps_abs = {:.1e}, eps_rel = {:.1e},",
        set.eps_abs, set.eps_rel
    )?;
    writeln!(
        out,
        "  eps_prim_inf = {:.1e}, eps_dual_inf = {:.1e},",
        set.eps_prim_inf, set.eps_dual_inf
    )?;
    writeln!(
        out,
        "  rho = {:.2e}, sigma = {:.2e}, alpha = {:.2},",
        set.rho, set.sigma, set.alpha
    )?;
    writeln!(
        out,
        "  adaptive rho: {}, scaling: {} passes, scaled termination: {}",
        _bool_on_off(set.adaptive_rho),
        set.scaling,
        _bool_on_off(set.scaled_termination)
    )?;
    writeln!(
        out,
        "  warm start: {}, polish: {}",
        _bool_on_off(set.warm_start),
        _bool_on_off(set.polish)
    )?;
    writeln!(out,)?;

    std::io::Result::Ok(())
}

pub(crate) fn print_status_header(out: &mut PrintTarget) -> std::io::Result<()> {
    //print a subheader for the iterations info
    write!(out, "iter   ")?;
    write!(out, "objective    ")?;
    write!(out, "prim res   ")?;
    write!(out, "dual res   ")?;
    write!(out, "rho        ")?;
    write!(out, "time")?;
    writeln!(out,)?;
    writeln!(out, "{RULE}")?;
    out.flush()?;
    std::io::Result::Ok(())
}

pub(crate) fn print_status<T: FloatT>(
    out: &mut PrintTarget,
    iter: u32,
    obj_val: T,
    prim_res: T,
    dual_res: T,
    rho: T,
    elapsed: Duration,
) -> std::io::Result<()> {
    write!(out, "{:>4}  ", iter)?;
    write!(out, "{}  ", expformat!("{:+8.4e}", obj_val))?;
    write!(out, "{}  ", expformat!("{:6.2e}", prim_res))?;
    write!(out, "{}  ", expformat!("{:6.2e}", dual_res))?;
    write!(out, "{}  ", expformat!("{:6.2e}", rho))?;
    write!(out, "{:.2e}s", elapsed.as_secs_f64())?;
    writeln!(out,)?;
    std::io::Result::Ok(())
}

pub(crate) fn print_footer<T: FloatT>(
    out: &mut PrintTarget,
    info: &SolveInfo<T>,
) -> std::io::Result<()> {
    writeln!(out, "{RULE}")?;

    match info.polish_status {
        PolishStatus::NotRun => (),
        PolishStatus::Succeeded => writeln!(out, "solution polishing: successful")?,
        PolishStatus::Failed => writeln!(out, "solution polishing: unsuccessful")?,
    }

    writeln!(out, "status:               {}", info.status)?;
    writeln!(out, "number of iterations: {}", info.iterations)?;
    if info.status.is_infeasible() {
        writeln!(out, "optimal objective:    {}", info.obj_val)?;
    } else {
        writeln!(
            out,
            "optimal objective:    {}",
            expformat!("{:.4e}", info.obj_val)
        )?;
    }
    writeln!(out, "rho updates:          {}", info.rho_updates)?;
    writeln!(
        out,
        "run time:             {:?}",
        Duration::from_secs_f64(info.run_time)
    )?;
    writeln!(out,)?;
    out.flush()?;

    std::io::Result::Ok(())
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}

// convert a string in LowerExp display format into one that
// 1) always has a sign after the exponent, and
// 2) has at least two digits in the exponent.

fn _exp_str_reformat(mut thestr: String) -> String {
    let Some(eidx) = thestr.find('e') else {
        return thestr;
    };
    let has_sign = thestr[eidx + 1..].starts_with('-');

    let has_short_exp = {
        if !has_sign {
            thestr.len() == eidx + 2
        } else {
            thestr.len() == eidx + 3
        }
    };

    let chars = match (has_sign, has_short_exp) {
        (false, true) => "+0",
        (false, false) => "+",
        (true, true) => "0",
        (true, false) => "",
    };

    let shift = if has_sign { 2 } else { 1 };
    thestr.insert_str(eidx + shift, chars);
    thestr
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_exp_str_reformat() {
        assert_eq!(_exp_str_reformat("1.0e3".to_string()), "1.0e+03");
        assert_eq!(_exp_str_reformat("1.0e-3".to_string()), "1.0e-03");
        assert_eq!(_exp_str_reformat("1.0e-12".to_string()), "1.0e-12");
        assert_eq!(_exp_str_reformat("1.0e12".to_string()), "1.0e+12");
        assert_eq!(expformat!("{:.1e}", f64::NAN), "NaN");
    }

    #[test]
    fn test_print_status_line() {
        let mut out = PrintTarget::Buffer(Vec::new());
        print_status(&mut out, 25, 1.88, 1e-4, 2e-5, 0.1, Duration::from_millis(3)).unwrap();
        let PrintTarget::Buffer(buf) = out else {
            panic!("expected a buffer");
        };
        let line = String::from_utf8(buf).unwrap();
        assert!(line.starts_with("  25  +1.8800e+00"));
        assert!(line.contains("1.00e-04"));
    }
}
