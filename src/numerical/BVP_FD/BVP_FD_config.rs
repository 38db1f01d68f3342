use crate::error::{BvpError, Result};
use crate::somelinalg::sparse_solvers_depot::LinearSysMethod;
use simplelog::LevelFilter;
use std::str::FromStr;
use toml::{Table, Value};

/// Options of the Newton iteration. Defaults: 10 iterations, iterates recorded for plotting,
/// no debug traces, 1e-12 for both the step and the residual infinity norms, banded LU.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    pub max_iter: usize,
    /// record every iterate (value + index) for an external renderer
    pub plot_iterates: bool,
    /// verbose traces (grid, iterates, residuals, dense Jacobian) at debug level - small m only
    pub debug: bool,
    pub tol_delta: f64,
    pub tol_Gk: f64,
    pub linear_sys_method: LinearSysMethod,
    /// "debug", "info", "warn", "error" or "off"; None leaves logging untouched
    pub loglevel: Option<String>,
    /// also write the log into this file
    pub log_to_file: Option<String>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            max_iter: 10,
            plot_iterates: true,
            debug: false,
            tol_delta: 1e-12,
            tol_Gk: 1e-12,
            linear_sys_method: LinearSysMethod::default(),
            loglevel: Some("info".to_string()),
            log_to_file: None,
        }
    }
}

fn invalid(name: &str, message: &str) -> BvpError {
    BvpError::InvalidParameter {
        name: name.to_string(),
        message: message.to_string(),
    }
}

impl SolverOptions {
    pub fn check(&self) -> Result<()> {
        if !(self.tol_delta >= 0.0) {
            return Err(invalid("tol_delta", "must be a non-negative number"));
        }
        if !(self.tol_Gk >= 0.0) {
            return Err(invalid("tol_Gk", "must be a non-negative number"));
        }
        if let Some(level) = &self.loglevel {
            parse_loglevel(level)?;
        }
        Ok(())
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerances(mut self, tol_delta: f64, tol_Gk: f64) -> Self {
        self.tol_delta = tol_delta;
        self.tol_Gk = tol_Gk;
        self
    }

    pub fn with_plot_iterates(mut self, plot_iterates: bool) -> Self {
        self.plot_iterates = plot_iterates;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_linear_sys_method(mut self, method: LinearSysMethod) -> Self {
        self.linear_sys_method = method;
        self
    }

    pub fn with_loglevel(mut self, loglevel: Option<String>) -> Self {
        self.loglevel = loglevel;
        self
    }

    /// Options from the `[solver]` table of a TOML document; missing keys keep their defaults.
    /// ```toml
    /// [solver]
    /// max_iter = 20
    /// plot_iterates = false
    /// debug = true
    /// tol_delta = 1e-10
    /// tol_Gk = 1e-10
    /// linear_sys_method = "lu"
    /// loglevel = "warn"
    /// log_to_file = "bvp.log"
    /// ```
    pub fn from_toml_str(document: &str) -> Result<SolverOptions> {
        let table: Table = document.parse::<Table>()?;
        let mut options = SolverOptions::default();
        let Some(solver) = table.get("solver") else {
            return Ok(options);
        };
        let solver = solver
            .as_table()
            .ok_or_else(|| BvpError::Config("[solver] must be a table".to_string()))?;
        for (key, value) in solver {
            match key.as_str() {
                "max_iter" => {
                    let max_iter = as_integer(key, value)?;
                    if max_iter < 0 {
                        return Err(invalid("max_iter", "must be non-negative"));
                    }
                    options.max_iter = max_iter as usize;
                }
                "plot_iterates" => options.plot_iterates = as_bool(key, value)?,
                "debug" => options.debug = as_bool(key, value)?,
                "tol_delta" => options.tol_delta = as_float(key, value)?,
                "tol_Gk" => options.tol_Gk = as_float(key, value)?,
                "linear_sys_method" => {
                    let name = as_str(key, value)?;
                    options.linear_sys_method = LinearSysMethod::from_str(name).map_err(|_| {
                        BvpError::Config(format!(
                            "unknown linear_sys_method '{}': choose 'band' or 'lu'",
                            name
                        ))
                    })?;
                }
                "loglevel" => options.loglevel = Some(as_str(key, value)?.to_string()),
                "log_to_file" => options.log_to_file = Some(as_str(key, value)?.to_string()),
                _ => return Err(BvpError::Config(format!("unknown key '{}' in [solver]", key))),
            }
        }
        options.check()?;
        Ok(options)
    }
}

/// number of interior points from `[grid] m = ...`; negative values are rejected
pub fn grid_size_from_toml(document: &str) -> Result<Option<usize>> {
    let table: Table = document.parse::<Table>()?;
    let Some(m) = table.get("grid").and_then(|g| g.get("m")) else {
        return Ok(None);
    };
    let m = as_integer("m", m)?;
    if m < 0 {
        return Err(BvpError::InvalidGridSize { m });
    }
    Ok(Some(m as usize))
}

pub fn parse_loglevel(level: &str) -> Result<LevelFilter> {
    match level.to_lowercase().as_str() {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        _ => Err(invalid(
            "loglevel",
            "must be debug, info, warn, error or off",
        )),
    }
}

fn as_integer(key: &str, value: &Value) -> Result<i64> {
    value
        .as_integer()
        .ok_or_else(|| BvpError::Config(format!("'{}' must be an integer", key)))
}

fn as_float(key: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Float(v) => Ok(*v),
        Value::Integer(v) => Ok(*v as f64),
        _ => Err(BvpError::Config(format!("'{}' must be a number", key))),
    }
}

fn as_bool(key: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| BvpError::Config(format!("'{}' must be true or false", key)))
}

fn as_str<'a>(key: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| BvpError::Config(format!("'{}' must be a string", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SolverOptions::default();
        assert_eq!(options.max_iter, 10);
        assert!(options.plot_iterates);
        assert!(!options.debug);
        assert_eq!(options.tol_delta, 1e-12);
        assert_eq!(options.tol_Gk, 1e-12);
        assert_eq!(options.linear_sys_method, LinearSysMethod::Band);
        assert!(options.check().is_ok());
    }

    #[test]
    fn test_options_from_toml() {
        let doc = r#"
            [solver]
            max_iter = 20
            plot_iterates = false
            debug = true
            tol_delta = 1e-10
            tol_Gk = 0
            linear_sys_method = "lu"
            loglevel = "warn"
        "#;
        let options = SolverOptions::from_toml_str(doc).unwrap();
        assert_eq!(options.max_iter, 20);
        assert!(!options.plot_iterates);
        assert!(options.debug);
        assert_eq!(options.tol_delta, 1e-10);
        assert_eq!(options.tol_Gk, 0.0);
        assert_eq!(options.linear_sys_method, LinearSysMethod::Lu);
        assert_eq!(options.loglevel.as_deref(), Some("warn"));
        assert_eq!(options.log_to_file, None);
    }

    #[test]
    fn test_missing_table_gives_defaults() {
        let options = SolverOptions::from_toml_str("title = \"run\"").unwrap();
        assert_eq!(options, SolverOptions::default());
    }

    #[test]
    fn test_bad_options_rejected() {
        assert!(SolverOptions::from_toml_str("[solver]\nmax_iter = -1").is_err());
        assert!(SolverOptions::from_toml_str("[solver]\nlinear_sys_method = \"gmres\"").is_err());
        assert!(SolverOptions::from_toml_str("[solver]\nloglevel = \"loud\"").is_err());
        assert!(SolverOptions::from_toml_str("[solver]\ntolerance = 1.0").is_err());
        assert!(SolverOptions::from_toml_str("[solver\n").is_err());
        assert!(SolverOptions::default().with_tolerances(-1.0, 1e-12).check().is_err());
    }

    #[test]
    fn test_zero_iterations_allowed() {
        let options = SolverOptions::from_toml_str("[solver]\nmax_iter = 0").unwrap();
        assert_eq!(options.max_iter, 0);
        assert!(options.check().is_ok());
    }

    #[test]
    fn test_grid_size_from_toml() {
        assert_eq!(grid_size_from_toml("[grid]\nm = 19").unwrap(), Some(19));
        assert_eq!(grid_size_from_toml("[solver]\nmax_iter = 3").unwrap(), None);
        assert!(matches!(
            grid_size_from_toml("[grid]\nm = -1"),
            Err(BvpError::InvalidGridSize { m: -1 })
        ));
    }
}
