/*
Newton-Raphson solver for the two-point boundary value problem

    eps*u''(x) + u(x)*(u'(x) - 1) = f(x),   u(ax) = alpha,  u(bx) = beta

on a uniform grid with m interior points. u'' and u' are replaced by central differences, which gives
m+2 nonlinear algebraic equations G(U) = 0 (two of them are the linear boundary equations). Every Newton
step solves the sparse tridiagonal system Jk*delta = Gk with Jk = A + N(Uk), where A is the constant
diffusion operator and N(Uk) the Jacobian of the term u*(u'-1). The iteration stops when the infinity
norm of the step or of the residual falls below its tolerance, or when max_iter steps are done; in the
latter case the last iterate is still returned and the caller decides whether to trust it.
*/
use crate::error::{BvpError, Result};
use crate::numerical::BVP_FD::BVP_FD_config::{SolverOptions, parse_loglevel};
use crate::numerical::BVP_FD::BVP_FD_operators::{jacobian, linear_operator};
use crate::numerical::BVP_FD::BVP_FD_utils::{CustomTimer, statistics_table};
use crate::numerical::BVP_FD::grid::Grid;
use crate::numerical::BVP_FD::residual::{inf_norm, residual};
use crate::somelinalg::linear_sys_diagnostics::poorly_conditioned;
use crate::somelinalg::sparse_solvers_depot::{LinearSysMethod, csmat_to_dmatrix};
use crate::Utils::logger::{save_iterates_to_csv, save_solution_to_file};
use crate::Utils::plots::plot_iterates;
use chrono::Local;
use log::{debug, info, warn};
use nalgebra::DVector;
use rayon::prelude::*;
use simplelog::*;
use sprs::CsMat;
use std::collections::HashMap;
use std::fs::File;
use strum_macros::Display;

const JACOBIAN_COND_WARNING: f64 = 1e12;

/// right hand side f(x)
pub type RhsFunction = Box<dyn Fn(f64) -> f64 + Send + Sync>;
/// maps the grid to the initial iterate
pub type InitialGuessFunction = Box<dyn Fn(&DVector<f64>) -> DVector<f64> + Send + Sync>;
/// called with (k, grid, Uk) at the start of every Newton step
pub type IterateHook = Box<dyn FnMut(usize, &DVector<f64>, &DVector<f64>) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SolverStatus {
    Initialized,
    Iterating,
    Converged,
    MaxIterReached,
}

/// one performed Newton step: norms of the residual and of the step, and (when iterates are recorded)
/// the iterate the step started from
#[derive(Debug, Clone)]
pub struct IterationRecord {
    pub k: usize,
    pub norm_Gk: f64,
    pub norm_delta: f64,
    pub Uk: Option<DVector<f64>>,
}

pub struct NRBVP_FD {
    pub epsilon: f64,          // coefficient of u''
    pub f: RhsFunction,        // right hand side
    pub ainfo: (f64, f64),     // (ax, alpha): u(ax) = alpha
    pub binfo: (f64, f64),     // (bx, beta): u(bx) = beta
    pub m: usize,              // number of interior grid points
    pub initial_guess: InitialGuessFunction,
    pub options: SolverOptions,
    pub custom_timer: CustomTimer,

    iterate_hook: Option<IterateHook>,
    grid: Option<Grid>,
    A: Option<CsMat<f64>>,   // constant part of the Jacobian
    jac: Option<CsMat<f64>>, // Jacobian of the last step
    result: Option<DVector<f64>>,
    status: SolverStatus,
    iterations: usize,
    history: Vec<IterationRecord>,
    calc_statistics: HashMap<String, String>,
}

impl NRBVP_FD {
    pub fn new<F, G>(
        epsilon: f64,
        f: F,
        ainfo: (f64, f64),
        binfo: (f64, f64),
        m: usize,
        initial_guess: G,
    ) -> NRBVP_FD
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
        G: Fn(&DVector<f64>) -> DVector<f64> + Send + Sync + 'static,
    {
        NRBVP_FD {
            epsilon,
            f: Box::new(f),
            ainfo,
            binfo,
            m,
            initial_guess: Box::new(initial_guess),
            options: SolverOptions::default(),
            custom_timer: CustomTimer::new(),
            iterate_hook: None,
            grid: None,
            A: None,
            jac: None,
            result: None,
            status: SolverStatus::Initialized,
            iterations: 0,
            history: Vec::new(),
            calc_statistics: HashMap::new(),
        }
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    pub fn set_options(&mut self, options: SolverOptions) {
        self.options = options;
    }

    /// change only the given parameters, keep the rest of the options
    pub fn set_solver_params(
        &mut self,
        loglevel: Option<String>,
        linear_sys_method: Option<LinearSysMethod>,
        max_iter: Option<usize>,
        tolerances: Option<(f64, f64)>,
    ) {
        if let Some(level) = loglevel {
            self.options.loglevel = Some(level);
        }
        if let Some(method) = linear_sys_method {
            self.options.linear_sys_method = method;
        }
        if let Some(max_iter) = max_iter {
            self.options.max_iter = max_iter;
        }
        if let Some((tol_delta, tol_Gk)) = tolerances {
            self.options.tol_delta = tol_delta;
            self.options.tol_Gk = tol_Gk;
        }
    }

    pub fn set_iterate_hook<H>(&mut self, hook: H)
    where
        H: FnMut(usize, &DVector<f64>, &DVector<f64>) + Send + 'static,
    {
        self.iterate_hook = Some(Box::new(hook));
    }

    /// all configuration errors are raised here, before the first iteration
    pub fn task_check(&self) -> Result<()> {
        if !(self.epsilon > 0.0) || !self.epsilon.is_finite() {
            return Err(BvpError::InvalidParameter {
                name: "epsilon".to_string(),
                message: format!("must be a positive number, got {}", self.epsilon),
            });
        }
        let (alpha, beta) = (self.ainfo.1, self.binfo.1);
        if !alpha.is_finite() || !beta.is_finite() {
            return Err(BvpError::InvalidParameter {
                name: "boundary values".to_string(),
                message: format!("must be finite, got alpha = {}, beta = {}", alpha, beta),
            });
        }
        self.options.check()
    }

    /// build the grid and the constant operator A
    pub fn eq_generate(&mut self) -> Result<()> {
        self.task_check()?;
        let grid = Grid::new(self.ainfo.0, self.binfo.0, self.m)?;
        if self.options.debug {
            debug!("+++ h = {}, m+2 = {}", grid.h, grid.len());
            debug!("+++ x = {}", grid.x.transpose());
        }
        self.A = Some(linear_operator(self.epsilon, grid.h, self.m));
        self.grid = Some(grid);
        Ok(())
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                ITERATIONS
    /////////////////////////////////////////////////////////////////////////////////////////////
    pub fn main_loop(&mut self) -> Result<DVector<f64>> {
        if self.grid.is_none() || self.A.is_none() {
            self.eq_generate()?;
        }
        let grid = self.grid.clone().ok_or(BvpError::Config("grid is not built".to_string()))?;
        let A = self.A.clone().ok_or(BvpError::Config("operator is not built".to_string()))?;
        let n = grid.len();
        let (alpha, beta) = (self.ainfo.1, self.binfo.1);
        let (tol_delta, tol_Gk) = (self.options.tol_delta, self.options.tol_Gk);
        let max_iter = self.options.max_iter;
        let debug_on = self.options.debug;
        let method = self.options.linear_sys_method;

        let mut Uk = (self.initial_guess)(&grid.x);
        if Uk.len() != n {
            return Err(BvpError::InitialGuessLength {
                expected: n,
                got: Uk.len(),
            });
        }
        if debug_on {
            debug!("+++ Initial Uk = {}", Uk.transpose());
        }
        self.status = SolverStatus::Initialized;
        self.history.clear();
        self.iterations = 0;
        self.result = Some(Uk.clone()); // in case the very first solve fails

        for k in 0..max_iter {
            self.status = SolverStatus::Iterating;
            if self.options.plot_iterates {
                if let Some(hook) = self.iterate_hook.as_mut() {
                    hook(k, &grid.x, &Uk);
                }
            }
            // N is formed from this snapshot
            let U = Uk.clone();

            self.custom_timer.jac_tic();
            let Jk = jacobian(&A, &U, grid.h);
            self.custom_timer.jac_tac();
            if debug_on {
                let Jk_dense = csmat_to_dmatrix(&Jk);
                debug!("+++ Jk = {}", Jk_dense);
                poorly_conditioned(&Jk_dense, JACOBIAN_COND_WARNING);
            }

            self.custom_timer.fun_tic();
            let Gk = residual(&Uk, &grid, self.epsilon, &*self.f, alpha, beta);
            self.custom_timer.fun_tac();
            if debug_on {
                debug!("+++ Uk = {}", Uk.transpose());
                debug!("+++ Gk = {}", Gk.transpose());
            }

            self.custom_timer.linear_system_tic();
            let delta = method.solve(&Jk, &Gk);
            self.custom_timer.linear_system_tac();
            let delta = delta?;
            if debug_on {
                debug!("+++ delta = {}", delta.transpose());
            }

            Uk = &Uk - &delta;
            // identity boundary rows: the Newton update reproduces the Dirichlet data
            Uk[0] = alpha;
            Uk[n - 1] = beta;

            let norm_delta = inf_norm(&delta);
            let norm_Gk = inf_norm(&Gk);
            info!(
                "Iteration k = {}: norm(Gk) = {:.2e}, norm(delta) = {:.2e}",
                k, norm_Gk, norm_delta
            );
            self.history.push(IterationRecord {
                k,
                norm_Gk,
                norm_delta,
                Uk: if self.options.plot_iterates { Some(U) } else { None },
            });
            self.iterations = k + 1;
            self.jac = Some(Jk);

            if norm_delta < tol_delta || norm_Gk < tol_Gk {
                // k is the index of the last step
                info!("Declared convergence after {} iterations", k);
                self.status = SolverStatus::Converged;
                break;
            }
        }
        // also reached with max_iter = 0: the initial guess is returned untouched
        if self.status != SolverStatus::Converged {
            warn!("Reached max_iter, possible nonconvergence");
            self.status = SolverStatus::MaxIterReached;
        }
        self.result = Some(Uk.clone());
        Ok(Uk)
    }
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    //                                       main functions to start the solver and caclulate statistics
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    pub fn solver(&mut self) -> Result<DVector<f64>> {
        self.custom_timer.start();
        self.eq_generate()?;
        let res = self.main_loop()?;
        self.custom_timer.get_all();
        self.calc_statistics();
        Ok(res)
    }

    /// wrapper around `solver` that sets up logging first; returns the grid and the final iterate
    pub fn solve(&mut self) -> Result<(DVector<f64>, DVector<f64>)> {
        if let Some(level) = self.options.loglevel.clone() {
            // the traces of `debug` are debug! records
            let level = if self.options.debug { "debug".to_string() } else { level };
            init_logger(&level, self.options.log_to_file.as_deref())?;
        }
        let u = self.solver()?;
        info!("Program ended");
        let x = self
            .get_grid()
            .map(|g| g.x.clone())
            .ok_or(BvpError::Config("grid is not built".to_string()))?;
        Ok((x, u))
    }

    fn calc_statistics(&mut self) {
        let mut stats = HashMap::new();
        stats.insert("status".to_string(), self.status.to_string());
        stats.insert("number of iterations".to_string(), self.iterations.to_string());
        stats.insert("number of grid nodes".to_string(), (self.m + 2).to_string());
        stats.insert("linear solver".to_string(), self.options.linear_sys_method.to_string());
        if let Some(grid) = &self.grid {
            stats.insert("h".to_string(), format!("{:.3e}", grid.h));
        }
        if let Some(jac) = &self.jac {
            stats.insert("jacobian nonzeros".to_string(), jac.nnz().to_string());
        }
        if let Some(last) = self.history.last() {
            stats.insert("final norm(Gk)".to_string(), format!("{:.3e}", last.norm_Gk));
            stats.insert("final norm(delta)".to_string(), format!("{:.3e}", last.norm_delta));
        }
        info!("\n \n CALC STATISTICS \n \n {}", statistics_table(&stats));
        self.calc_statistics = stats;
    }
    ///////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    //                                     functions to return and save result in different formats
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    pub fn get_result(&self) -> Option<DVector<f64>> {
        self.result.clone()
    }

    pub fn get_grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn status(&self) -> SolverStatus {
        self.status
    }

    /// number of Newton steps performed
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    pub fn statistics(&self) -> &HashMap<String, String> {
        &self.calc_statistics
    }

    /// last Jacobian assembled by the iteration
    pub fn last_jacobian(&self) -> Option<&CsMat<f64>> {
        self.jac.as_ref()
    }

    fn solved(&self) -> Result<(&Grid, &DVector<f64>)> {
        match (&self.grid, &self.result) {
            (Some(grid), Some(u)) => Ok((grid, u)),
            _ => Err(BvpError::Config("nothing to save: solve the problem first".to_string())),
        }
    }

    /// csv with the grid, every recorded iterate and the final solution as columns
    pub fn save_to_csv(&self, filename: &str) -> Result<()> {
        let (grid, u) = self.solved()?;
        save_iterates_to_csv(&grid.x, &self.history, u, filename)
    }

    /// tab separated "x u" table of the final solution
    pub fn save_to_file(&self, filename: &str) -> Result<()> {
        let (grid, u) = self.solved()?;
        save_solution_to_file(&grid.x, u, filename)
    }

    /// png with every recorded iterate (needs plot_iterates) and the final solution
    pub fn plot_result(&self, filename: &str) -> Result<()> {
        let (grid, u) = self.solved()?;
        plot_iterates(&grid.x, &self.history, u, filename)
    }
}

/// Solve eps*u'' + u*(u' - 1) = f on [ax, bx] with u(ax) = alpha, u(bx) = beta and m interior points.
/// Returns the grid and the last Newton iterate; running out of iterations is reported through the log,
/// not as an error.
pub fn solve_bvp_nonlinear<F, G>(
    epsilon: f64,
    f: F,
    ainfo: (f64, f64),
    binfo: (f64, f64),
    m: usize,
    u0_func: G,
    options: SolverOptions,
) -> Result<(DVector<f64>, DVector<f64>)>
where
    F: Fn(f64) -> f64 + Send + Sync + 'static,
    G: Fn(&DVector<f64>) -> DVector<f64> + Send + Sync + 'static,
{
    let mut nr = NRBVP_FD::new(epsilon, f, ainfo, binfo, m, u0_func);
    nr.set_options(options);
    nr.solve()
}

/// straight line through the two boundary values, the usual initial guess
pub fn linear_initial_guess(
    ainfo: (f64, f64),
    binfo: (f64, f64),
) -> impl Fn(&DVector<f64>) -> DVector<f64> + Send + Sync + 'static {
    let ((ax, alpha), (bx, beta)) = (ainfo, binfo);
    move |x: &DVector<f64>| {
        let mut u = x.map(|xi| alpha + (beta - alpha) * (xi - ax) / (bx - ax));
        let n = u.len();
        if n > 0 {
            u[0] = alpha;
            u[n - 1] = beta;
        }
        u
    }
}

/// independent problems solved in parallel, one result per solver
pub fn solve_batch(solvers: &mut [NRBVP_FD]) -> Vec<Result<DVector<f64>>> {
    solvers.par_iter_mut().map(|nr| nr.solver()).collect()
}

/// log file name stamped with the current date and time
pub fn timestamped_log_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Terminal logger, plus a file logger when a file name is given. A logger set up earlier is kept
/// and the (empty) file is removed again.
pub fn init_logger(loglevel: &str, log_to_file: Option<&str>) -> Result<()> {
    let level = parse_loglevel(loglevel)?;
    if level == LevelFilter::Off {
        return Ok(());
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(filename) = log_to_file {
        let file = File::create(filename)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    // Err means the global logger is already installed
    if CombinedLogger::init(loggers).is_err() {
        if let Some(filename) = log_to_file {
            warn!(
                "logger is already installed, file logger for {} is not set up",
                filename
            );
            std::fs::remove_file(filename)?;
        }
    }
    Ok(())
}
