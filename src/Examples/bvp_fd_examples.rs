use crate::numerical::BVP_FD::BVP_FD_config::{SolverOptions, grid_size_from_toml};
use crate::numerical::BVP_FD::NR_FD_solver::{
    NRBVP_FD, init_logger, linear_initial_guess, solve_batch, solve_bvp_nonlinear,
    timestamped_log_name,
};
use crate::numerical::fd_stencils::{fdcoeffF_full, fdstencil};
use crate::somelinalg::sparse_solvers_depot::LinearSysMethod;
use nalgebra::DVector;
use tabled::{builder::Builder, settings::Style};

pub fn bvp_fd_examples(example: usize) {
    match example {
        0 => {
            // eps = 0.01, f = 0, u(0) = 0, u(1) = 1, 19 interior points
            let ainfo = (0.0, 0.0);
            let binfo = (1.0, 1.0);
            let mut nr = NRBVP_FD::new(
                0.01,
                |_x: f64| 0.0,
                ainfo,
                binfo,
                19,
                linear_initial_guess(ainfo, binfo),
            );
            match nr.solve() {
                Ok((x, u)) => {
                    println!("status = {}, iterations = {}", nr.status(), nr.iterations());
                    println!("x = {}", x.transpose());
                    println!("u = {}", u.transpose());
                    if let Err(e) = nr.save_to_csv("bvp_fd_iterates.csv") {
                        println!("failed to save iterates: {}", e);
                    }
                    if let Err(e) = nr.plot_result("bvp_fd_iterates.png") {
                        println!("failed to plot iterates: {}", e);
                    }
                }
                Err(e) => println!("solver failed: {}", e),
            }
        }
        1 => {
            // u = x^3 is the exact solution for this right hand side: the error should drop ~4 times
            // every time h is halved
            let eps = 0.1;
            let f = move |x: f64| 6.0 * eps * x + x.powi(3) * (3.0 * x * x - 1.0);
            let mut builder = Builder::default();
            builder.push_record(["m".to_string(), "h".to_string(), "max error".to_string(), "ratio".to_string()]);
            let mut previous: Option<f64> = None;
            for m in [9, 19, 39, 79, 159] {
                let options = SolverOptions::default().with_loglevel(None);
                let res = solve_bvp_nonlinear(
                    eps,
                    f,
                    (0.0, 0.0),
                    (1.0, 1.0),
                    m,
                    linear_initial_guess((0.0, 0.0), (1.0, 1.0)),
                    options,
                );
                let (x, u) = match res {
                    Ok(res) => res,
                    Err(e) => {
                        println!("m = {}: {}", m, e);
                        continue;
                    }
                };
                let error = x
                    .iter()
                    .zip(u.iter())
                    .map(|(xi, ui)| (ui - xi.powi(3)).abs())
                    .fold(0.0, f64::max);
                let ratio = previous.map(|p| format!("{:.3}", p / error)).unwrap_or_default();
                builder.push_record([
                    m.to_string(),
                    format!("{:.3e}", 1.0 / (m as f64 + 1.0)),
                    format!("{:.3e}", error),
                    ratio,
                ]);
                previous = Some(error);
            }
            let mut table = builder.build();
            table.with(Style::modern_rounded());
            println!("\n{}", table);
        }
        2 => {
            // finite difference stencils
            let _ = init_logger("info", None);
            for (k, jbar, points) in [
                (1, 0, vec![-1, 0, 1]),
                (2, 0, vec![-1, 0, 1]),
                (2, 0, vec![-2, -1, 0, 1, 2]),
                (1, 0, vec![0, 1, 2]),
                (4, 0, vec![-2, -1, 0, 1, 2]),
            ] {
                match fdstencil(k, jbar, &points) {
                    Ok((_, s)) => println!("d^{}u/dx^{} at U_{{{}}} = {}", k, k, jbar, s),
                    Err(e) => println!("{}", e),
                }
            }
            // all derivatives up to the 2nd at once on a nonuniform stencil
            match fdcoeffF_full(2, 0.0, &[-0.3, 0.0, 0.5]) {
                Ok(C) => println!("weights for derivatives 0, 1, 2 (columns) = {}", C),
                Err(e) => println!("{}", e),
            }
        }
        3 => {
            // sweep over eps: every problem is independent, solve them in parallel
            let epsilons = [0.5, 0.1, 0.05, 0.02, 0.01];
            let ainfo = (0.0, -1.0);
            let binfo = (1.0, 1.5);
            let mut solvers: Vec<NRBVP_FD> = epsilons
                .iter()
                .map(|&eps| {
                    let mut nr = NRBVP_FD::new(
                        eps,
                        |x: f64| x.sin(),
                        ainfo,
                        binfo,
                        199,
                        linear_initial_guess(ainfo, binfo),
                    );
                    nr.set_options(SolverOptions::default().with_loglevel(None).with_max_iter(30));
                    nr
                })
                .collect();
            let results = solve_batch(&mut solvers);
            for ((eps, nr), res) in epsilons.iter().zip(solvers.iter()).zip(results) {
                match res {
                    Ok(u) => {
                        let grid = nr.get_grid().map(|g| g.x.clone()).unwrap_or_else(|| DVector::zeros(0));
                        let (imin, umin) = u.argmin();
                        println!(
                            "eps = {}: {} after {} iterations, min u = {:.4} at x = {:.3}",
                            eps,
                            nr.status(),
                            nr.iterations(),
                            umin,
                            grid.get(imin).copied().unwrap_or(f64::NAN)
                        );
                    }
                    Err(e) => println!("eps = {}: {}", eps, e),
                }
            }
        }
        4 => {
            // options from a TOML document, log written to a time stamped file as well
            let document = r#"
                [grid]
                m = 49

                [solver]
                max_iter = 20
                tol_delta = 1e-10
                tol_Gk = 1e-10
                linear_sys_method = "lu"
                loglevel = "info"
            "#;
            let options = match SolverOptions::from_toml_str(document) {
                Ok(options) => options,
                Err(e) => {
                    println!("bad options: {}", e);
                    return;
                }
            };
            let m = match grid_size_from_toml(document) {
                Ok(m) => m.unwrap_or(19),
                Err(e) => {
                    println!("bad grid: {}", e);
                    return;
                }
            };
            let log_name = timestamped_log_name();
            let options = SolverOptions {
                log_to_file: Some(log_name.clone()),
                ..options
            };
            let ainfo = (-1.0, 1.0);
            let binfo = (1.0, -1.0);
            let mut nr = NRBVP_FD::new(0.05, |x: f64| x * x, ainfo, binfo, m, linear_initial_guess(ainfo, binfo));
            nr.set_options(options);
            nr.set_solver_params(None, Some(LinearSysMethod::Band), None, None);
            match nr.solve() {
                Ok((_x, u)) => {
                    println!("u(0) = {:.6}, log saved to {}", u[(m + 1) / 2], log_name);
                    if let Err(e) = nr.save_to_file("bvp_fd_solution.txt") {
                        println!("failed to save solution: {}", e);
                    }
                }
                Err(e) => println!("solver failed: {}", e),
            }
        }
        _ => {
            println!("example not found");
        }
    }
}
