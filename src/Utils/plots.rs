use crate::error::{BvpError, Result};
use crate::numerical::BVP_FD::NR_FD_solver::IterationRecord;
use nalgebra::DVector;
use plotters::prelude::*;

fn plot_err<E: std::fmt::Display>(e: E) -> BvpError {
    BvpError::Plot(e.to_string())
}

/// Draws every recorded Newton iterate ("k = 0", "k = 1", ...) and the final solution into one png,
/// like watching the solution evolve while iterating.
pub fn plot_iterates(
    x: &DVector<f64>,
    history: &[IterationRecord],
    u: &DVector<f64>,
    filename: &str,
) -> Result<()> {
    let mut curves: Vec<(String, &DVector<f64>)> = history
        .iter()
        .filter_map(|rec| rec.Uk.as_ref().map(|Uk| (format!("k = {}", rec.k), Uk)))
        .collect();
    curves.push(("solution".to_string(), u));

    let x_min = x.min();
    let x_max = x.max();
    let mut y_min = curves.iter().map(|(_, y)| y.min()).fold(f64::INFINITY, f64::min);
    let mut y_max = curves.iter().map(|(_, y)| y.max()).fold(f64::NEG_INFINITY, f64::max);
    if !y_min.is_finite() || !y_max.is_finite() {
        return Err(BvpError::Plot("iterates contain non-finite values".to_string()));
    }
    let pad = 0.05 * (y_max - y_min).max(1e-12);
    y_min -= pad;
    y_max += pad;

    let root_area = BitMapBackend::new(filename, (800, 600)).into_drawing_area();
    root_area.fill(&WHITE).map_err(plot_err)?;
    let mut chart = ChartBuilder::on(&root_area)
        .caption("Approximate solution while iterating", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("u")
        .draw()
        .map_err(plot_err)?;

    for (col, (label, y)) in curves.into_iter().enumerate() {
        let series: Vec<(f64, f64)> = x.iter().zip(y.iter()).map(|(&x, &y)| (x, y)).collect();
        chart
            .draw_series(LineSeries::new(series, &Palette99::pick(col)))
            .map_err(plot_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &Palette99::pick(col)));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;
    root_area.present().map_err(plot_err)?;
    Ok(())
}
