use crate::error::{BvpError, Result};
use crate::numerical::BVP_FD::NR_FD_solver::IterationRecord;
use csv::Writer;
use nalgebra::DVector;
use std::fs::File;
use std::io::Write;

/// "x<TAB>u" table of the solution
pub fn save_solution_to_file(x_mesh: &DVector<f64>, u: &DVector<f64>, filename: &str) -> Result<()> {
    if x_mesh.len() != u.len() {
        return Err(BvpError::DimensionMismatch(format!(
            "grid has {} nodes, solution has {}",
            x_mesh.len(),
            u.len()
        )));
    }
    let mut file = File::create(filename)?;
    writeln!(file, "x\tu")?;
    for (xi, ui) in x_mesh.iter().zip(u.iter()) {
        writeln!(file, "{}\t{}", xi, ui)?;
    }
    Ok(())
}

/// csv with columns x, U_0, U_1, ... (every recorded iterate) and u (final solution)
pub fn save_iterates_to_csv(
    x_mesh: &DVector<f64>,
    history: &[IterationRecord],
    u: &DVector<f64>,
    filename: &str,
) -> Result<()> {
    let iterates: Vec<(usize, &DVector<f64>)> = history
        .iter()
        .filter_map(|rec| rec.Uk.as_ref().map(|Uk| (rec.k, Uk)))
        .collect();
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);

    let mut headers = vec!["x".to_string()];
    headers.extend(iterates.iter().map(|(k, _)| format!("U_{}", k)));
    headers.push("u".to_string());
    writer.write_record(&headers)?;

    for (i, xi) in x_mesh.iter().enumerate() {
        let mut row_data = vec![xi.to_string()];
        row_data.extend(iterates.iter().map(|(_, Uk)| Uk[i].to_string()));
        row_data.push(u[i].to_string());
        writer.write_record(&row_data)?;
    }
    writer.flush()?;
    Ok(())
}
