use log::info;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tabled::{builder::Builder, settings::Style};

pub fn elapsed_time(elapsed: Duration) -> (String, f64) {
    let time = elapsed.as_millis();
    if time < 1000 {
        (" ms".to_string(), elapsed.as_secs_f64() * 1000.0)
    } else if time < 60_000 {
        (" s".to_string(), elapsed.as_secs_f64())
    } else if time < 3_600_000 {
        (" min".to_string(), elapsed.as_secs_f64() / 60.0)
    } else {
        (" h".to_string(), elapsed.as_secs_f64() / 3600.0)
    }
}

/// Accumulates wall time spent in the three phases of a Newton step
#[derive(Debug, Clone)]
pub struct CustomTimer {
    pub start: Instant,
    pub jac_time: Instant,
    pub jac: Duration,
    pub fun_time: Instant,
    pub fun: Duration,
    pub linear_system_time: Instant,
    pub linear_system: Duration,
}

impl Default for CustomTimer {
    fn default() -> Self {
        CustomTimer::new()
    }
}

impl CustomTimer {
    pub fn new() -> CustomTimer {
        CustomTimer {
            start: Instant::now(),
            jac_time: Instant::now(),
            jac: Duration::from_secs(0),
            fun_time: Instant::now(),
            fun: Duration::from_secs(0),
            linear_system_time: Instant::now(),
            linear_system: Duration::from_secs(0),
        }
    }
    pub fn start(&mut self) {
        *self = CustomTimer::new();
    }
    pub fn jac_tic(&mut self) {
        self.jac_time = Instant::now();
    }
    pub fn jac_tac(&mut self) {
        self.jac += self.jac_time.elapsed();
    }
    pub fn fun_tic(&mut self) {
        self.fun_time = Instant::now();
    }
    pub fn fun_tac(&mut self) {
        self.fun += self.fun_time.elapsed();
    }
    pub fn linear_system_tic(&mut self) {
        self.linear_system_time = Instant::now();
    }
    pub fn linear_system_tac(&mut self) {
        self.linear_system += self.linear_system_time.elapsed();
    }

    /// share of every phase in the total time since `start`, logged as a table
    pub fn get_all(&self) -> HashMap<String, String> {
        let mut timer_data: HashMap<String, String> = HashMap::new();
        let total = self.start.elapsed();
        let total_ns = total.as_nanos().max(1) as f64;
        let percent = |d: Duration| (100.0 * d.as_nanos() as f64 / total_ns * 1000.0).round() / 1000.0;

        let (unit, value) = elapsed_time(total);
        timer_data.insert(format!("time elapsed,{}", unit), format!("{:.3}", value));
        let mut other = 100.0;
        for (name, phase) in [
            ("Jacobian", self.jac),
            ("Residual", self.fun),
            ("Linear System", self.linear_system),
        ] {
            let share = percent(phase);
            other -= share;
            let (unit, value) = elapsed_time(phase);
            timer_data.insert(
                format!("{} (%,{})", name, unit),
                format!("{}, {:.3}", share, value),
            );
        }
        timer_data.insert("other %".to_string(), format!("{:.3}", other.max(0.0)));
        let mut table = Builder::from(timer_data.clone()).build();
        table.with(Style::modern_rounded());
        info!("\n \n TIMER DATA \n \n {}", table);
        timer_data
    }
}

/// pretty table of solver statistics
pub fn statistics_table(stats: &HashMap<String, String>) -> String {
    let mut rows: Vec<(&String, &String)> = stats.iter().collect();
    rows.sort();
    let mut builder = Builder::default();
    for (key, value) in rows {
        builder.push_record([key.clone(), value.clone()]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_time_units() {
        assert_eq!(elapsed_time(Duration::from_millis(20)).0, " ms");
        assert_eq!(elapsed_time(Duration::from_secs(5)).0, " s");
        let (unit, value) = elapsed_time(Duration::from_secs(120));
        assert_eq!(unit, " min");
        assert!((value - 2.0).abs() < 1e-12);
        assert_eq!(elapsed_time(Duration::from_secs(7200)).0, " h");
    }

    #[test]
    fn test_timer_collects_phases() {
        let mut timer = CustomTimer::new();
        timer.jac_tic();
        timer.jac_tac();
        timer.fun_tic();
        timer.fun_tac();
        let data = timer.get_all();
        assert!(data.contains_key("Jacobian (%, ms)"));
        assert!(data.contains_key("other %"));
    }

    #[test]
    fn test_statistics_table_contains_entries() {
        let stats = HashMap::from([
            ("number of iterations".to_string(), "3".to_string()),
            ("status".to_string(), "Converged".to_string()),
        ]);
        let table = statistics_table(&stats);
        assert!(table.contains("number of iterations"));
        assert!(table.contains("Converged"));
    }
}
