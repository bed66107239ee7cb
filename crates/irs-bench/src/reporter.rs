use crate::data_generator::Tissue;
use crate::evaluation::EvaluationResult;

/// Print a formatted table of evaluation results to stdout.
pub fn print_report(results: &[EvaluationResult]) {
    if results.is_empty() {
        println!("No results to report.");
        return;
    }

    let tissues: Vec<&str> = Tissue::ALL.iter().map(|t| t.name()).collect();
    println!(
        "{:<18} {:<14} {:>8} {:>8} {:>8} {:>8} {:>8} {:>7} {:>6}",
        "Fixture",
        "Config",
        "before",
        "after",
        tissues[0],
        tissues[1],
        tissues[2],
        "OOR%",
        "fail"
    );
    println!("{}", "-".repeat(95));

    let mut current_fixture = String::new();
    for r in results {
        if r.fixture_name != current_fixture {
            if !current_fixture.is_empty() {
                println!("{}", "-".repeat(95));
            }
            current_fixture = r.fixture_name.clone();
        }

        println!(
            "{:<18} {:<14} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>7.2} {:>6}",
            r.fixture_name,
            r.config_name,
            r.before.mean_spread,
            r.after.mean_spread,
            r.after.tissue_spread[0],
            r.after.tissue_spread[1],
            r.after.tissue_spread[2],
            r.out_of_range_fraction * 100.0,
            r.failed_scans,
        );
    }
    println!("{}", "-".repeat(95));

    println!("\n=== Average spread reduction by config ===");
    for config in collect_config_names(results) {
        let ratios: Vec<f64> = results
            .iter()
            .filter(|r| r.config_name == config && r.before.mean_spread > 0.0)
            .map(|r| r.after.mean_spread / r.before.mean_spread)
            .collect();
        if !ratios.is_empty() {
            let avg = ratios.iter().sum::<f64>() / ratios.len() as f64;
            println!(
                "  {:<14} after/before = {:.3}  ({} fixtures)",
                config,
                avg,
                ratios.len()
            );
        }
    }
}

fn collect_config_names(results: &[EvaluationResult]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for r in results {
        if !names.contains(&r.config_name) {
            names.push(r.config_name.clone());
        }
    }
    names
}
