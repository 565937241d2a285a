//! Output formatting and progress bars for CLI

use crate::{analysis::PopulationStats, pipeline::MetricsSummary, value_store::ValueSnapshot};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, String)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

/// Print the population statistics of a finished run
pub fn print_population(stats: &PopulationStats) {
    print_subsection("Population");
    print_stats_table(&[
        ("Agents", stats.agents.to_string()),
        ("Live", stats.live_agents.to_string()),
        ("Inert", stats.inert_agents.to_string()),
        ("Food found", format_number(stats.total_food_found)),
        ("Mean food", format!("{:.2}", stats.mean_food_found)),
        ("Std dev food", format!("{:.2}", stats.std_dev_food_found)),
        ("Max food", stats.max_food_found.to_string()),
    ]);

    if !stats.by_strategy.is_empty() {
        print_subsection("By strategy");
        for (label, strategy) in &stats.by_strategy {
            print_kv(
                label,
                &format!(
                    "{} agents, {} food ({:.2} per agent)",
                    strategy.agents, strategy.food_found, strategy.mean_food_found
                ),
            );
        }
    }
}

/// Print run metrics
pub fn print_metrics(summary: &MetricsSummary) {
    print_subsection("Metrics");
    print_stats_table(&[
        ("Ticks", format_number(summary.ticks)),
        ("Agent steps", format_number(summary.agent_steps as u64)),
        ("Food rate", format!("{:.4}", summary.food_rate)),
        ("Exhausted", summary.exhausted.to_string()),
        ("Failures", summary.failures.to_string()),
        (
            "First food tick",
            summary
                .first_food_tick
                .map_or_else(|| "-".to_string(), |tick| tick.to_string()),
        ),
    ]);
}

/// Print a value snapshot, limited to `limit` rows
pub fn print_snapshot(snapshot: &ValueSnapshot, limit: usize) {
    match snapshot {
        ValueSnapshot::Table(records) => {
            println!("  {:12} {:8} {:>12}", "state", "action", "value");
            for record in records.iter().take(limit) {
                println!(
                    "  {:12} {:8} {:>12.6}",
                    record.state, record.action, record.value
                );
            }
        }
        ValueSnapshot::Perceptron(units) => {
            println!(
                "  {:8} {:>10} {:>10} {:>10} {:>10} {:>10}",
                "action", "bias", "w_up", "w_down", "w_left", "w_right"
            );
            for unit in units.iter().take(limit) {
                println!(
                    "  {:8} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
                    unit.action, unit.bias, unit.w_up, unit.w_down, unit.w_left, unit.w_right
                );
            }
        }
    }
    if snapshot.len() > limit {
        println!("  ... {} more", snapshot.len() - limit);
    }
}
