use std::io::{self, Write};

use circu_forge::{
    BenchmarkSource, ComplianceCheck, ComplianceStatus, Evaluation, Metal, ProcessingRoute,
    ScenarioComparison, StageBreakdown, ValidationWarning,
};

use crate::util::text::{percent, quantity, truncate, wrap};

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

const MAX_ROWS: usize = 15;

pub fn print_aggregate(route: &ProcessingRoute, evaluation: &Evaluation) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let agg = &evaluation.aggregate;
    let score_source = if evaluation.score.is_authoritative() {
        "declared"
    } else {
        "computed"
    };

    let rows = vec![
        ("Route", route.name.clone()),
        ("Stages", format!("{}", agg.stage_count)),
        ("Carbon", format!("{} kg CO2e", quantity(agg.total_carbon, 1))),
        ("Energy", format!("{} MJ", quantity(agg.total_energy, 1))),
        ("Water", format!("{} L", quantity(agg.total_water, 1))),
        ("Waste", format!("{} kg", quantity(agg.total_waste, 1))),
        ("Circular Loops", format!("{}", agg.circular_loops_count)),
        ("Carbon Saved", format!("{} kg CO2e", quantity(agg.carbon_saved, 1))),
        (
            "Circularity",
            format!("{:.0} / 100 ({})", agg.circularity_score, score_source),
        ),
    ];

    print_kv_table(&mut out, "Route Summary", &rows);
}

pub fn print_breakdown(breakdown: &[StageBreakdown]) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let data: Vec<(String, String, f64)> = breakdown
        .iter()
        .map(|s| {
            (
                s.name.clone(),
                quantity(s.metrics.carbon_emissions, 0),
                s.carbon_share,
            )
        })
        .collect();

    print_distribution_table(&mut out, "Carbon by Stage", "Stage", "kg CO2e", &data);
}

pub fn print_compliance(check: &ComplianceCheck) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let status = match check.status {
        ComplianceStatus::Compliant => "Compliant",
        ComplianceStatus::Warning => "Warning",
        ComplianceStatus::NonCompliant => "Non-compliant",
    };
    let benchmark = match (check.source, &check.process_route) {
        (BenchmarkSource::ProcessRoute, Some(route)) => format!("{} ({})", check.metal, route),
        (BenchmarkSource::Fallback, _) => format!("{} (default)", check.metal),
        _ => format!("{} (best available)", check.metal),
    };

    let rows = vec![
        ("Benchmark", benchmark),
        ("Limit", format!("{} kg CO2e", quantity(check.threshold, 0))),
        ("Actual", format!("{} kg CO2e", quantity(check.actual, 0))),
        ("Status", status.to_string()),
    ];
    print_kv_table(&mut out, "Emission Compliance", &rows);

    let _ = writeln!(out);
    print_bullet(&mut out, &check.message);
    for rec in &check.recommendations {
        print_bullet(&mut out, rec);
    }
}

pub fn print_comparison(comparison: &ScenarioComparison) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let name_w = 18usize;
    let carbon_w = 10usize;
    let change_w = 8usize;
    let sep_overhead = 10;
    let score_w = SAFE_TABLE_WIDTH.saturating_sub(name_w + carbon_w + change_w + sep_overhead);

    let title = match &comparison.metal {
        Some(metal) => format!("Scenario Comparison ({})", metal),
        None => "Scenario Comparison".to_string(),
    };

    let rule = |l: &str, m: &str, r: &str| {
        format!(
            "{}{l}{}{m}{}{m}{}{m}{}{r}",
            INDENT,
            "─".repeat(name_w + 2),
            "─".repeat(carbon_w + 2),
            "─".repeat(change_w + 2),
            "─".repeat(score_w + 2),
        )
    };

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(&title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}│ {:<name_w$} │ {:>carbon_w$} │ {:>change_w$} │ {:>score_w$} │",
        INDENT,
        "Scenario",
        "Carbon",
        "Change",
        "Score",
        name_w = name_w,
        carbon_w = carbon_w,
        change_w = change_w,
        score_w = score_w
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    let baseline = &comparison.baseline;
    let _ = writeln!(
        out,
        "{}│ {:<name_w$} │ {:>carbon_w$} │ {:>change_w$} │ {:>score_w$} │",
        INDENT,
        truncate(&format!("{} (base)", comparison.baseline_name), name_w),
        quantity(baseline.total_carbon, 0),
        "-",
        format!("{:.0}", baseline.circularity_score),
        name_w = name_w,
        carbon_w = carbon_w,
        change_w = change_w,
        score_w = score_w
    );

    for alt in comparison.alternatives.iter().take(MAX_ROWS) {
        let marker = if alt.name == comparison.best_scenario {
            "★ "
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:>carbon_w$} │ {:>change_w$} │ {:>score_w$} │",
            INDENT,
            truncate(&format!("{}{}", marker, alt.name), name_w),
            quantity(alt.result.total_carbon, 0),
            percent(alt.delta.total_carbon.percent_change),
            format!(
                "{:.0} ({:+.0})",
                alt.result.circularity_score, alt.circularity_improvement
            ),
            name_w = name_w,
            carbon_w = carbon_w,
            change_w = change_w,
            score_w = score_w
        );
    }

    if comparison.alternatives.len() > MAX_ROWS {
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:>carbon_w$} │ {:>change_w$} │ {:>score_w$} │",
            INDENT,
            format!("({} more)", comparison.alternatives.len() - MAX_ROWS),
            "...",
            "...",
            "...",
            name_w = name_w,
            carbon_w = carbon_w,
            change_w = change_w,
            score_w = score_w
        );
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));

    if !comparison.recommendations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}Recommendations:", INDENT);
        for rec in &comparison.recommendations {
            print_bullet(&mut out, rec);
        }
    }
}

pub fn print_catalog(metals: &[&Metal]) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let id_w = 20usize;
    let stages_w = 6usize;
    let sep_overhead = 8;
    let name_w = SAFE_TABLE_WIDTH.saturating_sub(id_w + stages_w + sep_overhead);

    for metal in metals {
        let _ = writeln!(
            out,
            "{}┌─ {} ─┐",
            INDENT,
            truncate(
                &format!("{} ({})", metal.name, metal.symbol),
                SAFE_TABLE_WIDTH - 6
            )
        );
        let _ = writeln!(
            out,
            "{}┌{i_line}┬{n_line}┬{s_line}┐",
            INDENT,
            i_line = "─".repeat(id_w + 2),
            n_line = "─".repeat(name_w + 2),
            s_line = "─".repeat(stages_w + 2)
        );
        let _ = writeln!(
            out,
            "{}│ {:<id_w$} │ {:<name_w$} │ {:>stages_w$} │",
            INDENT,
            "Route",
            "Ore / Name",
            "Stages",
            id_w = id_w,
            name_w = name_w,
            stages_w = stages_w
        );
        let _ = writeln!(
            out,
            "{}├{i_line}┼{n_line}┼{s_line}┤",
            INDENT,
            i_line = "─".repeat(id_w + 2),
            n_line = "─".repeat(name_w + 2),
            s_line = "─".repeat(stages_w + 2)
        );

        for ore in &metal.ores {
            for route in &ore.routes {
                let _ = writeln!(
                    out,
                    "{}│ {:<id_w$} │ {:<name_w$} │ {:>stages_w$} │",
                    INDENT,
                    truncate(&route.id, id_w),
                    truncate(&format!("{} / {}", ore.name, route.name), name_w),
                    route.stage_count(),
                    id_w = id_w,
                    name_w = name_w,
                    stages_w = stages_w
                );
            }
        }

        let _ = writeln!(
            out,
            "{}└{i_line}┴{n_line}┴{s_line}┘",
            INDENT,
            i_line = "─".repeat(id_w + 2),
            n_line = "─".repeat(name_w + 2),
            s_line = "─".repeat(stages_w + 2)
        );
    }
}

pub fn print_warnings(warnings: &[ValidationWarning]) {
    if warnings.is_empty() {
        return;
    }

    let stderr = io::stderr();
    let mut out = stderr.lock();

    let _ = writeln!(
        out,
        "{}\x1b[33m!\x1b[0m {} validation warning(s):",
        INDENT,
        warnings.len()
    );
    for warning in warnings.iter().take(MAX_ROWS) {
        print_bullet(&mut out, &warning.to_string());
    }
    if warnings.len() > MAX_ROWS {
        let _ = writeln!(out, "{}  ... {} more", INDENT, warnings.len() - MAX_ROWS);
    }
}

fn print_bullet(out: &mut impl Write, text: &str) {
    let wrapped = wrap(text, SAFE_TABLE_WIDTH - 4);
    if let Some((first, rest)) = wrapped.split_first() {
        let _ = writeln!(out, "{}  • {}", INDENT, first);
        for line in rest {
            let _ = writeln!(out, "{}    {}", INDENT, line);
        }
    }
}

fn print_distribution_table(
    out: &mut impl Write,
    title: &str,
    name_header: &str,
    value_header: &str,
    data: &[(String, String, f64)],
) {
    let name_w = 16usize;
    let value_w = 8usize;
    let sep_overhead = 6;
    let dist_w = SAFE_TABLE_WIDTH.saturating_sub(name_w + value_w + sep_overhead);
    let max_bar_width = dist_w.saturating_sub(8).min(20);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{name_line}┬{value_line}┬{dist_line}┐",
        INDENT,
        name_line = "─".repeat(name_w + 2),
        value_line = "─".repeat(value_w + 2),
        dist_line = "─".repeat(dist_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<name_w$} │ {:>value_w$} │ {:<dist_w$} │",
        INDENT,
        name_header,
        value_header,
        "Share",
        name_w = name_w,
        value_w = value_w,
        dist_w = dist_w
    );
    let _ = writeln!(
        out,
        "{}├{name_line}┼{value_line}┼{dist_line}┤",
        INDENT,
        name_line = "─".repeat(name_w + 2),
        value_line = "─".repeat(value_w + 2),
        dist_line = "─".repeat(dist_w + 2)
    );

    for (name, value, pct) in data.iter().take(MAX_ROWS) {
        let bar = make_bar(*pct, max_bar_width);
        let dist_cell = format!("{}  {:>5.1}%", bar, pct);
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:>value_w$} │ {:<dist_w$} │",
            INDENT,
            truncate(name, name_w),
            truncate(value, value_w),
            dist_cell,
            name_w = name_w,
            value_w = value_w,
            dist_w = dist_w
        );
    }

    if data.len() > MAX_ROWS {
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:>value_w$} │ {:<dist_w$} │",
            INDENT,
            "...",
            "...",
            format!("({} more stages)", data.len() - MAX_ROWS),
            name_w = name_w,
            value_w = value_w,
            dist_w = dist_w
        );
    }

    let _ = writeln!(
        out,
        "{}└{name_line}┴{value_line}┴{dist_line}┘",
        INDENT,
        name_line = "─".repeat(name_w + 2),
        value_line = "─".repeat(value_w + 2),
        dist_line = "─".repeat(dist_w + 2)
    );
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<key_w$} │ {:>val_w$} │",
        INDENT,
        "Metric",
        "Value",
        key_w = key_w,
        val_w = val_w
    );
    let _ = writeln!(
        out,
        "{}├{k_line}┼{v_line}┤",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
            key_w = key_w,
            val_w = val_w
        );
    }

    let _ = writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
}

fn make_bar(pct: f64, max_width: usize) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * max_width as f64).round() as usize;
    let empty = max_width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}
