use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use neuroforge::matcher::CareerMatch;
use neuroforge::normalizer::{TraitVector, ZScoreReport};
use neuroforge::session::{DerivedMetrics, SessionRecord};

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .add_attribute(Attribute::Bold)
        .fg(Color::Cyan)
}

fn accuracy_cell(pct: f32) -> Cell {
    let color = if pct >= 80.0 {
        Color::Green
    } else if pct >= 50.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{:.1}%", pct))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

pub fn print_session_report(record: &SessionRecord) {
    println!("\n📋 Session Report: {}", record.session_id);

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        header_cell("Game"),
        header_cell("Score"),
        header_cell("Accuracy"),
        header_cell("Avg RT"),
        header_cell("Level"),
        header_cell("Rounds"),
    ]);
    table.add_row(vec![
        Cell::new(record.game_type.to_string()),
        Cell::new(record.final_score).set_alignment(CellAlignment::Right),
        accuracy_cell(record.accuracy_percentage),
        Cell::new(format!("{} ms", record.avg_reaction_time_ms))
            .set_alignment(CellAlignment::Right),
        Cell::new(record.difficulty_level_reached).set_alignment(CellAlignment::Right),
        Cell::new(record.telemetry.len()).set_alignment(CellAlignment::Right),
    ]);
    println!("{table}");

    if let Some(derived) = &record.derived {
        print_derived(derived);
    }
}

fn print_derived(derived: &DerivedMetrics) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec![header_cell("Derived Metric"), header_cell("Value")]);

    let mut row = |name: &str, value: String| {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    };

    match derived {
        DerivedMetrics::DetailSpotter {
            scan_efficiency,
            impulsivity_count,
        } => {
            row("Scan efficiency", format!("{scan_efficiency:.2}/min"));
            row("Impulsive errors", impulsivity_count.to_string());
        }
        DerivedMetrics::SonicConservatory {
            max_span,
            working_memory_score,
            mistake_count,
            contour_matches,
        } => {
            row("Max span", max_span.to_string());
            row("Working memory score", working_memory_score.to_string());
            row("Mistakes", mistake_count.to_string());
            row("Contour matches", contour_matches.to_string());
        }
        DerivedMetrics::DispatcherConsole {
            max_span,
            total_errors,
            highest_level,
        } => {
            row("Max span", max_span.to_string());
            row("Total errors", total_errors.to_string());
            row("Highest level", highest_level.to_string());
        }
        DerivedMetrics::MatrixAssessment {
            problems_seen,
            rule_tally,
        } => {
            row("Problems seen", problems_seen.to_string());
            for (name, count) in ["xor", "and", "union"].iter().zip(rule_tally) {
                row(&format!("Rule {name}"), count.to_string());
            }
        }
        DerivedMetrics::StroopChaos {
            impulse_errors,
            impulse_error_rate,
        } => {
            row("Impulse errors", impulse_errors.to_string());
            row("Impulse error rate", format!("{impulse_error_rate:.1}%"));
        }
    }

    println!("{table}");
}

/// Horizontal bar chart of the five trait dimensions.
pub fn print_trait_profile(user_id: &str, traits: &TraitVector) {
    println!("\n🧠 Trait Profile: {user_id}");

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec![
        header_cell("Dimension"),
        header_cell("Score"),
        header_cell(""),
    ]);

    for (name, value) in traits.as_array() {
        let filled = (value / 5.0).round() as usize;
        let bar: String = "█".repeat(filled.min(20));
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{value:.0}")).set_alignment(CellAlignment::Right),
            Cell::new(bar).fg(Color::Green),
        ]);
    }

    println!("{table}");
}

pub fn print_z_report(game_name: &str, report: Option<ZScoreReport>) {
    match report {
        Some(r) => {
            println!(
                "📈 {game_name}: z = {:+.2}, faster than {}% of the population",
                r.z, r.percentile
            );
        }
        None => {
            println!("📈 {game_name}: no usable baseline, z-score skipped");
        }
    }
}

pub fn print_career_matches(matches: &[CareerMatch]) {
    println!("\n🎯 Top Career Matches");

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        header_cell("Title"),
        header_cell("Category"),
        header_cell("Match"),
        header_cell("Why you"),
    ]);

    for m in matches {
        let color = if m.match_score >= 80 {
            Color::Green
        } else if m.match_score >= 60 {
            Color::Yellow
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(m.profile.title).add_attribute(Attribute::Bold),
            Cell::new(m.profile.category.to_string()),
            Cell::new(format!("{}%", m.match_score))
                .fg(color)
                .set_alignment(CellAlignment::Right),
            Cell::new(&m.insight),
        ]);
    }

    println!("{table}");
}
