use abx_protocol::{ExperimentResults, Variant};
use serde::Serialize;

/// Fixed palette assigned to variants in id order.
pub const SERIES_COLORS: [&str; 10] = [
    "#95cf3d", "#027cc3", "#ff8900", "#d50200", "#7cb5ec", "#8085c9", "#ffeb3b", "#8a2be2",
    "#a52a2a", "#deb887",
];

/// Palette colour of the `index`-th series. Wraps past the end of the palette.
pub fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// Per-variant line of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantLine {
    pub id: String,
    pub name: String,
    pub color: &'static str,
    /// Conversion rate, in percent.
    pub conversion: f64,
    pub won: u64,
    pub displayed: u64,
}

/// Summary of an experiment's results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsReport {
    pub experiment_name: String,
    pub winner: Option<Variant>,
    /// Users assigned to any variant.
    pub population: u64,
    /// Total displays across variants.
    pub displays: u64,
    /// Variants sorted by id.
    pub variants: Vec<VariantLine>,
}

impl ResultsReport {
    pub fn from_results(results: &ExperimentResults) -> Self {
        let mut sorted: Vec<_> = results.results.iter().collect();
        sorted.sort_by(|a, b| abx_allocator::locale_cmp(&a.variant.id, &b.variant.id));

        let population: u64 = sorted
            .iter()
            .filter_map(|r| r.variant.current_population)
            .sum();
        let displays: u64 = sorted.iter().map(|r| r.displayed).sum();

        let variants = sorted
            .iter()
            .enumerate()
            .map(|(i, r)| VariantLine {
                id: r.variant.id.clone(),
                name: r.variant.name.clone(),
                color: series_color(i),
                conversion: r.transformation,
                won: r.won,
                displayed: r.displayed,
            })
            .collect();

        Self {
            experiment_name: results.experiment.name.clone(),
            winner: results.winner.clone(),
            population,
            displays,
            variants,
        }
    }

    pub fn winner_line(&self) -> String {
        match &self.winner {
            Some(w) => format!(
                "The winner of the experiment name \"{}\" is \"{}\" ({})",
                self.experiment_name, w.name, w.id
            ),
            None => format!(
                "There is no winner yet for the experiment name \"{}\"",
                self.experiment_name
            ),
        }
    }

    pub fn population_line(&self) -> String {
        format!(
            "Tested population consist of {} users with {} displays",
            self.population, self.displays
        )
    }

    /// Plain-text rendering of the whole report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("Winner\n");
        out.push_str(&format!("  {}\n", self.winner_line()));
        out.push_str("Population\n");
        out.push_str(&format!("  {}\n", self.population_line()));
        out.push_str("Variants\n");
        for line in &self.variants {
            out.push_str(&format!(
                "  Variant \"{}\" ({}) has a conversion rate of {:.3} %\n",
                line.name, line.id, line.conversion
            ));
            out.push_str(&format!(
                "    won {} times over {} displays\n",
                line.won, line.displayed
            ));
        }
        out
    }
}
