use serde::{Deserialize, Serialize};

/// One arm of an A/B experiment.
///
/// `traffic` is the share of the experiment population routed to this
/// variant, as a fraction in `[0, 1]`. The variants of an experiment are
/// expected to sum to 1.0 (to two decimal places).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub traffic: f64,
    /// Population currently assigned to this variant, as reported by results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_population: Option<u64>,
}

impl Variant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, traffic: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            traffic,
            current_population: None,
        }
    }

    /// Same variant with a different traffic share.
    pub fn with_traffic(&self, traffic: f64) -> Self {
        Self {
            traffic,
            ..self.clone()
        }
    }

    /// Display label used in reports and chart legends: `name (id)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

/// An A/B experiment as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Experiment {
    /// The experiment offered when creating a new one: enabled, with two
    /// variants splitting traffic evenly.
    pub fn with_defaults(id: impl Into<String>) -> Self {
        let mut a = Variant::new("A", "Variant A", 0.5);
        a.description = Some("Variant A is about ...".to_string());
        let mut b = Variant::new("B", "Variant B", 0.5);
        b.description = Some("Variant B is about ...".to_string());
        Self {
            id: id.into(),
            name: "My First experiment".to_string(),
            description: "See what people like the most about ...".to_string(),
            enabled: true,
            variants: vec![a, b],
        }
    }

    /// Sum of the variants' traffic fractions.
    pub fn traffic_sum(&self) -> f64 {
        self.variants.iter().map(|v| v.traffic).sum()
    }
}

/// A point of the cumulative traffic representation driving a multi-handle
/// slider. `traffic` is a cumulative percentage in `0..=100`; the leading
/// sentinel point has an empty `id` and `traffic == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficStackPoint {
    pub id: String,
    pub traffic: f64,
}

impl TrafficStackPoint {
    pub fn sentinel() -> Self {
        Self {
            id: String::new(),
            traffic: 0.0,
        }
    }
}

/// A conversion measurement recorded for a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantEvent {
    pub variant_id: String,
    pub date: chrono::NaiveDateTime,
    pub transformation: f64,
}

/// Aggregated results of one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantResult {
    pub variant: Variant,
    #[serde(default)]
    pub events: Vec<VariantEvent>,
    /// Conversion rate, in percent.
    #[serde(default)]
    pub transformation: f64,
    #[serde(default)]
    pub won: u64,
    #[serde(default)]
    pub displayed: u64,
}

/// Results of an experiment as returned by `GET /api/experiments/{id}/results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResults {
    #[serde(default)]
    pub results: Vec<VariantResult>,
    #[serde(default)]
    pub winner: Option<Variant>,
    pub experiment: Experiment,
}

/// Paging information attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub page: u32,
    pub page_size: u32,
    pub count: u64,
    pub nb_pages: u64,
}

/// One page of a paged listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub metadata: PageMetadata,
}

/// A listing request: free-text search terms plus paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub search: Vec<String>,
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            search: Vec::new(),
            page,
            page_size,
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search.push(term.into());
        self
    }

    /// Key pattern sent to the backend: `*` when no term is given, otherwise
    /// each term wrapped in wildcards and joined with commas.
    pub fn pattern(&self) -> String {
        let terms: Vec<String> = self
            .search
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| format!("*{t}*"))
            .collect();
        if terms.is_empty() {
            "*".to_string()
        } else {
            terms.join(",")
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}
