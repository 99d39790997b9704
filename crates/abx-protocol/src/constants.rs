/// Ordered table used to label new variants. `N` is absent from the table,
/// so the variant after `M` is `O`.
pub const VARIANT_LETTERS: [&str; 25] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "O", "P", "Q", "R", "S",
    "T", "U", "V", "W", "X", "Y", "Z",
];

/// Base path of the experiment resource.
pub const EXPERIMENTS_PATH: &str = "/api/experiments";

/// Bulk export/import of experiments, one JSON document per line.
pub const EXPERIMENTS_NDJSON_PATH: &str = "/api/experiments.ndjson";

/// Bulk export/import of experiment events, one JSON document per line.
pub const EXPERIMENT_EVENTS_NDJSON_PATH: &str = "/api/experiments/events.ndjson";

/// Header carrying the API client id when credentials are configured.
pub const CLIENT_ID_HEADER: &str = "Izanami-Client-Id";

/// Header carrying the API client secret when credentials are configured.
pub const CLIENT_SECRET_HEADER: &str = "Izanami-Client-Secret";

/// Event names emitted by the backend for experiment lifecycle changes.
pub const EVENT_EXPERIMENT_CREATED: &str = "EXPERIMENT_CREATED";
pub const EVENT_EXPERIMENT_UPDATED: &str = "EXPERIMENT_UPDATED";
pub const EVENT_EXPERIMENT_DELETED: &str = "EXPERIMENT_DELETED";

/// Path of a single experiment.
pub fn experiment_path(id: &str) -> String {
    format!("{EXPERIMENTS_PATH}/{id}")
}

/// Path of an experiment's results.
pub fn experiment_results_path(id: &str) -> String {
    format!("{EXPERIMENTS_PATH}/{id}/results")
}
