//! Command implementations behind the `abx` binary.
//!
//! Each command takes the [`ConsoleContext`] explicitly and returns the text
//! to print, so the binary only deals with argument parsing and output.

use std::path::Path;

use abx_allocator::VariantEditor;
use abx_protocol::{Experiment, Page, PageRequest};
use abx_results::{build_chart_data, ChartData, ResultsReport};
use anyhow::Context;

use crate::client::NdjsonKind;
use crate::context::ConsoleContext;

/// Traffic as a whole percentage, e.g. `33 %`.
pub fn format_percent(traffic: f64) -> String {
    format!("{} %", (traffic * 100.0).round())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

pub fn format_experiment_table(page: &Page<Experiment>) -> String {
    let mut out = format!(
        "{:<32} {:<24} {:<32} {:<6}\n",
        "Id", "Name", "Description", "Active"
    );
    for exp in &page.results {
        out.push_str(&format!(
            "{:<32} {:<24} {:<32} {:<6}\n",
            truncate(&exp.id, 32),
            truncate(&exp.name, 24),
            truncate(&exp.description, 32),
            if exp.enabled { "yes" } else { "no" }
        ));
    }
    let m = &page.metadata;
    out.push_str(&format!(
        "page {}/{} ({} experiments)\n",
        m.page,
        m.nb_pages.max(1),
        m.count
    ));
    out
}

pub fn format_experiment(exp: &Experiment) -> String {
    let mut out = String::new();
    out.push_str(&format!("Id:          {}\n", exp.id));
    out.push_str(&format!("Name:        {}\n", exp.name));
    out.push_str(&format!("Description: {}\n", exp.description));
    out.push_str(&format!("Active:      {}\n", if exp.enabled { "yes" } else { "no" }));
    out.push_str("Variants:\n");
    for v in &exp.variants {
        out.push_str(&format!(
            "  {:<4} {:<24} {:>6}\n",
            v.id,
            truncate(&v.name, 24),
            format_percent(v.traffic)
        ));
    }
    out
}

/// Chart series as a table: one row per point, one column per variant.
pub fn format_chart(data: &ChartData) -> String {
    if data.is_empty() {
        return "No events recorded yet.\n".to_string();
    }
    let mut out = format!("{:<17}", "Date");
    for s in &data.series {
        out.push_str(&format!(" {:>10}", truncate(&s.key, 10)));
    }
    out.push('\n');
    for (i, point) in data.points.iter().enumerate() {
        out.push_str(&format!("{:<17}", point.name));
        for s in &data.series {
            let value = data.value(i, &s.key).unwrap_or_default();
            out.push_str(&format!(" {value:>10.2}"));
        }
        out.push('\n');
    }
    out
}

pub async fn list(ctx: &ConsoleContext, search: Vec<String>, page: u32, page_size: Option<u32>) -> anyhow::Result<String> {
    let mut request = PageRequest::new(page, page_size.unwrap_or(ctx.config.display.page_size));
    request.search = search;
    let page = ctx
        .client
        .list(&request)
        .await
        .context("failed to list experiments")?;
    Ok(format_experiment_table(&page))
}

pub async fn show(ctx: &ConsoleContext, id: &str) -> anyhow::Result<String> {
    let exp = ctx
        .client
        .fetch(id)
        .await
        .with_context(|| format!("failed to fetch experiment '{id}'"))?;
    Ok(format_experiment(&exp))
}

pub async fn create(
    ctx: &ConsoleContext,
    id: &str,
    name: Option<String>,
    description: Option<String>,
) -> anyhow::Result<String> {
    let mut exp = Experiment::with_defaults(id);
    if let Some(name) = name {
        exp.name = name;
    }
    if let Some(description) = description {
        exp.description = description;
    }
    let created = ctx
        .client
        .create(&exp)
        .await
        .with_context(|| format!("failed to create experiment '{id}'"))?;
    Ok(format_experiment(&created))
}

pub async fn set_enabled(ctx: &ConsoleContext, id: &str, enabled: bool) -> anyhow::Result<String> {
    let exp = ctx
        .client
        .set_enabled(id, enabled)
        .await
        .with_context(|| format!("failed to update experiment '{id}'"))?;
    Ok(format!(
        "Experiment {} is now {}\n",
        exp.id,
        if exp.enabled { "active" } else { "inactive" }
    ))
}

pub async fn delete(ctx: &ConsoleContext, id: &str) -> anyhow::Result<String> {
    ctx.client
        .delete(id)
        .await
        .with_context(|| format!("failed to delete experiment '{id}'"))?;
    Ok(format!("Experiment {id} deleted\n"))
}

pub async fn results(ctx: &ConsoleContext, id: &str, with_chart: bool) -> anyhow::Result<String> {
    let results = ctx
        .client
        .results(id)
        .await
        .with_context(|| format!("failed to fetch results of '{id}'"))?;
    let mut out = format!("Results for {}\n", results.experiment.name);
    out.push_str(&ResultsReport::from_results(&results).render());
    if with_chart {
        out.push_str("Conversion over time\n");
        out.push_str(&format_chart(&build_chart_data(&results)));
    }
    Ok(out)
}

/// Fetch an experiment, apply `edit` to its variants, and store it back.
async fn edit_variants<F>(ctx: &ConsoleContext, id: &str, edit: F) -> anyhow::Result<Experiment>
where
    F: FnOnce(&mut VariantEditor) -> anyhow::Result<()>,
{
    let mut exp = ctx
        .client
        .fetch(id)
        .await
        .with_context(|| format!("failed to fetch experiment '{id}'"))?;
    let mut editor = VariantEditor::new(std::mem::take(&mut exp.variants));
    edit(&mut editor)?;
    exp.variants = editor.into_variants();
    ctx.client
        .update(id, &exp)
        .await
        .with_context(|| format!("failed to update experiment '{id}'"))
}

pub async fn add_variant(ctx: &ConsoleContext, id: &str) -> anyhow::Result<String> {
    let exp = edit_variants(ctx, id, |editor| {
        editor.add()?;
        Ok(())
    })
    .await?;
    Ok(format_experiment(&exp))
}

pub async fn remove_variant(ctx: &ConsoleContext, id: &str, variant_id: &str) -> anyhow::Result<String> {
    let exp = edit_variants(ctx, id, |editor| Ok(editor.remove(variant_id)?)).await?;
    Ok(format_experiment(&exp))
}

/// Set traffic from slider handle positions (percent, sentinel first, ids
/// in sorted order).
pub async fn set_traffic(ctx: &ConsoleContext, id: &str, positions: Vec<f64>) -> anyhow::Result<String> {
    let exp = edit_variants(ctx, id, |editor| Ok(editor.drag(&positions)?)).await?;
    Ok(format_experiment(&exp))
}

pub async fn export(ctx: &ConsoleContext, kind: NdjsonKind, out: Option<&Path>) -> anyhow::Result<String> {
    let body = ctx
        .client
        .export(kind)
        .await
        .with_context(|| format!("failed to export {kind}"))?;
    match out {
        Some(path) => {
            std::fs::write(path, &body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(format!(
                "Exported {} {kind} records to {}\n",
                abx_protocol::ndjson::count_records(&body),
                path.display()
            ))
        }
        None => Ok(body),
    }
}

pub async fn import(ctx: &ConsoleContext, kind: NdjsonKind, file: &Path) -> anyhow::Result<String> {
    let body = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let report = ctx
        .client
        .import(kind, body)
        .await
        .with_context(|| format!("failed to import {kind}"))?;
    Ok(format!("{}\n", serde_json::to_string_pretty(&report)?))
}
