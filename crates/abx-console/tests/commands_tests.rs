mod common;

use abx_console::commands;
use abx_console::NdjsonKind;
use abx_protocol::{Experiment, Page, PageMetadata, Variant};
use anyhow::Result;

use common::{context_for, spawn_backend};

fn three_way() -> Experiment {
    let mut exp = Experiment::with_defaults("shop:cart");
    exp.variants = vec![
        Variant::new("A", "Variant A", 0.34),
        Variant::new("B", "Variant B", 0.33),
        Variant::new("C", "Variant C", 0.33),
    ];
    exp
}

#[test]
fn test_format_percent() {
    assert_eq!(commands::format_percent(0.33), "33 %");
    assert_eq!(commands::format_percent(1.0), "100 %");
}

#[test]
fn test_format_experiment_table() {
    let page = Page {
        results: vec![Experiment::with_defaults("shop:cart")],
        metadata: PageMetadata {
            page: 1,
            page_size: 20,
            count: 1,
            nb_pages: 1,
        },
    };
    let text = commands::format_experiment_table(&page);
    assert!(text.starts_with("Id"));
    assert!(text.contains("shop:cart"));
    assert!(text.contains("yes"));
    assert!(text.contains("page 1/1 (1 experiments)"));
}

#[tokio::test]
async fn test_add_variant_command_stores_rebalanced_traffic() -> Result<()> {
    let Some((base, backend, handle)) = spawn_backend().await? else {
        return Ok(());
    };
    backend.insert(Experiment::with_defaults("shop:cart")).await;
    let ctx = context_for(&base);

    let out = commands::add_variant(&ctx, "shop:cart").await?;
    assert!(out.contains("Variant C"));

    let stored = backend.get("shop:cart").await.unwrap();
    let traffic: Vec<f64> = stored.variants.iter().map(|v| v.traffic).collect();
    assert_eq!(traffic, vec![0.33, 0.33, 0.34]);

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_remove_variant_command_redistributes() -> Result<()> {
    let Some((base, backend, handle)) = spawn_backend().await? else {
        return Ok(());
    };
    backend.insert(three_way()).await;
    let ctx = context_for(&base);

    commands::remove_variant(&ctx, "shop:cart", "A").await?;
    let stored = backend.get("shop:cart").await.unwrap();
    assert_eq!(stored.variants.len(), 2);
    assert_eq!(stored.variants[0].id, "B");
    assert_eq!(stored.variants[0].traffic, 0.5);
    assert_eq!(stored.variants[1].traffic, 0.5);

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_remove_unknown_variant_leaves_experiment_untouched() -> Result<()> {
    let Some((base, backend, handle)) = spawn_backend().await? else {
        return Ok(());
    };
    backend.insert(three_way()).await;
    let ctx = context_for(&base);

    assert!(commands::remove_variant(&ctx, "shop:cart", "Q").await.is_err());
    assert_eq!(backend.get("shop:cart").await.unwrap(), three_way());

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_set_traffic_command() -> Result<()> {
    let Some((base, backend, handle)) = spawn_backend().await? else {
        return Ok(());
    };
    backend.insert(three_way()).await;
    let ctx = context_for(&base);

    commands::set_traffic(&ctx, "shop:cart", vec![0.0, 50.0, 75.0, 100.0]).await?;
    let stored = backend.get("shop:cart").await.unwrap();
    let traffic: Vec<f64> = stored.variants.iter().map(|v| v.traffic).collect();
    assert_eq!(traffic, vec![0.5, 0.25, 0.25]);

    assert!(commands::set_traffic(&ctx, "shop:cart", vec![0.0, 100.0]).await.is_err());

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_results_command_prints_report_and_chart() -> Result<()> {
    let Some((base, backend, handle)) = spawn_backend().await? else {
        return Ok(());
    };
    backend.insert(three_way()).await;
    let ctx = context_for(&base);

    let out = commands::results(&ctx, "shop:cart", true).await?;
    assert!(out.contains("There is no winner yet"));
    assert!(out.contains("Tested population consist of 22 users with 22 displays"));
    assert!(out.contains("2018-03-01 10:00"));
    assert!(out.contains("20.00"));

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_create_and_toggle_commands() -> Result<()> {
    let Some((base, backend, handle)) = spawn_backend().await? else {
        return Ok(());
    };
    let ctx = context_for(&base);

    commands::create(&ctx, "shop:cart", Some("Cart".into()), None).await?;
    assert_eq!(backend.get("shop:cart").await.unwrap().name, "Cart");

    let out = commands::set_enabled(&ctx, "shop:cart", false).await?;
    assert!(out.contains("inactive"));

    let out = commands::list(&ctx, vec![], 1, None).await?;
    assert!(out.contains("shop:cart"));

    commands::delete(&ctx, "shop:cart").await?;
    assert!(commands::show(&ctx, "shop:cart").await.is_err());

    handle.abort();
    Ok(())
}

#[tokio::test]
async fn test_export_to_file_then_import() -> Result<()> {
    let Some((base, backend, handle)) = spawn_backend().await? else {
        return Ok(());
    };
    backend.insert(three_way()).await;
    let ctx = context_for(&base);
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("experiments.ndjson");

    let out = commands::export(&ctx, NdjsonKind::Experiments, Some(&path)).await?;
    assert!(out.contains("Exported 1 experiments records"));
    assert!(path.exists());

    let out = commands::import(&ctx, NdjsonKind::Experiments, &path).await?;
    assert!(out.contains("\"success\": 1"));

    handle.abort();
    Ok(())
}
