use std::path::Path;

use anyhow::{Context, Result};
use fitcheck_core::generation::ImageResolver;

use super::outfit::image_reference;
use super::{print_outcome, print_view, short_ref};
use crate::context::AppContext;

pub async fn show(ctx: &AppContext) -> Result<()> {
    print_view(&ctx.studio.view().await);
    Ok(())
}

pub async fn establish(ctx: &AppContext, image: &str) -> Result<()> {
    let model = image_reference(image)?;
    ctx.studio.establish_model(model.clone()).await;
    println!("🧍 Model set to {}", short_ref(&model));
    Ok(())
}

pub async fn create_model(ctx: &AppContext, photo: &str) -> Result<()> {
    let photo = image_reference(photo)?;
    println!("🧍 Creating your model from {}", short_ref(&photo));
    print_outcome(&ctx.studio.create_model(&photo).await);
    print_view(&ctx.studio.view().await);
    Ok(())
}

pub async fn remodel(ctx: &AppContext) -> Result<()> {
    print_outcome(&ctx.studio.regenerate_model().await);
    print_view(&ctx.studio.view().await);
    Ok(())
}

/// Reached from the shell only; a one-shot run restores a single-entry history.
pub async fn undo(ctx: &AppContext) -> Result<()> {
    print_outcome(&ctx.studio.undo().await);
    print_view(&ctx.studio.view().await);
    Ok(())
}

pub async fn start_over(ctx: &AppContext) -> Result<()> {
    ctx.studio.start_over().await;
    println!("🧹 Session cleared");
    Ok(())
}

/// Saves the displayed image, decoding inline data or fetching remote images.
pub async fn export(ctx: &AppContext, path: &Path) -> Result<()> {
    let view = ctx.studio.view().await;
    let display = view
        .display_image
        .context("Nothing to export, no model yet")?;
    let payload = ctx
        .resolver
        .fetch(&display)
        .await
        .with_context(|| format!("Failed to load {}", short_ref(&display)))?;
    tokio::fs::write(path, &payload.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "💾 Wrote {} ({}, {} bytes)",
        path.display(),
        payload.mime_type,
        payload.len()
    );
    Ok(())
}
