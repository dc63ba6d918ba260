use std::path::Path;

use anyhow::{Context, Result};
use fitcheck_core::garment::Category;
use fitcheck_core::outfit::OutfitSlot;
use fitcheck_core::pose::Pose;
use fitcheck_interaction::{file_url, read_image_file};

use super::{print_outcome, print_view};
use crate::context::AppContext;

/// Accepts URLs as they are and turns local paths into `file://` URLs.
pub(crate) fn image_reference(raw: &str) -> Result<String> {
    const SCHEMES: [&str; 4] = ["http://", "https://", "data:", "file://"];
    if SCHEMES.iter().any(|scheme| raw.starts_with(scheme)) {
        return Ok(raw.to_string());
    }
    let path = Path::new(raw)
        .canonicalize()
        .with_context(|| format!("No such image file: {}", raw))?;
    Ok(file_url(&path))
}

pub async fn try_on(ctx: &AppContext, garment_id: &str) -> Result<()> {
    let garment = ctx
        .studio
        .wardrobe()
        .find(garment_id)
        .await
        .with_context(|| format!("No garment '{}' in the wardrobe", garment_id))?;
    println!("👗 Trying on {} ({})", garment.name, garment.category);
    print_outcome(&ctx.studio.select_garment(garment, None).await);
    print_view(&ctx.studio.view().await);
    Ok(())
}

pub async fn upload(
    ctx: &AppContext,
    file: &Path,
    name: &str,
    category: Option<Category>,
) -> Result<()> {
    let path = file
        .canonicalize()
        .with_context(|| format!("No such image file: {}", file.display()))?;
    let payload = read_image_file(&path).await?;
    let (garment, outcome) = ctx
        .studio
        .upload_garment(name, &file_url(&path), category, payload)
        .await;
    println!("👗 Trying on {} ({}, {})", garment.name, garment.category, garment.id);
    print_outcome(&outcome);
    print_view(&ctx.studio.view().await);
    Ok(())
}

pub async fn pose(ctx: &AppContext, pose: Pose) -> Result<()> {
    println!("🕺 {}", pose.label());
    print_outcome(&ctx.studio.change_pose(pose).await);
    print_view(&ctx.studio.view().await);
    Ok(())
}

pub async fn remove(ctx: &AppContext, slot: OutfitSlot) -> Result<()> {
    print_outcome(&ctx.studio.remove_item(slot).await);
    print_view(&ctx.studio.view().await);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_reference() {
        assert_eq!(
            image_reference("https://img.example/model.png").unwrap(),
            "https://img.example/model.png"
        );
        assert!(image_reference("/definitely/not/here.png").is_err());

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("model.png");
        std::fs::write(&path, [1, 2, 3]).unwrap();
        let reference = image_reference(path.to_str().unwrap()).unwrap();
        assert!(reference.starts_with("file://"));
        assert!(reference.ends_with("model.png"));
    }
}
