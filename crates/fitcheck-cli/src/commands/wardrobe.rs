use anyhow::{Context, Result};
use fitcheck_core::import::{PendingImport, ProductId};

use super::print_import;
use crate::context::AppContext;

pub async fn list(ctx: &AppContext) -> Result<()> {
    let garments = ctx.studio.wardrobe().list().await;
    println!("{} garments", garments.len());
    for garment in garments {
        let price = garment
            .price
            .map(|price| format!("{:.0}", price))
            .unwrap_or_default();
        println!(
            "  {:<28} {:<10} {:>9}  {}",
            garment.id,
            garment.category.to_string(),
            price,
            garment.name
        );
    }
    Ok(())
}

/// Leaves a handoff record and lets the studio consume it.
pub async fn import(
    ctx: &AppContext,
    id: String,
    name: String,
    url: String,
    price: Option<f64>,
    category: Option<String>,
) -> Result<()> {
    ctx.imports.offer(&PendingImport {
        id: ProductId::Text(id),
        name,
        url,
        price,
        category,
    })?;
    let imported = ctx
        .studio
        .import_pending(&ctx.imports)
        .await
        .context("The handoff record could not be read back")?;
    print_import(&imported);
    Ok(())
}
