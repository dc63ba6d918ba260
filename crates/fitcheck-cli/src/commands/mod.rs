pub mod outfit;
pub mod session;
pub mod wardrobe;

use anyhow::Result;
use fitcheck_application::{CompositionOutcome, ImportedGarment, MountReport, SkipReason, StudioView};
use fitcheck_core::garment::classify as detect_category;
use fitcheck_core::pose::Pose;

use crate::args::{StudioCommand, WardrobeAction};
use crate::context::AppContext;

/// Runs one command against a mounted studio.
pub async fn run(ctx: &AppContext, command: StudioCommand) -> Result<()> {
    match command {
        StudioCommand::Classify { names } => classify(&names),
        StudioCommand::Poses => poses(),
        StudioCommand::Wardrobe { action } => match action {
            WardrobeAction::List => wardrobe::list(ctx).await?,
        },
        StudioCommand::Show => session::show(ctx).await?,
        StudioCommand::Establish { image, photo } => match (image, photo) {
            (Some(image), _) => session::establish(ctx, &image).await?,
            (None, Some(photo)) => session::create_model(ctx, &photo).await?,
            (None, None) => anyhow::bail!("Give a model image, or --photo"),
        },
        StudioCommand::Remodel => session::remodel(ctx).await?,
        StudioCommand::TryOn {
            garment_id,
            file,
            name,
            category,
        } => match (garment_id, file, name) {
            (Some(id), _, _) => outfit::try_on(ctx, &id).await?,
            (None, Some(file), Some(name)) => outfit::upload(ctx, &file, &name, category).await?,
            _ => anyhow::bail!("Give a garment id, or --file with --name"),
        },
        StudioCommand::Pose { pose } => outfit::pose(ctx, pose).await?,
        StudioCommand::Remove { slot } => outfit::remove(ctx, slot).await?,
        StudioCommand::StartOver => session::start_over(ctx).await?,
        StudioCommand::Import {
            id,
            name,
            url,
            price,
            category,
        } => wardrobe::import(ctx, id, name, url, price, category).await?,
        StudioCommand::Export { path } => session::export(ctx, &path).await?,
    }
    Ok(())
}

pub fn classify(names: &[String]) {
    for name in names {
        println!("{:<10} {}", detect_category(name).to_string(), name);
    }
}

pub fn poses() {
    for pose in Pose::catalog() {
        println!("{:<12} {:<14} {}", pose.to_string(), pose.label(), pose.instruction());
    }
}

/// Loads the wardrobe and session the way the studio page does on open.
pub(crate) async fn mount(ctx: &AppContext) -> MountReport {
    let report = ctx.studio.mount(&ctx.imports).await;
    if let Some(imported) = &report.imported {
        print_import(imported);
    }
    report
}

pub(crate) fn print_import(imported: &ImportedGarment) {
    if imported.added {
        println!(
            "📥 Imported '{}' as {} ({})",
            imported.garment.name, imported.garment.category, imported.garment.id
        );
    } else {
        println!("📥 '{}' is already in the wardrobe", imported.garment.name);
    }
}

pub(crate) fn print_outcome(outcome: &CompositionOutcome) {
    match outcome {
        CompositionOutcome::Applied => println!("✅ Done"),
        CompositionOutcome::Skipped(reason) => println!("⏭️  {}", skip_text(*reason)),
        CompositionOutcome::Failed { message } => println!("❌ {}", message),
        CompositionOutcome::Discarded => println!("⚠️  The session changed, result dropped"),
    }
}

fn skip_text(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NoModel => "No model yet, run `fitcheck establish <image>` first",
        SkipReason::Busy => "Another request is still running",
        SkipReason::NoChange => "Nothing to change",
        SkipReason::NothingToUndo => "Nothing to undo",
        SkipReason::NoPhoto => "No uploaded photo, run `fitcheck establish --photo <file>` first",
    }
}

pub(crate) fn print_view(view: &StudioView) {
    let Some(model) = &view.model_image_url else {
        println!("No model yet");
        return;
    };
    println!("Model:   {}", short_ref(model));
    if let Some(display) = &view.display_image {
        println!("Showing: {}", short_ref(display));
    }
    println!("Pose:    {} ({})", view.pose, view.pose.label());
    if view.outfit.is_empty() {
        println!("Outfit:  (nothing)");
    } else {
        println!("Outfit:");
        for (slot, garment) in view.outfit.occupied() {
            println!("  {:<24} {} [{}]", format!("{:?}", slot), garment.name, garment.id);
        }
    }
    if let Some(cursor) = view.cursor {
        println!(
            "History: {}/{}{}",
            cursor + 1,
            view.history_len,
            if view.can_undo { " (undo available)" } else { "" }
        );
    }
    if let Some(error) = &view.error {
        println!("Error:   {}", error);
    }
}

/// Shortens data URLs, which can run to megabytes.
pub(crate) fn short_ref(reference: &str) -> String {
    match reference.strip_prefix("data:") {
        Some(rest) => {
            let mime = rest.split([';', ',']).next().unwrap_or("");
            format!("data:{} ({} KB inline)", mime, reference.len() / 1024)
        }
        None => reference.to_string(),
    }
}
