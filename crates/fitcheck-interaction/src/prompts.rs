//! Instruction templates sent alongside the images.

use fitcheck_core::error::GenerationError;
use minijinja::{Environment, context};
use once_cell::sync::Lazy;

const COMPOSITE_TEMPLATE: &str = "\
You are a virtual try-on renderer. The first image is the model. \
{%- for garment in garments %} Image {{ loop.index + 1 }} is the {{ garment }}.{% endfor %}
Render a photorealistic full-body photo of the same person wearing \
{%- if garments | length == 1 %} this garment{% else %} all of these garments together{% endif %}. \
Keep the face, body shape, skin tone, hair, pose and background unchanged. \
Replace only the clothing it covers and keep every other item the model already wears.
Return only the image.";

const MODEL_TEMPLATE: &str = "\
Turn the person in this photo into a full-body fashion model photo for virtual try-on. \
Keep the face, identity, body shape, skin tone and hair unchanged. \
Show the whole body from head to toe ({{ pose }}), \
wearing simple fitted clothing, in front of a plain light studio background.
Return only the image.";

const REPOSE_TEMPLATE: &str = "\
The image shows a fashion model in a complete outfit. \
Regenerate the same person wearing exactly the same outfit in a new pose: {{ instruction }}. \
Keep the face, clothing, colours and background unchanged.
Return only the image.";

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("composite", COMPOSITE_TEMPLATE)
        .expect("composite template should parse");
    env.add_template("model", MODEL_TEMPLATE)
        .expect("model template should parse");
    env.add_template("repose", REPOSE_TEMPLATE)
        .expect("repose template should parse");
    env
});

/// Renders the composite instruction; `garments` are slot labels in image order.
pub fn composite_instruction(garments: &[&str]) -> Result<String, GenerationError> {
    render("composite", context! { garments => garments })
}

/// Renders the instruction that turns a user photo into the model image.
pub fn model_instruction(pose: &str) -> Result<String, GenerationError> {
    render("model", context! { pose => pose })
}

pub fn repose_instruction(instruction: &str) -> Result<String, GenerationError> {
    render("repose", context! { instruction => instruction })
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String, GenerationError> {
    TEMPLATES
        .get_template(name)
        .and_then(|template| template.render(ctx))
        .map_err(|e| GenerationError::InvalidInput(format!("Failed to render {name} prompt: {e}")))
}
