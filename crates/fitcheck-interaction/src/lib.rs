//! Remote collaborators: image resolution and Gemini image generation.

pub mod gemini_image_service;
pub mod image_resolver;
pub mod prompts;

pub use gemini_image_service::GeminiImageService;
pub use image_resolver::{
    HttpImageResolver, decode_data_url, encode_data_url, file_url, read_image_file,
};
