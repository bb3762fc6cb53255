// ottmarks services
// Services hold the enrichment logic (links, thumbnails), view derivation, voice capture and settings.

pub mod enrichment;
pub mod image_lookup;
pub mod link_resolver;
pub mod settings_engine;
pub mod thumbnail_resolver;
pub mod view_derivation;
pub mod voice_capture;
