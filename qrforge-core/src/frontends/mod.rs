// Assets embedded into the binary (default delivery).
pub mod provider_embed;

// Assets read from disk on every request, for editing the template live.
#[cfg(feature = "ui_disk")]
pub mod provider_disk;
