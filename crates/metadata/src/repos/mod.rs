//! Repository traits, one per concern.

pub mod clients;
pub mod geotags;
pub mod keys;
pub mod licenses;
pub mod packs;
pub mod sessions;
pub mod sounds;
pub mod tokens;
pub mod users;

pub use clients::ClientRepo;
pub use geotags::GeoTagRepo;
pub use keys::ApiKeyRepo;
pub use licenses::LicenseRepo;
pub use packs::PackRepo;
pub use sessions::SessionRepo;
pub use sounds::SoundRepo;
pub use tokens::TokenRepo;
pub use users::UserRepo;
