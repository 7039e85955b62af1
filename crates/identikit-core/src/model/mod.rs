pub mod date;
pub mod gallery;
pub mod ids;
pub mod performer;
pub mod related;
pub mod scene;
pub mod stash_id;
pub mod studio;
pub mod tag;

pub use date::{Date, DatePrecision};
pub use gallery::Gallery;
pub use ids::{GalleryId, PerformerId, SceneId, StudioId, TagId};
pub use performer::{Gender, Performer};
pub use related::Related;
pub use scene::Scene;
pub use stash_id::StashId;
pub use studio::Studio;
pub use tag::Tag;
