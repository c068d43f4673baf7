pub mod collection;
pub mod record;
pub mod synastry;
pub mod transits;

// Re-export handler functions for use in routing
pub use collection::get as collection_get;
pub use collection::post as collection_post;
pub use record::delete as record_delete;
pub use record::get as record_get;
pub use synastry::post as synastry_post;
pub use transits::post as transits_post;
