pub mod post;
pub mod profile;
pub mod user;

/// Maps a document type to the collection it lives in. The generic CRUD
/// handlers in `handlers::factory` are parameterized over this.
pub trait Model {
    const COLLECTION: &'static str;
}
