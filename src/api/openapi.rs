//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, bookshelves, favorites, health, mylibrary, notes, reading_list, reviews};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BookFinder API",
        version = "1.0.0",
        description = "Book search, shelves and reading notes on top of an external catalog"
    ),
    servers(
        (url = "/api", description = "BookFinder API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::status,
        auth::login,
        auth::logout,
        // Catalog
        books::search_books,
        books::get_book,
        books::related_books,
        // Favorites
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        // Reading list
        reading_list::list_reading_list,
        reading_list::add_to_reading_list,
        reading_list::update_reading_status,
        reading_list::remove_from_reading_list,
        // Notes
        notes::list_notes,
        notes::add_note,
        notes::update_note,
        notes::delete_note,
        // Reviews
        reviews::get_review,
        reviews::save_review,
        reviews::delete_review,
        // Local bookshelves
        bookshelves::list_shelves,
        bookshelves::create_shelf,
        bookshelves::rename_shelf,
        bookshelves::delete_shelf,
        bookshelves::list_shelf_books,
        bookshelves::add_shelf_book,
        bookshelves::remove_shelf_book,
        // Catalog library
        mylibrary::list_shelves,
        mylibrary::add_volume,
        mylibrary::remove_volume,
        mylibrary::list_volumes,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::VolumeInfo,
            crate::models::book::IndustryIdentifier,
            crate::models::book::ImageLinks,
            crate::models::book::Price,
            crate::models::book::SaleInfo,
            crate::models::book::FormatAvailability,
            crate::models::book::AccessInfo,
            crate::models::book::UserBookInfo,
            crate::models::book::SearchResults,
            books::RelatedBooksResponse,
            // Auth
            crate::models::user::UserInfo,
            crate::models::user::AuthStatus,
            // Shelves
            crate::models::shelf::Shelf,
            crate::models::shelf::ShelfBook,
            crate::models::shelf::ShelfRef,
            crate::models::shelf::CreateShelf,
            crate::models::shelf::RenameShelf,
            crate::models::shelf::AddShelfBook,
            crate::models::shelf::ShelvesResponse,
            crate::models::shelf::CreateShelfResponse,
            crate::models::shelf::ShelfBooksResponse,
            crate::models::shelf::LibraryShelvesResponse,
            // Favorites and reading list
            crate::models::favorite::FavoriteBook,
            crate::models::favorite::AddFavorite,
            crate::models::favorite::FavoritesResponse,
            crate::models::reading_list::ReadingStatus,
            crate::models::reading_list::ReadingListBook,
            crate::models::reading_list::AddToReadingList,
            crate::models::reading_list::UpdateReadingStatus,
            crate::models::reading_list::ReadingListResponse,
            // Notes and reviews
            crate::models::note::Note,
            crate::models::note::NoteRequest,
            crate::models::note::NotesResponse,
            crate::models::note::NoteCreatedResponse,
            crate::models::review::Review,
            crate::models::review::ReviewRequest,
            crate::models::review::ReviewResponse,
            crate::models::review::ReviewSavedResponse,
            // Health
            health::HealthResponse,
            // Common
            crate::models::ActionResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Visitor authentication"),
        (name = "books", description = "Catalog search and lookups"),
        (name = "favorites", description = "Favorite books"),
        (name = "reading-list", description = "Reading list and progress"),
        (name = "notes", description = "Notes on books"),
        (name = "reviews", description = "Book reviews"),
        (name = "bookshelves", description = "Local bookshelves"),
        (name = "mylibrary", description = "Catalog library of the signed-in visitor")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
