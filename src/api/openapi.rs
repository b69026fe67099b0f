//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, health, items, pages, reservations, users, wishlist};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Catalog API",
        version = "0.3.0",
        description = "Office library: catalog, copies, reservations and wishlist"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Pages
        pages::index,
        pages::login_page,
        pages::search_page,
        pages::contact_page,
        pages::contact_submit,
        pages::register_page,
        pages::register_submit,
        pages::form_schema,
        // Auth
        auth::login,
        auth::me,
        auth::forgot_password,
        auth::reset_password,
        // Users
        users::update_my_profile,
        users::change_my_password,
        // Items
        items::list_items,
        items::get_item,
        items::create_book,
        items::create_magazine,
        items::update_book,
        items::update_magazine,
        items::delete_item,
        items::list_copies,
        items::add_copy,
        items::edit_copy,
        items::delete_copy,
        // Reservations
        reservations::reserve,
        reservations::list_my_reservations,
        reservations::cancel,
        reservations::mark_borrowed,
        reservations::mark_returned,
        // Wishlist
        wishlist::list_wishlist,
        wishlist::add_wish,
        wishlist::like_wish,
        wishlist::delete_wish,
        // Admin
        admin::promote_admins,
    ),
    components(
        schemas(
            // Pages
            pages::PageResponse,
            crate::api::Flash,
            crate::api::FlashRedirect,
            // Auth
            auth::LoginResponse,
            crate::forms::LoginForm,
            crate::forms::RegistrationForm,
            crate::forms::ForgotPass,
            crate::forms::ResetPasswordForm,
            crate::forms::EditPasswordForm,
            crate::forms::EditProfileForm,
            crate::forms::ContactForm,
            crate::forms::SearchForm,
            // Items
            crate::models::item::LibraryItem,
            crate::models::item::ItemShort,
            crate::models::item::ItemQuery,
            crate::models::item::ItemType,
            crate::models::item::Language,
            crate::models::item::Category,
            crate::models::item::Author,
            crate::models::item::Tag,
            crate::models::item::BookDetails,
            crate::models::item::MagazineDetails,
            crate::forms::LibraryItemFields,
            crate::forms::BookForm,
            crate::forms::MagazineForm,
            crate::forms::AddNewItemBookForm,
            crate::forms::AddNewItemMagazineForm,
            // Copies
            crate::models::copy::ItemCopy,
            crate::models::copy::BookStatus,
            crate::forms::CopyAddForm,
            crate::forms::CopyEditForm,
            // Reservations
            crate::models::rental::RentalLog,
            crate::models::rental::RentalAction,
            crate::models::rental::ReservationDetails,
            // Wishlist
            crate::models::wishlist::WishListItem,
            crate::forms::WishlistForm,
            // Users
            crate::models::user::User,
            crate::models::user::RoleEnum,
            // Admin
            admin::PromoteRequest,
            crate::services::admin::PromotionReport,
            crate::services::admin::PromotionStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "pages", description = "Page titles and form descriptions"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Profile of the signed-in user"),
        (name = "items", description = "Catalog of books and magazines"),
        (name = "copies", description = "Physical copies of catalog items"),
        (name = "reservations", description = "Reservations and borrows"),
        (name = "wishlist", description = "Titles proposed for purchase"),
        (name = "admin", description = "Administration")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
