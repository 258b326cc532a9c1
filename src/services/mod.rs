pub mod password_policy;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{
    AuthorDetailDto, AuthorDto, BookDetailDto, BookInstanceDto, BookSummaryDto, CatalogError,
    CatalogRecord, CatalogService, GenreDto, IndexCounts, LanguageDto,
};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{
    AuthError, AuthService, LoginResult, SIGNUP_FIELDS, SignupForm, SignupFormValues, UserInfo,
};
pub use auth_service_impl::SeaOrmAuthService;
