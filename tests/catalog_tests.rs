use chrono::{Duration, Local};
use locallibrary::config::Config;
use locallibrary::db::NewUser;
use locallibrary::domain::{DueBackFilter, EntityKind, InstanceFilter};
use locallibrary::entities::book_instance::LoanStatus;
use locallibrary::models::catalog::{AuthorInput, BookInput, BookInstanceInput, NameInput};
use locallibrary::services::{
    AuthError, AuthService, CatalogError, CatalogRecord, CatalogService, SignupForm,
};
use locallibrary::state::SharedState;

async fn setup() -> SharedState {
    let path = std::env::temp_dir().join(format!(
        "locallibrary-catalog-{}.db",
        uuid::Uuid::new_v4()
    ));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}?mode=rwc", path.display());

    SharedState::new(config)
        .await
        .expect("Failed to create shared state")
}

fn name(value: &str) -> NameInput {
    NameInput {
        name: value.to_string(),
    }
}

fn author(first: &str, last: &str) -> AuthorInput {
    AuthorInput {
        first_name: first.to_string(),
        last_name: last.to_string(),
        date_of_birth: None,
        date_of_death: None,
    }
}

fn book(title: &str, isbn: &str, author_id: i32) -> BookInput {
    BookInput {
        title: title.to_string(),
        summary: format!("Summary of {title}"),
        isbn: isbn.to_string(),
        author_id: Some(author_id),
        language_id: None,
        genre_ids: Vec::new(),
        cover: None,
    }
}

fn copy(book_id: i32, status: LoanStatus) -> BookInstanceInput {
    BookInstanceInput {
        id: None,
        book_id: Some(book_id),
        imprint: "Gollancz, 2011".to_string(),
        due_back: None,
        status,
        borrower_id: None,
    }
}

#[tokio::test]
async fn test_genre_names_unique_ignoring_case() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    catalog.create_genre(&name("Fantasy")).await.unwrap();

    let err = catalog.create_genre(&name("fantasy")).await.unwrap_err();
    match err {
        CatalogError::ConstraintViolation { field, message } => {
            assert_eq!(field, "name");
            assert_eq!(message, "Genre already exists (case insensitive match)");
        }
        other => panic!("expected constraint violation, got {other:?}"),
    }

    assert_eq!(catalog.count_all(EntityKind::Genre).await.unwrap(), 1);
}

#[tokio::test]
async fn test_rename_genre_into_existing_name_rejected() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    catalog.create_genre(&name("Poetry")).await.unwrap();
    let horror = catalog.create_genre(&name("Horror")).await.unwrap();

    let err = catalog
        .rename_genre(horror.id, &name("POETRY"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::ConstraintViolation { .. }));

    let renamed = catalog
        .rename_genre(horror.id, &name("Gothic Horror"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Gothic Horror");
}

#[tokio::test]
async fn test_language_names_unique_ignoring_case() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    catalog.create_language(&name("English")).await.unwrap();
    let err = catalog.create_language(&name("ENGLISH")).await.unwrap_err();

    match err {
        CatalogError::ConstraintViolation { message, .. } => {
            assert_eq!(message, "Language already exists (case insensitive match)");
        }
        other => panic!("expected constraint violation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_isbn_unique() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    let tolkien = catalog.create_author(&author("J. R. R.", "Tolkien")).await.unwrap();
    catalog
        .create_book(&book("The Hobbit", "9780261103344", tolkien.id))
        .await
        .unwrap();

    let err = catalog
        .create_book(&book("The Hobbit (reprint)", "9780261103344", tolkien.id))
        .await
        .unwrap_err();

    match err {
        CatalogError::ConstraintViolation { field, .. } => assert_eq!(field, "isbn"),
        other => panic!("expected constraint violation, got {other:?}"),
    }
    assert_eq!(catalog.count_all(EntityKind::Book).await.unwrap(), 1);
}

#[tokio::test]
async fn test_isbn_stored_trimmed_and_padding_does_not_dodge_uniqueness() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    let tolkien = catalog.create_author(&author("J. R. R.", "Tolkien")).await.unwrap();
    let hobbit = catalog
        .create_book(&book("  The Hobbit ", " 9780261103344 ", tolkien.id))
        .await
        .unwrap();
    assert_eq!(hobbit.isbn, "9780261103344");
    assert_eq!(hobbit.title, "The Hobbit");

    let err = catalog
        .create_book(&book("The Hobbit (reprint)", "  9780261103344  ", tolkien.id))
        .await
        .unwrap_err();
    match err {
        CatalogError::ConstraintViolation { field, .. } => assert_eq!(field, "isbn"),
        other => panic!("expected constraint violation, got {other:?}"),
    }

    let err = catalog
        .create_book(&book("Too long", "  97802611033445  ", tolkien.id))
        .await
        .unwrap_err();
    match err {
        CatalogError::Validation(errors) => assert_eq!(
            errors.get("isbn"),
            ["Ensure this value has at most 13 characters (it has 14)."]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }

    assert_eq!(catalog.count_all(EntityKind::Book).await.unwrap(), 1);
}

#[tokio::test]
async fn test_author_delete_blocked_by_books() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    let austen = catalog.create_author(&author("Jane", "Austen")).await.unwrap();
    let emma = catalog
        .create_book(&book("Emma", "9780141439587", austen.id))
        .await
        .unwrap();

    let err = catalog.delete_author(austen.id).await.unwrap_err();
    assert!(matches!(err, CatalogError::ReferentialIntegrity(_)));
    assert_eq!(catalog.count_all(EntityKind::Author).await.unwrap(), 1);

    catalog.delete_book(emma.id).await.unwrap();
    catalog.delete_author(austen.id).await.unwrap();
    assert_eq!(catalog.count_all(EntityKind::Author).await.unwrap(), 0);
}

#[tokio::test]
async fn test_book_delete_blocked_by_copies() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    let le_guin = catalog.create_author(&author("Ursula", "Le Guin")).await.unwrap();
    let earthsea = catalog
        .create_book(&book("A Wizard of Earthsea", "9780547773742", le_guin.id))
        .await
        .unwrap();
    let instance = catalog
        .create_instance(&copy(earthsea.id, LoanStatus::Available))
        .await
        .unwrap();

    let err = catalog.delete_book(earthsea.id).await.unwrap_err();
    assert!(matches!(err, CatalogError::ReferentialIntegrity(_)));

    catalog.delete_instance(instance.id).await.unwrap();
    catalog.delete_book(earthsea.id).await.unwrap();
}

#[tokio::test]
async fn test_language_delete_clears_book_language() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    let french = catalog.create_language(&name("French")).await.unwrap();
    let hugo = catalog.create_author(&author("Victor", "Hugo")).await.unwrap();
    let mut input = book("Les Misérables", "9782253096344", hugo.id);
    input.language_id = Some(french.id);
    let created = catalog.create_book(&input).await.unwrap();
    assert_eq!(created.language.as_ref().map(|l| l.id), Some(french.id));

    catalog.delete_language(french.id).await.unwrap();

    let record = catalog
        .get_by_id(EntityKind::Book, &created.id.to_string())
        .await
        .unwrap();
    match record {
        CatalogRecord::BookDetail(detail) => assert!(detail.language.is_none()),
        other => panic!("expected book detail, got {other:?}"),
    }
}

#[tokio::test]
async fn test_count_available_instances() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    let herbert = catalog.create_author(&author("Frank", "Herbert")).await.unwrap();
    let dune = catalog
        .create_book(&book("Dune", "9780441172719", herbert.id))
        .await
        .unwrap();

    for status in [
        LoanStatus::Available,
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Maintenance,
        LoanStatus::Reserved,
    ] {
        catalog.create_instance(&copy(dune.id, status)).await.unwrap();
    }

    assert_eq!(catalog.count_available_instances().await.unwrap(), 2);

    let counts = catalog.index_counts().await.unwrap();
    assert_eq!(counts.num_books, 1);
    assert_eq!(counts.num_instances, 5);
    assert_eq!(counts.num_instances_available, 2);
    assert_eq!(counts.num_authors, 1);
}

#[tokio::test]
async fn test_instance_ids_generated() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    let pratchett = catalog.create_author(&author("Terry", "Pratchett")).await.unwrap();
    let mort = catalog
        .create_book(&book("Mort", "9780552131063", pratchett.id))
        .await
        .unwrap();

    let first = catalog
        .create_instance(&copy(mort.id, LoanStatus::default()))
        .await
        .unwrap();
    let second = catalog
        .create_instance(&copy(mort.id, LoanStatus::default()))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    assert!(!first.id.is_nil());
    assert_eq!(first.status, LoanStatus::Maintenance);
    assert_eq!(first.display_name, format!("{} (Mort)", first.id));
}

#[tokio::test]
async fn test_borrower_delete_clears_loan() {
    let state = setup().await;
    let catalog = &state.catalog_service;
    let security = state.config.read().await.security.clone();

    let reader = state
        .store
        .create_user(
            NewUser {
                username: "reader".to_string(),
                first_name: "Rita".to_string(),
                last_name: "Reader".to_string(),
                password: "tangerine-orbit-42".to_string(),
                is_staff: false,
            },
            &security,
        )
        .await
        .unwrap();

    let orwell = catalog.create_author(&author("George", "Orwell")).await.unwrap();
    let novel = catalog
        .create_book(&book("Nineteen Eighty-Four", "9780451524935", orwell.id))
        .await
        .unwrap();

    let mut loan = copy(novel.id, LoanStatus::OnLoan);
    loan.borrower_id = Some(reader.id);
    loan.due_back = Some(Local::now().date_naive() - Duration::days(1));
    let instance = catalog.create_instance(&loan).await.unwrap();
    assert_eq!(instance.borrower_id, Some(reader.id));
    assert!(instance.is_due);

    assert!(state.store.delete_user(reader.id).await.unwrap());

    let record = catalog
        .get_by_id(EntityKind::BookInstance, &instance.id.to_string())
        .await
        .unwrap();
    match record {
        CatalogRecord::BookInstance(after) => assert_eq!(after.borrower_id, None),
        other => panic!("expected book instance, got {other:?}"),
    }
}

#[tokio::test]
async fn test_book_genres_replaced_on_update() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    let fantasy = catalog.create_genre(&name("Fantasy")).await.unwrap();
    let adventure = catalog.create_genre(&name("Adventure")).await.unwrap();
    let classic = catalog.create_genre(&name("Classic")).await.unwrap();

    let tolkien = catalog.create_author(&author("J. R. R.", "Tolkien")).await.unwrap();
    let mut input = book("The Hobbit", "9780261103344", tolkien.id);
    input.genre_ids = vec![fantasy.id, adventure.id];
    let created = catalog.create_book(&input).await.unwrap();
    assert_eq!(created.genres.len(), 2);

    input.genre_ids = vec![classic.id];
    let updated = catalog.update_book(created.id, &input).await.unwrap();
    assert_eq!(updated.display_genre, "Classic");

    input.genre_ids = vec![9999];
    let err = catalog.update_book(created.id, &input).await.unwrap_err();
    match err {
        CatalogError::Validation(errors) => assert!(errors.has("genre_ids")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_by_id_unknown_or_malformed() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    for (kind, id) in [
        (EntityKind::Book, "42"),
        (EntityKind::Author, "not-a-number"),
        (EntityKind::Genre, "-1"),
        (EntityKind::BookInstance, "17"),
    ] {
        let err = catalog.get_by_id(kind, id).await.unwrap_err();
        assert!(
            matches!(err, CatalogError::NotFound { .. }),
            "{kind}/{id} should be not found"
        );
    }
}

#[tokio::test]
async fn test_authors_listed_by_last_then_first_name() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    catalog.create_author(&author("Zadie", "Smith")).await.unwrap();
    catalog.create_author(&author("Ali", "Smith")).await.unwrap();
    catalog.create_author(&author("Chinua", "Achebe")).await.unwrap();

    let names: Vec<String> = catalog
        .list_all(EntityKind::Author)
        .await
        .unwrap()
        .into_iter()
        .map(|record| match record {
            CatalogRecord::Author(a) => a.display_name,
            other => panic!("expected author, got {other:?}"),
        })
        .collect();

    assert_eq!(names, ["Achebe, Chinua", "Smith, Ali", "Smith, Zadie"]);
}

#[tokio::test]
async fn test_list_instances_filtered() {
    let state = setup().await;
    let catalog = &state.catalog_service;
    let today = Local::now().date_naive();

    let christie = catalog.create_author(&author("Agatha", "Christie")).await.unwrap();
    let novel = catalog
        .create_book(&book("Murder on the Orient Express", "9780007119318", christie.id))
        .await
        .unwrap();

    let mut due_today = copy(novel.id, LoanStatus::OnLoan);
    due_today.due_back = Some(today);
    catalog.create_instance(&due_today).await.unwrap();
    catalog
        .create_instance(&copy(novel.id, LoanStatus::Available))
        .await
        .unwrap();

    let on_loan = catalog
        .list_instances(&InstanceFilter {
            status: Some(LoanStatus::OnLoan),
            due_back: None,
        })
        .await
        .unwrap();
    assert_eq!(on_loan.len(), 1);
    assert!(!on_loan[0].is_due);

    let undated = catalog
        .list_instances(&InstanceFilter {
            status: None,
            due_back: Some(DueBackFilter::NoDate),
        })
        .await
        .unwrap();
    assert_eq!(undated.len(), 1);
    assert_eq!(undated[0].status, LoanStatus::Available);

    let today_bucket = catalog
        .list_instances(&InstanceFilter {
            status: None,
            due_back: Some(DueBackFilter::Today),
        })
        .await
        .unwrap();
    assert_eq!(today_bucket.len(), 1);
}

#[tokio::test]
async fn test_author_validation() {
    let state = setup().await;
    let catalog = &state.catalog_service;

    let mut input = author("", "Nobody");
    input.date_of_birth = chrono::NaiveDate::from_ymd_opt(1900, 1, 1);
    input.date_of_death = chrono::NaiveDate::from_ymd_opt(1899, 1, 1);

    match catalog.create_author(&input).await.unwrap_err() {
        CatalogError::Validation(errors) => {
            assert!(errors.has("first_name"));
            assert!(errors.has("date_of_death"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(catalog.count_all(EntityKind::Author).await.unwrap(), 0);
}

#[tokio::test]
async fn test_signup_mismatch_creates_nothing() {
    let state = setup().await;
    let before = state.store.user_count().await.unwrap();

    let form = SignupForm {
        username: "newreader".to_string(),
        first_name: "New".to_string(),
        last_name: "Reader".to_string(),
        password1: "tangerine-orbit-42".to_string(),
        password2: "tangerine-orbit-43".to_string(),
    };

    match state.auth_service.register_user(&form).await.unwrap_err() {
        AuthError::Validation(errors) => {
            assert_eq!(
                errors.get("password2"),
                ["The two password fields didn't match."]
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    assert_eq!(state.store.user_count().await.unwrap(), before);
}

#[tokio::test]
async fn test_signup_creates_one_account_and_rejects_duplicates() {
    let state = setup().await;
    let before = state.store.user_count().await.unwrap();

    let form = SignupForm {
        username: "newreader".to_string(),
        first_name: "New".to_string(),
        last_name: "Reader".to_string(),
        password1: "tangerine-orbit-42".to_string(),
        password2: "tangerine-orbit-42".to_string(),
    };

    let user = state.auth_service.register_user(&form).await.unwrap();
    assert_eq!(user.username, "newreader");
    assert!(!user.is_staff);
    assert_eq!(state.store.user_count().await.unwrap(), before + 1);

    match state.auth_service.register_user(&form).await.unwrap_err() {
        AuthError::Validation(errors) => {
            assert_eq!(
                errors.get("username"),
                ["A user with that username already exists."]
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(state.store.user_count().await.unwrap(), before + 1);

    let login = state
        .auth_service
        .login("newreader", "tangerine-orbit-42")
        .await
        .unwrap();
    assert!(!login.api_key.is_empty());
}

#[tokio::test]
async fn test_signup_rejects_username_differing_only_in_case() {
    let state = setup().await;

    let mut form = SignupForm {
        username: "Reader".to_string(),
        first_name: "Casey".to_string(),
        last_name: "Shelf".to_string(),
        password1: "tangerine-orbit-42".to_string(),
        password2: "tangerine-orbit-42".to_string(),
    };
    state.auth_service.register_user(&form).await.unwrap();
    let after_first = state.store.user_count().await.unwrap();

    form.username = "reader".to_string();
    match state.auth_service.register_user(&form).await.unwrap_err() {
        AuthError::Validation(errors) => {
            assert_eq!(
                errors.get("username"),
                ["A user with that username already exists."]
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(state.store.user_count().await.unwrap(), after_first);
}
