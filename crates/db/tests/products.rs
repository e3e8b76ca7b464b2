//! Integration tests for product listing and inventory.

use catalog_core::category::{CategoryPath, CategoryRank, ParentRefs};
use catalog_core::listing::{ProductSort, SortOrder};
use catalog_db::models::brand::CreateBrand;
use catalog_db::models::product::{CreateProduct, ProductFilter, UpdateProduct};
use catalog_db::repositories::{BrandRepo, CategoryRepo, ProductRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn product(name: &str, sku: &str, price_cents: i64) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        sku: sku.to_string(),
        description: None,
        price_cents: Some(price_cents),
        stock_quantity: Some(5),
        brand_id: None,
        categories: CategoryPath::default(),
        image_urls: vec![],
    }
}

fn filter(limit: i64) -> ProductFilter {
    ProductFilter {
        limit,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Test: create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_applies_defaults(pool: PgPool) {
    let created = ProductRepo::create(
        &pool,
        &CreateProduct {
            price_cents: None,
            stock_quantity: None,
            ..product("  Widget  ", "W-1", 0)
        },
    )
    .await
    .unwrap();

    assert_eq!(created.name, "Widget");
    assert_eq!(created.price_cents, 0);
    assert_eq!(created.stock_quantity, 0);
    assert!(created.image_urls.is_empty());
    assert_eq!(created.product_template_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_sku_is_unique_violation(pool: PgPool) {
    ProductRepo::create(&pool, &product("A", "DUP", 1)).await.unwrap();

    let err = ProductRepo::create(&pool, &product("B", "DUP", 1)).await.unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
            assert_eq!(db_err.constraint(), Some("uq_products_sku"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_sorts_and_pages(pool: PgPool) {
    ProductRepo::create(&pool, &product("Charlie", "C", 300)).await.unwrap();
    ProductRepo::create(&pool, &product("Alpha", "A", 200)).await.unwrap();
    ProductRepo::create(&pool, &product("Bravo", "B", 100)).await.unwrap();

    let by_name = ProductRepo::list(&pool, &filter(10)).await.unwrap();
    let names: Vec<_> = by_name.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);
    assert_eq!(by_name.total, 3);

    let by_price_desc = ProductRepo::list(
        &pool,
        &ProductFilter {
            sort: ProductSort::Price,
            order: SortOrder::Desc,
            ..filter(2)
        },
    )
    .await
    .unwrap();
    let prices: Vec<_> = by_price_desc.items.iter().map(|p| p.price_cents).collect();
    assert_eq!(prices, vec![300, 200]);
    assert_eq!(by_price_desc.total, 3);

    let second_page = ProductRepo::list(
        &pool,
        &ProductFilter {
            offset: 2,
            ..filter(2)
        },
    )
    .await
    .unwrap();
    assert_eq!(second_page.items.len(), 1);
    assert_eq!(second_page.items[0].name, "Charlie");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_brand_and_category(pool: PgPool) {
    let primary = CategoryRepo::create(&pool, "Heating", CategoryRank::Primary, &ParentRefs::default())
        .await
        .unwrap();
    let brand = BrandRepo::create(
        &pool,
        &CreateBrand {
            name: "Acme".to_string(),
            description: None,
            logo_url: None,
            categories: CategoryPath::default(),
        },
    )
    .await
    .unwrap();

    ProductRepo::create(
        &pool,
        &CreateProduct {
            brand_id: Some(brand.id),
            categories: CategoryPath {
                primary_category_id: Some(primary.id),
                ..Default::default()
            },
            ..product("Boiler", "B-1", 100)
        },
    )
    .await
    .unwrap();
    ProductRepo::create(&pool, &product("Fan", "F-1", 100)).await.unwrap();

    let branded = ProductRepo::list(
        &pool,
        &ProductFilter {
            brand_id: Some(brand.id),
            ..filter(10)
        },
    )
    .await
    .unwrap();
    assert_eq!(branded.total, 1);
    assert_eq!(branded.items[0].name, "Boiler");

    let in_category = ProductRepo::list(
        &pool,
        &ProductFilter {
            categories: CategoryPath {
                primary_category_id: Some(primary.id),
                ..Default::default()
            },
            ..filter(10)
        },
    )
    .await
    .unwrap();
    assert_eq!(in_category.total, 1);

    // Deleting the brand keeps the product.
    assert!(BrandRepo::delete(&pool, brand.id).await.unwrap());
    let all = ProductRepo::list(&pool, &filter(10)).await.unwrap();
    assert_eq!(all.total, 2);
    assert!(all.items.iter().all(|p| p.brand_id.is_none()));
}

// ---------------------------------------------------------------------------
// Test: update, stock, images
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update_keeps_other_columns(pool: PgPool) {
    let created = ProductRepo::create(&pool, &product("Widget", "W-1", 100)).await.unwrap();

    let updated = ProductRepo::update(
        &pool,
        created.id,
        &UpdateProduct {
            name: None,
            sku: None,
            description: Some(Some("Sturdy".to_string())),
            price_cents: Some(150),
            brand_id: None,
            categories: None,
            image_urls: None,
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.name, "Widget");
    assert_eq!(updated.price_cents, 150);
    assert_eq!(updated.description.as_deref(), Some("Sturdy"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_adjust_stock_never_goes_negative(pool: PgPool) {
    let created = ProductRepo::create(&pool, &product("Widget", "W-1", 100)).await.unwrap();

    let restocked = ProductRepo::adjust_stock(&pool, created.id, 10).await.unwrap().unwrap();
    assert_eq!(restocked.stock_quantity, 15);

    let sold = ProductRepo::adjust_stock(&pool, created.id, -15).await.unwrap().unwrap();
    assert_eq!(sold.stock_quantity, 0);

    assert!(ProductRepo::adjust_stock(&pool, created.id, -1).await.unwrap().is_none());
    let unchanged = ProductRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(unchanged.stock_quantity, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_images_and_delete(pool: PgPool) {
    let created = ProductRepo::create(&pool, &product("Widget", "W-1", 100)).await.unwrap();
    let urls = vec!["https://cdn.example.com/a.png".to_string()];

    let updated = ProductRepo::replace_images(&pool, created.id, &urls).await.unwrap().unwrap();
    assert_eq!(updated.image_urls, urls);

    assert!(ProductRepo::delete(&pool, created.id).await.unwrap());
    assert!(!ProductRepo::delete(&pool, created.id).await.unwrap());
    assert!(ProductRepo::find_by_id(&pool, created.id).await.unwrap().is_none());
}
