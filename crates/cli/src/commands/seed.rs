//! Seed the database with a demo catalog.
//!
//! The YAML file lists categories, brands, customers and products. Every
//! record goes through the same validation as the admin forms, so a seed
//! file cannot store anything the panel would reject. Products name their
//! brand and categories; those are looked up among live records after the
//! earlier sections are loaded.
//!
//! ```yaml
//! categories:
//!   - name: Kitchen
//! brands:
//!   - name: Acme
//!     url: https://acme.example
//! products:
//!   - name: Enamel mug
//!     sku: ACME-MUG-1
//!     price: "12.50"
//!     brand: Acme
//!     categories: [Kitchen]
//! ```
//!
//! Records that fail validation (including ones already present) are
//! skipped with a warning, so a file can be applied repeatedly.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};

use shopdesk_admin::components::FormInput;
use shopdesk_admin::db::{BrandRepository, CategoryRepository};
use shopdesk_admin::services::{self, SubmitError};

use super::{CommandError, connect};

/// A seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedFile {
    pub categories: Vec<CategorySeed>,
    pub brands: Vec<BrandSeed>,
    pub customers: Vec<CustomerSeed>,
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySeed {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrandSeed {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "yes")]
    pub is_visible: bool,
    #[serde(default)]
    pub primary_hex: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomerSeed {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub city: String,
    pub zip_code: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSeed {
    pub name: String,
    pub sku: String,
    /// Decimal string such as `"12.50"`.
    pub price: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default = "deliverable")]
    pub product_type: String,
    #[serde(default = "yes")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_featured: bool,
    /// `YYYY-MM-DD`; today when omitted.
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Brand name.
    #[serde(default)]
    pub brand: Option<String>,
    /// Category names.
    #[serde(default)]
    pub categories: Vec<String>,
}

const fn yes() -> bool {
    true
}

fn deliverable() -> String {
    "deliverable".to_string()
}

/// Per-section outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedCount {
    pub inserted: usize,
    pub skipped: usize,
}

fn pairs_with_optional(
    mut pairs: Vec<(&'static str, String)>,
    optional: &[(&'static str, &Option<String>)],
) -> Vec<(&'static str, String)> {
    for (key, value) in optional {
        if let Some(value) = value {
            pairs.push((key, value.clone()));
        }
    }
    pairs
}

fn toggle(pairs: &mut Vec<(&'static str, String)>, key: &'static str, on: bool) {
    if on {
        pairs.push((key, "1".to_string()));
    }
}

impl CategorySeed {
    #[must_use]
    pub fn to_form(&self) -> FormInput {
        FormInput::from_pairs([("name", self.name.clone())])
    }
}

impl BrandSeed {
    #[must_use]
    pub fn to_form(&self) -> FormInput {
        let mut pairs = pairs_with_optional(
            vec![("name", self.name.clone()), ("url", self.url.clone())],
            &[
                ("description", &self.description),
                ("primary_hex", &self.primary_hex),
            ],
        );
        toggle(&mut pairs, "is_visible", self.is_visible);
        FormInput::from_pairs(pairs)
    }
}

impl CustomerSeed {
    #[must_use]
    pub fn to_form(&self) -> FormInput {
        FormInput::from_pairs([
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("phone", self.phone.clone()),
            ("date_of_birth", self.date_of_birth.clone()),
            ("city", self.city.clone()),
            ("zip_code", self.zip_code.clone()),
            ("address", self.address.clone()),
        ])
    }
}

impl ProductSeed {
    /// Form values, with brand and category names resolved to IDs.
    ///
    /// Unknown names are passed through unresolved so validation reports
    /// them as invalid choices.
    #[must_use]
    pub fn to_form(
        &self,
        brands: &HashMap<String, String>,
        categories: &HashMap<String, String>,
    ) -> FormInput {
        let mut pairs = pairs_with_optional(
            vec![
                ("name", self.name.clone()),
                ("sku", self.sku.clone()),
                ("price", self.price.clone()),
                ("quantity", self.quantity.to_string()),
                ("product_type", self.product_type.clone()),
            ],
            &[
                ("published_at", &self.published_at),
                ("description", &self.description),
                ("image", &self.image),
            ],
        );
        toggle(&mut pairs, "is_visible", self.is_visible);
        toggle(&mut pairs, "is_featured", self.is_featured);
        if let Some(brand) = &self.brand {
            let id = brands.get(brand).unwrap_or(brand);
            pairs.push(("brand_id", id.clone()));
        }
        for name in &self.categories {
            let id = categories.get(name).unwrap_or(name);
            pairs.push(("category_ids", id.clone()));
        }

        if self.published_at.is_none() {
            pairs.push(("published_at", Utc::now().date_naive().to_string()));
        }
        FormInput::from_pairs(pairs)
    }
}

/// Load a seed file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid seed YAML.
pub async fn load(path: &Path) -> Result<SeedFile, CommandError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: path.display().to_string(),
            source,
        })?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Seed from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is unreadable or the database fails.
/// Invalid records are skipped, not errors.
pub async fn run(path: &Path) -> Result<(), CommandError> {
    info!(path = %path.display(), "Loading seed file");
    let seed = load(path).await?;
    let pool = connect().await?;

    let categories = insert_all(&seed.categories, "category", |c| {
        let form = c.to_form();
        let pool = pool.clone();
        async move { services::categories::create(&pool, &form).await.map(|_| ()) }
    })
    .await?;
    let brands = insert_all(&seed.brands, "brand", |b| {
        let form = b.to_form();
        let pool = pool.clone();
        async move { services::brands::create(&pool, &form).await.map(|_| ()) }
    })
    .await?;
    let customers = insert_all(&seed.customers, "customer", |c| {
        let form = c.to_form();
        let pool = pool.clone();
        async move { services::customers::create(&pool, &form).await.map(|_| ()) }
    })
    .await?;

    let brand_ids = name_to_id(&pool, Lookup::Brands).await?;
    let category_ids = name_to_id(&pool, Lookup::Categories).await?;
    let products = insert_all(&seed.products, "product", |p| {
        let form = p.to_form(&brand_ids, &category_ids);
        let pool = pool.clone();
        async move { services::products::create(&pool, &form).await.map(|_| ()) }
    })
    .await?;

    info!("Seeding complete!");
    for (section, count) in [
        ("Categories", categories),
        ("Brands", brands),
        ("Customers", customers),
        ("Products", products),
    ] {
        info!(
            "  {section}: {} inserted, {} skipped",
            count.inserted, count.skipped
        );
    }
    Ok(())
}

async fn insert_all<T, F, Fut>(
    records: &[T],
    kind: &str,
    mut insert: F,
) -> Result<SeedCount, CommandError>
where
    F: FnMut(&T) -> Fut,
    Fut: Future<Output = Result<(), SubmitError>>,
{
    let mut count = SeedCount::default();
    for (index, record) in records.iter().enumerate() {
        match insert(record).await {
            Ok(()) => count.inserted += 1,
            Err(SubmitError::Invalid(errors)) => {
                count.skipped += 1;
                for (field, message) in errors.iter() {
                    warn!(kind, index, field, "skipped: {message}");
                }
            }
            Err(SubmitError::Repository(err)) => return Err(err.into()),
        }
    }
    Ok(count)
}

enum Lookup {
    Brands,
    Categories,
}

async fn name_to_id(pool: &PgPool, lookup: Lookup) -> Result<HashMap<String, String>, CommandError> {
    let options = match lookup {
        Lookup::Brands => BrandRepository::new(pool).options().await?,
        Lookup::Categories => CategoryRepository::new(pool).options().await?,
    };
    Ok(options.into_iter().map(|o| (o.label, o.value)).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DEMO: &str = r##"
categories:
  - name: Kitchen
brands:
  - name: Acme
    url: https://acme.example
    primary_hex: "#112233"
customers:
  - name: Ada Lovelace
    email: ada@example.com
    phone: "555-0100"
    date_of_birth: "1990-12-10"
    city: London
    zip_code: N1 9GU
    address: 12 Analytical Row
products:
  - name: Enamel mug
    sku: ACME-MUG-1
    price: "12.50"
    quantity: 40
    is_featured: true
    brand: Acme
    categories: [Kitchen, Garden]
"##;

    #[test]
    fn test_parse_seed_file_with_defaults() {
        let seed: SeedFile = serde_yaml::from_str(DEMO).unwrap();
        assert_eq!(seed.categories.len(), 1);
        assert!(seed.brands[0].is_visible);
        assert_eq!(seed.products[0].product_type, "deliverable");
        assert!(seed.products[0].is_visible);
        assert!(seed.products[0].published_at.is_none());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = serde_yaml::from_str::<SeedFile>("brands:\n  - name: A\n    url: x\n    slug: a\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_brand_form_omits_unchecked_toggle() {
        let seed: SeedFile = serde_yaml::from_str(DEMO).unwrap();
        let mut brand = seed.brands.into_iter().next().unwrap();
        let form = brand.to_form();
        assert!(form.is_checked("is_visible"));
        assert_eq!(form.value("primary_hex"), "#112233");
        assert_eq!(form.get("description"), None);

        brand.is_visible = false;
        assert!(!brand.to_form().is_checked("is_visible"));
    }

    #[test]
    fn test_product_form_resolves_names() {
        let seed: SeedFile = serde_yaml::from_str(DEMO).unwrap();
        let brands = HashMap::from([("Acme".to_string(), "3".to_string())]);
        let categories = HashMap::from([("Kitchen".to_string(), "7".to_string())]);

        let form = seed.products[0].to_form(&brands, &categories);

        assert_eq!(form.value("brand_id"), "3");
        // Unknown names stay as-is and fail validation later.
        assert_eq!(form.all("category_ids"), ["7".to_string(), "Garden".to_string()]);
        assert!(form.is_checked("is_featured"));
        assert!(form.is_checked("is_visible"));
        assert_eq!(
            form.value("published_at"),
            Utc::now().date_naive().to_string()
        );
    }
}
