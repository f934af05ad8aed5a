//! Storefront records
//!
//! Response records are lenient: the backend sends ids and prices as
//! either numbers or numeric strings, and omits fields freely.

use crate::error::ResultExt;
use crate::http::MultipartField;
use crate::types::Role;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Lenient number decoding
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(u64),
    Float(f64),
    Text(String),
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(lenient_f64_opt(deserializer)?.unwrap_or_default())
}

fn lenient_f64_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(NumberOrString::Int(n)) => Some(n as f64),
        Some(NumberOrString::Float(n)) => Some(n),
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
    })
}

fn lenient_u64_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(NumberOrString::Int(n)) => Some(n),
        Some(NumberOrString::Float(n)) if n >= 0.0 => Some(n as u64),
        Some(NumberOrString::Float(_)) => None,
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
    })
}

// ============================================================================
// Catalog
// ============================================================================

/// A product as listed, shown in detail, or held in a wishlist
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    /// Numeric id
    #[serde(default, deserialize_with = "lenient_u64_opt")]
    pub id: Option<u64>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// URL key
    #[serde(default)]
    pub slug: String,
    /// Unit price
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    /// Units in stock
    #[serde(default, deserialize_with = "lenient_u64_opt")]
    pub stock: Option<u64>,
    /// Image URL
    #[serde(default)]
    pub image: Option<String>,
    /// Long description (detail view only)
    #[serde(default)]
    pub description: Option<String>,
    /// Creation timestamp as sent by the server
    #[serde(default)]
    pub created_at: Option<String>,
    /// Leaf category the product is filed under
    #[serde(default, deserialize_with = "lenient_u64_opt")]
    pub sub_sub_category_id: Option<u64>,
}

/// A category at any of the three levels
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Category {
    /// Numeric id
    #[serde(default, deserialize_with = "lenient_u64_opt")]
    pub id: Option<u64>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// URL key
    #[serde(default)]
    pub slug: Option<String>,
}

/// `GET /api/categories/{slug}?with=subCategories`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryDetail {
    /// The category itself
    #[serde(flatten)]
    pub category: Category,
    /// Its sub-categories
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sub_categories: Vec<Category>,
}

/// `GET /api/sub-categories/{slug}?with=subSubCategories`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubCategoryDetail {
    /// The sub-category itself
    #[serde(flatten)]
    pub category: Category,
    /// Its sub-sub-categories
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sub_sub_categories: Vec<Category>,
}

/// Link row between a sub-sub-category and a product
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductCategory {
    /// The linked product
    #[serde(default)]
    pub product: Option<Product>,
}

/// `GET /api/sub-sub-categories/{slug}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubSubCategoryDetail {
    /// The sub-sub-category itself
    #[serde(flatten)]
    pub category: Category,
    /// Product links
    #[serde(default, deserialize_with = "null_as_empty")]
    pub product_categories: Vec<ProductCategory>,
}

impl SubSubCategoryDetail {
    /// Products filed under this sub-sub-category
    pub fn products(&self) -> Vec<Product> {
        self.product_categories
            .iter()
            .filter_map(|pc| pc.product.clone())
            .collect()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `GET /api/user/wishlists` content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Wishlist {
    /// Wishlisted products
    #[serde(default, deserialize_with = "null_as_empty")]
    pub products: Vec<Product>,
}

// ============================================================================
// Orders
// ============================================================================

/// Order status as managed by the seller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Placed, not yet handled
    Pending,
    /// Being prepared
    OnProgress,
    /// Delivered
    Finished,
    /// Cancelled
    Cancelled,
    /// Any status this client does not know about
    Other(String),
}

impl OrderStatus {
    /// Statuses a seller can pick from
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::OnProgress,
        OrderStatus::Finished,
        OrderStatus::Cancelled,
    ];

    /// Wire name
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::OnProgress => "on progress",
            OrderStatus::Finished => "finished",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other(s) => s,
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Other(String::new())
    }
}

fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OrderStatus, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .map(OrderStatus::from)
        .unwrap_or_default())
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "on progress" | "on_progress" | "on-progress" => OrderStatus::OnProgress,
            "finished" => OrderStatus::Finished,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        OrderStatus::from(s.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buyer shown on a seller's order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderUser {
    /// Buyer username
    #[serde(default)]
    pub username: Option<String>,
    /// Buyer phone
    #[serde(default)]
    pub phone: Option<String>,
}

/// An order as seen by the seller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order id
    #[serde(default, deserialize_with = "lenient_u64_opt")]
    pub id: Option<u64>,
    /// Current status, `Other("")` when the backend sends none
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: OrderStatus,
    /// Ordered quantity
    #[serde(default, deserialize_with = "lenient_u64_opt")]
    pub quantity: Option<u64>,
    /// Total price
    #[serde(default, deserialize_with = "lenient_f64_opt")]
    pub total_price: Option<f64>,
    /// Ordered product
    #[serde(default)]
    pub product: Option<Product>,
    /// Buyer
    #[serde(default)]
    pub user: Option<OrderUser>,
}

// ============================================================================
// Requests
// ============================================================================

/// `POST /api/auth/register` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
    /// Phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Account role
    pub role: Role,
}

/// `POST /api/auth/login` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
    /// Role to log in as
    pub role: Role,
}

/// `POST /api/auth/login` content
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub(crate) struct LoginContent {
    #[serde(default)]
    pub token: Option<String>,
}

/// Image file for product uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name sent to the server
    pub file_name: String,
    /// File contents
    pub bytes: Vec<u8>,
    /// MIME type, if known
    pub mime: Option<String>,
}

impl ImageUpload {
    /// Create an upload, guessing the MIME type from the file extension
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = guess_image_mime(&file_name).map(String::from);
        Self {
            file_name,
            bytes,
            mime,
        }
    }

    /// Read an image from disk
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("cannot read image {}", path.display()))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// Multipart field carrying this image
    pub(crate) fn to_field(&self, name: &str) -> MultipartField {
        MultipartField::file(
            name,
            self.file_name.clone(),
            self.bytes.clone(),
            self.mime.clone(),
        )
    }
}

fn guess_image_mime(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// `PUT /api/seller/products/{slug}` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    /// Display name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub stock: u64,
    /// Leaf category id
    pub sub_sub_category_id: u64,
}

/// `POST /api/seller/products` multipart body
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub stock: u64,
    /// Leaf category id
    pub sub_sub_category_id: u64,
    /// Product image
    pub image: ImageUpload,
}

impl NewProduct {
    /// Multipart fields in the order the server expects
    pub(crate) fn to_fields(&self) -> Vec<MultipartField> {
        vec![
            MultipartField::text("name", &self.name),
            self.image.to_field("imageFile"),
            MultipartField::text("price", self.price),
            MultipartField::text("stock", self.stock),
            MultipartField::text("sub_sub_category_id", self.sub_sub_category_id),
        ]
    }
}

/// `POST /api/user/orders` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Slug of the product bought
    pub product_slug: String,
    /// Number of units
    pub quantity: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_product_lenient_numbers() {
        let product: Product = serde_json::from_value(json!({
            "id": "12",
            "name": "Kopi Gayo",
            "slug": "kopi-gayo",
            "price": "45000.00",
            "stock": 7,
            "image": "http://localhost:8000/storage/kopi.png"
        }))
        .unwrap();

        assert_eq!(product.id, Some(12));
        assert_eq!(product.price, 45000.0);
        assert_eq!(product.stock, Some(7));
        assert!(product.description.is_none());
    }

    #[test]
    fn test_product_missing_fields_default() {
        let product: Product = serde_json::from_value(json!({"name": "Teh"})).unwrap();
        assert_eq!(product.price, 0.0);
        assert!(product.slug.is_empty());
        assert!(product.id.is_none());
    }

    #[test]
    fn test_category_detail_null_children() {
        let detail: CategoryDetail = serde_json::from_value(json!({
            "id": 1, "name": "Minuman", "slug": "minuman", "sub_categories": null
        }))
        .unwrap();
        assert_eq!(detail.category.name, "Minuman");
        assert!(detail.sub_categories.is_empty());
    }

    #[test]
    fn test_sub_sub_category_products() {
        let detail: SubSubCategoryDetail = serde_json::from_value(json!({
            "name": "Kopi Bubuk",
            "slug": "kopi-bubuk",
            "product_categories": [
                {"product": {"id": 1, "name": "Kopi A", "slug": "kopi-a", "price": 10}},
                {"product": null},
                {"product": {"id": 2, "name": "Kopi B", "slug": "kopi-b", "price": 20}}
            ]
        }))
        .unwrap();

        let slugs: Vec<_> = detail.products().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["kopi-a", "kopi-b"]);
    }

    #[test_case("pending", OrderStatus::Pending)]
    #[test_case("on progress", OrderStatus::OnProgress)]
    #[test_case("Finished", OrderStatus::Finished)]
    #[test_case("canceled", OrderStatus::Cancelled)]
    fn test_order_status_parse(raw: &str, expected: OrderStatus) {
        assert_eq!(OrderStatus::from(raw), expected);
    }

    #[test]
    fn test_order_status_unknown_preserved() {
        let status: OrderStatus = serde_json::from_value(json!("shipped")).unwrap();
        assert_eq!(status, OrderStatus::Other("shipped".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("shipped"));
        assert_eq!(
            serde_json::to_value(OrderStatus::OnProgress).unwrap(),
            json!("on progress")
        );
    }

    #[test]
    fn test_order_deserialize() {
        let order: Order = serde_json::from_value(json!({
            "id": 5,
            "status": "pending",
            "total_price": "90000",
            "product": {"name": "Kopi Gayo"},
            "user": {"username": "budi", "phone": "08123456789"}
        }))
        .unwrap();

        assert_eq!(order.id, Some(5));
        assert_eq!(order.total_price, Some(90000.0));
        assert_eq!(order.product.unwrap().name, "Kopi Gayo");
        assert_eq!(order.user.unwrap().username.as_deref(), Some("budi"));
    }

    #[test]
    fn test_order_status_missing_or_null() {
        let missing: Order = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(missing.status, OrderStatus::Other(String::new()));

        let null: Order = serde_json::from_value(json!({"id": 2, "status": null})).unwrap();
        assert_eq!(null.status, OrderStatus::default());
        assert_eq!(null.status.as_str(), "");
    }

    #[tokio::test]
    async fn test_image_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kopi.png");
        std::fs::write(&path, b"png").unwrap();

        let upload = ImageUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "kopi.png");
        assert_eq!(upload.mime.as_deref(), Some("image/png"));

        let err = ImageUpload::from_path(dir.path().join("absent.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("cannot read image"));
    }

    #[test]
    fn test_image_upload_mime_guess() {
        assert_eq!(
            ImageUpload::new("a.JPG", vec![]).mime.as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(
            ImageUpload::new("a.png", vec![]).mime.as_deref(),
            Some("image/png")
        );
        assert!(ImageUpload::new("README", vec![]).mime.is_none());
    }

    #[test]
    fn test_new_product_fields() {
        let product = NewProduct {
            name: "Kopi".into(),
            price: 15000.0,
            stock: 3,
            sub_sub_category_id: 9,
            image: ImageUpload::new("kopi.png", b"png".to_vec()),
        };

        let names: Vec<_> = product
            .to_fields()
            .into_iter()
            .map(|f| match f {
                MultipartField::Text { name, .. } | MultipartField::File { name, .. } => name,
            })
            .collect();
        assert_eq!(
            names,
            vec!["name", "imageFile", "price", "stock", "sub_sub_category_id"]
        );
    }

    #[test]
    fn test_registration_serializes_role() {
        let reg = Registration {
            username: "sari".into(),
            password: "rahasia1".into(),
            phone: "081234567890".into(),
            email: "sari@gmail.com".into(),
            role: Role::Seller,
        };
        assert_eq!(serde_json::to_value(&reg).unwrap()["role"], "seller");
    }
}
