//! Storefront API module
//!
//! Typed records and a client with one method per backend endpoint:
//! catalog browsing, account, buyer wishlist/orders and seller
//! product/order management.

mod client;
mod models;

pub use client::StorefrontClient;
pub use models::{
    Category, CategoryDetail, Credentials, ImageUpload, NewOrder, NewProduct, Order,
    OrderStatus, OrderUser, Product, ProductCategory, ProductUpdate, Registration,
    SubCategoryDetail, SubSubCategoryDetail, Wishlist,
};
