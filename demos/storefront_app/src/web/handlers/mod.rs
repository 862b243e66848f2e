// demos/storefront_app/src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod product_handlers;

#[cfg(test)]
pub(crate) mod test_support;
